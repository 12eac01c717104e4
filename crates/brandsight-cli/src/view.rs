//! Client view state.
//!
//! A [`ClientSession`] holds which view is active, which sentiment group is
//! expanded, and the report currently on display.

use brandsight_core::{Sentiment, StoredReport};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CurrentView {
    #[default]
    Dashboard,
    History,
    Report,
    About,
}

/// Which sentiment group of reviews is expanded. At most one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ExpandFilter {
    #[default]
    None,
    Negative,
    Neutral,
    Positive,
}

impl ExpandFilter {
    /// Sentiment the filter selects, if any.
    #[must_use]
    pub fn sentiment(self) -> Option<Sentiment> {
        match self {
            ExpandFilter::None => None,
            ExpandFilter::Negative => Some(Sentiment::Negative),
            ExpandFilter::Neutral => Some(Sentiment::Neutral),
            ExpandFilter::Positive => Some(Sentiment::Positive),
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ExpandFilter::None => "None",
            ExpandFilter::Negative => "Negative",
            ExpandFilter::Neutral => "Neutral",
            ExpandFilter::Positive => "Positive",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClientSession {
    view: CurrentView,
    filter: ExpandFilter,
    displayed: Option<StoredReport>,
    history: Vec<StoredReport>,
}

impl ClientSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn view(&self) -> CurrentView {
        self.view
    }

    #[must_use]
    pub fn filter(&self) -> ExpandFilter {
        self.filter
    }

    /// The report held for display and export, whatever the current view.
    #[must_use]
    pub fn displayed(&self) -> Option<&StoredReport> {
        self.displayed.as_ref()
    }

    /// The report to render in the current view. `None` in `History` and `About`.
    #[must_use]
    pub fn visible_report(&self) -> Option<&StoredReport> {
        match self.view {
            CurrentView::Dashboard | CurrentView::Report => self.displayed.as_ref(),
            CurrentView::History | CurrentView::About => None,
        }
    }

    #[must_use]
    pub fn history(&self) -> &[StoredReport] {
        &self.history
    }

    pub fn switch_view(&mut self, view: CurrentView) {
        self.view = view;
    }

    /// Show a freshly analysed report on the dashboard.
    pub fn show_analysis(&mut self, report: StoredReport) {
        self.displayed = Some(report);
        self.filter = ExpandFilter::None;
        self.view = CurrentView::Dashboard;
    }

    /// Replace the loaded history list and switch to the history view.
    pub fn load_history(&mut self, reports: Vec<StoredReport>) {
        self.history = reports;
        self.view = CurrentView::History;
    }

    /// Open a report in the report view.
    pub fn open_report(&mut self, report: StoredReport) {
        self.displayed = Some(report);
        self.filter = ExpandFilter::None;
        self.view = CurrentView::Report;
    }

    /// Open a report from the loaded history by id. Returns `false` if absent.
    pub fn open_from_history(&mut self, id: Uuid) -> bool {
        match self.history.iter().find(|r| r.id == id).cloned() {
            Some(report) => {
                self.open_report(report);
                true
            }
            None => false,
        }
    }

    /// Make `filter` the only expanded group.
    pub fn select_filter(&mut self, filter: ExpandFilter) {
        self.filter = filter;
    }

    /// Expand `filter`, or collapse it if it is already expanded.
    pub fn toggle_filter(&mut self, filter: ExpandFilter) {
        self.filter = if self.filter == filter {
            ExpandFilter::None
        } else {
            filter
        };
    }
}
