//! Interactive browsing over a [`ClientSession`].
//!
//! `brandsight browse` reads one command per line and redraws the current
//! view after each. Parsing and drawing live here; the binary does the I/O.

use std::path::PathBuf;

use crate::render::{history_lines, render_report};
use crate::view::{ClientSession, CurrentView, ExpandFilter};

pub const HELP: &[&str] = &[
    "Commands:",
    "  dashboard            show the last analysed report",
    "  history              reload and list stored reports",
    "  open <N>             open entry N from the history list",
    "  negative | neutral | positive",
    "                       expand that review group, or collapse it if open",
    "  about                about BrandSight",
    "  export [DIR]         export the report on display (default: .)",
    "  help                 this list",
    "  quit                 leave",
];

const ABOUT: &[&str] = &[
    "About BrandSight",
    "",
    "BrandSight collects recent store reviews for a brand, runs them through",
    "a sentiment engine, and keeps every report so you can compare over time.",
    "Each report lists the sentiment split, recurring keywords, suggestions,",
    "and every analysed review with its label and rating.",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    Dashboard,
    History,
    /// 1-based position in the loaded history.
    Open(usize),
    Toggle(ExpandFilter),
    About,
    Export(PathBuf),
    Help,
    Quit,
}

/// Parse one input line. Blank input is `Ok(None)`.
///
/// # Errors
///
/// Returns a message for unknown commands or a bad `open` index.
pub fn parse_command(line: &str) -> Result<Option<BrowseCommand>, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let arg = words.next();

    let command = match verb.to_ascii_lowercase().as_str() {
        "dashboard" | "d" => BrowseCommand::Dashboard,
        "history" | "h" => BrowseCommand::History,
        "open" | "o" => {
            let n = arg
                .and_then(|a| a.parse::<usize>().ok())
                .filter(|n| *n > 0)
                .ok_or_else(|| "usage: open <N> with N from the history list".to_string())?;
            BrowseCommand::Open(n)
        }
        "negative" | "neg" => BrowseCommand::Toggle(ExpandFilter::Negative),
        "neutral" | "neu" => BrowseCommand::Toggle(ExpandFilter::Neutral),
        "positive" | "pos" => BrowseCommand::Toggle(ExpandFilter::Positive),
        "about" => BrowseCommand::About,
        "export" => BrowseCommand::Export(PathBuf::from(arg.unwrap_or("."))),
        "help" | "?" => BrowseCommand::Help,
        "quit" | "exit" | "q" => BrowseCommand::Quit,
        other => return Err(format!("unknown command '{other}'; type 'help'")),
    };
    Ok(Some(command))
}

/// Open history entry `n` (1-based). Returns `false` if there is no such entry.
pub fn open_entry(session: &mut ClientSession, n: usize) -> bool {
    let id = n
        .checked_sub(1)
        .and_then(|i| session.history().get(i))
        .map(|report| report.id);
    id.is_some_and(|id| session.open_from_history(id))
}

/// Lines for the session's current view.
#[must_use]
pub fn screen(session: &ClientSession) -> Vec<String> {
    match session.view() {
        CurrentView::About => ABOUT.iter().map(|l| (*l).to_string()).collect(),
        CurrentView::History => history_lines(session.history()),
        CurrentView::Dashboard | CurrentView::Report => match session.visible_report() {
            Some(report) => render_report(report, session.filter()),
            None => vec![
                "No report on display. Run `brandsight analyze <URL>` or open one from history."
                    .to_string(),
            ],
        },
    }
}

#[cfg(test)]
mod tests {
    use brandsight_core::{
        ReportContent, ReviewItem, Sentiment, SentimentDistribution, StoredReport,
    };
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    fn report(title: &str) -> StoredReport {
        let mut review = ReviewItem::new("ana", 1, "crashes");
        review.sentiment = Some(Sentiment::Negative);
        StoredReport {
            id: Uuid::new_v4(),
            content: ReportContent {
                owner_id: "owner-1".to_string(),
                title: title.to_string(),
                description: String::new(),
                icon: String::new(),
                keywords: vec![],
                sentiment_distribution: SentimentDistribution {
                    negative: 100.0,
                    neutral: 0.0,
                    positive: 0.0,
                },
                analyzed_reviews: vec![review],
                suggestions: vec![],
                success: true,
            },
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn parses_commands_and_aliases() {
        assert_eq!(parse_command("  "), Ok(None));
        assert_eq!(parse_command("open 2"), Ok(Some(BrowseCommand::Open(2))));
        assert_eq!(
            parse_command("NEG"),
            Ok(Some(BrowseCommand::Toggle(ExpandFilter::Negative)))
        );
        assert_eq!(
            parse_command("export /tmp/out"),
            Ok(Some(BrowseCommand::Export(PathBuf::from("/tmp/out"))))
        );
        assert_eq!(
            parse_command("export"),
            Ok(Some(BrowseCommand::Export(PathBuf::from("."))))
        );
        assert_eq!(parse_command("q"), Ok(Some(BrowseCommand::Quit)));
    }

    #[test]
    fn open_needs_a_positive_index() {
        assert!(parse_command("open").is_err());
        assert!(parse_command("open 0").is_err());
        assert!(parse_command("open two").is_err());
        assert!(parse_command("launch").is_err());
    }

    #[test]
    fn opening_history_entries_by_position() {
        let mut session = ClientSession::new();
        session.load_history(vec![report("newest"), report("older")]);

        assert!(open_entry(&mut session, 2));
        assert_eq!(session.view(), CurrentView::Report);
        assert_eq!(
            session.displayed().map(|r| r.content.title.as_str()),
            Some("older")
        );
        assert!(!open_entry(&mut session, 3));
        assert!(!open_entry(&mut session, 0));
    }

    #[test]
    fn toggling_a_group_twice_collapses_it_on_screen() {
        let mut session = ClientSession::new();
        session.open_report(report("Spotify"));

        session.toggle_filter(ExpandFilter::Negative);
        assert!(screen(&session).iter().any(|l| l == "Negative reviews (1)"));
        session.toggle_filter(ExpandFilter::Negative);
        assert!(!screen(&session).iter().any(|l| l.starts_with("Negative reviews")));
    }

    #[test]
    fn about_hides_the_report_until_dashboard() {
        let mut session = ClientSession::new();
        session.show_analysis(report("Spotify"));

        session.switch_view(CurrentView::About);
        assert_eq!(screen(&session)[0], "About BrandSight");
        session.switch_view(CurrentView::Dashboard);
        assert_eq!(screen(&session)[0], "Spotify");
    }

    #[test]
    fn empty_dashboard_has_a_hint() {
        let session = ClientSession::new();
        assert!(screen(&session)[0].starts_with("No report on display"));
    }
}
