//! Owner report history.

use brandsight_core::StoredReport;

use crate::error::{PipelineError, Stage};
use crate::store::ReportStore;

/// An owner's reports.
#[derive(Debug, Clone, PartialEq)]
pub enum History {
    /// Known owner with no reports yet.
    Empty,
    /// Newest first.
    Reports(Vec<StoredReport>),
}

impl History {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            History::Empty => 0,
            History::Reports(reports) => reports.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// List every report an owner has, newest first.
///
/// # Errors
///
/// - [`PipelineError::Validation`] if `owner_id` is blank or unregistered.
/// - [`PipelineError::Persistence`] if the store cannot be read.
pub async fn list_history(
    store: &dyn ReportStore,
    owner_id: &str,
) -> Result<History, PipelineError> {
    let owner_id = owner_id.trim();
    if owner_id.is_empty() {
        return Err(PipelineError::validation("ownerId is required"));
    }

    let known = store
        .owner_exists(owner_id)
        .await
        .map_err(|e| PipelineError::persistence(Stage::History, e))?;
    if !known {
        return Err(PipelineError::validation(format!(
            "unknown owner '{owner_id}'"
        )));
    }

    let reports = store
        .read_all_by_owner(owner_id)
        .await
        .map_err(|e| PipelineError::persistence(Stage::History, e))?;

    if reports.is_empty() {
        Ok(History::Empty)
    } else {
        Ok(History::Reports(reports))
    }
}
