use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered owner id and the name given at registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub owner_id: String,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Owner {
    /// First word of the display name, used for greetings.
    #[must_use]
    pub fn first_name(&self) -> Option<&str> {
        self.display_name
            .as_deref()
            .and_then(|name| name.split_whitespace().next())
    }
}
