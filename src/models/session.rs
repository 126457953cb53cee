//! Per-visitor session state

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session data kept between requests of the same visitor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    #[serde(default)]
    pub num_visits: u64,
}

impl Session {
    /// Start a fresh session with a random identifier
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            num_visits: 0,
        }
    }

    /// Count one more visit, returning the number of visits before this one
    pub fn record_visit(&mut self) -> u64 {
        let previous = self.num_visits;
        self.num_visits = previous + 1;
        previous
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
