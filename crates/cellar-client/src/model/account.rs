// Account model types

use serde::{Deserialize, Serialize};

/// Body of the account create and update actions
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountPayload {
    /// Name of account
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl AccountPayload {
    pub fn new(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
        }
    }
}
