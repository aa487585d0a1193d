// Actions exposed by the cellar API

use std::{fmt, str::FromStr};

use crate::{constants::cellar_api_path, descriptor::HttpMethod, error::CellarError};

/// One remote action of the cellar API
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    CreateAccount,
    CreateBottle,
    ShowAccount,
    ShowBottle,
    UpdateAccount,
    UpdateBottle,
    DeleteAccount,
    DeleteBottle,
    ListBottle,
    RateBottle,
}

impl Action {
    pub const ALL: [Action; 10] = [
        Action::CreateAccount,
        Action::CreateBottle,
        Action::ShowAccount,
        Action::ShowBottle,
        Action::UpdateAccount,
        Action::UpdateBottle,
        Action::DeleteAccount,
        Action::DeleteBottle,
        Action::ListBottle,
        Action::RateBottle,
    ];

    /// Operation name as exposed by the API client ("createAccount", ...)
    pub fn name(&self) -> &'static str {
        match self {
            Action::CreateAccount => "createAccount",
            Action::CreateBottle => "createBottle",
            Action::ShowAccount => "showAccount",
            Action::ShowBottle => "showBottle",
            Action::UpdateAccount => "updateAccount",
            Action::UpdateBottle => "updateBottle",
            Action::DeleteAccount => "deleteAccount",
            Action::DeleteBottle => "deleteBottle",
            Action::ListBottle => "listBottle",
            Action::RateBottle => "rateBottle",
        }
    }

    pub fn method(&self) -> HttpMethod {
        match self {
            Action::CreateAccount | Action::CreateBottle => HttpMethod::Post,
            Action::ShowAccount | Action::ShowBottle | Action::ListBottle => HttpMethod::Get,
            Action::UpdateAccount | Action::RateBottle => HttpMethod::Put,
            Action::UpdateBottle => HttpMethod::Patch,
            Action::DeleteAccount | Action::DeleteBottle => HttpMethod::Delete,
        }
    }

    /// Documented path format; informational only
    pub fn path_pattern(&self) -> &'static str {
        match self {
            Action::CreateAccount => cellar_api_path::ACCOUNTS,
            Action::ShowAccount | Action::UpdateAccount | Action::DeleteAccount => {
                cellar_api_path::ACCOUNT
            }
            Action::CreateBottle | Action::ListBottle => cellar_api_path::BOTTLES,
            Action::ShowBottle | Action::UpdateBottle | Action::DeleteBottle => {
                cellar_api_path::BOTTLE
            }
            Action::RateBottle => cellar_api_path::BOTTLE_RATE,
        }
    }

    /// Whether the action sends a request body
    pub fn takes_payload(&self) -> bool {
        matches!(
            self,
            Action::CreateAccount
                | Action::CreateBottle
                | Action::UpdateAccount
                | Action::UpdateBottle
                | Action::RateBottle
        )
    }

    /// Whether the action accepts the `years` query filter
    pub fn takes_years(&self) -> bool {
        matches!(self, Action::ListBottle)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Action {
    type Err = CellarError;

    /// Accepts "createAccount", "create-account" and "create_account"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();

        Action::ALL
            .into_iter()
            .find(|action| action.name().to_ascii_lowercase() == normalized)
            .ok_or_else(|| CellarError::UnknownAction(s.to_string()))
    }
}
