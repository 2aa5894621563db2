//! Owner and physician selects for a client's accounts.

use serde::{Deserialize, Serialize};

use crate::option::{MultiSelectField, SelectField, SelectOption};

/// A user account belonging to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
    #[serde(default)]
    pub is_physician: bool,
}

/// Every account, labelled by email and tagged with a `physician` flag.
pub fn owner_options(accounts: &[AccountRecord]) -> Vec<SelectOption> {
    accounts
        .iter()
        .map(|account| {
            SelectOption::new(account.id.to_string(), account.email.clone())
                .with_attribute("physician", account.is_physician)
        })
        .collect()
}

/// Only the physician accounts.
pub fn physician_options(accounts: &[AccountRecord]) -> Vec<SelectOption> {
    owner_options(accounts)
        .into_iter()
        .filter(|option| option.attribute("physician") == Some("true"))
        .collect()
}

/// Parse a client id as typed or selected; anything non-numeric is `None`.
pub fn parse_client_id(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

/// Owners (multi) and physician (single) selects of a rep case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnerSelection {
    pub owners: MultiSelectField,
    pub physician: SelectField,
}

impl OwnerSelection {
    /// Re-derive both selects. Without a client id both are cleared.
    pub fn update(&mut self, client_id: Option<i64>, accounts: &[AccountRecord]) {
        if client_id.is_none() {
            self.clear();
            return;
        }
        self.owners.set_options(owner_options(accounts));
        self.physician.set_options(physician_options(accounts));
    }

    pub fn clear(&mut self) {
        self.owners.clear();
        self.physician.clear();
    }
}
