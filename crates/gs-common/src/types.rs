use serde::{Deserialize, Serialize};

/// The two kinds of account the platform serves. Hotels own utility bills;
/// travel agents own trips.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Hotel,
    TravelAgent,
}
