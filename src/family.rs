//! The income/expense partition shared by categories and transactions.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// Selects which of the two parallel table families an operation targets.
///
/// Categories and transactions are physically split into income and expense
/// tables. A transaction's family decides which category table its category
/// ID must resolve against; there is no shared category namespace. Moving a
/// transaction between families therefore relocates the row between tables
/// rather than updating a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    /// Money earned: salaries, refunds, interest.
    Income,
    /// Money spent: groceries, rent, subscriptions.
    Expense,
}

impl Family {
    /// The transaction table backing this family.
    pub fn transaction_table(self) -> &'static str {
        match self {
            Family::Income => "income_transaction",
            Family::Expense => "expense_transaction",
        }
    }

    /// The category table backing this family.
    pub fn category_table(self) -> &'static str {
        match self {
            Family::Income => "income_category",
            Family::Expense => "expense_category",
        }
    }

    /// The lowercase tag used in URLs, forms, and ledger rows.
    pub fn as_str(self) -> &'static str {
        match self {
            Family::Income => "income",
            Family::Expense => "expense",
        }
    }

    /// The opposite family.
    pub fn other(self) -> Self {
        match self {
            Family::Income => Family::Expense,
            Family::Expense => Family::Income,
        }
    }

    /// Both families, in the order ledger queries visit them.
    pub const ALL: [Family; 2] = [Family::Income, Family::Expense];
}

impl Display for Family {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Family {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(Family::Income),
            "expense" => Ok(Family::Expense),
            other => Err(Error::InvalidFamily(other.to_string())),
        }
    }
}
