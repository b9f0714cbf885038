//! Core transaction domain types.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{category::CategoryId, family::Family, user::UserId};

/// Database identifier for a transaction.
///
/// IDs are assigned per family table, so an income transaction and an expense
/// transaction can share a numeric ID. A transaction is only fully identified
/// by its ID together with its family, and a family migration assigns a new
/// ID in the target table.
pub type TransactionId = i64;

/// A transaction row as stored in one of the two family tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction within its family's table.
    pub id: TransactionId,
    /// The user who recorded the transaction.
    pub user_id: UserId,
    /// The category the transaction belongs to, within the same family.
    pub category_id: CategoryId,
    /// The amount of money earned or spent.
    pub amount: f64,
    /// A text description of what the transaction was for.
    pub description: String,
    /// When the transaction happened.
    pub date: Date,
    /// Which family table the row lives in.
    pub family: Family,
}

/// A transaction enriched with its category name, as shown in the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    /// The ID of the transaction within its family's table.
    pub id: TransactionId,
    /// The amount of money earned or spent.
    pub amount: f64,
    /// When the transaction happened.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The name of the transaction's category.
    pub category: String,
    /// The ID of the transaction's category, used to prefill the edit form.
    pub category_id: CategoryId,
    /// Which family the transaction belongs to.
    pub family: Family,
}

/// The form payload shared by the create and edit endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionForm {
    /// The amount of money earned or spent.
    pub amount: f64,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The category the transaction belongs to, within `family`.
    pub category_id: CategoryId,
    /// When the transaction happened.
    pub date: Date,
    /// Whether this is an income or expense transaction.
    pub family: Family,
}
