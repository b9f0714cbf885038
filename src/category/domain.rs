//! Core category domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// Database identifier for a category.
pub type CategoryId = i64;

/// A validated, non-empty category name.
///
/// Uniqueness within a family is enforced by the store, not by this type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyCategoryName] if `name` is an
    /// empty string.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategoryName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because
    /// if the non-empty invariant is violated it will cause incorrect
    /// behaviour but not affect memory safety.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CategoryName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryName::new(s)
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A fixed category that transactions of the matching family reference,
/// e.g. 'Salary' for income or 'Groceries' for expenses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// The ID of the category within its family's table.
    pub id: CategoryId,
    /// The category's unique name within its family.
    pub name: CategoryName,
    /// A brief description of what belongs in the category.
    pub description: Option<String>,
    /// Whether the category is offered for new transactions.
    ///
    /// Inactive categories stay referenced by old transactions without being
    /// deleted.
    pub is_active: bool,
    /// When the row was created, as recorded by the store.
    pub created_at: String,
    /// When the row was last updated, as recorded by the store.
    pub updated_at: String,
}

#[cfg(test)]
mod category_name_tests {
    use crate::Error;

    use super::CategoryName;

    #[test]
    fn new_fails_on_empty_string() {
        let category_name = CategoryName::new("");

        assert_eq!(category_name, Err(Error::EmptyCategoryName));
    }

    #[test]
    fn new_fails_on_just_whitespace() {
        let category_name = CategoryName::new("\n\t \r");

        assert_eq!(category_name, Err(Error::EmptyCategoryName));
    }

    #[test]
    fn new_succeeds_on_non_empty_string() {
        let category_name = CategoryName::new("Groceries");

        assert!(category_name.is_ok())
    }

    #[test]
    fn new_trims_whitespace() {
        let category_name = CategoryName::new("  Rent \n").unwrap();

        assert_eq!(category_name.as_ref(), "Rent");
    }
}
