//! The API endpoints URIs.
//!
//! For endpoints that take an ID parameter, e.g., '/transactions/{transaction_id}/edit',
//! use [format_endpoint]. For endpoints that also take a family parameter, use
//! [format_family_endpoint].

use crate::family::Family;

/// The root route which redirects to the ledger or sign-in page.
pub const ROOT: &str = "/";
/// The page for displaying a user's transactions for one month.
pub const TRANSACTIONS_VIEW: &str = "/transactions";
/// The page for creating a new transaction.
pub const NEW_TRANSACTION_VIEW: &str = "/transactions/new";
/// The page for editing an existing transaction.
pub const EDIT_TRANSACTION_VIEW: &str = "/transactions/{transaction_id}/edit";
/// The admin dashboard listing users, categories, and all transactions.
pub const ADMIN_VIEW: &str = "/admin";
/// The route for getting the sign-in page.
pub const SIGN_IN_VIEW: &str = "/sign_in";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route the identity provider integration posts verified identities to.
pub const SESSION_API: &str = "/auth/session";
/// The route for the client to end the current session.
pub const SIGN_OUT: &str = "/auth/sign_out";
/// The route to create a transaction.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route to update a transaction.
pub const PUT_TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to delete a transaction within a family.
pub const DELETE_TRANSACTION: &str = "/api/transactions/{family}/{transaction_id}";
/// The route for an admin to update a user's profile and role.
pub const PUT_ADMIN_USER: &str = "/api/admin/users/{user_id}";
/// The route for an admin to create a category.
pub const POST_ADMIN_CATEGORY: &str = "/api/admin/categories";
/// The route for an admin to update a category within a family.
pub const PUT_ADMIN_CATEGORY: &str = "/api/admin/categories/{family}/{category_id}";
/// The route for an admin to delete a category within a family.
pub const DELETE_ADMIN_CATEGORY: &str = "/api/admin/categories/{family}/{category_id}";
/// The route for an admin to update any transaction in place within a family.
pub const PUT_ADMIN_TRANSACTION: &str = "/api/admin/transactions/{family}/{transaction_id}";

/// Replace the ID parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/users/{user_id}', '{user_id}' is the
/// parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

/// Replace the family and ID parameters in `endpoint_path`.
///
/// The '{family}' parameter is replaced with the family's lowercase tag and
/// the remaining parameter with `id`.
pub fn format_family_endpoint(endpoint_path: &str, family: Family, id: i64) -> String {
    format_endpoint(&endpoint_path.replace("{family}", family.as_str()), id)
}

/// Replace the '{user_id}' parameter in `endpoint_path` with `user_id`.
///
/// User IDs are opaque strings assigned by the identity provider, so they
/// cannot go through [format_endpoint].
pub fn format_user_endpoint(endpoint_path: &str, user_id: &str) -> String {
    endpoint_path.replace("{user_id}", user_id)
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::{endpoints, family::Family};

    use super::{format_endpoint, format_family_endpoint, format_user_endpoint};

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::ROOT);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS_VIEW);
        assert_endpoint_is_valid_uri(endpoints::NEW_TRANSACTION_VIEW);
        assert_endpoint_is_valid_uri(endpoints::EDIT_TRANSACTION_VIEW);
        assert_endpoint_is_valid_uri(endpoints::ADMIN_VIEW);
        assert_endpoint_is_valid_uri(endpoints::SIGN_IN_VIEW);
        assert_endpoint_is_valid_uri(endpoints::INTERNAL_ERROR_VIEW);
        assert_endpoint_is_valid_uri(endpoints::STATIC);

        assert_endpoint_is_valid_uri(endpoints::SESSION_API);
        assert_endpoint_is_valid_uri(endpoints::SIGN_OUT);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS_API);
        assert_endpoint_is_valid_uri(endpoints::PUT_TRANSACTION);
        assert_endpoint_is_valid_uri(endpoints::DELETE_TRANSACTION);
        assert_endpoint_is_valid_uri(endpoints::PUT_ADMIN_USER);
        assert_endpoint_is_valid_uri(endpoints::POST_ADMIN_CATEGORY);
        assert_endpoint_is_valid_uri(endpoints::PUT_ADMIN_CATEGORY);
        assert_endpoint_is_valid_uri(endpoints::DELETE_ADMIN_CATEGORY);
        assert_endpoint_is_valid_uri(endpoints::PUT_ADMIN_TRANSACTION);
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint("/hello/{world_id}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());

        // Parameter with single word should also work.
        let formatted_path = format_endpoint("/hello/{world}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", 1);

        assert_eq!(formatted_path, "/hello/world");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint("/hello/{world}/bye", 1);

        assert_eq!(formatted_path, "/hello/1/bye");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn formats_family_endpoints() {
        let formatted_path =
            format_family_endpoint(endpoints::DELETE_TRANSACTION, Family::Expense, 7);

        assert_eq!(formatted_path, "/api/transactions/expense/7");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn formats_user_endpoints() {
        let formatted_path = format_user_endpoint(endpoints::PUT_ADMIN_USER, "user_2abc");

        assert_eq!(formatted_path, "/api/admin/users/user_2abc");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }
}
