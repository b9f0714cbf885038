//! Fixed income and expense category lists managed by administrators.

mod create_endpoint;
mod db;
mod delete_endpoint;
mod domain;
mod edit_endpoint;

pub use create_endpoint::create_category_endpoint;
pub use db::{
    create_category, create_category_tables, delete_category, get_categories, update_category,
};
pub use delete_endpoint::delete_category_endpoint;
pub use domain::{Category, CategoryId, CategoryName};
pub use edit_endpoint::update_category_endpoint;
