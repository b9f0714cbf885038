//! Users mirrored from the identity provider, and their application roles.

mod db;
mod domain;

pub use db::{
    create_user_table, ensure_user, get_all_users, get_user, get_user_role, update_user,
};
pub use domain::{Role, User, UserId};
