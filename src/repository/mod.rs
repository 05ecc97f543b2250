// src/repository/mod.rs
// Plain CRUD repositories over the durable store

pub mod friends;
pub mod users;

pub use friends::FriendRepository;
pub use users::UserRepository;

use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("User {0} cannot befriend themselves")]
    SelfReference(String),

    #[error("{user} and {friend} are already friends")]
    AlreadyExists { user: String, friend: String },

    #[error("{user} and {friend} are not friends")]
    NotFound { user: String, friend: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}
