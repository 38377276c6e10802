//! Shared state handed to every handler.

use crate::db::repository::FullRepository;
use crate::models::UserId;
use std::sync::Arc;

/// Cloned into each request; the repository handle is the only shared piece.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn FullRepository>,
    /// User assumed when a request carries no `user_id` query parameter.
    pub default_user: UserId,
}

impl AppState {
    pub fn new(repository: Arc<dyn FullRepository>, default_user: UserId) -> Self {
        Self {
            repository,
            default_user,
        }
    }
}
