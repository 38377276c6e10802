//! Axum HTTP surface over the service layer.
//!
//! Deliberately thin: handlers parse and validate the request, call a
//! service function from [`crate::db::services`], and let [`error`] turn
//! failures into status codes and JSON bodies. No progress derivation
//! happens at this layer.
//!
//! - [`router`]: route table plus CORS, compression, and trace middleware
//! - [`handlers`]: one async fn per endpoint
//! - [`dto`]: request and response body types
//! - [`state`]: shared repository handle and the fallback user
//! - [`error`]: service-to-HTTP error mapping
//!
//! The whole module sits behind the `http-server` feature, gated at the
//! crate root.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::AppState;
