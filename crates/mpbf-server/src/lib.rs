//! HTTP surface for the MPBF assistant.
//!
//! Two command endpoints plus a health probe; all assistant behavior
//! lives in `mpbf-pipeline`, this crate only maps it onto axum.

pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::AppState;
