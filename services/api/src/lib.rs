//! REST backend for the social reading tracker
//!
//! Modules are split the same way the data flows: `routes` orchestrates per
//! endpoint, `repositories` own the SQL, `models` are the row and payload
//! shapes, and `error` maps failures to the HTTP contract.

pub mod error;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod validation;

pub use state::AppState;
