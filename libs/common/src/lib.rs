//! Common library for the reading-tracker backend
//!
//! This crate provides shared infrastructure used by the API service:
//! PostgreSQL connection pooling, health checks, and the database error
//! taxonomy.

pub mod database;
pub mod error;
