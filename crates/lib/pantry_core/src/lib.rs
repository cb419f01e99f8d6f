//! # pantry_core
//!
//! Core domain logic for Pantry: accounts and tokens, recipes with
//! ingredient reconciliation, tags, favourites and cookbooks.

pub mod auth;
pub mod cookbooks;
pub mod db;
pub mod migrate;
pub mod models;
pub mod recipes;
pub mod seed;
pub mod tags;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
