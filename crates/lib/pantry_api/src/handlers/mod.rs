//! Request handlers.

pub mod admin;
pub mod auth;
pub mod cookbooks;
pub mod recipes;
pub mod tags;
pub mod users;
