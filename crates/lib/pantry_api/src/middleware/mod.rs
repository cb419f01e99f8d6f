//! Request middleware: identity resolution and route authorization.

pub mod auth;
pub mod policy;
