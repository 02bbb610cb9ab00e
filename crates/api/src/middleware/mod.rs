//! Request middleware.

pub mod auth;

pub use auth::{ReportUser, user_context_middleware};
