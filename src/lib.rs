//! Client-side data access and presentation helpers for the company review
//! and interview report service.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod format;
pub mod journal;
pub mod mappers;
pub mod models;
pub mod search;
pub mod session;
pub mod timeago;
pub mod validators;

pub use api::{ApiService, Credentials, OrgQuery};
pub use error::{ApiError, ApiResult};
