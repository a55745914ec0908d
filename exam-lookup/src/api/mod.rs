//! HTTP handlers for exam-lookup

pub mod health;
pub mod query;
pub mod update;

pub use health::health_routes;
pub use query::{get_stats, get_welcome, post_more, post_query};
pub use update::{post_update, MAX_UPLOAD_BYTES, UPDATE_SECRET_HEADER};
