pub mod auth;
pub mod submission;
