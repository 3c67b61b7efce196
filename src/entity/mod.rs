pub mod session;
pub mod submission;
pub mod user;
