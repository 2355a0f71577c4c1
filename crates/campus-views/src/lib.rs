//! Screen view models for the campus complaint tracker.
//!
//! Each view model is a reducer over store emissions plus local UI state
//! (loading flag, error message, form values, transient notices). They are
//! generic over the traits in `campus-core`, so the same code drives an
//! in-process SQLite store or the remote HTTP client.

pub mod account;
pub mod admin;
pub mod dashboard;
pub mod my_complaints;
pub mod state;
pub mod submit;

pub use admin::AdminConsole;
pub use dashboard::Dashboard;
pub use my_complaints::MyComplaints;
pub use state::{LoadState, Notice, NoticeKind};
pub use submit::SubmitForm;

#[cfg(test)]
mod testing;
