//! `conduct-complaints`: complaints filed against students, and their statistics.

pub mod complaint;
pub mod stats;
pub mod store;

pub use complaint::{Complaint, DEFAULT_PHOTO, NewComplaint};
pub use stats::{ComplaintStats, DateCount, ReasonCount, summarize};
pub use store::{ComplaintStore, InMemoryComplaintStore};
