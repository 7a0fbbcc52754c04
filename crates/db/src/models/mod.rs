//! Row models and insert DTOs for the forum tables.

pub mod category;
pub mod conversation;
pub mod post;
pub mod thread;
pub mod user;
