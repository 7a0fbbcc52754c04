//! Legacy CoolForum to forum store migration.
//!
//! [`Pipeline`] runs the import stages in their fixed order: categories,
//! users, threads, posts, thread reconciliation, private messages,
//! conversation reconciliation, housekeeping and sequence reset.

pub mod config;
pub mod credentials;
pub mod error;
pub mod housekeeping;
pub mod importers;
pub mod pipeline;
pub mod reconcile;
pub mod report;
pub mod sequences;
pub mod source;
pub mod stage;

pub use pipeline::Pipeline;
