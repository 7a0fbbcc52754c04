//! Pure building blocks of the CoolForum legacy migration.
//!
//! No database, no async, no file I/O: everything here operates on strings
//! and plain values so it can be unit tested in isolation.

pub mod config;
pub mod conversation;
pub mod error;
pub mod housekeeping;
pub mod json_repair;
pub mod keygen;
pub mod legacy;
pub mod password;
pub mod slug;
pub mod text;
pub mod types;
