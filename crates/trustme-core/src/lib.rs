//! Core domain types for trustme: digests, job configuration and file hashing.
#![deny(warnings, clippy::all, clippy::pedantic)]
#![warn(missing_docs)]

pub mod hash;
pub mod job;
pub mod types;
