//! trustme CLI library: drives provisioning and per-package signing for one job.
#![deny(warnings, clippy::all, clippy::pedantic)]
#![warn(missing_docs)]

pub mod orchestrator;
