//! Certificate provisioning, package signing and cache patching for trustme.
#![deny(warnings, clippy::all, clippy::pedantic)]
#![warn(missing_docs)]

pub mod credential;
pub mod error;
pub mod patch;
pub mod provision;
pub mod signer;
#[cfg(feature = "test-util")]
pub mod testing;
pub mod tool;
