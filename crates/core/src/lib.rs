//! PhotoLoad Core - Shared types library.
//!
//! This crate provides common types used across all PhotoLoad components:
//! - `web` - The public web application
//! - `integration-tests` - Cross-module test suite
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. All durable
//! state lives in the managed backend platform, so these types describe wire
//! identities (UUID-backed IDs, storage object paths) rather than local rows.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, and storage paths

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
