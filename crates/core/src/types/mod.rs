//! Core types for PhotoLoad.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod path;

pub use email::{Email, EmailError};
pub use id::*;
pub use path::{StoragePath, StoragePathError};
