//! Integration tests for PhotoLoad.
//!
//! These exercise the cross-module flows - the view-state machine driving a
//! whole session, the upload-then-gallery pipeline, and the account
//! deletion sequence - against in-memory fakes. Nothing here talks to the
//! managed platform; the platform client wire formats are covered by unit
//! tests in `photoload-web`.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p photoload-integration-tests
//! ```
