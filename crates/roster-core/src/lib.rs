//! Core types and utilities for roster.
//!
//! This crate provides the foundational types shared by the roster crates:
//!
//! - **Identifiers**: the token subject and the per-request correlation id
//! - **Error types**: common error definitions shared across crates
//!
//! # Example
//!
//! ```
//! use roster_core::{RequestId, SubjectId};
//!
//! // Subjects are kept as given and must not be blank
//! let subject = SubjectId::new("user-42").unwrap();
//! assert_eq!(subject.as_str(), "user-42");
//! assert!(SubjectId::new("   ").is_err());
//!
//! // Generate a request id
//! let request_id = RequestId::generate();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod ids;

pub use error::{CoreError, Result};
pub use ids::{IdError, RequestId, SubjectId};
