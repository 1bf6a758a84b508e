//! # ipscope Core
//!
//! Core types, errors, and traits shared by every ipscope crate.
//!
//! - **Types**: lookup keys, provider selection, and the normalized result record
//! - **Errors**: the throttle / upstream / configuration error taxonomy
//! - **Clock**: injectable time source for TTL and window expiry
//! - **Traits**: the upstream lookup seam used by the orchestrator
//!
//! ## Example
//!
//! ```rust
//! use ipscope_core::{LookupKey, ResultRecord};
//!
//! let key = LookupKey::from_address(Some("8.8.8.8"));
//! assert_eq!(key.to_string(), "ip-8.8.8.8");
//!
//! let record = ResultRecord::default();
//! let json = serde_json::to_string(&record).unwrap();
//! assert_eq!(json, "{}");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod clock;
pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use clock::{Clock, ManualClock, SystemClock};
pub use constants::*;
pub use error::{IpscopeError, Result};
pub use traits::*;
pub use types::*;
