//! Domain types for ipscope.
//!
//! - [`LookupKey`]: cache key derived from the requested address
//! - [`Provider`]: which upstream geolocation provider serves a request
//! - [`ResultRecord`]: normalized provider output

mod key;
mod provider;
mod record;

pub use key::*;
pub use provider::*;
pub use record::*;
