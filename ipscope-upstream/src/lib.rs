//! # ipscope Upstream
//!
//! HTTP clients for the upstream geolocation providers.
//!
//! Both providers sit behind one [`GeoClient`]; what differs between them
//! (endpoint layout, credential parameter, response mapping) lives in a
//! provider profile selected per call.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod client;
mod config;
mod profile;

pub use client::GeoClient;
pub use config::{ProviderConfig, UpstreamConfig};
