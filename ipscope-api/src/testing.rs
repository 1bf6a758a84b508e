//! Scripted upstream for orchestrator and router tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use ipscope_core::error::{IpscopeError, Result};
use ipscope_core::traits::GeoLookup;
use ipscope_core::types::{Provider, ResultRecord};

/// Address the fake reports for "own address" lookups.
pub const FAKE_OWN_ADDRESS: &str = "203.0.113.7";

pub struct FakeUpstream {
    calls: AtomicUsize,
    failures: Mutex<HashMap<String, (u16, String)>>,
    last_provider: Mutex<Option<Provider>>,
}

impl FakeUpstream {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            failures: Mutex::new(HashMap::new()),
            last_provider: Mutex::new(None),
        }
    }

    /// Makes lookups of `address` fail with the given status and message.
    pub fn fail_for(&self, address: &str, status: u16, message: &str) {
        self.failures
            .lock()
            .insert(address.to_string(), (status, message.to_string()));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_provider(&self) -> Option<Provider> {
        *self.last_provider.lock()
    }
}

#[async_trait]
impl GeoLookup for FakeUpstream {
    async fn fetch(&self, address: Option<&str>, provider: Provider) -> Result<ResultRecord> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_provider.lock() = Some(provider);

        if let Some((status, message)) = address.and_then(|a| self.failures.lock().get(a).cloned()) {
            return Err(IpscopeError::upstream(status, message));
        }

        Ok(ResultRecord {
            ip: Some(address.unwrap_or(FAKE_OWN_ADDRESS).to_string()),
            city: Some("Mountain View".into()),
            country: Some("US".into()),
            latitude: Some(37.4056),
            longitude: Some(-122.0775),
            org: Some(format!("served by {}", provider)),
            ..Default::default()
        })
    }
}
