/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 *
 * Unless you explicitly state otherwise, any contribution intentionally
 * submitted for inclusion in the work by you, as defined in the Apache-2.0
 * license, shall be dual licensed as above, without any additional terms or
 * conditions.
 */

//! Coordinator configuration.
//!
//! Values come from defaults, an optional JSON file, then environment variables
//! prefixed with `HEADSET_SYNC_`.

use crate::error::{Result, SyncError};
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable prefix for overrides
const ENV_PREFIX: &str = "HEADSET_SYNC_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// A suspension held longer than this is reported as stuck.
    /// Env: HEADSET_SYNC_STUCK_SUSPENSION_MS
    pub stuck_suspension_threshold_ms: u64,
    /// Number of events buffered per subscriber on the event bus.
    /// Env: HEADSET_SYNC_EVENT_BUS_CAPACITY
    pub event_bus_capacity: usize,
    /// Publish suspend/release metrics on the diagnostics bus.
    /// Env: HEADSET_SYNC_PUBLISH_DIAGNOSTICS
    pub publish_diagnostics: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            stuck_suspension_threshold_ms: 30_000,
            event_bus_capacity: 256,
            publish_diagnostics: true,
        }
    }
}

impl SyncConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SyncConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|name| std::env::var(format!("{ENV_PREFIX}{name}")).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(value) = lookup("STUCK_SUSPENSION_MS") {
            self.stuck_suspension_threshold_ms = parse_number("STUCK_SUSPENSION_MS", &value)?;
        }
        if let Some(value) = lookup("EVENT_BUS_CAPACITY") {
            self.event_bus_capacity = parse_number("EVENT_BUS_CAPACITY", &value)?;
        }
        if let Some(value) = lookup("PUBLISH_DIAGNOSTICS") {
            self.publish_diagnostics = parse_bool(&value);
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.event_bus_capacity == 0 {
            return Err(SyncError::InvalidConfig(
                "event_bus_capacity must be at least 1".to_string(),
            ));
        }
        if self.stuck_suspension_threshold_ms == 0 {
            return Err(SyncError::InvalidConfig(
                "stuck_suspension_threshold_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn stuck_suspension_threshold(&self) -> Duration {
        Duration::from_millis(self.stuck_suspension_threshold_ms)
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        SyncError::InvalidConfig(format!("{ENV_PREFIX}{name}: not a number: {value:?}"))
    })
}

/// Truthy values are "true", "1" and "yes"; anything else is false.
fn parse_bool(value: &str) -> bool {
    let truthy = matches!(value.to_lowercase().as_str(), "true" | "1" | "yes");
    if !truthy && !matches!(value.to_lowercase().as_str(), "false" | "0" | "no") {
        warn!("unrecognised boolean {value:?}, treating as false");
    }
    truthy
}
