// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Client-side license gate.
//!
//! The key table is compiled into the binary and its bindings live in local
//! storage, so anyone with the binary or the storage file can read or edit
//! it. Treat the gate as a UX check, not an access-control boundary.

use crate::db;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info};

pub const LICENSE_KEY: &str = "sbkp_license";
pub const FINGERPRINT_KEY: &str = "sbkp_fingerprint";
pub const REGISTRY_KEY: &str = "sbkp_license_db";

pub const FEATURE_ALL: &str = "all";

static KEY_FORMAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^SBKP-\d{4}-[A-Z0-9]{4}-[A-Z0-9]{5}$").expect("license key pattern compiles")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LicenseError {
    #[error("Invalid license key format")]
    InvalidFormat,
    #[error("Invalid license key")]
    UnknownKey,
    #[error("This license is already activated on another device")]
    AlreadyActivated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseType {
    Trial,
    Full,
}

impl fmt::Display for LicenseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LicenseType::Trial => "trial",
            LicenseType::Full => "full",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseRecord {
    pub key: String,
    pub r#type: LicenseType,
    pub bound_device_fingerprint: Option<String>,
    pub activated_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub features: BTreeSet<String>,
}

impl LicenseRecord {
    fn new(key: &str, r#type: LicenseType, features: &[&str]) -> Self {
        LicenseRecord {
            key: key.to_string(),
            r#type,
            bound_device_fingerprint: None,
            activated_at: None,
            expires_at: None,
            features: features.iter().map(|f| f.to_string()).collect(),
        }
    }

    pub fn allows(&self, feature: &str) -> bool {
        self.features.contains(FEATURE_ALL) || self.features.contains(feature)
    }
}

pub fn validate_format(key: &str) -> bool {
    KEY_FORMAT.is_match(key)
}

/// Admin helper: a fresh key in the accepted format. It is not added to the
/// table, so it will not activate until compiled in.
pub fn generate_key<R: Rng>(year: i32, rng: &mut R) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut group = |n: usize| -> String {
        (0..n)
            .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
            .collect()
    };
    let a = group(4);
    let b = group(5);
    format!("SBKP-{:04}-{}-{}", year, a, b)
}

/// Binding state for one key as written to the local cache. License type and
/// features always come from the built-in table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CachedBinding {
    key: String,
    bound_device_fingerprint: Option<String>,
    activated_at: Option<DateTime<Utc>>,
}

/// Built-in key table plus whatever bindings were cached locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseRegistry {
    records: BTreeMap<String, LicenseRecord>,
}

impl Default for LicenseRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LicenseRegistry {
    pub fn builtin() -> Self {
        let records = [
            LicenseRecord::new("SBKP-2025-XXXX-TRIAL", LicenseType::Trial, &["basic"]),
            LicenseRecord::new("SBKP-2025-DEMO-00001", LicenseType::Full, &[FEATURE_ALL]),
            LicenseRecord::new("SBKP-2025-PROD-12345", LicenseType::Full, &[FEATURE_ALL]),
        ]
        .into_iter()
        .map(|r| (r.key.clone(), r))
        .collect();
        LicenseRegistry { records }
    }

    /// Built-in table with cached binding state applied. Cached entries for
    /// keys outside the table are ignored.
    pub fn load(conn: &Connection) -> Result<Self> {
        let mut reg = Self::builtin();
        let Some(raw) = db::get_item(conn, REGISTRY_KEY)? else {
            return Ok(reg);
        };
        let cached: Vec<CachedBinding> = serde_json::from_str(&raw)
            .with_context(|| format!("Malformed license cache under '{}'", REGISTRY_KEY))?;
        for c in cached {
            if let Some(r) = reg.records.get_mut(&c.key) {
                r.bound_device_fingerprint = c.bound_device_fingerprint;
                r.activated_at = c.activated_at;
            }
        }
        Ok(reg)
    }

    pub fn save(&self, conn: &Connection) -> Result<()> {
        let bound: Vec<CachedBinding> = self
            .records
            .values()
            .filter(|r| r.bound_device_fingerprint.is_some())
            .map(|r| CachedBinding {
                key: r.key.clone(),
                bound_device_fingerprint: r.bound_device_fingerprint.clone(),
                activated_at: r.activated_at,
            })
            .collect();
        db::set_item(conn, REGISTRY_KEY, &serde_json::to_string(&bound)?)
    }

    pub fn get(&self, key: &str) -> Option<&LicenseRecord> {
        self.records.get(key)
    }

    /// First write wins: a key already bound to a different fingerprint is
    /// left untouched.
    pub fn bind(
        &mut self,
        key: &str,
        fingerprint: &str,
        now: DateTime<Utc>,
    ) -> Result<&LicenseRecord, LicenseError> {
        if !validate_format(key) {
            return Err(LicenseError::InvalidFormat);
        }
        let record = self.records.get_mut(key).ok_or(LicenseError::UnknownKey)?;
        match record.bound_device_fingerprint.as_deref() {
            Some(bound) if bound != fingerprint => return Err(LicenseError::AlreadyActivated),
            _ => {}
        }
        record.bound_device_fingerprint = Some(fingerprint.to_string());
        record.activated_at = Some(now);
        Ok(record)
    }

    pub fn unbind(&mut self, key: &str) {
        if let Some(r) = self.records.get_mut(key) {
            r.bound_device_fingerprint = None;
            r.activated_at = None;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    Locked,
    Unlocked { key: String, fingerprint: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Activation {
    pub key: String,
    pub r#type: LicenseType,
    pub features: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseInfo {
    pub key: String,
    pub r#type: LicenseType,
    pub features: BTreeSet<String>,
    pub activated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseGate {
    registry: LicenseRegistry,
    state: GateState,
}

impl LicenseGate {
    pub fn new(registry: LicenseRegistry) -> Self {
        LicenseGate {
            registry,
            state: GateState::Locked,
        }
    }

    pub fn load(conn: &Connection) -> Result<Self> {
        Ok(Self::new(LicenseRegistry::load(conn)?))
    }

    pub fn state(&self) -> &GateState {
        &self.state
    }

    pub fn is_unlocked(&self) -> bool {
        matches!(self.state, GateState::Unlocked { .. })
    }

    pub fn registry(&self) -> &LicenseRegistry {
        &self.registry
    }

    pub fn activate(
        &mut self,
        key: &str,
        fingerprint: &str,
        now: DateTime<Utc>,
    ) -> Result<Activation, LicenseError> {
        let record = self.registry.bind(key, fingerprint, now)?;
        let activation = Activation {
            key: record.key.clone(),
            r#type: record.r#type,
            features: record.features.clone(),
        };
        info!(key, license_type = %activation.r#type, "license activated");
        self.state = GateState::Unlocked {
            key: key.to_string(),
            fingerprint: fingerprint.to_string(),
        };
        Ok(activation)
    }

    /// Checks saved credentials against the freshly computed fingerprint.
    pub fn verify(&mut self, saved_key: Option<&str>, saved_fp: Option<&str>, current: &str) -> bool {
        let (Some(key), Some(saved_fp)) = (saved_key, saved_fp) else {
            return false;
        };
        let Some(record) = self.registry.get(key) else {
            debug!(key, "saved license not in table");
            return false;
        };
        if saved_fp != current {
            debug!("saved fingerprint does not match this device");
            return false;
        }
        if record
            .bound_device_fingerprint
            .as_deref()
            .is_some_and(|bound| bound != current)
        {
            debug!(key, "license bound to another device");
            return false;
        }
        self.state = GateState::Unlocked {
            key: key.to_string(),
            fingerprint: current.to_string(),
        };
        true
    }

    pub fn restore(&mut self, conn: &Connection, current: &str) -> Result<bool> {
        let key = db::get_item(conn, LICENSE_KEY)?;
        let fp = db::get_item(conn, FINGERPRINT_KEY)?;
        Ok(self.verify(key.as_deref(), fp.as_deref(), current))
    }

    /// Releases the active key, or `saved_key` when the gate is locked. A
    /// device whose fingerprint drifted can no longer unlock, but it still
    /// holds the saved credential and must be able to free its own binding.
    pub fn deactivate(&mut self, saved_key: Option<&str>) {
        let key = match &self.state {
            GateState::Unlocked { key, .. } => Some(key.clone()),
            GateState::Locked => saved_key.map(str::to_string),
        };
        if let Some(key) = key {
            self.registry.unbind(&key);
            info!(key = %key, "license deactivated");
        }
        self.state = GateState::Locked;
    }

    /// Writes the binding cache and the saved credentials for the current state.
    pub fn persist(&self, conn: &Connection) -> Result<()> {
        self.registry.save(conn)?;
        match &self.state {
            GateState::Unlocked { key, fingerprint } => {
                db::set_item(conn, LICENSE_KEY, key)?;
                db::set_item(conn, FINGERPRINT_KEY, fingerprint)?;
            }
            GateState::Locked => {
                db::remove_item(conn, LICENSE_KEY)?;
                db::remove_item(conn, FINGERPRINT_KEY)?;
            }
        }
        Ok(())
    }

    pub fn info(&self) -> Option<LicenseInfo> {
        let GateState::Unlocked { key, .. } = &self.state else {
            return None;
        };
        let r = self.registry.get(key)?;
        Some(LicenseInfo {
            key: r.key.clone(),
            r#type: r.r#type,
            features: r.features.clone(),
            activated_at: r.activated_at,
        })
    }

    pub fn has_feature(&self, feature: &str) -> bool {
        match &self.state {
            GateState::Unlocked { key, .. } => {
                self.registry.get(key).is_some_and(|r| r.allows(feature))
            }
            GateState::Locked => false,
        }
    }
}
