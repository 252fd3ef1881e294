// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Per-process application context: storage handle, transaction list and
//! license gate, built once and handed to every command.

use crate::db;
use crate::fingerprint::{self, SignalSource};
use crate::ledger::Ledger;
use crate::license::{Activation, LICENSE_KEY, LicenseGate};
use anyhow::{Result, bail};
use chrono::Utc;
use rusqlite::Connection;
use tracing::debug;

pub struct Session {
    conn: Connection,
    ledger: Ledger,
    gate: LicenseGate,
}

impl Session {
    pub fn open(conn: Connection) -> Result<Self> {
        let ledger = Ledger::load(&conn)?;
        let gate = LicenseGate::load(&conn)?;
        Ok(Session { conn, ledger, gate })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn gate(&self) -> &LicenseGate {
        &self.gate
    }

    /// Applies `f` to the transaction list and re-persists the whole list.
    pub fn mutate<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Ledger) -> Result<T>,
    {
        let out = f(&mut self.ledger)?;
        self.ledger.save(&self.conn)?;
        debug!(count = self.ledger.len(), "transactions persisted");
        Ok(out)
    }

    pub fn activate(&mut self, key: &str, signals: &dyn SignalSource) -> Result<Activation> {
        let fp = fingerprint::generate(signals)?;
        let activation = self.gate.activate(key, &fp, Utc::now())?;
        self.gate.persist(&self.conn)?;
        Ok(activation)
    }

    /// LOCKED -> UNLOCKED from saved credentials, if they match this device.
    pub fn unlock(&mut self, signals: &dyn SignalSource) -> Result<bool> {
        if self.gate.is_unlocked() {
            return Ok(true);
        }
        let fp = fingerprint::generate(signals)?;
        self.gate.restore(&self.conn, &fp)
    }

    pub fn require_unlocked(&mut self, signals: &dyn SignalSource) -> Result<()> {
        if !self.unlock(signals)? {
            bail!("No active license for this device; run `sbkp license activate <KEY>`");
        }
        Ok(())
    }

    /// Clears the saved credentials and releases the key they name, whether
    /// or not this device still unlocks with them.
    pub fn logout(&mut self) -> Result<()> {
        let saved_key = db::get_item(&self.conn, LICENSE_KEY)?;
        self.gate.deactivate(saved_key.as_deref());
        self.gate.persist(&self.conn)
    }
}
