// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! In-memory transaction list persisted as one JSON array in local storage.

use crate::db;
use crate::models::{Transaction, TransactionFields, TxType};
use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::debug;

pub const TRANSACTIONS_KEY: &str = "sbkp_transactions";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub search: Option<String>,
    pub r#type: Option<TxType>,
    pub category: Option<String>,
}

impl Filter {
    pub fn matches(&self, t: &Transaction) -> bool {
        let search_ok = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(s) => {
                let needle = s.to_lowercase();
                t.description.to_lowercase().contains(&needle)
                    || t
                        .notes
                        .as_deref()
                        .is_some_and(|n| n.to_lowercase().contains(&needle))
            }
        };
        let type_ok = self.r#type.is_none_or(|ty| ty == t.r#type);
        let category_ok = self.category.as_deref().is_none_or(|c| c == t.category);
        search_ok && type_ok && category_ok
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    transactions: Vec<Transaction>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_transactions(transactions: Vec<Transaction>) -> Self {
        Ledger { transactions }
    }

    pub fn load(conn: &Connection) -> Result<Self> {
        let Some(raw) = db::get_item(conn, TRANSACTIONS_KEY)? else {
            return Ok(Self::new());
        };
        let transactions: Vec<Transaction> = serde_json::from_str(&raw)
            .with_context(|| format!("Malformed transaction list under '{}'", TRANSACTIONS_KEY))?;
        debug!(count = transactions.len(), "transactions loaded");
        Ok(Ledger { transactions })
    }

    pub fn save(&self, conn: &Connection) -> Result<()> {
        let raw = serde_json::to_string(&self.transactions)?;
        db::set_item(conn, TRANSACTIONS_KEY, &raw)
    }

    pub fn all(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    pub fn create(&mut self, fields: TransactionFields) -> Result<&Transaction> {
        let now = chrono::Utc::now().timestamp_millis();
        self.create_at(fields, now)
    }

    /// Same as [`Ledger::create`] with an explicit clock reading in epoch millis.
    pub fn create_at(&mut self, fields: TransactionFields, now_millis: i64) -> Result<&Transaction> {
        fields.validate()?;
        let id = self.next_id(now_millis);
        self.transactions.push(fields.into_transaction(id));
        let idx = self.transactions.len() - 1;
        Ok(&self.transactions[idx])
    }

    /// Returns `Ok(false)` and leaves the list untouched when `id` is absent.
    pub fn update(&mut self, id: &str, fields: TransactionFields) -> Result<bool> {
        fields.validate()?;
        match self.transactions.iter_mut().find(|t| t.id == id) {
            Some(slot) => {
                *slot = fields.into_transaction(id.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.transactions.len();
        self.transactions.retain(|t| t.id != id);
        before != self.transactions.len()
    }

    pub fn bulk_delete<S: AsRef<str>>(&mut self, ids: &[S]) -> usize {
        let before = self.transactions.len();
        self.transactions
            .retain(|t| !ids.iter().any(|id| id.as_ref() == t.id));
        before - self.transactions.len()
    }

    /// Filtered view, newest date first. Equal dates keep insertion order.
    pub fn list(&self, filter: &Filter) -> Vec<&Transaction> {
        let mut out: Vec<&Transaction> =
            self.transactions.iter().filter(|t| filter.matches(t)).collect();
        out.sort_by(|a, b| b.date.cmp(&a.date));
        out
    }

    // Ids are clock-based; bump past every numeric id so two creations in
    // the same millisecond still get distinct ids.
    fn next_id(&self, now_millis: i64) -> String {
        let max_existing = self
            .transactions
            .iter()
            .filter_map(|t| t.id.parse::<i64>().ok())
            .max();
        // A hand-edited id at i64::MAX leaves no room above it; fall back to
        // scanning from the clock.
        let mut candidate = match max_existing {
            Some(m) if m >= now_millis => m.checked_add(1).unwrap_or(now_millis),
            _ => now_millis,
        };
        while self.get(&candidate.to_string()).is_some() {
            candidate = candidate.checked_add(1).unwrap_or(0);
        }
        candidate.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn fields(day: u32, ty: TxType, cat: &str, desc: &str) -> TransactionFields {
        TransactionFields {
            date: NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
            r#type: ty,
            category: cat.into(),
            description: desc.into(),
            amount: dec!(10),
            notes: None,
        }
    }

    #[test]
    fn ids_unique_within_same_millisecond() {
        let mut l = Ledger::new();
        let a = l
            .create_at(fields(1, TxType::Income, "Sales", "a"), 1000)
            .unwrap()
            .id
            .clone();
        let b = l
            .create_at(fields(1, TxType::Income, "Sales", "b"), 1000)
            .unwrap()
            .id
            .clone();
        assert_eq!(a, "1000");
        assert_eq!(b, "1001");
    }

    #[test]
    fn ids_at_i64_max_do_not_overflow() {
        let mut l = Ledger::new();
        let top = l
            .create_at(fields(1, TxType::Income, "Sales", "top"), i64::MAX)
            .unwrap()
            .id
            .clone();
        assert_eq!(top, i64::MAX.to_string());
        let a = l
            .create_at(fields(2, TxType::Income, "Sales", "a"), 5)
            .unwrap()
            .id
            .clone();
        let b = l
            .create_at(fields(3, TxType::Income, "Sales", "b"), 5)
            .unwrap()
            .id
            .clone();
        assert_eq!(a, "5");
        assert_eq!(b, "6");
    }

    #[test]
    fn update_missing_is_noop() {
        let mut l = Ledger::new();
        l.create_at(fields(1, TxType::Income, "Sales", "a"), 1).unwrap();
        let snapshot = l.clone();
        let changed = l
            .update("nope", fields(2, TxType::Expense, "Rent", "b"))
            .unwrap();
        assert!(!changed);
        assert_eq!(l, snapshot);
    }

    #[test]
    fn update_keeps_id() {
        let mut l = Ledger::new();
        l.create_at(fields(1, TxType::Income, "Sales", "a"), 7).unwrap();
        assert!(l.update("7", fields(3, TxType::Expense, "Rent", "rent")).unwrap());
        let t = l.get("7").unwrap();
        assert_eq!(t.category, "Rent");
        assert_eq!(t.r#type, TxType::Expense);
    }

    #[test]
    fn delete_and_bulk_delete() {
        let mut l = Ledger::new();
        for i in 1..=4 {
            l.create_at(fields(i, TxType::Income, "Sales", "x"), i as i64)
                .unwrap();
        }
        assert!(!l.delete("99"));
        assert_eq!(l.len(), 4);
        assert!(l.delete("2"));
        assert_eq!(l.len(), 3);
        assert_eq!(l.bulk_delete(&["1", "3", "99"]), 2);
        assert_eq!(l.all().len(), 1);
        assert_eq!(l.all()[0].id, "4");
    }

    #[test]
    fn list_filters_and_sorts_desc() {
        let mut l = Ledger::new();
        l.create_at(fields(1, TxType::Income, "Sales", "Invoice ACME"), 1)
            .unwrap();
        l.create_at(fields(5, TxType::Expense, "Rent", "Office rent"), 2)
            .unwrap();
        let mut noted = fields(3, TxType::Expense, "Meals", "Lunch");
        noted.notes = Some("client acme".into());
        l.create_at(noted, 3).unwrap();

        let all = l.list(&Filter::default());
        let days: Vec<u32> = all.iter().map(|t| chrono::Datelike::day(&t.date)).collect();
        assert_eq!(days, vec![5, 3, 1]);

        let acme = l.list(&Filter {
            search: Some("ACME".into()),
            ..Filter::default()
        });
        assert_eq!(acme.len(), 2);

        let expenses = l.list(&Filter {
            r#type: Some(TxType::Expense),
            category: Some("Rent".into()),
            ..Filter::default()
        });
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].description, "Office rent");
    }
}
