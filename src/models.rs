// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, anyhow, bail};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const INCOME_CATEGORIES: &[&str] =
    &["Sales", "Services", "Consulting", "Products", "Other Income"];

pub const EXPENSE_CATEGORIES: &[&str] = &[
    "Advertising",
    "Car & Truck",
    "Commissions",
    "Contract Labor",
    "Depreciation",
    "Employee Benefits",
    "Insurance",
    "Legal & Professional",
    "Office Expense",
    "Rent",
    "Repairs & Maintenance",
    "Supplies",
    "Travel",
    "Meals",
    "Utilities",
    "Wages",
    "Other Expenses",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxType {
    Income,
    Expense,
}

impl TxType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxType::Income => "income",
            TxType::Expense => "expense",
        }
    }

    pub fn categories(&self) -> &'static [&'static str] {
        match self {
            TxType::Income => INCOME_CATEGORIES,
            TxType::Expense => EXPENSE_CATEGORIES,
        }
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TxType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TxType::Income),
            "expense" => Ok(TxType::Expense),
            other => Err(anyhow!("Invalid type '{}', expected income|expense", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub date: NaiveDate,
    pub r#type: TxType,
    pub category: String,
    pub description: String,
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Everything a caller supplies when recording or replacing a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionFields {
    pub date: NaiveDate,
    pub r#type: TxType,
    pub category: String,
    pub description: String,
    pub amount: Decimal,
    pub notes: Option<String>,
}

impl TransactionFields {
    pub fn validate(&self) -> Result<()> {
        if !self.r#type.categories().contains(&self.category.as_str()) {
            bail!(
                "Category '{}' is not a valid {} category",
                self.category,
                self.r#type
            );
        }
        if self.amount.is_sign_negative() && !self.amount.is_zero() {
            bail!("Amount must be non-negative, got {}", self.amount);
        }
        Ok(())
    }

    pub fn into_transaction(self, id: String) -> Transaction {
        Transaction {
            id,
            date: self.date,
            r#type: self.r#type,
            category: self.category,
            description: self.description,
            amount: self.amount,
            notes: self.notes.filter(|n| !n.trim().is_empty()),
        }
    }
}

impl From<&Transaction> for TransactionFields {
    fn from(t: &Transaction) -> Self {
        TransactionFields {
            date: t.date,
            r#type: t.r#type,
            category: t.category.clone(),
            description: t.description.clone(),
            amount: t.amount,
            notes: t.notes.clone(),
        }
    }
}
