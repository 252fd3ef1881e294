// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Aggregations over the transaction list. Every function is a full scan.

use crate::models::{Transaction, TxType};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

pub const TRAILING_MONTHS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Totals {
    pub income: Decimal,
    pub expense: Decimal,
    pub net: Decimal,
    pub count: usize,
}

pub fn totals<'a, I>(txs: I) -> Totals
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut t = Totals::default();
    for tx in txs {
        match tx.r#type {
            TxType::Income => t.income += tx.amount,
            TxType::Expense => t.expense += tx.amount,
        }
        t.count += 1;
    }
    t.net = t.income - t.expense;
    t
}

/// Transactions dated within `[from, to]`, both ends inclusive.
pub fn in_range(txs: &[Transaction], from: NaiveDate, to: NaiveDate) -> Vec<&Transaction> {
    txs.iter().filter(|t| t.date >= from && t.date <= to).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryNet {
    pub category: String,
    pub income: Decimal,
    pub expense: Decimal,
    pub net: Decimal,
}

pub fn by_category<'a, I>(txs: I) -> Vec<CategoryNet>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut map: BTreeMap<&str, (Decimal, Decimal)> = BTreeMap::new();
    for tx in txs {
        let entry = map
            .entry(tx.category.as_str())
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        match tx.r#type {
            TxType::Income => entry.0 += tx.amount,
            TxType::Expense => entry.1 += tx.amount,
        }
    }
    map.into_iter()
        .map(|(category, (income, expense))| CategoryNet {
            category: category.to_string(),
            income,
            expense,
            net: income - expense,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyPoint {
    pub label: String,
    pub year: i32,
    pub month: u32,
    pub income: Decimal,
    pub expense: Decimal,
}

/// Income/expense per calendar month for the `months` months ending with
/// the month containing `today`, oldest first.
pub fn monthly_series(txs: &[Transaction], today: NaiveDate, months: usize) -> Vec<MonthlyPoint> {
    let anchor = today.year() * 12 + today.month0() as i32;
    (0..months as i32)
        .rev()
        .filter_map(|back| {
            let idx = anchor - back;
            let year = idx.div_euclid(12);
            let month = idx.rem_euclid(12) as u32 + 1;
            let first = NaiveDate::from_ymd_opt(year, month, 1)?;
            let mut point = MonthlyPoint {
                label: first.format("%b %Y").to_string(),
                year,
                month,
                income: Decimal::ZERO,
                expense: Decimal::ZERO,
            };
            for tx in txs
                .iter()
                .filter(|t| t.date.year() == year && t.date.month() == month)
            {
                match tx.r#type {
                    TxType::Income => point.income += tx.amount,
                    TxType::Expense => point.expense += tx.amount,
                }
            }
            Some(point)
        })
        .collect()
}

/// Income statement / cash flow over a closed date window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statement {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub income: Decimal,
    pub expense: Decimal,
    pub net: Decimal,
}

pub fn statement(txs: &[Transaction], from: NaiveDate, to: NaiveDate) -> Statement {
    let t = totals(in_range(txs, from, to));
    Statement {
        from,
        to,
        income: t.income,
        expense: t.expense,
        net: t.net,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryAmount {
    pub category: String,
    pub amount: Decimal,
}

/// Schedule C style yearly summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxSummary {
    pub year: i32,
    pub total_income: Decimal,
    pub expenses: Vec<CategoryAmount>,
    pub total_expenses: Decimal,
    pub net_profit: Decimal,
}

pub fn tax_summary(txs: &[Transaction], year: i32) -> TaxSummary {
    let mut total_income = Decimal::ZERO;
    let mut by_cat: BTreeMap<&str, Decimal> = BTreeMap::new();
    for tx in txs.iter().filter(|t| t.date.year() == year) {
        match tx.r#type {
            TxType::Income => total_income += tx.amount,
            TxType::Expense => {
                *by_cat.entry(tx.category.as_str()).or_insert(Decimal::ZERO) += tx.amount
            }
        }
    }
    let total_expenses: Decimal = by_cat.values().copied().sum();
    TaxSummary {
        year,
        total_income,
        expenses: by_cat
            .into_iter()
            .map(|(category, amount)| CategoryAmount {
                category: category.to_string(),
                amount,
            })
            .collect(),
        total_expenses,
        net_profit: total_income - total_expenses,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn tx(id: &str, date: &str, ty: TxType, cat: &str, amount: Decimal) -> Transaction {
        Transaction {
            id: id.into(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            r#type: ty,
            category: cat.into(),
            description: String::new(),
            amount,
            notes: None,
        }
    }

    fn sample() -> Vec<Transaction> {
        vec![
            tx("1", "2025-01-15", TxType::Income, "Sales", dec!(1000.00)),
            tx("2", "2025-01-20", TxType::Expense, "Rent", dec!(400.00)),
            tx("3", "2025-02-03", TxType::Expense, "Meals", dec!(25.50)),
            tx("4", "2025-02-10", TxType::Income, "Consulting", dec!(300)),
            tx("5", "2024-12-31", TxType::Expense, "Rent", dec!(400)),
            tx("6", "2025-03-01", TxType::Income, "Other Income", dec!(10)),
        ]
    }

    #[test]
    fn net_is_income_minus_expense() {
        let txs = sample();
        let t = totals(&txs);
        assert_eq!(t.income, dec!(1310));
        assert_eq!(t.expense, dec!(825.50));
        assert_eq!(t.net, t.income - t.expense);
        assert_eq!(t.count, 6);
    }

    #[test]
    fn statement_window_is_inclusive() {
        let txs = sample();
        let from = NaiveDate::from_ymd_opt(2025, 1, 20).unwrap();
        let to = NaiveDate::from_ymd_opt(2025, 2, 10).unwrap();
        let s = statement(&txs, from, to);
        assert_eq!(s.income, dec!(300));
        assert_eq!(s.expense, dec!(425.50));
        assert_eq!(s.net, dec!(-125.50));
    }

    #[test]
    fn category_nets_sorted_by_name() {
        let txs = sample();
        let cats = by_category(&txs);
        let names: Vec<&str> = cats.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(names, vec!["Consulting", "Meals", "Other Income", "Rent", "Sales"]);
        let rent = cats.iter().find(|c| c.category == "Rent").unwrap();
        assert_eq!(rent.net, dec!(-800));
    }

    #[test]
    fn monthly_series_crosses_year_boundary() {
        let txs = sample();
        let today = NaiveDate::from_ymd_opt(2025, 2, 14).unwrap();
        let pts = monthly_series(&txs, today, TRAILING_MONTHS);
        assert_eq!(pts.len(), 6);
        assert_eq!(pts[0].label, "Sep 2024");
        assert_eq!(pts[3].label, "Dec 2024");
        assert_eq!(pts[3].expense, dec!(400));
        assert_eq!(pts[4].income, dec!(1000.00));
        assert_eq!((pts[5].year, pts[5].month), (2025, 2));
        assert_eq!(pts[5].expense, dec!(25.50));
    }

    #[test]
    fn tax_summary_groups_expenses_for_year() {
        let txs = sample();
        let s = tax_summary(&txs, 2025);
        assert_eq!(s.total_income, dec!(1310));
        assert_eq!(s.expenses.len(), 2);
        assert_eq!(s.total_expenses, dec!(425.50));
        assert_eq!(s.net_profit, dec!(884.50));
        let empty = tax_summary(&txs, 2030);
        assert!(empty.expenses.is_empty());
        assert_eq!(empty.net_profit, Decimal::ZERO);
    }
}
