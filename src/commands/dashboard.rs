// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::Ledger;
use crate::reports::{MonthlyPoint, TRAILING_MONTHS, Totals, monthly_series, totals};
use crate::utils::{fmt_money, maybe_print_json, pretty_table};
use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub totals: Totals,
    pub monthly: Vec<MonthlyPoint>,
}

pub fn compute(ledger: &Ledger, today: NaiveDate) -> Dashboard {
    Dashboard {
        totals: totals(ledger.all()),
        monthly: monthly_series(ledger.all(), today, TRAILING_MONTHS),
    }
}

pub fn handle(ledger: &Ledger, sub: &clap::ArgMatches) -> Result<()> {
    let dash = compute(ledger, chrono::Local::now().date_naive());
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &dash)? {
        return Ok(());
    }
    let t = &dash.totals;
    println!(
        "{}",
        pretty_table(
            &["Total Revenue", "Total Expenses", "Net Income", "Transactions"],
            vec![vec![
                fmt_money(&t.income),
                fmt_money(&t.expense),
                fmt_money(&t.net),
                t.count.to_string(),
            ]],
        )
    );
    let rows = dash
        .monthly
        .iter()
        .map(|p| vec![p.label.clone(), fmt_money(&p.income), fmt_money(&p.expense)])
        .collect();
    println!("{}", pretty_table(&["Month", "Income", "Expenses"], rows));
    Ok(())
}
