// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::Ledger;
use crate::reports::tax_summary;
use crate::utils::{fmt_money, maybe_print_json, pretty_table};
use anyhow::Result;
use chrono::Datelike;

pub fn handle(ledger: &Ledger, sub: &clap::ArgMatches) -> Result<()> {
    let year = sub
        .get_one::<i32>("year")
        .copied()
        .unwrap_or_else(|| chrono::Local::now().year());
    let summary = tax_summary(ledger.all(), year);
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &summary)? {
        return Ok(());
    }

    println!("Schedule C - Tax Year {}", summary.year);
    let mut rows = vec![vec![
        "Gross Income".to_string(),
        fmt_money(&summary.total_income),
    ]];
    for e in &summary.expenses {
        rows.push(vec![format!("  {}", e.category), fmt_money(&e.amount)]);
    }
    rows.push(vec![
        "Total Expenses".to_string(),
        fmt_money(&summary.total_expenses),
    ]);
    rows.push(vec!["Net Profit".to_string(), fmt_money(&summary.net_profit)]);
    println!("{}", pretty_table(&["Line", "Amount"], rows));
    Ok(())
}
