// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::Ledger;
use crate::reports::{CategoryNet, Statement, by_category, in_range, statement};
use crate::utils::{fmt_money, maybe_print_json, parse_date, pretty_table};
use anyhow::{Result, bail};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct PeriodReport {
    pub income_statement: Statement,
    pub categories: Vec<CategoryNet>,
}

pub fn build(ledger: &Ledger, sub: &clap::ArgMatches) -> Result<PeriodReport> {
    let from = parse_date(sub.get_one::<String>("from").unwrap())?;
    let to = parse_date(sub.get_one::<String>("to").unwrap())?;
    if from > to {
        bail!("--from {} is after --to {}", from, to);
    }
    Ok(PeriodReport {
        income_statement: statement(ledger.all(), from, to),
        categories: by_category(in_range(ledger.all(), from, to)),
    })
}

pub fn handle(ledger: &Ledger, sub: &clap::ArgMatches) -> Result<()> {
    let report = build(ledger, sub)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
        return Ok(());
    }
    let s = &report.income_statement;
    let period = format!("{} - {}", s.from, s.to);

    println!("Income Statement ({})", period);
    println!(
        "{}",
        pretty_table(
            &["Total Income", "Total Expenses", "Net Income"],
            vec![vec![fmt_money(&s.income), fmt_money(&s.expense), fmt_money(&s.net)]],
        )
    );

    // Same window, cash basis: every transaction is a cash movement.
    println!("Cash Flow ({})", period);
    println!(
        "{}",
        pretty_table(
            &["Cash In", "Cash Out", "Net Cash Flow"],
            vec![vec![fmt_money(&s.income), fmt_money(&s.expense), fmt_money(&s.net)]],
        )
    );

    println!("Category Analysis ({})", period);
    let rows = report
        .categories
        .iter()
        .map(|c| {
            vec![
                c.category.clone(),
                fmt_money(&c.income),
                fmt_money(&c.expense),
                fmt_money(&c.net),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Category", "Income", "Expense", "Net"], rows)
    );
    Ok(())
}
