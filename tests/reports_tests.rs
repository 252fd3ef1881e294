// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sbkp::commands::{dashboard, reports as report_cmd};
use sbkp::ledger::{Filter, Ledger};
use sbkp::models::{TransactionFields, TxType};
use sbkp::{cli, reports};

fn ledger() -> Ledger {
    let mut l = Ledger::new();
    let rows = [
        ("2025-03-05", TxType::Income, "Sales", dec!(2000)),
        ("2025-03-09", TxType::Expense, "Rent", dec!(900)),
        ("2025-04-01", TxType::Expense, "Travel", dec!(310.40)),
        ("2025-04-15", TxType::Income, "Services", dec!(450.25)),
        ("2025-06-30", TxType::Expense, "Meals", dec!(42.10)),
        ("2024-11-11", TxType::Expense, "Insurance", dec!(120)),
    ];
    for (i, (date, ty, cat, amount)) in rows.into_iter().enumerate() {
        l.create_at(
            TransactionFields {
                date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
                r#type: ty,
                category: cat.into(),
                description: format!("row {i}"),
                amount,
                notes: None,
            },
            i as i64 + 1,
        )
        .unwrap();
    }
    l
}

#[test]
fn net_matches_income_minus_expense_for_any_filter() {
    let l = ledger();
    let filters = [
        Filter::default(),
        Filter {
            r#type: Some(TxType::Expense),
            ..Filter::default()
        },
        Filter {
            category: Some("Sales".into()),
            ..Filter::default()
        },
        Filter {
            search: Some("row 1".into()),
            ..Filter::default()
        },
    ];
    for f in &filters {
        let view = l.list(f);
        let income: Decimal = view
            .iter()
            .filter(|t| t.r#type == TxType::Income)
            .map(|t| t.amount)
            .sum();
        let expense: Decimal = view
            .iter()
            .filter(|t| t.r#type == TxType::Expense)
            .map(|t| t.amount)
            .sum();
        assert_eq!(reports::totals(view.iter().copied()).net, income - expense);
    }
}

#[test]
fn dashboard_uses_trailing_six_months() {
    let l = ledger();
    let dash = dashboard::compute(&l, NaiveDate::from_ymd_opt(2025, 6, 30).unwrap());
    assert_eq!(dash.totals.count, 6);
    assert_eq!(dash.totals.net, dec!(1077.75));
    let labels: Vec<&str> = dash.monthly.iter().map(|p| p.label.as_str()).collect();
    assert_eq!(
        labels,
        vec!["Jan 2025", "Feb 2025", "Mar 2025", "Apr 2025", "May 2025", "Jun 2025"]
    );
    assert_eq!(dash.monthly[2].income, dec!(2000));
    assert_eq!(dash.monthly[3].expense, dec!(310.40));
    assert_eq!(dash.monthly[5].expense, dec!(42.10));
}

#[test]
fn period_report_from_cli_window() {
    let l = ledger();
    let matches = cli::build_cli().get_matches_from([
        "sbkp",
        "report",
        "--from",
        "2025-03-01",
        "--to",
        "2025-04-01",
    ]);
    let (_, sub) = matches.subcommand().unwrap();
    let r = report_cmd::build(&l, sub).unwrap();
    assert_eq!(r.income_statement.income, dec!(2000));
    assert_eq!(r.income_statement.expense, dec!(1210.40));
    assert_eq!(r.income_statement.net, dec!(789.60));
    let cats: Vec<&str> = r.categories.iter().map(|c| c.category.as_str()).collect();
    assert_eq!(cats, vec!["Rent", "Sales", "Travel"]);
}

#[test]
fn period_report_rejects_inverted_window() {
    let l = ledger();
    let matches = cli::build_cli().get_matches_from([
        "sbkp",
        "report",
        "--from",
        "2025-05-01",
        "--to",
        "2025-04-01",
    ]);
    let (_, sub) = matches.subcommand().unwrap();
    assert!(report_cmd::build(&l, sub).is_err());
}

#[test]
fn tax_summary_excludes_other_years() {
    let l = ledger();
    let s = reports::tax_summary(l.all(), 2024);
    assert_eq!(s.total_income, Decimal::ZERO);
    assert_eq!(s.total_expenses, dec!(120));
    assert_eq!(s.net_profit, dec!(-120));
    assert_eq!(s.expenses[0].category, "Insurance");
}
