// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal_macros::dec;
use sbkp::ledger::{Ledger, TRANSACTIONS_KEY};
use sbkp::models::{TransactionFields, TxType};
use sbkp::session::Session;
use sbkp::{cli, commands::transactions, db};

fn fields(date: &str, ty: TxType, cat: &str, desc: &str) -> TransactionFields {
    TransactionFields {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        r#type: ty,
        category: cat.into(),
        description: desc.into(),
        amount: dec!(10.00),
        notes: None,
    }
}

fn setup() -> Session {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    let mut s = Session::open(conn).unwrap();
    s.mutate(|l| {
        for (i, d) in ["2025-01-01", "2025-01-02", "2025-01-03"].iter().enumerate() {
            l.create_at(fields(d, TxType::Expense, "Supplies", "Paper"), 100 + i as i64)?;
        }
        Ok(())
    })
    .unwrap();
    s
}

fn run(session: &mut Session, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["sbkp", "tx"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        transactions::handle(session, tx_m)
    } else {
        panic!("no tx subcommand");
    }
}

#[test]
fn list_limit_respected() {
    let s = setup();
    let matches = cli::build_cli().get_matches_from(["sbkp", "tx", "list", "--limit", "2"]);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        if let Some(("list", list_m)) = tx_m.subcommand() {
            let rows = transactions::query_rows(s.ledger(), list_m).unwrap();
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0].date.to_string(), "2025-01-03");
        } else {
            panic!("no list subcommand");
        }
    } else {
        panic!("no tx subcommand");
    }
}

#[test]
fn add_persists_and_reload_round_trips() {
    let mut s = setup();
    run(
        &mut s,
        &[
            "add",
            "--date",
            "2025-02-14",
            "--type",
            "income",
            "--category",
            "Consulting",
            "-d",
            "Retainer",
            "--amount",
            "1250.75",
            "--notes",
            "Feb invoice",
        ],
    )
    .unwrap();
    assert_eq!(s.ledger().len(), 4);

    let before = s.ledger().clone();
    let reloaded = Ledger::load(s.conn()).unwrap();
    assert_eq!(reloaded, before);
    let added = reloaded
        .all()
        .iter()
        .find(|t| t.description == "Retainer")
        .unwrap();
    assert_eq!(added.amount, dec!(1250.75));
    assert_eq!(added.notes.as_deref(), Some("Feb invoice"));
    assert_eq!(added.r#type, TxType::Income);
}

#[test]
fn add_rejects_category_of_other_type() {
    let mut s = setup();
    let err = run(
        &mut s,
        &[
            "add", "--type", "income", "--category", "Rent", "-d", "x", "--amount", "1",
        ],
    )
    .unwrap_err();
    assert!(err.to_string().contains("not a valid income category"));
    assert_eq!(s.ledger().len(), 3);
}

#[test]
fn add_rejects_negative_amount() {
    let mut s = setup();
    let err = run(
        &mut s,
        &[
            "add", "--type", "expense", "--category", "Rent", "-d", "x", "--amount", "-5",
        ],
    )
    .unwrap_err();
    assert!(err.to_string().contains("non-negative"));
}

#[test]
fn edit_merges_given_fields() {
    let mut s = setup();
    run(&mut s, &["edit", "101", "--amount", "99.99", "--notes", "fixed"]).unwrap();
    let t = s.ledger().get("101").unwrap();
    assert_eq!(t.amount, dec!(99.99));
    assert_eq!(t.notes.as_deref(), Some("fixed"));
    assert_eq!(t.category, "Supplies");
    assert_eq!(t.date.to_string(), "2025-01-02");
}

#[test]
fn edit_unknown_id_is_silent_noop() {
    let mut s = setup();
    let before = s.ledger().clone();
    run(&mut s, &["edit", "nope", "--amount", "1"]).unwrap();
    assert_eq!(s.ledger(), &before);
}

#[test]
fn rm_removes_exactly_one() {
    let mut s = setup();
    run(&mut s, &["rm", "100", "--yes"]).unwrap();
    let ids: Vec<&str> = s.ledger().all().iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["101", "102"]);

    run(&mut s, &["rm", "does-not-exist", "--yes"]).unwrap();
    assert_eq!(s.ledger().len(), 2);
    let stored = db::get_item(s.conn(), TRANSACTIONS_KEY).unwrap().unwrap();
    assert!(!stored.contains("\"100\""));
}

#[test]
fn rm_many_requires_selection() {
    let mut s = setup();
    let err = run(&mut s, &["rm-many", "--yes"]).unwrap_err();
    assert_eq!(err.to_string(), "Please select transactions to delete");

    run(&mut s, &["rm-many", "--ids", "100,102", "--yes"]).unwrap();
    assert_eq!(s.ledger().len(), 1);
    assert_eq!(s.ledger().all()[0].id, "101");
}

#[test]
fn list_filters_by_search_and_type() {
    let mut s = setup();
    s.mutate(|l| {
        let mut f = fields("2025-01-10", TxType::Income, "Sales", "Widget sale");
        f.notes = Some("Paid by ACME".into());
        l.create_at(f, 500)?;
        Ok(())
    })
    .unwrap();
    let matches = cli::build_cli().get_matches_from([
        "sbkp", "tx", "list", "--search", "acme", "--type", "income",
    ]);
    let (_, tx_m) = matches.subcommand().unwrap();
    let (_, list_m) = tx_m.subcommand().unwrap();
    let rows = transactions::query_rows(s.ledger(), list_m).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, "500");
}
