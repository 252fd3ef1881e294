// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::{Filter, Ledger};
use crate::models::{Transaction, TransactionFields, TxType};
use crate::session::Session;
use crate::utils::{confirm, fmt_money, maybe_print_json, parse_amount, parse_date, pretty_table};
use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use tracing::{debug, info};

pub fn handle(session: &mut Session, m: &ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(session, sub)?,
        Some(("edit", sub)) => edit(session, sub)?,
        Some(("rm", sub)) => remove(session, sub)?,
        Some(("rm-many", sub)) => remove_many(session, sub)?,
        Some(("list", sub)) => list(session.ledger(), sub)?,
        _ => {}
    }
    Ok(())
}

/// Builds the full field set from the command line, falling back to `base`
/// for anything not given.
pub fn read_fields(sub: &ArgMatches, base: Option<TransactionFields>) -> Result<TransactionFields> {
    let date = match sub.get_one::<String>("date") {
        Some(s) => parse_date(s)?,
        None => base
            .as_ref()
            .map(|b| b.date)
            .unwrap_or_else(|| chrono::Local::now().date_naive()),
    };
    let r#type: TxType = match sub.get_one::<String>("type") {
        Some(s) => s.parse()?,
        None => base.as_ref().map(|b| b.r#type).context("--type is required")?,
    };
    let category = sub
        .get_one::<String>("category")
        .map(|s| s.trim().to_string())
        .or_else(|| base.as_ref().map(|b| b.category.clone()))
        .context("--category is required")?;
    let description = sub
        .get_one::<String>("description")
        .map(|s| s.trim().to_string())
        .or_else(|| base.as_ref().map(|b| b.description.clone()))
        .context("--description is required")?;
    let amount = match sub.get_one::<String>("amount") {
        Some(s) => parse_amount(s)?,
        None => base.as_ref().map(|b| b.amount).context("--amount is required")?,
    };
    let notes = match sub.get_one::<String>("notes") {
        Some(n) => Some(n.clone()),
        None => base.and_then(|b| b.notes),
    };
    Ok(TransactionFields {
        date,
        r#type,
        category,
        description,
        amount,
        notes,
    })
}

fn add(session: &mut Session, sub: &ArgMatches) -> Result<()> {
    let fields = read_fields(sub, None)?;
    let tx = session.mutate(|l| l.create(fields).cloned())?;
    info!(id = %tx.id, "transaction recorded");
    println!(
        "Recorded {} {} on {} ({}) id={}",
        tx.r#type,
        fmt_money(&tx.amount),
        tx.date,
        tx.category,
        tx.id
    );
    Ok(())
}

fn edit(session: &mut Session, sub: &ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").unwrap().trim().to_string();
    let Some(existing) = session.ledger().get(&id) else {
        debug!(id = %id, "edit target not found, nothing to do");
        return Ok(());
    };
    let fields = read_fields(sub, Some(TransactionFields::from(existing)))?;
    if session.mutate(|l| l.update(&id, fields))? {
        info!(id = %id, "transaction updated");
        println!("Updated transaction {}", id);
    }
    Ok(())
}

fn remove(session: &mut Session, sub: &ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").unwrap().trim().to_string();
    if !confirm(
        "Are you sure you want to delete this transaction?",
        sub.get_flag("yes"),
    )? {
        println!("Cancelled");
        return Ok(());
    }
    if session.mutate(|l| Ok(l.delete(&id)))? {
        info!(id = %id, "transaction deleted");
        println!("Deleted transaction {}", id);
    } else {
        println!("No transaction with id {}", id);
    }
    Ok(())
}

fn remove_many(session: &mut Session, sub: &ArgMatches) -> Result<()> {
    let ids: Vec<String> = sub
        .get_many::<String>("ids")
        .map(|v| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();
    if ids.is_empty() {
        bail!("Please select transactions to delete");
    }
    if !confirm(
        &format!("Delete {} selected transaction(s)?", ids.len()),
        sub.get_flag("yes"),
    )? {
        println!("Cancelled");
        return Ok(());
    }
    let removed = session.mutate(|l| Ok(l.bulk_delete(&ids)))?;
    info!(removed, requested = ids.len(), "bulk delete");
    println!("Deleted {} transaction(s)", removed);
    Ok(())
}

pub fn filter_from(sub: &ArgMatches) -> Result<Filter> {
    Ok(Filter {
        search: sub.get_one::<String>("search").cloned(),
        r#type: sub
            .get_one::<String>("type")
            .map(|s| s.parse::<TxType>())
            .transpose()?,
        category: sub.get_one::<String>("category").cloned(),
    })
}

pub fn query_rows(ledger: &Ledger, sub: &ArgMatches) -> Result<Vec<Transaction>> {
    let filter = filter_from(sub)?;
    let limit = sub.get_one::<usize>("limit").copied().unwrap_or(usize::MAX);
    Ok(ledger
        .list(&filter)
        .into_iter()
        .take(limit)
        .cloned()
        .collect())
}

fn list(ledger: &Ledger, sub: &ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(ledger, sub)?;
    if maybe_print_json(json_flag, jsonl_flag, &data)? {
        return Ok(());
    }
    if data.is_empty() {
        println!("No transactions found");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = data
        .iter()
        .map(|t| {
            vec![
                t.id.clone(),
                t.date.to_string(),
                t.r#type.to_string(),
                t.category.clone(),
                t.description.clone(),
                fmt_money(&t.amount),
                t.notes.clone().unwrap_or_default(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["ID", "Date", "Type", "Category", "Description", "Amount", "Notes"],
            rows,
        )
    );
    Ok(())
}
