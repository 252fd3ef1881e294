// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::fingerprint::SignalSource;
use crate::license::generate_key;
use crate::session::Session;
use crate::utils::{confirm, maybe_print_json, pretty_table};
use anyhow::Result;
use chrono::Datelike;
use clap::ArgMatches;

pub fn handle(session: &mut Session, signals: &dyn SignalSource, m: &ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("activate", sub)) => {
            // Keys are matched upper-case, so accept any casing on input.
            let key = sub.get_one::<String>("key").unwrap().trim().to_uppercase();
            let activation = session.activate(&key, signals)?;
            let features: Vec<&str> = activation.features.iter().map(String::as_str).collect();
            println!(
                "License activated successfully! ({}; features: {})",
                activation.r#type,
                features.join(", ")
            );
        }
        Some(("status", sub)) => status(session, signals, sub)?,
        Some(("logout", sub)) => {
            if !confirm("Are you sure you want to logout?", sub.get_flag("yes"))? {
                println!("Cancelled");
                return Ok(());
            }
            session.logout()?;
            println!("Logged out; license released on this device");
        }
        Some(("keygen", sub)) => {
            let year = sub
                .get_one::<i32>("year")
                .copied()
                .unwrap_or_else(|| chrono::Local::now().year());
            println!("{}", generate_key(year, &mut rand::thread_rng()));
        }
        _ => {}
    }
    Ok(())
}

fn status(session: &mut Session, signals: &dyn SignalSource, sub: &ArgMatches) -> Result<()> {
    if !session.unlock(signals)? {
        println!("No active license on this device");
        return Ok(());
    }
    let Some(info) = session.gate().info() else {
        println!("No active license on this device");
        return Ok(());
    };
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &info)? {
        return Ok(());
    }
    let features: Vec<&str> = info.features.iter().map(String::as_str).collect();
    let rows = vec![
        vec!["Key".to_string(), info.key.clone()],
        vec!["Type".to_string(), info.r#type.to_string()],
        vec!["Features".to_string(), features.join(", ")],
        vec![
            "Activated".to_string(),
            info.activated_at
                .map(|t| t.to_rfc3339())
                .unwrap_or_default(),
        ],
    ];
    println!("{}", pretty_table(&["License", ""], rows));
    Ok(())
}
