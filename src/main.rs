// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use std::path::Path;

use sbkp::fingerprint::SystemSignals;
use sbkp::logging::{Verbosity, init_logging};
use sbkp::session::Session;
use sbkp::{cli, commands, db};

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    init_logging(Verbosity::from_flags(
        matches.get_count("verbose"),
        matches.get_flag("quiet"),
    ));

    let (conn, path) = match matches.get_one::<String>("db") {
        Some(p) => (db::open_at(Path::new(p))?, p.into()),
        None => (db::open_or_init()?, db::db_path()?),
    };
    let mut session = Session::open(conn)?;
    let signals = SystemSignals;

    if matches.subcommand_name().is_some_and(cli::requires_license) {
        session.require_unlocked(&signals)?;
    }

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Storage initialized at {}", path.display());
        }
        Some(("license", sub)) => commands::license::handle(&mut session, &signals, sub)?,
        Some(("categories", sub)) => commands::categories::handle(sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&mut session, sub)?,
        Some(("dashboard", sub)) => commands::dashboard::handle(session.ledger(), sub)?,
        Some(("report", sub)) => commands::reports::handle(session.ledger(), sub)?,
        Some(("tax", sub)) => commands::tax::handle(session.ledger(), sub)?,
        Some(("export", sub)) => commands::exporter::handle(session.ledger(), sub)?,
        Some((name, _)) => unreachable!("subcommand {name} is not wired"),
        None => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
