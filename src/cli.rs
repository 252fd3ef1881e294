// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, command, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Pretty JSON output"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("One JSON document per line"),
    )
}

fn yes_flag() -> Arg {
    Arg::new("yes")
        .long("yes")
        .short('y')
        .action(ArgAction::SetTrue)
        .help("Skip the confirmation prompt")
}

fn tx_type_arg(required: bool) -> Arg {
    Arg::new("type")
        .long("type")
        .value_parser(["income", "expense"])
        .required(required)
}

fn tx_field_args(cmd: Command, required: bool) -> Command {
    cmd.arg(
        Arg::new("date")
            .long("date")
            .help("YYYY-MM-DD (defaults to today when adding)"),
    )
    .arg(tx_type_arg(required))
    .arg(Arg::new("category").long("category").required(required))
    .arg(
        Arg::new("description")
            .long("description")
            .short('d')
            .required(required),
    )
    .arg(
        Arg::new("amount")
            .long("amount")
            .allow_hyphen_values(true)
            .required(required),
    )
    .arg(Arg::new("notes").long("notes"))
}

pub fn build_cli() -> Command {
    command!()
        .name("sbkp")
        .about("SmallBiz BookKeeping Pro: income/expense bookkeeping behind a device-bound license")
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .help("Storage file (defaults to the platform data dir or $SBKP_DATA_DIR)"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::Count)
                .global(true),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(Command::new("init").about("Create the local storage file"))
        .subcommand(
            Command::new("license")
                .about("Activate, inspect or release the license on this device")
                .subcommand(
                    Command::new("activate")
                        .arg(Arg::new("key").required(true).help("SBKP-YYYY-XXXX-XXXXX")),
                )
                .subcommand(json_flags(Command::new("status")))
                .subcommand(Command::new("logout").arg(yes_flag()))
                .subcommand(
                    Command::new("keygen")
                        .about("Generate a key in the accepted format (admin)")
                        .arg(
                            Arg::new("year")
                                .long("year")
                                .value_parser(value_parser!(i32)),
                        ),
                ),
        )
        .subcommand(
            Command::new("tx")
                .about("Record and manage transactions")
                .subcommand(tx_field_args(Command::new("add"), true))
                .subcommand(tx_field_args(
                    Command::new("edit").arg(Arg::new("id").required(true)),
                    false,
                ))
                .subcommand(
                    Command::new("rm")
                        .arg(Arg::new("id").required(true))
                        .arg(yes_flag()),
                )
                .subcommand(
                    Command::new("rm-many")
                        .arg(
                            Arg::new("ids")
                                .long("ids")
                                .value_delimiter(',')
                                .num_args(0..),
                        )
                        .arg(yes_flag()),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(Arg::new("search").long("search").short('s'))
                        .arg(tx_type_arg(false))
                        .arg(Arg::new("category").long("category"))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                )),
        )
        .subcommand(
            Command::new("categories")
                .about("List the fixed income/expense categories")
                .arg(tx_type_arg(false)),
        )
        .subcommand(json_flags(
            Command::new("dashboard").about("Totals and the trailing six-month series"),
        ))
        .subcommand(json_flags(
            Command::new("report")
                .about("Income statement, cash flow and category analysis for a period")
                .arg(Arg::new("from").long("from").required(true))
                .arg(Arg::new("to").long("to").required(true)),
        ))
        .subcommand(json_flags(
            Command::new("tax")
                .about("Schedule C style summary for a tax year")
                .arg(
                    Arg::new("year")
                        .long("year")
                        .value_parser(value_parser!(i32)),
                ),
        ))
        .subcommand(
            Command::new("export")
                .about("Export transactions or report documents")
                .subcommand(
                    Command::new("transactions")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .default_value("csv"),
                        )
                        .arg(Arg::new("out").long("out").required(true))
                        .arg(
                            Arg::new("ids")
                                .long("ids")
                                .value_delimiter(',')
                                .num_args(0..),
                        ),
                )
                .subcommand(
                    Command::new("pdf")
                        .arg(Arg::new("report").long("report").required(true))
                        .arg(Arg::new("out").long("out").required(true)),
                ),
        )
}

/// Whether a top-level subcommand needs an unlocked license.
pub fn requires_license(command: &str) -> bool {
    !matches!(command, "init" | "license")
}
