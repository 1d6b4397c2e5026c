// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print output as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print output as JSON lines"),
    )
}

fn user_arg() -> Arg {
    Arg::new("user")
        .long("user")
        .required(true)
        .help("Owner of the ledger")
}

fn record_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("type")
            .long("type")
            .required(true)
            .help("Income or Expense"),
    )
    .arg(
        Arg::new("category")
            .long("category")
            .required(true)
            .help("Category within the type's fixed set"),
    )
    .arg(
        Arg::new("amount")
            .long("amount")
            .required(true)
            .help("Non-negative decimal amount"),
    )
    .arg(
        Arg::new("currency")
            .long("currency")
            .required(true)
            .help("Currency code, e.g. THB"),
    )
    .arg(
        Arg::new("date")
            .long("date")
            .help("Calendar day YYYY-MM-DD (defaults to today)"),
    )
    .arg(Arg::new("description").long("description"))
}

pub fn build_cli() -> Command {
    Command::new("daybook")
        .about("Multi-currency income/expense ledger with incremental daily rollups")
        .subcommand(Command::new("init").about("Initialize the database"))
        .subcommand(
            Command::new("tx")
                .about("Record and browse transactions")
                .subcommand(record_args(
                    Command::new("add").about("Record a transaction").arg(user_arg()),
                ))
                .subcommand(record_args(
                    Command::new("update")
                        .about("Replace an existing transaction")
                        .arg(user_arg())
                        .arg(Arg::new("id").long("id").required(true)),
                ))
                .subcommand(
                    Command::new("delete")
                        .about("Delete a transaction")
                        .arg(user_arg())
                        .arg(Arg::new("id").long("id").required(true)),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .about("List transactions with rollup totals")
                        .arg(user_arg())
                        .arg(Arg::new("currency").long("currency"))
                        .arg(Arg::new("type").long("type"))
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("from").long("from").help("Window start YYYY-MM-DD"))
                        .arg(Arg::new("to").long("to").help("Window end YYYY-MM-DD"))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize))
                                .default_value("10"),
                        )
                        .arg(
                            Arg::new("cursor")
                                .long("cursor")
                                .help("Id of the last record from the previous page"),
                        ),
                )),
        )
        .subcommand(json_flags(
            Command::new("erase")
                .about("Delete every transaction and rollup in a date window")
                .arg(user_arg())
                .arg(Arg::new("from").long("from").required(true))
                .arg(Arg::new("to").long("to").required(true)),
        ))
        .subcommand(
            Command::new("doctor")
                .about("Audit rollups against a replay of the transaction log")
                .arg(user_arg())
                .arg(Arg::new("from").long("from"))
                .arg(Arg::new("to").long("to")),
        )
        .subcommand(
            Command::new("currency")
                .about("Home currency used for totals when no filter is given")
                .subcommand(
                    Command::new("set").arg(Arg::new("code").required(true).help("e.g. THB")),
                )
                .subcommand(Command::new("show")),
        )
}
