// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command};

fn user_arg() -> Arg {
    Arg::new("user")
        .long("user")
        .short('u')
        .required(true)
        .help("Opaque user identifier the operation is scoped to")
}

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

pub fn build_cli() -> Command {
    Command::new("pocketledger")
        .about("Per-user wallet ledger with recurring rules and monthly budgets")
        .subcommand(Command::new("init").about("Initialize the database"))
        .subcommand(wallet_cmd())
        .subcommand(tx_cmd())
        .subcommand(budget_cmd())
        .subcommand(recurring_cmd())
}

fn wallet_cmd() -> Command {
    let amount_args = |cmd: Command| {
        cmd.arg(user_arg())
            .arg(Arg::new("amount").long("amount").required(true))
            .arg(Arg::new("description").long("description"))
            .arg(
                Arg::new("category")
                    .long("category")
                    .help("One of the fixed categories; unknown values fall back to 'other'"),
            )
    };
    Command::new("wallet")
        .about("Balance queries and direct credit/debit")
        .subcommand(Command::new("balance").about("Show the current balance").arg(user_arg()))
        .subcommand(amount_args(
            Command::new("credit").about("Credit the wallet"),
        ))
        .subcommand(amount_args(Command::new("debit").about("Debit the wallet")))
}

fn tx_cmd() -> Command {
    Command::new("tx")
        .about("List, edit and delete ledger transactions")
        .subcommand(json_flags(
            Command::new("list")
                .about("List transactions, newest first")
                .arg(user_arg())
                .arg(Arg::new("type").long("type").help("credit or debit"))
                .arg(Arg::new("category").long("category"))
                .arg(Arg::new("month").long("month").help("Inclusive month window, YYYY-MM"))
                .arg(Arg::new("from").long("from").help("Start date, inclusive (YYYY-MM-DD)"))
                .arg(Arg::new("to").long("to").help("End date, inclusive (YYYY-MM-DD)"))
                .arg(
                    Arg::new("search")
                        .long("search")
                        .help("Case-insensitive substring over description/category"),
                )
                .arg(Arg::new("page").long("page"))
                .arg(Arg::new("limit").long("limit")),
        ))
        .subcommand(
            Command::new("edit")
                .about("Edit fields of a transaction; absent fields are kept")
                .arg(user_arg())
                .arg(Arg::new("id").long("id").required(true))
                .arg(Arg::new("type").long("type"))
                .arg(Arg::new("amount").long("amount"))
                .arg(Arg::new("category").long("category"))
                .arg(Arg::new("description").long("description"))
                .arg(Arg::new("date").long("date").help("New timestamp or date")),
        )
        .subcommand(
            Command::new("rm")
                .about("Delete a transaction")
                .arg(user_arg())
                .arg(Arg::new("id").long("id").required(true)),
        )
}

fn budget_cmd() -> Command {
    Command::new("budget")
        .about("Monthly per-category spending caps")
        .subcommand(json_flags(
            Command::new("list")
                .about("List budgets")
                .arg(user_arg())
                .arg(Arg::new("month").long("month")),
        ))
        .subcommand(
            Command::new("set")
                .about("Create or replace a budget; a limit of 0 removes it")
                .arg(user_arg())
                .arg(Arg::new("month").long("month").required(true))
                .arg(Arg::new("category").long("category").required(true))
                .arg(Arg::new("limit").long("limit").required(true)),
        )
}

fn recurring_cmd() -> Command {
    Command::new("recurring")
        .about("Rules that auto-generate transactions on a schedule")
        .subcommand(json_flags(
            Command::new("list").about("List rules, newest first").arg(user_arg()),
        ))
        .subcommand(
            Command::new("add")
                .about("Create a rule")
                .arg(user_arg())
                .arg(Arg::new("title").long("title").required(true))
                .arg(Arg::new("amount").long("amount").required(true))
                .arg(Arg::new("type").long("type").required(true).help("credit or debit"))
                .arg(Arg::new("frequency").long("frequency").required(true).help("daily, weekly or monthly"))
                .arg(Arg::new("category").long("category"))
                .arg(Arg::new("description").long("description"))
                .arg(
                    Arg::new("next-run")
                        .long("next-run")
                        .help("First due timestamp; defaults to now"),
                ),
        )
        .subcommand(
            Command::new("edit")
                .about("Edit fields of a rule; absent fields are kept")
                .arg(user_arg())
                .arg(Arg::new("id").long("id").required(true))
                .arg(Arg::new("title").long("title"))
                .arg(Arg::new("amount").long("amount"))
                .arg(Arg::new("type").long("type"))
                .arg(Arg::new("frequency").long("frequency"))
                .arg(Arg::new("category").long("category"))
                .arg(Arg::new("description").long("description"))
                .arg(Arg::new("next-run").long("next-run"))
                .arg(Arg::new("active").long("active").help("true or false")),
        )
        .subcommand(
            Command::new("rm")
                .about("Delete a rule; its past transactions remain")
                .arg(user_arg())
                .arg(Arg::new("id").long("id").required(true)),
        )
}
