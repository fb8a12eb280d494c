// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn id_arg() -> Arg {
    Arg::new("id")
        .required(true)
        .value_parser(clap::value_parser!(i64))
}

fn yes_flag() -> Arg {
    Arg::new("yes")
        .long("yes")
        .short('y')
        .action(ArgAction::SetTrue)
        .help("Delete without asking")
}

fn opt(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).help(help)
}

fn crop_fields(cmd: Command, required: bool) -> Command {
    cmd.arg(opt("name", "Crop name").required(required))
        .arg(opt("variety", "Variety").required(required))
        .arg(opt("area", "Area in acres").required(required))
        .arg(opt("planting-date", "YYYY-MM-DD").required(required))
        .arg(opt("harvest-date", "YYYY-MM-DD"))
        .arg(opt("notes", "Free-form notes"))
}

fn activity_fields(cmd: Command, required: bool) -> Command {
    cmd.arg(opt("type", "Activity type, e.g. Irrigation").required(required))
        .arg(opt("date", "YYYY-MM-DD").required(required))
        .arg(opt("crop-id", "Crop the activity belongs to").required(required))
        .arg(opt("description", "What was done"))
}

fn expense_fields(cmd: Command, required: bool) -> Command {
    cmd.arg(opt("title", "Expense title").required(required))
        .arg(opt("amount", "Amount").required(required))
        .arg(opt("category", "Category, e.g. Seeds").required(required))
        .arg(opt("date", "YYYY-MM-DD").required(required))
        .arg(opt("description", "Details"))
}

fn entity(
    name: &'static str,
    about: &'static str,
    fields: fn(Command, bool) -> Command,
) -> Command {
    Command::new(name)
        .about(about)
        .subcommand_required(true)
        .subcommand(json_flags(Command::new("list").about("List all")))
        .subcommand(json_flags(
            Command::new("show").about("Show one").arg(id_arg()),
        ))
        .subcommand(fields(Command::new("add").about("Add new"), true))
        .subcommand(fields(
            Command::new("edit").about("Change fields of an existing one").arg(id_arg()),
            false,
        ))
        .subcommand(
            Command::new("rm")
                .about("Delete")
                .arg(id_arg())
                .arg(yes_flag()),
        )
}

fn filter_flags(cmd: Command) -> Command {
    cmd.arg(
        opt("range", "Date preset: week|month|year|custom")
            .default_value("month"),
    )
    .arg(opt("start", "Start date YYYY-MM-DD (implies --range custom)"))
    .arg(opt("end", "End date YYYY-MM-DD (implies --range custom)"))
    .arg(opt("category", "Only expenses in this category"))
    .arg(opt("crop", "Only activities for this crop name"))
    .arg(opt("type", "Only activities of this type"))
}

pub fn build_cli() -> Command {
    Command::new("farmbook")
        .about("Farm records: crops, activities, expenses and reports")
        .version(crate_version!())
        .subcommand(
            Command::new("login")
                .about("Sign in and store the session locally")
                .arg(opt("username", "Username").required(true))
                .arg(opt("password", "Password").required(true)),
        )
        .subcommand(
            Command::new("register")
                .about("Create an account")
                .arg(opt("username", "Username").required(true))
                .arg(opt("email", "Email").required(true))
                .arg(opt("password", "Password").required(true))
                .arg(opt("role", "ADMIN or FARMER")),
        )
        .subcommand(
            Command::new("logout")
                .about("Forget the stored session")
                .arg(
                    Arg::new("clear-settings")
                        .long("clear-settings")
                        .action(ArgAction::SetTrue)
                        .help("Also reset preferences"),
                ),
        )
        .subcommand(entity("crop", "Manage crops", crop_fields))
        .subcommand(
            entity("activity", "Manage farm activities", activity_fields).subcommand(
                json_flags(
                    Command::new("upcoming")
                        .about("Activities due soon")
                        .arg(
                            opt("days", "Look-ahead window in days")
                                .default_value("7")
                                .value_parser(clap::value_parser!(u32)),
                        ),
                ),
            ),
        )
        .subcommand(
            entity("expense", "Manage expenses", expense_fields).mut_subcommand("list", |c| {
                c.arg(opt("month", "Only expenses in YYYY-MM"))
            }),
        )
        .subcommand(json_flags(filter_flags(
            Command::new("dashboard")
                .about("Overview, charts data and budget alert")
                .arg(
                    opt("year", "Year for the monthly series")
                        .value_parser(clap::value_parser!(i32)),
                ),
        )))
        .subcommand(filter_flags(
            Command::new("export")
                .about("Export filtered data")
                .arg(
                    Arg::new("kind")
                        .required(true)
                        .help("expenses|activities|all"),
                )
                .arg(
                    opt("format", "csv|excel|pdf")
                        .short('f')
                        .default_value("csv"),
                )
                .arg(opt("out", "Output directory").short('o').default_value(".")),
        ))
        .subcommand(
            Command::new("budget")
                .about("Monthly budget")
                .subcommand_required(true)
                .subcommand(
                    Command::new("set")
                        .about("Set the monthly budget (0 disables the alert)")
                        .arg(Arg::new("amount").required(true)),
                )
                .subcommand(json_flags(
                    Command::new("show").about("Budget vs. this month's spend"),
                )),
        )
        .subcommand(
            Command::new("settings")
                .about("Local preferences")
                .subcommand_required(true)
                .subcommand(json_flags(Command::new("show")))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("key").required(true))
                        .arg(Arg::new("value").required(true)),
                )
                .subcommand(Command::new("reset")),
        )
}
