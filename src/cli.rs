// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn output_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print pretty JSON instead of a table"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn value_arg() -> Arg {
    Arg::new("value")
        .long("value")
        .default_value("total_sales")
        .help("Numeric column: total_sales|quantity|unit_price|discount")
}

fn format_out(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("format")
            .long("format")
            .default_value("csv")
            .help("csv|json"),
    )
    .arg(Arg::new("out").long("out").required(true))
}

pub fn build_cli() -> Command {
    Command::new("salescope")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Sales analytics: seasonality, growth, RFM segmentation and forecasting")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true)
                .help("Increase log detail on stderr (-v info, -vv debug, -vvv trace)"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .action(ArgAction::SetTrue)
                .global(true)
                .conflicts_with("verbose")
                .help("Only log errors"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("import").about("Ingest data").subcommand(
                Command::new("sales")
                    .about("Import sales records from a CSV file")
                    .arg(Arg::new("path").long("path").required(true))
                    .arg(
                        Arg::new("replace")
                            .long("replace")
                            .action(ArgAction::SetTrue)
                            .help("Delete stored records before importing"),
                    ),
            ),
        )
        .subcommand(
            Command::new("sample")
                .about("Generate reproducible sample records into the store")
                .arg(
                    Arg::new("records")
                        .long("records")
                        .value_parser(value_parser!(usize))
                        .default_value("1000"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_parser(value_parser!(u64))
                        .default_value("42"),
                )
                .arg(Arg::new("start").long("start").help("YYYY-MM-DD"))
                .arg(Arg::new("end").long("end").help("YYYY-MM-DD"))
                .arg(
                    Arg::new("out")
                        .long("out")
                        .help("Also write the generated records to this CSV file"),
                ),
        )
        .subcommand(
            Command::new("analyze")
                .about("Run analyses over stored records")
                .subcommand(output_flags(
                    Command::new("seasonality")
                        .about("Additive seasonal decomposition of the daily series")
                        .arg(value_arg())
                        .arg(
                            Arg::new("period")
                                .long("period")
                                .value_parser(value_parser!(usize))
                                .default_value("12"),
                        )
                        .arg(
                            Arg::new("fill-gaps")
                                .long("fill-gaps")
                                .action(ArgAction::SetTrue)
                                .help("Treat missing days as zero sales"),
                        ),
                ))
                .subcommand(output_flags(
                    Command::new("growth")
                        .about("Period-over-period growth rates")
                        .arg(value_arg())
                        .arg(
                            Arg::new("freq")
                                .long("freq")
                                .default_value("monthly")
                                .help("daily|weekly|monthly|quarterly|yearly"),
                        ),
                ))
                .subcommand(output_flags(
                    Command::new("rfm")
                        .about("Recency/frequency/monetary customer segmentation")
                        .arg(
                            Arg::new("customer")
                                .long("customer")
                                .default_value("customer_id"),
                        )
                        .arg(value_arg())
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize))
                                .help("Show only the N highest-scoring customers"),
                        ),
                ))
                .subcommand(output_flags(
                    Command::new("forecast")
                        .about("Linear trend forecast of the daily series")
                        .arg(value_arg())
                        .arg(
                            Arg::new("periods")
                                .long("periods")
                                .value_parser(value_parser!(usize))
                                .default_value("30"),
                        ),
                ))
                .subcommand(output_flags(
                    Command::new("moving-average")
                        .about("Trailing moving averages of the daily series")
                        .arg(value_arg())
                        .arg(
                            Arg::new("windows")
                                .long("windows")
                                .value_parser(value_parser!(usize))
                                .value_delimiter(',')
                                .default_value("7,30,90"),
                        ),
                ))
                .subcommand(output_flags(
                    Command::new("outliers")
                        .about("Individual sales far outside the typical range")
                        .arg(value_arg())
                        .arg(
                            Arg::new("method")
                                .long("method")
                                .default_value("iqr")
                                .help("iqr|zscore"),
                        )
                        .arg(
                            Arg::new("threshold")
                                .long("threshold")
                                .value_parser(value_parser!(f64))
                                .help("Fence multiplier (default 1.5 for iqr, 3 for zscore)"),
                        ),
                ))
                .subcommand(output_flags(
                    Command::new("all")
                        .about("Run every core analysis, continuing past failures")
                        .arg(
                            Arg::new("fill-gaps")
                                .long("fill-gaps")
                                .action(ArgAction::SetTrue)
                                .help("Treat missing days as zero sales for seasonality"),
                        ),
                )),
        )
        .subcommand(
            Command::new("report")
                .about("Summaries and reports")
                .subcommand(output_flags(
                    Command::new("summary").about("Executive summary of stored sales"),
                ))
                .subcommand(output_flags(
                    Command::new("performance")
                        .about("Totals per product, region, rep or customer")
                        .arg(Arg::new("by").long("by").default_value("product"))
                        .arg(
                            Arg::new("top")
                                .long("top")
                                .value_parser(value_parser!(usize))
                                .default_value("10"),
                        ),
                ))
                .subcommand(
                    Command::new("html")
                        .about("Write a standalone HTML summary report")
                        .arg(Arg::new("out").long("out").required(true)),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Export data")
                .subcommand(format_out(
                    Command::new("sales").about("Export stored sales records"),
                ))
                .subcommand(format_out(
                    Command::new("rfm").about("Export the RFM segmentation table"),
                )),
        )
        .subcommand(Command::new("doctor").about("Check stored records for data problems"))
        .subcommand(
            Command::new("config")
                .about("Read or change settings")
                .subcommand(output_flags(
                    Command::new("get").arg(Arg::new("key").long("key")),
                ))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("key").long("key").required(true))
                        .arg(Arg::new("value").long("value").required(true)),
                ),
        )
}
