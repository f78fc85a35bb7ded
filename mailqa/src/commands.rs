use crate::CLAP_STYLING;
use clap::{arg, command};

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("mailqa")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("mailqa")
        .about("Link, UTM, token and content QA for marketing emails")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Suppress banner, spinner and progress messages")
                .required(false)
                .global(true),
        )
        .arg(
            arg!(-v --"verbose" "Log debug output to stderr (RUST_LOG overrides)")
                .required(false)
                .global(true),
        )
        .arg(
            arg!(-c --"config" <PATH>)
                .required(false)
                .global(true)
                .help("Config file to use (default: ~/.config/mailqa/config.toml)")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .subcommand_required(false)
        .subcommand(
            command!("init")
                .about("Writes a commented default config file")
                .arg(
                    arg!([PATH])
                        .required(false)
                        .help("Where to write the config file, or a directory to put config.toml in")
                        .default_value("~/.config/mailqa/config.toml"),
                )
                .arg(
                    arg!(-f --"force")
                        .help("Overwrite an existing config file at the specified location.")
                        .required(false),
                ),
        )
        .subcommand(
            command!("check")
                .about(
                    "Check one email file (.html, .htm, .eml, .msg): link liveness, UTM tagging, \
                personalization tokens and an optional AI content review.",
                )
                .arg(
                    arg!(<FILE>)
                        .required(true)
                        .help("The email file to check")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Per-link request timeout in seconds (default from config: 5)")
                        .value_parser(clap::value_parser!(u64).range(1..)),
                )
                .arg(
                    arg!(--"concurrency" <NUM_WORKERS>)
                        .required(false)
                        .help("How many links to probe at once (default from config: 1)")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--"no-review")
                        .required(false)
                        .help("Skip the AI content review")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"dedupe")
                        .required(false)
                        .help("Report each distinct href once")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"utm-subject" <SUBJECT>)
                        .required(false)
                        .help(
                            "Check UTM tags on the href as written (raw) or on the unwrapped \
                        SafeLinks destination (normalized)",
                        )
                        .value_parser(["raw", "normalized"]),
                ),
        )
}
