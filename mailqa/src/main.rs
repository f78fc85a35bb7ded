use colored::Colorize;
use commands::command_argument_builder;
use mailqa::handlers::{EXIT_EMPTY_CONTENT, exit_code_for, handle_check, handle_init, init_logging};
use mailqa_core::print_banner;
use std::path::PathBuf;

mod commands;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");
    let verbose = chosen_command.get_flag("verbose");
    let config_path = chosen_command.get_one::<PathBuf>("config").cloned();

    init_logging(verbose);

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    let result = match chosen_command.subcommand() {
        Some(("init", primary_command)) => handle_init(primary_command),
        Some(("check", primary_command)) => {
            handle_check(primary_command, config_path.as_deref(), quiet).await
        }
        // No subcommand provided, just show the banner
        None => Ok(()),
        _ => unreachable!("clap should ensure we don't get here"),
    };

    if let Err(e) = result {
        let code = exit_code_for(&e);
        if code == EXIT_EMPTY_CONTENT {
            eprintln!("{} {}", "⚠".yellow().bold(), format!("{:#}", e).yellow());
        } else {
            eprintln!("{} {:#}", "✗".red().bold(), e);
        }
        std::process::exit(code);
    }
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
