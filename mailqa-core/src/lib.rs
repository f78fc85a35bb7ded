pub mod check;
pub mod config;
pub mod error;
pub mod intake;
pub mod report;
pub mod review;

use colored::Colorize;

pub use check::{CheckOptions, CheckProgressCallback, build_classifier, check_content, execute_check};
pub use config::Config;
pub use error::{CheckError, ConfigError, IntakeError, ReviewError};
pub use intake::{ContainerKind, EmailContent};
pub use report::{QaReport, ReportFormat};
pub use review::ReviewOutcome;

pub fn print_banner() {
    eprintln!(
        "{} {}",
        "mailqa".bright_cyan().bold(),
        format!("v{} - marketing email QA", env!("CARGO_PKG_VERSION")).bright_black()
    );
    eprintln!();
}
