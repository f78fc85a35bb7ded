use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use colored::Colorize;
use mailqa_core::config::{Config, default_config_template};
use mailqa_core::error::{CheckError, IntakeError};
use mailqa_core::report::{
    QaReport, ReportFormat, generate_json_report, generate_text_report, save_report,
};
use mailqa_core::{CheckOptions, ReviewOutcome, execute_check};
use mailqa_scanner::UtmSubject;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Exit code when the email had no content to check.
pub const EXIT_EMPTY_CONTENT: i32 = 2;

const VERBOSE_FILTER: &str = "warn,mailqa=debug,mailqa_core=debug,mailqa_scanner=debug";

/// Install the stderr log subscriber. `RUST_LOG` wins over `verbose`.
pub fn init_logging(verbose: bool) {
    let default = if verbose { VERBOSE_FILTER } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // try_init: a second call (tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Flags on `check` that take precedence over the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckOverrides {
    pub timeout_secs: Option<u64>,
    pub concurrency: Option<usize>,
    pub no_review: bool,
    pub dedupe: bool,
    pub utm_subject: Option<UtmSubject>,
}

impl CheckOverrides {
    pub fn from_matches(args: &ArgMatches) -> Self {
        Self {
            timeout_secs: args.get_one::<u64>("timeout").copied(),
            concurrency: args.get_one::<usize>("concurrency").copied(),
            no_review: args.get_flag("no-review"),
            dedupe: args.get_flag("dedupe"),
            utm_subject: args
                .get_one::<String>("utm-subject")
                .and_then(|s| s.parse::<UtmSubject>().ok()),
        }
    }

    pub fn apply(&self, config: &mut Config) {
        if let Some(timeout) = self.timeout_secs {
            config.probe.timeout_secs = timeout;
        }
        if let Some(concurrency) = self.concurrency {
            config.probe.concurrency = concurrency;
        }
        if let Some(subject) = self.utm_subject {
            config.probe.utm_subject = subject;
        }
        if self.dedupe {
            config.probe.dedupe_links = true;
        }
        if self.no_review {
            config.review.enabled = false;
        }
    }
}

/// Read the config file, then fill the API key from the environment.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = Config::load(path).with_context(|| match path {
        Some(p) => format!("Failed to load config from {}", p.display()),
        None => "Failed to load default config".to_string(),
    })?;
    config.apply_env();
    Ok(config)
}

pub fn render_report(report: &QaReport, format: ReportFormat, color: bool) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(report, color)),
        ReportFormat::Json => {
            generate_json_report(report).context("Failed to serialize JSON report")
        }
    }
}

/// Map a failed command to the process exit code.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<CheckError>() {
        Some(CheckError::Intake(IntakeError::EmptyContent)) => EXIT_EMPTY_CONTENT,
        _ => 1,
    }
}

pub async fn handle_check(args: &ArgMatches, config_path: Option<&Path>, quiet: bool) -> Result<()> {
    let file = args
        .get_one::<PathBuf>("FILE")
        .context("No email file given")?;
    let format = args
        .get_one::<String>("format")
        .and_then(|f| f.parse::<ReportFormat>().ok())
        .unwrap_or(ReportFormat::Text);
    let output = args.get_one::<PathBuf>("output");

    let mut config = load_config(config_path)?;
    CheckOverrides::from_matches(args).apply(&mut config);

    if !quiet {
        eprintln!(
            "{} Checking {}",
            "→".blue(),
            file.display().to_string().bright_white()
        );
    }

    let options = CheckOptions {
        path: file.clone(),
        config,
        show_progress_bars: !quiet,
    };

    let progress_callback: Option<mailqa_core::CheckProgressCallback> = if quiet {
        None
    } else {
        Some(Arc::new(|msg: String| {
            eprintln!("  {} {}", "•".blue(), msg);
        }))
    };

    let report = execute_check(options, progress_callback)
        .await
        .with_context(|| format!("Check of {} failed", file.display()))?;

    if let ReviewOutcome::Failed(ref reason) = report.review {
        tracing::warn!("AI review failed: {}", reason);
    }

    let rendered = render_report(&report, format, output.is_none())?;

    match output {
        Some(path) => {
            save_report(&rendered, path)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            if !quiet {
                eprintln!(
                    "{} Report saved to {}",
                    "✓".green().bold(),
                    path.display().to_string().bright_white()
                );
            }
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

/// Resolve the `init` target: a directory gets `config.toml` appended.
pub fn resolve_init_path(raw: &str) -> PathBuf {
    let path = PathBuf::from(shellexpand::tilde(raw).as_ref());
    if path.is_dir() || raw.ends_with('/') {
        path.join(CONFIG_FILE_NAME)
    } else {
        path
    }
}

/// Write the default config template to `path`, creating parent directories.
pub fn write_config_template(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, default_config_template())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

pub fn handle_init(args: &ArgMatches) -> Result<()> {
    let raw = args
        .get_one::<String>("PATH")
        .map(String::as_str)
        .unwrap_or("~/.config/mailqa/config.toml");
    let force = args.get_flag("force");
    let path = resolve_init_path(raw);

    write_config_template(&path, force)?;

    println!(
        "{} Config written: {}",
        "✓".green().bold(),
        path.display().to_string().bright_white()
    );
    println!(
        "{} Set review.api_key there or export OPENAI_API_KEY to enable the AI review",
        "ℹ".blue()
    );
    Ok(())
}
