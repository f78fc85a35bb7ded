use crate::config::{Config, ReviewConfig};
use crate::error::CheckError;
use crate::intake::{EmailContent, load_email};
use crate::report::QaReport;
use crate::review::{ReviewOutcome, run_review};
use indicatif::{ProgressBar, ProgressStyle};
use mailqa_scanner::{EmailDocument, HttpProbe, LinkClassifier, LivenessProbe, extract_tokens};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Options for a single QA pass
pub struct CheckOptions {
    pub path: PathBuf,
    pub config: Config,
    pub show_progress_bars: bool,
}

/// Callback for reporting pass progress
pub type CheckProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Build the HTTP-backed classifier described by `config`.
pub fn build_classifier(config: &Config) -> Result<LinkClassifier<HttpProbe>, CheckError> {
    let probe = match config.probe.user_agent {
        Some(ref agent) => HttpProbe::with_options(config.probe.timeout(), agent)?,
        None => HttpProbe::with_timeout(config.probe.timeout())?,
    };

    Ok(LinkClassifier::new(probe)
        .with_utm_marker(config.probe.utm_marker.clone())
        .with_utm_subject(config.probe.utm_subject)
        .with_concurrency(config.probe.concurrency)
        .with_dedupe(config.probe.dedupe_links))
}

/// Load the file named in `options` and run the full pass over it.
pub async fn execute_check(
    options: CheckOptions,
    progress_callback: Option<CheckProgressCallback>,
) -> Result<QaReport, CheckError> {
    let CheckOptions {
        path,
        config,
        show_progress_bars,
    } = options;

    let content = load_email(&path)?;

    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Checking links...");
        Some(Arc::new(pb))
    } else {
        None
    };

    // Route messages around the spinner so they don't tear its line
    let progress_callback: Option<CheckProgressCallback> =
        match (progress_bar.clone(), progress_callback) {
            (Some(pb), Some(cb)) => Some(Arc::new(move |msg: String| pb.suspend(|| cb(msg)))),
            (_, cb) => cb,
        };

    let mut classifier = build_classifier(&config)?;
    if let Some(ref pb) = progress_bar {
        let pb_clone = pb.clone();
        classifier = classifier.with_progress_callback(Arc::new(
            move |done: usize, total: usize, link: &str| {
                pb_clone.set_message(format!("Checking link {}/{}: {}", done, total, link));
            },
        ));
    }

    let report = check_content(
        content,
        path.display().to_string(),
        &classifier,
        &config.review,
        progress_callback,
    )
    .await;

    if let Some(ref pb) = progress_bar {
        pb.finish_and_clear();
    }

    report
}

/// Run links, tokens and review over already-decoded content.
pub async fn check_content<P: LivenessProbe>(
    content: EmailContent,
    source: String,
    classifier: &LinkClassifier<P>,
    review: &ReviewConfig,
    progress_callback: Option<CheckProgressCallback>,
) -> Result<QaReport, CheckError> {
    let notify = |msg: String| {
        if let Some(ref callback) = progress_callback {
            callback(msg);
        }
    };

    // Html is !Send; drop it before the first await
    let (links, text) = {
        let document = EmailDocument::parse(&content.body);
        (document.links()?, document.visible_text())
    };
    info!("Extracted {} links from {}", links.len(), source);

    notify(format!("Checking {} links", links.len()));
    let link_records = classifier.classify_all(&links).await;

    let tokens = extract_tokens(&content.body);
    info!("Found {} personalization tokens", tokens.len());

    if review.is_enabled() {
        notify("Requesting AI content review".to_string());
    }
    let review_outcome = run_review(review, &text).await;
    if let ReviewOutcome::Disabled(ref reason) = review_outcome {
        notify(format!("AI review skipped: {}", reason));
    }

    Ok(QaReport {
        source,
        subject: content.subject,
        links: link_records,
        tokens,
        review: review_outcome,
        generated_at: chrono::Utc::now().to_rfc3339(),
    })
}
