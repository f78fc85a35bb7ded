use crate::probe::LivenessProbe;
use crate::result::LinkRecord;
use crate::safelink;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

pub const DEFAULT_UTM_MARKER: &str = "utm_";

pub type LinkProgressCallback = Arc<dyn Fn(usize, usize, &str) + Send + Sync>;

/// Which form of the link the UTM check inspects.
///
/// The liveness probe always targets the unwrapped link. The UTM check
/// historically looked at the href as written, so a SafeLinks wrapper can
/// hide or expose tags that the destination does not have. `Raw` keeps that
/// behavior; `Normalized` checks the same URL that was probed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UtmSubject {
    #[default]
    Raw,
    Normalized,
}

impl FromStr for UtmSubject {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "raw" => Ok(UtmSubject::Raw),
            "normalized" | "normalised" => Ok(UtmSubject::Normalized),
            other => Err(format!("unknown UTM subject '{}' (expected raw or normalized)", other)),
        }
    }
}

/// Turns raw hrefs into [`LinkRecord`]s.
pub struct LinkClassifier<P: LivenessProbe> {
    probe: P,
    utm_marker: String,
    utm_subject: UtmSubject,
    concurrency: usize,
    dedupe: bool,
    progress_callback: Option<LinkProgressCallback>,
}

impl<P: LivenessProbe> LinkClassifier<P> {
    pub fn new(probe: P) -> Self {
        Self {
            probe,
            utm_marker: DEFAULT_UTM_MARKER.to_string(),
            utm_subject: UtmSubject::default(),
            concurrency: 1,
            dedupe: false,
            progress_callback: None,
        }
    }

    pub fn with_utm_marker(mut self, marker: impl Into<String>) -> Self {
        self.utm_marker = marker.into();
        self
    }

    pub fn with_utm_subject(mut self, subject: UtmSubject) -> Self {
        self.utm_subject = subject;
        self
    }

    /// Number of probes allowed in flight at once. Output order is unaffected.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Only keep the first occurrence of each href.
    pub fn with_dedupe(mut self, dedupe: bool) -> Self {
        self.dedupe = dedupe;
        self
    }

    pub fn with_progress_callback(mut self, callback: LinkProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_missing_utm(&self, raw: &str, normalized: &str) -> bool {
        let subject = match self.utm_subject {
            UtmSubject::Raw => raw,
            UtmSubject::Normalized => normalized,
        };
        !subject.contains(&self.utm_marker)
    }

    /// Classify a single href: unwrap, probe once, check tagging.
    pub async fn classify(&self, raw: &str) -> LinkRecord {
        let normalized = safelink::normalize(raw);
        let outcome = self.probe.probe(&normalized).await;
        let missing_utm = self.is_missing_utm(raw, &normalized);

        let record = LinkRecord::new(raw.to_string(), normalized, outcome, missing_utm);
        debug!("{} -> {}", raw, record.status);
        record
    }

    /// Classify every link, returning records in input order.
    pub async fn classify_all(&self, links: &[String]) -> Vec<LinkRecord> {
        let links: Vec<&str> = if self.dedupe {
            let mut seen = HashSet::new();
            links
                .iter()
                .map(String::as_str)
                .filter(|link| seen.insert(*link))
                .collect()
        } else {
            links.iter().map(String::as_str).collect()
        };

        let total = links.len();
        info!(
            "Classifying {} links with concurrency {}",
            total, self.concurrency
        );

        let progress_cb = self.progress_callback.clone();
        let records: Vec<LinkRecord> = stream::iter(links.into_iter().enumerate())
            .map(|(idx, link)| {
                let progress_cb = progress_cb.clone();
                async move {
                    if let Some(ref callback) = progress_cb {
                        callback(idx + 1, total, link);
                    }
                    self.classify(link).await
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let broken = records.iter().filter(|r| r.status.is_broken()).count();
        info!("Classified {} links, {} broken", records.len(), broken);
        records
    }
}
