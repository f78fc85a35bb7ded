use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a link probe did not come back with a plain 200.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum UnreachableReason {
    /// The server answered, but not with 200.
    Status(u16),
    Timeout,
    Connect,
    /// The link could not be turned into a request at all (relative, mailto, empty...).
    InvalidUrl,
    Request(String),
}

impl fmt::Display for UnreachableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnreachableReason::Status(code) => write!(f, "HTTP {}", code),
            UnreachableReason::Timeout => write!(f, "timed out"),
            UnreachableReason::Connect => write!(f, "connection failed"),
            UnreachableReason::InvalidUrl => write!(f, "not a fetchable URL"),
            UnreachableReason::Request(msg) => write!(f, "request failed: {}", msg),
        }
    }
}

/// Outcome of a single liveness probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeOutcome {
    Reachable,
    Unreachable(UnreachableReason),
}

impl ProbeOutcome {
    pub fn is_reachable(&self) -> bool {
        matches!(self, ProbeOutcome::Reachable)
    }

    pub fn reason(&self) -> Option<&UnreachableReason> {
        match self {
            ProbeOutcome::Reachable => None,
            ProbeOutcome::Unreachable(reason) => Some(reason),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reachability {
    #[serde(rename = "OK")]
    Ok,
    Broken,
}

impl From<&ProbeOutcome> for Reachability {
    fn from(outcome: &ProbeOutcome) -> Self {
        if outcome.is_reachable() {
            Reachability::Ok
        } else {
            Reachability::Broken
        }
    }
}

impl fmt::Display for Reachability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reachability::Ok => write!(f, "OK"),
            Reachability::Broken => write!(f, "Broken"),
        }
    }
}

/// Display label for a link: reachability plus the UTM annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusLabel {
    pub reachability: Reachability,
    pub missing_utm: bool,
}

impl StatusLabel {
    pub fn new(reachability: Reachability, missing_utm: bool) -> Self {
        Self {
            reachability,
            missing_utm,
        }
    }

    pub fn is_broken(&self) -> bool {
        self.reachability == Reachability::Broken
    }
}

impl fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reachability)?;
        if self.missing_utm {
            write!(f, " (Missing UTM)")?;
        }
        Ok(())
    }
}

/// One row of the links table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    /// The href exactly as it appears in the email.
    pub link: String,
    /// What was actually probed after safelink unwrapping.
    pub normalized: String,
    pub status: StatusLabel,
    pub probe: ProbeOutcome,
}

impl LinkRecord {
    pub fn new(link: String, normalized: String, probe: ProbeOutcome, missing_utm: bool) -> Self {
        let status = StatusLabel::new(Reachability::from(&probe), missing_utm);
        Self {
            link,
            normalized,
            status,
            probe,
        }
    }

    pub fn was_unwrapped(&self) -> bool {
        self.link != self.normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_label_display() {
        assert_eq!(StatusLabel::new(Reachability::Ok, false).to_string(), "OK");
        assert_eq!(
            StatusLabel::new(Reachability::Ok, true).to_string(),
            "OK (Missing UTM)"
        );
        assert_eq!(
            StatusLabel::new(Reachability::Broken, false).to_string(),
            "Broken"
        );
        assert_eq!(
            StatusLabel::new(Reachability::Broken, true).to_string(),
            "Broken (Missing UTM)"
        );
    }

    #[test]
    fn test_record_collapses_reason_to_broken() {
        let record = LinkRecord::new(
            "https://example.com".to_string(),
            "https://example.com".to_string(),
            ProbeOutcome::Unreachable(UnreachableReason::Status(503)),
            false,
        );
        assert!(record.status.is_broken());
        assert_eq!(
            record.probe.reason(),
            Some(&UnreachableReason::Status(503))
        );
        assert!(!record.was_unwrapped());
    }
}
