pub mod classify;
pub mod error;
pub mod extract;
pub mod probe;
pub mod result;
pub mod safelink;
pub mod tokens;

pub use classify::{LinkClassifier, LinkProgressCallback, UtmSubject};
pub use error::ScanError;
pub use extract::{EmailDocument, extract_links, extract_text};
pub use probe::{HttpProbe, LivenessProbe};
pub use result::{LinkRecord, ProbeOutcome, Reachability, StatusLabel, UnreachableReason};
pub use safelink::normalize;
pub use tokens::{extract_tokens, unique_tokens};
