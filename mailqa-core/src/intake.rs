// Email file intake: turns uploaded bytes into a body and a subject

use crate::error::IntakeError;
use cfb::CompoundFile;
use mail_parser::MessageParser;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    Html,
    Eml,
    Msg,
}

impl ContainerKind {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "html" | "htm" => Some(ContainerKind::Html),
            "eml" => Some(ContainerKind::Eml),
            "msg" => Some(ContainerKind::Msg),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, IntakeError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        Self::from_extension(ext).ok_or_else(|| IntakeError::UnknownExtension(ext.to_string()))
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerKind::Html => write!(f, ".html"),
            ContainerKind::Eml => write!(f, ".eml"),
            ContainerKind::Msg => write!(f, ".msg"),
        }
    }
}

/// What the rest of the pass works on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailContent {
    /// HTML markup, or plain text when the email has no HTML part.
    pub body: String,
    pub subject: Option<String>,
    pub kind: ContainerKind,
}

/// Read and decode an email file, picking the decoder by extension.
pub fn load_email(path: &Path) -> Result<EmailContent, IntakeError> {
    let kind = ContainerKind::from_path(path)?;
    let bytes = fs::read(path).map_err(|source| IntakeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Loaded {} ({} bytes, {})", path.display(), bytes.len(), kind);
    decode_email(kind, &bytes)
}

pub fn decode_email(kind: ContainerKind, bytes: &[u8]) -> Result<EmailContent, IntakeError> {
    let content = match kind {
        ContainerKind::Html => decode_html(bytes),
        ContainerKind::Eml => decode_eml(bytes)?,
        ContainerKind::Msg => decode_msg(bytes)?,
    };

    if content.body.trim().is_empty() {
        return Err(IntakeError::EmptyContent);
    }
    Ok(content)
}

fn decode_html(bytes: &[u8]) -> EmailContent {
    let body = String::from_utf8_lossy(bytes);
    EmailContent {
        body: body.trim_start_matches('\u{feff}').to_string(),
        subject: None,
        kind: ContainerKind::Html,
    }
}

fn decode_eml(bytes: &[u8]) -> Result<EmailContent, IntakeError> {
    let message = MessageParser::default()
        .parse(bytes)
        .ok_or_else(|| IntakeError::Malformed("no RFC 5322 message found".to_string()))?;

    let subject = message
        .subject()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    // body_html() would wrap plain text in markup; only take a real HTML part
    let html = message
        .html_part(0)
        .filter(|part| part.is_text_html())
        .and_then(|part| part.text_contents())
        .filter(|b| !b.trim().is_empty());
    let text = message.text_part(0).and_then(|part| part.text_contents());

    let body = html.or(text).unwrap_or_default().to_string();

    debug!(
        "Decoded .eml: subject={:?}, body {} chars",
        subject,
        body.len()
    );

    Ok(EmailContent {
        body,
        subject,
        kind: ContainerKind::Eml,
    })
}

/// MAPI property tags read from an Outlook message.
const PR_SUBJECT: &str = "0037";
const PR_BODY: &str = "1000";
const PR_HTML: &str = "1013";

/// Property stream suffixes, most preferred first.
const PT_UNICODE: &str = "001F";
const PT_STRING8: &str = "001E";
const PT_BINARY: &str = "0102";

fn decode_msg(bytes: &[u8]) -> Result<EmailContent, IntakeError> {
    let mut file = CompoundFile::open(Cursor::new(bytes))
        .map_err(|e| IntakeError::Malformed(format!("not an Outlook .msg file: {}", e)))?;

    let subject = read_property(&mut file, PR_SUBJECT)?
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    // Plain body first, then the HTML body
    let body = match read_property(&mut file, PR_BODY)?.filter(|b| !b.trim().is_empty()) {
        Some(body) => body,
        None => read_property(&mut file, PR_HTML)?.unwrap_or_default(),
    };

    debug!(
        "Decoded .msg: subject={:?}, body {} chars",
        subject,
        body.len()
    );

    Ok(EmailContent {
        body,
        subject,
        kind: ContainerKind::Msg,
    })
}

/// Read a top-level `__substg1.0_<tag><type>` stream as text, if present.
fn read_property<F: Read + Seek>(
    file: &mut CompoundFile<F>,
    tag: &str,
) -> Result<Option<String>, IntakeError> {
    for kind in [PT_UNICODE, PT_STRING8, PT_BINARY] {
        let path = format!("/__substg1.0_{}{}", tag, kind);
        if !file.is_stream(&path) {
            continue;
        }

        let mut raw = Vec::new();
        file.open_stream(&path)
            .and_then(|mut stream| stream.read_to_end(&mut raw))
            .map_err(|e| IntakeError::Malformed(format!("unreadable stream {}: {}", path, e)))?;

        let text = if kind == PT_UNICODE {
            let units: Vec<u16> = raw
                .chunks_exact(2)
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        } else {
            String::from_utf8_lossy(&raw).into_owned()
        };
        return Ok(Some(text.trim_end_matches('\0').to_string()));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_kind_from_path() {
        assert_eq!(
            ContainerKind::from_path(&PathBuf::from("promo.HTML")).unwrap(),
            ContainerKind::Html
        );
        assert_eq!(
            ContainerKind::from_path(&PathBuf::from("promo.eml")).unwrap(),
            ContainerKind::Eml
        );
        assert_eq!(
            ContainerKind::from_path(&PathBuf::from("promo.msg")).unwrap(),
            ContainerKind::Msg
        );
        assert!(matches!(
            ContainerKind::from_path(&PathBuf::from("promo.pdf")),
            Err(IntakeError::UnknownExtension(ext)) if ext == "pdf"
        ));
        assert!(ContainerKind::from_path(&PathBuf::from("promo")).is_err());
    }

    #[test]
    fn test_html_is_lossy_and_has_no_subject() {
        let bytes = b"\xef\xbb\xbf<p>Hi \xff there</p>";
        let content = decode_email(ContainerKind::Html, bytes).unwrap();
        assert!(content.body.starts_with("<p>Hi "));
        assert!(content.body.contains('\u{fffd}'));
        assert_eq!(content.subject, None);
    }

    #[test]
    fn test_empty_html_is_rejected() {
        assert!(matches!(
            decode_email(ContainerKind::Html, b"   \n"),
            Err(IntakeError::EmptyContent)
        ));
    }

    #[test]
    fn test_truncated_msg_is_malformed() {
        assert!(matches!(
            decode_email(ContainerKind::Msg, b"\xd0\xcf\x11\xe0\xa1\xb1\x1a\xe1"),
            Err(IntakeError::Malformed(_))
        ));
    }
}
