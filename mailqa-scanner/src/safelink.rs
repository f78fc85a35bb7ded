// Outlook SafeLinks unwrapping

use std::borrow::Cow;
use tracing::debug;
use url::Url;

/// Host fragment every SafeLinks redirect carries.
pub const SAFELINK_MARKER: &str = "safelinks.protection.outlook.com";

/// Query parameter holding the wrapped destination.
pub const DESTINATION_PARAM: &str = "url";

/// Upper bound on percent-decoding passes over the destination.
pub const MAX_DECODE_PASSES: usize = 3;

const DEFAULT_SCHEME: &str = "http://";

/// Whether `link` looks like a SafeLinks redirect.
pub fn is_safelink(link: &str) -> bool {
    !link.is_empty() && link.contains(SAFELINK_MARKER)
}

/// Recover the destination behind an Outlook SafeLinks URL.
///
/// Anything that is not a SafeLinks URL is returned unchanged. When the
/// wrapper cannot be parsed, or carries no destination, the input is also
/// returned unchanged: this function never fails, it only improves the link
/// when it can.
pub fn normalize(link: &str) -> String {
    if !is_safelink(link) {
        return link.to_string();
    }

    let parsed = match Url::parse(link) {
        Ok(parsed) => parsed,
        Err(e) => {
            debug!("Leaving unparseable safelink as-is ({}): {}", e, link);
            return link.to_string();
        }
    };

    // query_pairs already strips one layer of encoding
    let destination = parsed
        .query_pairs()
        .find(|(key, _)| key == DESTINATION_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty());

    let Some(destination) = destination else {
        debug!("Safelink without a '{}' parameter: {}", DESTINATION_PARAM, link);
        return link.to_string();
    };

    let decoded = decode_layers(destination, MAX_DECODE_PASSES);
    let unwrapped = with_default_scheme(decoded);
    debug!("Unwrapped safelink {} -> {}", link, unwrapped);
    unwrapped
}

/// Percent-decode `value` up to `passes` times, stopping once a pass is a no-op.
/// A pass that yields invalid UTF-8 ends decoding and keeps the last good value.
fn decode_layers(mut value: String, passes: usize) -> String {
    for _ in 0..passes {
        match urlencoding::decode(&value) {
            Ok(Cow::Borrowed(_)) => break,
            Ok(Cow::Owned(next)) => {
                if next == value {
                    break;
                }
                value = next;
            }
            Err(_) => break,
        }
    }
    value
}

fn has_http_scheme(url: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        url.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

fn with_default_scheme(url: String) -> String {
    if has_http_scheme(&url) {
        url
    } else {
        format!("{}{}", DEFAULT_SCHEME, url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(encoded_destination: &str) -> String {
        format!(
            "https://nam02.safelinks.protection.outlook.com/?url={}&data=05%7C01%7C&reserved=0",
            encoded_destination
        )
    }

    #[test]
    fn test_passthrough_plain_url() {
        let link = "https://example.com/offer?utm_source=mail";
        assert_eq!(normalize(link), link);
    }

    #[test]
    fn test_passthrough_empty_and_relative() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("/relative/path"), "/relative/path");
        assert_eq!(normalize("mailto:team@example.com"), "mailto:team@example.com");
    }

    #[test]
    fn test_single_encoded_destination() {
        let link = wrap("https%3A%2F%2Fexample.com%2Fa%3Fb%3D1");
        assert_eq!(normalize(&link), "https://example.com/a?b=1");
    }

    #[test]
    fn test_double_encoded_destination() {
        let link = wrap("https%253A%252F%252Fexample.com%252Fa%253Fb%253D1");
        assert_eq!(normalize(&link), "https://example.com/a?b=1");
    }

    #[test]
    fn test_decoding_is_bounded() {
        // Four layers: query parsing removes one, three decode passes remove the rest.
        let link = wrap("https%2525253A%2525252F%2525252Fexample.com");
        assert_eq!(normalize(&link), "https://example.com");

        // Five layers leave one behind, which then gets the default scheme.
        let link = wrap("https%252525253A%252525252F%252525252Fexample.com");
        assert!(normalize(&link).starts_with("http://https%3A"));
    }

    #[test]
    fn test_missing_scheme_gets_default() {
        let link = wrap("example.com%2Flanding");
        assert_eq!(normalize(&link), "http://example.com/landing");
    }

    #[test]
    fn test_uppercase_scheme_is_kept() {
        let link = wrap("HTTPS%3A%2F%2Fexample.com%2Fa");
        assert_eq!(normalize(&link), "HTTPS://example.com/a");

        let link = wrap("Http%3A%2F%2Fexample.com%2Fb");
        assert_eq!(normalize(&link), "Http://example.com/b");
    }

    #[test]
    fn test_missing_destination_param() {
        let link = "https://eur01.safelinks.protection.outlook.com/?data=05%7C01";
        assert_eq!(normalize(link), link);
    }

    #[test]
    fn test_empty_destination_param() {
        let link = "https://eur01.safelinks.protection.outlook.com/?url=&data=05";
        assert_eq!(normalize(link), link);
    }

    #[test]
    fn test_unparseable_safelink_fails_open() {
        let link = "nam02.safelinks.protection.outlook.com/?url=https%3A%2F%2Fexample.com";
        assert_eq!(normalize(link), link);
    }

    #[test]
    fn test_is_safelink() {
        assert!(is_safelink(&wrap("https%3A%2F%2Fexample.com")));
        assert!(!is_safelink("https://example.com"));
        assert!(!is_safelink(""));
    }
}
