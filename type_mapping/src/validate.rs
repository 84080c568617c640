//! Validation and sanitization of incoming text
//!
//! Email syntax checks and the text scrubbing applied to user-supplied
//! column values before they reach a store.

use regex::Regex;
use std::sync::LazyLock;

const MIN_EMAIL_LENGTH: usize = 6;

static LOCAL_PART: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9!#$%&'*+/=?^_`{|}~.-]+$").expect("valid regex"));

static LOCAL_PART_INVALID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9!#$%&'*+/=?^_`{|}~.-]").expect("valid regex"));

static DOMAIN_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9-]+$").expect("valid regex"));

static DOMAIN_LABEL_INVALID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9-]").expect("valid regex"));

static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

static PERCENT_OCTET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%[a-fA-F0-9]{2}").expect("valid regex"));

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\r\n\t ]+").expect("valid regex"));

static NUMERIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").expect("valid regex")
});

/// Check whether a string is a syntactically valid email address
pub fn is_email(email: &str) -> bool {
    if email.len() < MIN_EMAIL_LENGTH {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || !LOCAL_PART.is_match(local) {
        return false;
    }

    if domain.contains("..") || domain.trim_matches(|c: char| c == '.' || c.is_whitespace()) != domain {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }

    labels.iter().all(|label| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && DOMAIN_LABEL.is_match(label)
    })
}

/// Strip characters that can never appear in an email address.
///
/// Returns an empty string when nothing usable is left.
pub fn sanitize_email(email: &str) -> String {
    let email = email.trim();
    if email.len() < MIN_EMAIL_LENGTH {
        return String::new();
    }

    let Some((local, domain)) = email.split_once('@') else {
        return String::new();
    };

    let local = LOCAL_PART_INVALID.replace_all(local, "");
    if local.is_empty() {
        return String::new();
    }

    let domain = domain.trim_matches(|c: char| c == '.' || c.is_whitespace());
    let labels: Vec<String> = domain
        .split('.')
        .map(|label| {
            DOMAIN_LABEL_INVALID
                .replace_all(label.trim_matches('-'), "")
                .into_owned()
        })
        .filter(|label| !label.is_empty())
        .collect();

    if labels.len() < 2 {
        return String::new();
    }

    format!("{}@{}", local, labels.join("."))
}

/// Scrub free text: drop markup and percent-encoded octets, collapse whitespace, trim
pub fn sanitize_text_field(text: &str) -> String {
    let without_tags = HTML_TAG.replace_all(text, "");
    let without_octets = PERCENT_OCTET.replace_all(&without_tags, "");
    WHITESPACE_RUN
        .replace_all(&without_octets, " ")
        .trim()
        .to_string()
}

/// Check whether a string reads as a number
pub fn is_numeric(value: &str) -> bool {
    NUMERIC.is_match(value)
}
