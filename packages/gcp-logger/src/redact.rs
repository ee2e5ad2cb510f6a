//! PII scrubbing applied to messages and string fields when a logger is
//! configured with `redact_pii`.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

const TOKEN_PLACEHOLDER: &str = "[REDACTED_TOKEN]";

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"\b([A-Za-z0-9._%+-])[A-Za-z0-9._%+-]*(@[A-Za-z0-9.-]+\.[A-Za-z]+)\b").unwrap()
});

// Base64-ish and hex runs of 16+ characters. Hex is a subset of the first
// class, so one pattern covers both.
static OPAQUE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"\b[A-Za-z0-9+/]{16,}\b={0,2}").unwrap()
});

/// Mask email local parts and long opaque tokens.
///
/// Emails keep their first character and full domain (`u***@example.com`).
/// Emails are handled before tokens so a long local part is not swallowed
/// as a token first. Runs without a digit (paths, identifiers, prose) are
/// not tokens.
pub fn redact(input: &str) -> Cow<'_, str> {
    let emails = EMAIL.replace_all(input, |caps: &Captures| format!("{}***{}", &caps[1], &caps[2]));
    match emails {
        Cow::Borrowed(s) => OPAQUE_TOKEN.replace_all(s, mask_token),
        Cow::Owned(s) => Cow::Owned(OPAQUE_TOKEN.replace_all(&s, mask_token).into_owned()),
    }
}

fn mask_token(caps: &Captures) -> String {
    let run = &caps[0];
    if run.bytes().any(|b| b.is_ascii_digit()) {
        TOKEN_PLACEHOLDER.to_string()
    } else {
        run.to_string()
    }
}
