//! Text normalisation for legacy usernames, titles and message bodies.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<!--(?s:.)*?-->|</?[A-Za-z][^<>]*>").expect("valid regex")
});

static SIZE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[size=(\d)\]").expect("valid regex"));

/// Keep at most `max` characters (not bytes).
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Decode named and numeric HTML entities.
pub fn unescape_html(s: &str) -> String {
    html_escape::decode_html_entities(s).into_owned()
}

/// Remove HTML tags and comments, leaving their text content.
///
/// Runs until no tag remains so that fragments like `<<b>i>` cannot
/// reassemble into a tag after one pass.
pub fn strip_tags(s: &str) -> String {
    let mut current = s.to_string();
    loop {
        let next = TAG_RE.replace_all(&current, "").into_owned();
        if next == current {
            return next;
        }
        current = next;
    }
}

/// Shift legacy single-digit `[size=N]` markup by `shift`.
pub fn shift_size_markup(s: &str, shift: u32) -> String {
    SIZE_RE
        .replace_all(s, |caps: &Captures| {
            let size: u32 = caps[1].parse().unwrap_or(0);
            format!("[size={}]", size + shift)
        })
        .into_owned()
}

/// Clean a legacy post or private message body into plain bbcode text:
/// entities decoded, tags stripped, size markup rescaled.
pub fn clean_content(raw: &str, size_shift: u32) -> String {
    let plain = strip_tags(&unescape_html(raw));
    shift_size_markup(&plain, size_shift)
}

/// Normalise a legacy login into a forum username.
///
/// Spaces become underscores, entities are decoded and the result is cut to
/// `max_len` characters. The same input always yields the same output.
pub fn convert_username(login: &str, max_len: usize) -> String {
    truncate_chars(&unescape_html(&login.replace(' ', "_")), max_len)
}

/// Decode and cut a legacy thread subject.
pub fn convert_title(subject: &str, max_len: usize) -> String {
    truncate_chars(&unescape_html(subject), max_len)
}
