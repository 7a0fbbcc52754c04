//! Slug generation with per-scope uniqueness.
//!
//! Titles are transliterated to ASCII (NFKD, combining marks dropped),
//! lowercased and reduced to `[a-z0-9-]`. Uniqueness is resolved by appending
//! `-1`, `-2`, ... while trimming the base so the result never exceeds the
//! maximum length.

use unicode_normalization::UnicodeNormalization;

/// Separator between words and before the uniqueness counter.
pub const SEPARATOR: char = '-';

/// Generate a URL-safe slug of at most `max_len` characters.
///
/// Returns an empty string when nothing alphanumeric survives.
pub fn slugify(title: &str, max_len: usize) -> String {
    let ascii: String = title
        .nfkd()
        .filter(char::is_ascii)
        .collect::<String>()
        .to_lowercase();

    let mut slug = String::with_capacity(ascii.len());
    let mut pending_separator = false;
    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push(SEPARATOR);
            }
            pending_separator = false;
            slug.push(c);
        } else if c != '\'' && c != '"' {
            // Quotes vanish so "l'hiver" reads as one word.
            pending_separator = true;
        }
    }

    if slug.len() > max_len {
        slug.truncate(max_len);
    }
    slug.trim_end_matches(SEPARATOR).to_string()
}

/// Make `slug` unique according to `is_taken`.
///
/// The first candidate is `slug` itself, then `slug-1`, `slug-2`, ...
/// The base is shortened whenever base + separator + counter would exceed
/// `max_len`.
pub fn unique_slug(slug: &str, max_len: usize, mut is_taken: impl FnMut(&str) -> bool) -> String {
    let mut base = slug.to_string();
    let mut candidate = base.clone();
    let mut counter: u64 = 1;
    while is_taken(&candidate) {
        let suffix = format!("{SEPARATOR}{counter}");
        if base.len() + suffix.len() > max_len {
            base.truncate(max_len.saturating_sub(suffix.len()));
        }
        candidate = format!("{base}{suffix}");
        counter += 1;
    }
    candidate
}

/// Slug for a thread title, falling back to `fallback` when the title has no
/// sluggable characters.
pub fn thread_slug(
    title: &str,
    fallback: &str,
    max_len: usize,
    mut is_taken: impl FnMut(&str) -> bool,
) -> String {
    let mut base = slugify(title, max_len);
    if base.is_empty() {
        base = slugify(fallback, max_len);
    }
    unique_slug(&base, max_len, &mut is_taken)
}
