//! Repair of phpMyAdmin JSON exports.
//!
//! The legacy dumps are "almost JSON": a comment banner precedes the array,
//! single quotes are backslash-escaped, some `msg`/`usercitation` values are
//! left unquoted and string values may carry raw control characters. The
//! functions here turn such text into something `serde_json` accepts.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::CoreError;

/// Literal separating two records in the exported array.
pub const RECORD_BOUNDARY: &str = "}, {";

/// Fields whose values are sometimes exported without quotes.
pub const UNQUOTED_FIELDS: &[&str] = &["msg", "usercitation"];

static UNQUOTED_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    UNQUOTED_FIELDS
        .iter()
        .map(|field| Regex::new(&format!(r#"("{field}": )([^"]*),"#)).expect("valid regex"))
        .collect()
});

static STRING_VALUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#": "((?s:.)*?)","#).expect("valid regex"));

/// Drop every line before the first one that opens the array.
fn strip_preamble(raw: &str) -> Result<&str, CoreError> {
    let mut offset = 0;
    for line in raw.split_inclusive('\n') {
        if line.starts_with('[') {
            return Ok(&raw[offset..]);
        }
        offset += line.len();
    }
    Err(CoreError::MalformedExport(
        "no line starts with '[' (expected a JSON array)".into(),
    ))
}

/// Wrap unquoted `msg` / `usercitation` values in double quotes. A bare
/// `null` stays a JSON null.
fn quote_bare_values(text: &str) -> String {
    let mut out = text.to_string();
    for re in UNQUOTED_RES.iter() {
        out = re
            .replace_all(&out, |caps: &Captures| {
                if caps[2].trim() == "null" {
                    caps[0].to_string()
                } else {
                    format!("{}\"{}\",", &caps[1], &caps[2])
                }
            })
            .into_owned();
    }
    out
}

/// Re-encode every colon-prefixed string value of one record chunk through a
/// JSON string encoder so raw newlines and control characters get escaped.
fn reencode_string_values(chunk: &str) -> String {
    STRING_VALUE_RE
        .replace_all(chunk, |caps: &Captures| {
            let encoded = serde_json::Value::from(&caps[1]).to_string();
            format!(": {encoded},")
        })
        .into_owned()
}

/// Turn a raw legacy export into parseable JSON text.
///
/// Fails with [`CoreError::MalformedExport`] when the input never opens a
/// JSON array; any remaining damage surfaces later as a parse error.
pub fn repair_export(raw: &str) -> Result<String, CoreError> {
    let body = strip_preamble(raw)?;
    // `\'` is not a legal JSON escape.
    let body = body.replace("\\'", "'");
    let body = quote_bare_values(&body);

    let chunks: Vec<String> = body
        .split(RECORD_BOUNDARY)
        .map(reencode_string_values)
        .collect();
    Ok(chunks.join(RECORD_BOUNDARY))
}
