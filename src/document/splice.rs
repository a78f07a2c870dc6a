//! Joining modifier contributions onto a serialized base document.
//!
//! Two strategies, selected by [`SpliceStrategy`](crate::config::SpliceStrategy):
//!
//! - [`splice`] leaves the base object open (everything before its closing
//!   brace) and appends the body of every contributed fragment. The base is
//!   never parsed. Keys a fragment repeats are written twice.
//! - [`structured_merge`] parses the base into a map, inserts contributed keys
//!   (later wins) and serializes once.
//!
//! Both copy the base through untouched when nothing was contributed.

use serde_json::Value as JsonValue;

use crate::config::Formatting;
use crate::modifier::Fragment;
use crate::{Error, Result};

// ============================================================================
// Byte splice
// ============================================================================

/// Append `fragments` to the JSON object in `base`, writing into `out`.
///
/// Empty fragments contribute nothing. The closing brace of `base` is found
/// by scanning backward past trailing whitespace, so a serializer that ends
/// its output with a newline is handled as well.
pub fn splice(base: &[u8], fragments: &[Fragment], formatting: Formatting, out: &mut Vec<u8>) -> Result<()> {
    let bodies = fragment_bodies(fragments, formatting)?;
    if bodies.is_empty() {
        out.extend_from_slice(base);
        return Ok(());
    }

    let open = open_object(base)?;
    let mut first = object_body(base)?.is_empty();
    let (separator, close): (&[u8], &[u8]) = match formatting {
        Formatting::Compact => (b",", b"}"),
        Formatting::Indented => (b",\n  ", b"\n}"),
    };

    out.reserve(base.len() + bodies.iter().map(|b| b.len() + separator.len()).sum::<usize>());
    out.extend_from_slice(open);
    for body in &bodies {
        if first {
            // No comma before the first field of an empty base object.
            out.extend_from_slice(&separator[1..]);
            first = false;
        } else {
            out.extend_from_slice(separator);
        }
        out.extend_from_slice(body);
    }
    out.extend_from_slice(close);
    Ok(())
}

/// Serialized bodies (the bytes between the braces) of the non-empty fragments.
fn fragment_bodies(fragments: &[Fragment], formatting: Formatting) -> Result<Vec<Vec<u8>>> {
    fragments
        .iter()
        .filter(|fragment| !fragment.is_empty())
        .map(|fragment| {
            let bytes = match formatting {
                Formatting::Compact => serde_json::to_vec(fragment)?,
                Formatting::Indented => serde_json::to_vec_pretty(fragment)?,
            };
            Ok(object_body(&bytes)?.to_vec())
        })
        .collect()
}

/// The base object without its closing brace and any whitespace before it.
fn open_object(bytes: &[u8]) -> Result<&[u8]> {
    let (_, close) = braces(bytes)?;
    Ok(bytes[..close].trim_ascii_end())
}

/// The bytes strictly between the outer braces, whitespace-trimmed.
fn object_body(bytes: &[u8]) -> Result<&[u8]> {
    let (open, close) = braces(bytes)?;
    Ok(bytes[open + 1..close].trim_ascii())
}

/// Positions of the outer opening and closing braces.
fn braces(bytes: &[u8]) -> Result<(usize, usize)> {
    let open = bytes.iter().position(|b| !b.is_ascii_whitespace());
    let close = bytes.iter().rposition(|b| !b.is_ascii_whitespace());
    match (open, close) {
        (Some(open), Some(close)) if open < close && bytes[open] == b'{' && bytes[close] == b'}' => {
            Ok((open, close))
        }
        _ => Err(Error::MalformedDocument(format!(
            "expected a JSON object, got {} bytes starting {:?}",
            bytes.len(),
            String::from_utf8_lossy(&bytes[..bytes.len().min(16)])
        ))),
    }
}

// ============================================================================
// Structured merge
// ============================================================================

/// Parse `base` as an object, merge `fragments` in order (later keys win),
/// and serialize the result into `out`.
pub fn structured_merge(
    base: &[u8],
    fragments: &[Fragment],
    formatting: Formatting,
    out: &mut Vec<u8>,
) -> Result<()> {
    if fragments.iter().all(Fragment::is_empty) {
        out.extend_from_slice(base);
        return Ok(());
    }

    let mut document = match serde_json::from_slice::<JsonValue>(base)? {
        JsonValue::Object(map) => map,
        other => {
            return Err(Error::MalformedDocument(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            )));
        }
    };
    for fragment in fragments {
        for (key, value) in fragment {
            document.insert(key.clone(), value.clone());
        }
    }

    match formatting {
        Formatting::Compact => serde_json::to_writer(&mut *out, &document)?,
        Formatting::Indented => serde_json::to_writer_pretty(&mut *out, &document)?,
    }
    Ok(())
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

// ============================================================================
// Tests
// ============================================================================
