//! Error-message extraction from heterogeneous API error payloads.
//!
//! The backend answers failures with one of several shapes: a structured
//! envelope carrying per-field validation errors, the same envelope with
//! only a message, a bare `{"detail": ..}` object, or arbitrary text.
//! Decoders run in strict priority order; a shape that fails to parse or
//! yields no content simply doesn't apply.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    meta: ErrorMeta,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorMeta {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<FieldError>,
}

#[derive(Debug, Deserialize)]
struct FieldError {
    #[serde(default)]
    error: String,
    #[serde(default)]
    field: String,
}

type ShapeDecoder = fn(&[u8]) -> Option<String>;

/// Tried in order; first decoder producing a message wins.
const DECODERS: &[ShapeDecoder] = &[field_errors, meta_message, detail];

/// Produce a human-readable message for a non-2xx response body.
pub(crate) fn decode_error_message(status: u16, body: &[u8]) -> String {
    for decoder in DECODERS {
        if let Some(message) = decoder(body) {
            return message;
        }
    }
    format!(
        "request failed (status {status}): {}",
        String::from_utf8_lossy(body)
    )
}

/// Structured validation errors: `"{field}: {error}"` per entry, global
/// entries (empty field) as `"{error}"`, newline-joined.
fn field_errors(body: &[u8]) -> Option<String> {
    let envelope: ErrorEnvelope = serde_json::from_slice(body).ok()?;
    if envelope.meta.errors.is_empty() {
        return None;
    }

    let lines: Vec<String> = envelope
        .meta
        .errors
        .iter()
        .map(|entry| {
            if entry.field.is_empty() {
                entry.error.clone()
            } else {
                format!("{}: {}", entry.field, entry.error)
            }
        })
        .collect();
    Some(lines.join("\n"))
}

fn meta_message(body: &[u8]) -> Option<String> {
    let envelope: ErrorEnvelope = serde_json::from_slice(body).ok()?;
    Some(envelope.meta.message).filter(|message| !message.is_empty())
}

fn detail(body: &[u8]) -> Option<String> {
    #[derive(Deserialize)]
    struct DetailBody {
        detail: String,
    }

    let parsed: DetailBody = serde_json::from_slice(body).ok()?;
    Some(parsed.detail).filter(|detail| !detail.is_empty())
}
