//! Shapes of the AJAX responses the catalog endpoints return.
//!
//! Every response is wrapped as `{"error": bool, "message": str, "body": ...}`.
//! On failure pixiv sends `"body": []`, so the envelope is inspected before
//! the body is decoded into one of the listing shapes below.

use serde::Deserialize;
use serde_json::Value;

use crate::error::CatalogError;
use crate::types::Illustration;

/// `GET /ajax/top/illust` body
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct TopBody {
    pub(crate) thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Thumbnails {
    pub(crate) illust: Vec<Illustration>,
}

/// `GET /ajax/search/artworks/{word}` body
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct SearchBody {
    #[serde(rename = "illustManga")]
    pub(crate) illust_manga: SearchSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct SearchSection {
    pub(crate) data: Vec<Illustration>,
    pub(crate) total: u64,
}

/// Validate the envelope and hand back its body
pub(crate) fn unwrap_envelope(content: &str) -> Result<Value, CatalogError> {
    let envelope: Value =
        serde_json::from_str(content).map_err(|e| CatalogError::Decode(e.to_string()))?;

    if envelope.get("error").and_then(Value::as_bool) == Some(true) {
        let message = envelope
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .unwrap_or("unknown error")
            .to_string();
        return Err(CatalogError::Api { message });
    }

    match envelope.get("body") {
        Some(body) if body.is_object() => Ok(body.clone()),
        Some(other) => Err(CatalogError::Decode(format!(
            "expected an object body, found {}",
            json_kind(other)
        ))),
        None => Err(CatalogError::Decode("response has no body".to_string())),
    }
}

/// Decode the top listing into its illustrations
pub(crate) fn decode_top(content: &str) -> Result<Vec<Illustration>, CatalogError> {
    let body: TopBody = serde_json::from_value(unwrap_envelope(content)?)
        .map_err(|e| CatalogError::Decode(e.to_string()))?;
    Ok(body.thumbnails.illust)
}

/// Decode a keyword search into its illustrations
pub(crate) fn decode_search(content: &str) -> Result<Vec<Illustration>, CatalogError> {
    let body: SearchBody = serde_json::from_value(unwrap_envelope(content)?)
        .map_err(|e| CatalogError::Decode(e.to_string()))?;
    tracing::debug!(
        total = body.illust_manga.total,
        page = body.illust_manga.data.len(),
        "Decoded search listing"
    );
    Ok(body.illust_manga.data)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
