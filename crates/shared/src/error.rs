use serde::Deserialize;
use serde_json::Value;

/// Error payload shapes the photo backend is known to send.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiErrorBody {
    /// Best-effort one-line summary of an error response body.
    ///
    /// Understands `{"detail": ".."}`, `{"message": ".."}` and field
    /// validation maps like `{"image": ["No file was submitted."]}`.
    pub fn summarize(raw: &str) -> Option<String> {
        let value: Value = serde_json::from_str(raw.trim()).ok()?;

        if let Ok(body) = serde_json::from_value::<ApiErrorBody>(value.clone()) {
            if let Some(text) = body.detail.or(body.message) {
                let text = text.trim();
                if !text.is_empty() {
                    return Some(text.to_string());
                }
            }
        }

        let Value::Object(fields) = value else {
            return None;
        };
        let parts: Vec<String> = fields
            .iter()
            .filter_map(|(field, messages)| {
                let joined = match messages {
                    Value::String(s) => s.clone(),
                    Value::Array(items) => items
                        .iter()
                        .filter_map(Value::as_str)
                        .collect::<Vec<_>>()
                        .join(" "),
                    _ => return None,
                };
                (!joined.is_empty()).then(|| format!("{field}: {joined}"))
            })
            .collect();

        (!parts.is_empty()).then(|| parts.join("; "))
    }
}
