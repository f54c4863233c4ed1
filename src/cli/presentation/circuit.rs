//! Circuit status presentation.

use crate::error::ApiError;
use crate::generation::CircuitState;
use chrono::{DateTime, Utc};
use serde_json::json;

pub fn format_circuit_status_text(state: Option<&CircuitState>, now: DateTime<Utc>) -> String {
    match state {
        None => "Circuit: clear (upstream calls allowed)".to_string(),
        Some(state) => format!(
            "Circuit: tripped (upstream calls suppressed)\n  Tripped at: {}\n  TTL: {}s\n  Clears in: {}s",
            state.tripped_at.to_rfc3339(),
            state.ttl.as_secs(),
            state.remaining(now).as_secs()
        ),
    }
}

pub fn format_circuit_status_json(
    state: Option<&CircuitState>,
    now: DateTime<Utc>,
) -> Result<String, ApiError> {
    let out = match state {
        None => json!({ "tripped": false }),
        Some(state) => json!({
            "tripped": true,
            "trippedAt": state.tripped_at.to_rfc3339(),
            "ttl": state.ttl.as_secs(),
            "remaining": state.remaining(now).as_secs(),
        }),
    };
    Ok(serde_json::to_string_pretty(&out)?)
}
