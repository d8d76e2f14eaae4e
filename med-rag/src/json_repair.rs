//! Tolerant JSON decoding of model replies with bounded retry.

use std::future::Future;

use ai_llm_service::AiLlmError;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::errors::MedRagError;

/// Slice from the first `{` to the last `}` inclusive.
///
/// Models tend to wrap JSON in prose or code fences; this strips both.
///
/// ```
/// assert_eq!(med_rag::extract_json_object("Sure! {\"a\": 1} Hope it helps."), Some("{\"a\": 1}"));
/// assert_eq!(med_rag::extract_json_object("} no {"), None);
/// ```
pub fn extract_json_object(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let end = s.rfind('}')?;
    (start < end).then(|| &s[start..=end])
}

/// Decodes the object embedded in `reply`. Without braces the whole reply is
/// handed to the decoder, which then reports the error.
pub fn parse_json_reply<T: DeserializeOwned>(reply: &str) -> Result<T, MedRagError> {
    let slice = extract_json_object(reply).unwrap_or(reply);
    Ok(serde_json::from_str(slice)?)
}

/// Calls `produce` until its reply decodes into `T`, at most `max_attempts` times.
///
/// LLM failures and decode failures both count as an attempt.
///
/// # Errors
/// [`MedRagError::MaxAttemptsReached`] carrying the last failure.
pub async fn retry_json<T, F, Fut>(
    what: &'static str,
    max_attempts: u32,
    mut produce: F,
) -> Result<T, MedRagError>
where
    T: DeserializeOwned,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, AiLlmError>>,
{
    let attempts = max_attempts.max(1);
    let mut last_error = String::new();

    for attempt in 1..=attempts {
        match produce().await {
            Ok(reply) => match parse_json_reply::<T>(&reply) {
                Ok(v) => {
                    debug!(what, attempt, "json reply decoded");
                    return Ok(v);
                }
                Err(e) => {
                    warn!(what, attempt, error = %e, "error parsing JSON output, trying again");
                    last_error = e.to_string();
                }
            },
            Err(e) => {
                warn!(what, attempt, error = %e, "LLM call failed, trying again");
                last_error = e.to_string();
            }
        }
    }

    Err(MedRagError::MaxAttemptsReached {
        what,
        attempts,
        last_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::cell::Cell;
    use std::time::Duration;

    #[test]
    fn extracts_outermost_braces() {
        let s = "```json\n{\"a\": {\"b\": 2}}\n```";
        assert_eq!(extract_json_object(s), Some("{\"a\": {\"b\": 2}}"));
        assert_eq!(extract_json_object("no braces"), None);
        assert_eq!(extract_json_object("{ only open"), None);
    }

    #[tokio::test]
    async fn succeeds_after_bad_replies() {
        let calls = Cell::new(0);
        let v: Value = retry_json("test", 4, || {
            calls.set(calls.get() + 1);
            let reply = match calls.get() {
                1 => Err(AiLlmError::Timeout(Duration::from_secs(1))),
                2 => Ok("not json at all".to_string()),
                _ => Ok("Here you go: {\"ok\": true}".to_string()),
            };
            std::future::ready(reply)
        })
        .await
        .unwrap();

        assert_eq!(v["ok"], true);
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = Cell::new(0);
        let err = retry_json::<Value, _, _>("diagnosis", 4, || {
            calls.set(calls.get() + 1);
            std::future::ready(Ok("{broken".to_string()))
        })
        .await
        .unwrap_err();

        assert_eq!(calls.get(), 4);
        assert!(matches!(
            err,
            MedRagError::MaxAttemptsReached { what: "diagnosis", attempts: 4, .. }
        ));
    }
}
