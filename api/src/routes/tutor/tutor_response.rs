use serde::Serialize;
use tutor::Intent;

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub output: String,
    /// Mermaid source split out of the reply, if any.
    pub diagram: Option<String>,
    pub intent: Option<Intent>,
    pub topic: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResetSessionResponse {
    pub session_id: String,
    pub reset: bool,
}
