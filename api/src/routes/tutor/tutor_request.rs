use serde::Deserialize;

/// One chat turn from the web app.
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    /// The student's message.
    pub body: String,
    /// Conversation id; the single shared session is used when absent.
    #[serde(default)]
    pub session_id: Option<String>,
    /// Optional student work as a base64 image data URL.
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResetSessionRequest {
    #[serde(default)]
    pub session_id: Option<String>,
}
