use ai_llm_service::LlmServiceProfiles;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::{errors::MedRagError, json_repair::retry_json};

/// Patient facts pulled out of a consultation transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientInfo {
    #[serde(default)]
    pub gender: Option<String>,
    /// Models answer with a number, a string ("45", "mid-forties") or nothing.
    #[serde(default)]
    pub age: Option<Value>,
    pub symptoms: String,
}

impl PatientInfo {
    pub fn gender_or_unknown(&self) -> &str {
        self.gender
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .unwrap_or("Unknown")
    }

    pub fn age_or_unknown(&self) -> String {
        match &self.age {
            None | Some(Value::Null) => "Unknown".to_string(),
            Some(Value::String(s)) if s.trim().is_empty() => "Unknown".to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

/// Asks the model for a [`PatientInfo`] JSON object, retrying bad replies.
pub async fn extract_patient_info(
    llm: &LlmServiceProfiles,
    instructions: &str,
    transcript: &str,
    max_attempts: u32,
) -> Result<PatientInfo, MedRagError> {
    let prompt = format!("{}\n{}", instructions.trim_end(), transcript.trim());
    let prompt = prompt.as_str();

    let info: PatientInfo =
        retry_json("patient info", max_attempts, move || llm.generate(prompt)).await?;
    info!(
        gender = info.gender_or_unknown(),
        age = %info.age_or_unknown(),
        "patient info extracted"
    );
    Ok(info)
}
