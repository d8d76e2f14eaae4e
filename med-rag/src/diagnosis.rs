//! Retrieval-augmented diagnosis from a consultation transcript.

use std::{path::Path, sync::Arc};

use ai_llm_service::LlmServiceProfiles;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, instrument};

use crate::{
    errors::MedRagError,
    index::{RetrievedChunk, Retriever},
    json_repair::retry_json,
    patient::{PatientInfo, extract_patient_info},
};

pub const PATIENT_INFO_PROMPT: &str = "patient_info_prompt.txt";
pub const DIAGNOSIS_PROMPT: &str = "diagnosis_prompt.txt";

#[derive(Debug, Clone)]
pub struct DiagnosisPrompts {
    pub patient_info: String,
    pub diagnosis: String,
}

impl DiagnosisPrompts {
    pub fn load(dir: &Path) -> Result<Self, MedRagError> {
        Ok(Self {
            patient_info: read_prompt(dir, PATIENT_INFO_PROMPT)?,
            diagnosis: read_prompt(dir, DIAGNOSIS_PROMPT)?,
        })
    }
}

fn read_prompt(dir: &Path, name: &str) -> Result<String, MedRagError> {
    let path = dir.join(name);
    match std::fs::read_to_string(&path) {
        Ok(s) => Ok(s),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(MedRagError::MissingPrompt(path)),
        Err(source) => Err(MedRagError::Io { path, source }),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Diagnosis {
    pub patient: PatientInfo,
    /// The model's JSON object, passed through as-is.
    pub result: Value,
    /// Distinct sources of the retrieved context, in rank order.
    pub sources: Vec<String>,
}

pub struct Diagnoser<R> {
    llm: Arc<LlmServiceProfiles>,
    retriever: R,
    prompts: DiagnosisPrompts,
    top_k: u64,
    max_attempts: u32,
}

impl<R: Retriever> Diagnoser<R> {
    pub fn new(
        llm: Arc<LlmServiceProfiles>,
        retriever: R,
        prompts: DiagnosisPrompts,
        top_k: u64,
        max_attempts: u32,
    ) -> Self {
        Self {
            llm,
            retriever,
            prompts,
            top_k,
            max_attempts,
        }
    }

    pub fn retriever(&self) -> &R {
        &self.retriever
    }

    /// Extracts patient info, retrieves context for the symptoms and asks
    /// the model for a JSON diagnosis.
    #[instrument(skip_all, fields(top_k = self.top_k))]
    pub async fn diagnose(&self, transcript: &str) -> Result<Diagnosis, MedRagError> {
        let patient = extract_patient_info(
            &self.llm,
            &self.prompts.patient_info,
            transcript,
            self.max_attempts,
        )
        .await?;

        let chunks = self.retriever.retrieve(&patient.symptoms, self.top_k).await?;
        info!(retrieved = chunks.len(), "context retrieved");

        let context = chunks
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let prompt = diagnosis_prompt(&self.prompts.diagnosis, &patient, &context);
        let prompt = prompt.as_str();
        let llm = self.llm.as_ref();

        let result: Map<String, Value> =
            retry_json("diagnosis", self.max_attempts, move || llm.generate(prompt)).await?;

        Ok(Diagnosis {
            patient,
            result: Value::Object(result),
            sources: distinct_sources(&chunks),
        })
    }
}

/// `{instructions}\nGender: ..\nAge: ..\nSymptoms: ..\n\nContext:\n{context}`
pub fn diagnosis_prompt(instructions: &str, patient: &PatientInfo, context: &str) -> String {
    format!(
        "{}\nGender: {}\nAge: {}\nSymptoms: {}\n\nContext:\n{}",
        instructions.trim_end(),
        patient.gender_or_unknown(),
        patient.age_or_unknown(),
        patient.symptoms,
        context
    )
}

fn distinct_sources(chunks: &[RetrievedChunk]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for src in chunks.iter().filter_map(|c| c.source.as_deref()) {
        if !out.iter().any(|s| s == src) {
            out.push(src.to_string());
        }
    }
    out
}
