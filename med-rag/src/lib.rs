//! Retrieval-augmented diagnosis over a Qdrant index.
//!
//! - [`MedIndex`] splits text documents, embeds the chunks with the embedding
//!   profile of [`ai_llm_service::LlmServiceProfiles`] and stores them in Qdrant.
//! - [`Diagnoser`] extracts [`PatientInfo`] from a transcript, retrieves
//!   context for the symptoms and asks the chat model for a JSON diagnosis.
//!
//! Model replies are decoded with [`retry_json`], which trims surrounding prose
//! and retries a bounded number of times.

mod config;
mod diagnosis;
mod errors;
mod index;
mod json_repair;
mod patient;
mod splitter;
mod vector_db;

pub use config::{DEFAULT_INDEX_NAME, MedRagConfig};
pub use diagnosis::{
    DIAGNOSIS_PROMPT, Diagnoser, Diagnosis, DiagnosisPrompts, PATIENT_INFO_PROMPT,
    diagnosis_prompt,
};
pub use errors::MedRagError;
pub use index::{IndexStats, MedIndex, RetrievedChunk, Retriever};
pub use json_repair::{extract_json_object, parse_json_reply, retry_json};
pub use patient::{PatientInfo, extract_patient_info};
pub use splitter::RecursiveSplitter;
