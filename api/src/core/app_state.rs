use std::sync::Arc;

use ai_llm_service::LlmServiceProfiles;
use med_rag::{Diagnoser, DiagnosisPrompts, MedIndex, MedRagConfig, MedRagError};
use tracing::{info, warn};
use tutor::{SessionStore, Tutor};

use crate::error_handler::AppError;

/// Shared state for all HTTP handlers.
pub struct AppState {
    /// Chat + embedding profiles shared by the tutor and the diagnosis pipeline.
    pub llm: Arc<LlmServiceProfiles>,
    pub tutor: Tutor,
    pub sessions: SessionStore,
    /// `None` when the diagnosis prompts are not installed; the routes answer 503.
    pub diagnoser: Option<Diagnoser<MedIndex>>,
}

impl AppState {
    pub fn new(
        llm: Arc<LlmServiceProfiles>,
        tutor: Tutor,
        diagnoser: Option<Diagnoser<MedIndex>>,
    ) -> Self {
        let sessions = SessionStore::with_capacity(tutor.config().max_sessions);
        Self {
            llm,
            tutor,
            sessions,
            diagnoser,
        }
    }

    /// Load shared state from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        let llm = Arc::new(
            LlmServiceProfiles::from_env().map_err(|e| AppError::Config(e.to_string()))?,
        );
        let (chat, embedding) = llm.profiles();
        info!(
            chat_provider = ?chat.provider,
            chat_model = %chat.model,
            embedding_model = %embedding.model,
            "LLM profiles configured"
        );

        let tutor = Tutor::from_env(llm.clone()).map_err(|e| AppError::Config(e.to_string()))?;

        let med_cfg = MedRagConfig::from_env().map_err(|e| AppError::Config(e.to_string()))?;
        let diagnoser = match DiagnosisPrompts::load(&med_cfg.prompts_dir) {
            Ok(prompts) => {
                let (top_k, max_attempts) = (med_cfg.top_k, med_cfg.max_attempts);
                let index = MedIndex::new(med_cfg, llm.clone())
                    .map_err(|e| AppError::Config(e.to_string()))?;
                Some(Diagnoser::new(llm.clone(), index, prompts, top_k, max_attempts))
            }
            Err(MedRagError::MissingPrompt(path)) => {
                warn!(path = %path.display(), "diagnosis prompt missing; diagnosis routes disabled");
                None
            }
            Err(e) => return Err(AppError::Config(e.to_string())),
        };

        Ok(Self::new(llm, tutor, diagnoser))
    }
}
