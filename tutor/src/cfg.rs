//! Runtime configuration loaded from environment variables.

use std::path::PathBuf;

/// Where prompts are read from and where the frontend's artifacts are written.
#[derive(Clone, Debug)]
pub struct TutorConfig {
    /// Directory with the prompt templates and example images.
    pub prompts_dir: PathBuf,
    /// Directory for saved drawings/diagrams (the web app's `public/`).
    pub artifacts_dir: PathBuf,
    /// Live sessions kept before the least recently used one is evicted.
    pub max_sessions: usize,
}

pub const DRAWING_FILE: &str = "drawing.png";
pub const DIAGRAM_FILE: &str = "saved_diagram.svg";
pub const DEFAULT_MAX_SESSIONS: usize = 1000;

impl TutorConfig {
    /// Reads `PROMPTS_DIR` (default `./prompts`), `ARTIFACTS_DIR` (default
    /// `./public`) and `MAX_SESSIONS` (default 1000; unparsable or zero values
    /// fall back to the default).
    pub fn from_env() -> Self {
        let max_sessions = std::env::var("MAX_SESSIONS")
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_MAX_SESSIONS);
        Self {
            prompts_dir: env_path("PROMPTS_DIR", "./prompts"),
            artifacts_dir: env_path("ARTIFACTS_DIR", "./public"),
            max_sessions,
        }
    }

    /// Last drawing uploaded by the student; fallback image for check work.
    pub fn drawing_path(&self) -> PathBuf {
        self.artifacts_dir.join(DRAWING_FILE)
    }
}

fn env_path(key: &str, dflt: &str) -> PathBuf {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(dflt))
}
