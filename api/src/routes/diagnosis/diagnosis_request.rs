use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct DiagnoseRequest {
    /// Doctor/patient conversation transcript.
    pub transcript: String,
}

/// Text documents (`.txt`, `.md`) readable by the server process.
#[derive(Debug, Deserialize)]
pub struct BuildIndexRequest {
    pub paths: Vec<PathBuf>,
}
