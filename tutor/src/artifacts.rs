//! Files the web app hands back to the tutor: the student's drawing and the
//! last rendered diagram.

use std::path::{Path, PathBuf};

use ai_llm_service::ImageData;
use tracing::info;

use crate::{
    cfg::{DIAGRAM_FILE, TutorConfig},
    error::TutorError,
};

/// Decodes a `data:image/...;base64,` URL or bare base64 payload.
pub fn decode_image(input: &str) -> Result<ImageData, TutorError> {
    ImageData::from_data_url(input)
        .ok_or_else(|| TutorError::InvalidImage("expected a base64 image data URL".into()))
}

/// Stores the drawing as `drawing.png`; check work falls back to it.
pub async fn save_drawing(cfg: &TutorConfig, data_url: &str) -> Result<PathBuf, TutorError> {
    let image = decode_image(data_url)?;
    let bytes = image
        .to_bytes()
        .map_err(|e| TutorError::InvalidImage(e.to_string()))?;

    let path = cfg.drawing_path();
    write_artifact(&cfg.artifacts_dir, &path, &bytes).await?;
    info!(path = %path.display(), bytes = bytes.len(), "drawing saved");
    Ok(path)
}

/// Stores diagram markup as `saved_diagram.svg`.
pub async fn save_diagram(cfg: &TutorConfig, diagram: &str) -> Result<PathBuf, TutorError> {
    let path = cfg.artifacts_dir.join(DIAGRAM_FILE);
    write_artifact(&cfg.artifacts_dir, &path, diagram.as_bytes()).await?;
    info!(path = %path.display(), "diagram saved");
    Ok(path)
}

async fn write_artifact(dir: &Path, path: &Path, bytes: &[u8]) -> Result<(), TutorError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| TutorError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    tokio::fs::write(path, bytes)
        .await
        .map_err(|source| TutorError::Io {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(dir: &Path) -> TutorConfig {
        TutorConfig {
            prompts_dir: dir.to_path_buf(),
            artifacts_dir: dir.join("public"),
            max_sessions: 8,
        }
    }

    #[tokio::test]
    async fn drawing_is_decoded_into_artifacts_dir() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = cfg(dir.path());

        // "png!" in base64
        let path = save_drawing(&cfg, "data:image/png;base64,cG5nIQ==").await.unwrap();

        assert_eq!(path, dir.path().join("public").join("drawing.png"));
        assert_eq!(std::fs::read(path).unwrap(), b"png!");
    }

    #[tokio::test]
    async fn bad_data_url_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = save_drawing(&cfg(dir.path()), "data:text/plain;base64,aGk=")
            .await
            .unwrap_err();
        assert!(matches!(err, TutorError::InvalidImage(_)));
        assert!(!dir.path().join("public").exists());
    }

    #[tokio::test]
    async fn diagram_overwrites_previous() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = cfg(dir.path());
        save_diagram(&cfg, "<svg>1</svg>").await.unwrap();
        let path = save_diagram(&cfg, "<svg>2</svg>").await.unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "<svg>2</svg>");
    }
}
