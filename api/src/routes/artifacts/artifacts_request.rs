use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SaveDiagramRequest {
    /// Rendered diagram markup (SVG).
    pub diagram: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveImageRequest {
    /// Canvas export as `data:image/png;base64,...`.
    pub image: String,
}
