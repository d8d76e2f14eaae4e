//! Provider-agnostic chat messages.
//!
//! A message is an ordered list of parts. Order matters: the check-work flow
//! interleaves instructions and example images, and providers receive the
//! parts exactly in the order they were pushed.

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
}

/// Base64-encoded image with its media type (e.g. `image/png`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub media_type: String,
    pub data_base64: String,
}

impl ImageData {
    /// Encodes raw image bytes.
    pub fn from_bytes(media_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            media_type: media_type.into(),
            data_base64: STANDARD.encode(bytes),
        }
    }

    /// Parses `data:image/<fmt>;base64,<payload>` or a bare base64 payload (assumed PNG).
    ///
    /// Returns `None` when the payload is empty or not valid base64, or when the
    /// data URL is not a base64 image.
    pub fn from_data_url(input: &str) -> Option<Self> {
        let input = input.trim();
        let (media_type, payload) = match input.strip_prefix("data:") {
            Some(rest) => {
                let (meta, payload) = rest.split_once(',')?;
                let media_type = meta.strip_suffix(";base64")?;
                if !media_type.starts_with("image/") {
                    return None;
                }
                (media_type.to_string(), payload)
            }
            None => ("image/png".to_string(), input),
        };

        if payload.is_empty() || STANDARD.decode(payload).is_err() {
            return None;
        }

        Some(Self {
            media_type,
            data_base64: payload.to_string(),
        })
    }

    /// Decoded image bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(&self.data_base64)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Text(String),
    Image(ImageData),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub parts: Vec<ContentPart>,
}

impl ChatMessage {
    /// Single-text user message.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![ContentPart::Text(text.into())],
        }
    }

    /// Empty user message to be filled with [`ChatMessage::text`] / [`ChatMessage::image`].
    pub fn user() -> Self {
        Self {
            role: Role::User,
            parts: Vec::new(),
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.parts.push(ContentPart::Text(text.into()));
        self
    }

    pub fn image(mut self, image: ImageData) -> Self {
        self.parts.push(ContentPart::Image(image));
        self
    }

    /// Text parts joined with newlines (images dropped).
    pub fn joined_text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                ContentPart::Text(t) => Some(t.as_str()),
                ContentPart::Image(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn images(&self) -> impl Iterator<Item = &ImageData> {
        self.parts.iter().filter_map(|p| match p {
            ContentPart::Image(img) => Some(img),
            ContentPart::Text(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_url_is_split_into_media_type_and_payload() {
        let img = ImageData::from_data_url("data:image/jpeg;base64,aGVsbG8=").unwrap();
        assert_eq!(img.media_type, "image/jpeg");
        assert_eq!(img.to_bytes().unwrap(), b"hello");
    }

    #[test]
    fn bare_base64_defaults_to_png() {
        let img = ImageData::from_data_url("aGVsbG8=").unwrap();
        assert_eq!(img.media_type, "image/png");
    }

    #[test]
    fn rejects_non_image_and_garbage() {
        assert!(ImageData::from_data_url("data:text/plain;base64,aGVsbG8=").is_none());
        assert!(ImageData::from_data_url("data:image/png,raw").is_none());
        assert!(ImageData::from_data_url("not base64 !!").is_none());
        assert!(ImageData::from_data_url("").is_none());
    }

    #[test]
    fn builder_keeps_part_order() {
        let img = ImageData::from_bytes("image/png", b"\x89PNG");
        let msg = ChatMessage::user().text("a").image(img.clone()).text("b");
        assert_eq!(
            msg.parts,
            vec![
                ContentPart::Text("a".into()),
                ContentPart::Image(img),
                ContentPart::Text("b".into()),
            ]
        );
        assert_eq!(msg.joined_text(), "a\nb");
        assert_eq!(msg.images().count(), 1);
    }
}
