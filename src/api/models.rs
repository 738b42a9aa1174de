use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use serde::Deserialize;

use crate::page::{PageError, UploadedImage};

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: String,
    pub image: Option<ImageUpload>,
}

/// Image as sent by the page: base64 data, optionally as a `data:` URL.
#[derive(Debug, Deserialize)]
pub struct ImageUpload {
    pub mime_type: String,
    pub data: String,
}

impl ImageUpload {
    pub fn decode(self) -> Result<UploadedImage, PageError> {
        let encoded = match self.data.split_once(";base64,") {
            Some((prefix, rest)) if prefix.starts_with("data:") => rest,
            _ => self.data.as_str(),
        };

        let data = BASE64_STANDARD
            .decode(encoded.trim())
            .map_err(|e| PageError::InvalidEncoding(e.to_string()))?;

        Ok(UploadedImage {
            mime_type: self.mime_type,
            data,
        })
    }
}
