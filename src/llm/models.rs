pub const SUPPORTED_IMAGE_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

/// Raw image bytes plus the MIME type the browser declared for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl ImagePayload {
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }
}

pub fn is_supported_image_type(mime_type: &str) -> bool {
    SUPPORTED_IMAGE_TYPES
        .iter()
        .any(|supported| supported.eq_ignore_ascii_case(mime_type.trim()))
}

/// Maps a file extension to one of the accepted image MIME types.
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        _ => None,
    }
}
