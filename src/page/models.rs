use serde::Serialize;
use thiserror::Error;

use crate::llm::models::{is_supported_image_type, ImagePayload};
use crate::llm::LlmError;
use crate::session::{QaPair, Session};

/// A file as it arrived from the uploader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Everything the view layer hands to one page cycle.
#[derive(Debug, Clone, Default)]
pub struct PageInput {
    pub image: Option<UploadedImage>,
    pub question: String,
    pub submit: bool,
}

impl PageInput {
    /// A cycle that only renders the current state.
    pub fn render() -> Self {
        Self::default()
    }

    pub fn submit(image: Option<UploadedImage>, question: impl Into<String>) -> Self {
        Self {
            image,
            question: question.into(),
            submit: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum PageError {
    #[error("Please upload an image before asking a question.")]
    MissingImage,
    #[error("The uploaded image is empty.")]
    EmptyImage,
    #[error("Unsupported image type '{0}', upload a JPEG or PNG image.")]
    UnsupportedImageType(String),
    #[error("The uploaded image could not be read: {0}")]
    InvalidEncoding(String),
    #[error("Jarvis could not answer right now, please try again.")]
    Upstream(#[source] LlmError),
}

impl PageError {
    pub fn is_validation(&self) -> bool {
        !matches!(self, PageError::Upstream(_))
    }
}

/// Turns the uploaded file into the payload sent to the model.
pub fn image_from_upload(upload: Option<UploadedImage>) -> Result<ImagePayload, PageError> {
    let upload = upload.ok_or(PageError::MissingImage)?;
    if upload.data.is_empty() {
        return Err(PageError::EmptyImage);
    }
    if !is_supported_image_type(&upload.mime_type) {
        return Err(PageError::UnsupportedImageType(upload.mime_type));
    }
    Ok(ImagePayload::new(
        upload.mime_type.trim().to_ascii_lowercase(),
        upload.data,
    ))
}

/// What the renderer shows after a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageView {
    pub last_question: Option<String>,
    pub last_response: Option<String>,
    pub chat_history: Vec<QaPair>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

impl PageView {
    pub fn from_session(session: &Session) -> Self {
        Self {
            last_question: session.last_question().map(str::to_string),
            last_response: session.last_response().map(str::to_string),
            chat_history: session.chat_history().to_vec(),
            notice: None,
        }
    }
}

#[derive(Debug)]
pub struct PageOutcome {
    pub view: PageView,
    pub error: Option<PageError>,
}

impl PageOutcome {
    pub fn new(mut view: PageView, error: Option<PageError>) -> Self {
        view.notice = error.as_ref().map(|e| e.to_string());
        Self { view, error }
    }
}
