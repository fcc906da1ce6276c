//! Request bodies: JSON payloads and multipart uploads.

use cordwain_error::{RestError, RestResult};
use serde::Serialize;

/// A file uploaded alongside a JSON payload.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters)]
pub struct FileAttachment {
    filename: String,
    content_type: Option<String>,
    data: Vec<u8>,
}

impl FileAttachment {
    /// Create an attachment from raw bytes.
    pub fn new(filename: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content_type: None,
            data: data.into(),
        }
    }

    /// Set an explicit MIME type for the file part.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Body of an outgoing request.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    /// No body
    #[default]
    Empty,
    /// A JSON document sent as `application/json`
    Json(serde_json::Value),
    /// A `multipart/form-data` body with a `payload_json` part and `files[n]` parts
    Multipart {
        /// JSON payload sent as the `payload_json` part
        payload_json: Option<serde_json::Value>,
        /// Files sent as `files[0]`, `files[1]`, ...
        files: Vec<FileAttachment>,
    },
}

impl RequestBody {
    /// Serialize a value into a JSON body.
    ///
    /// # Errors
    ///
    /// Returns a malformed-input error if the value cannot be represented as JSON.
    #[track_caller]
    pub fn json<T: Serialize + ?Sized>(value: &T) -> RestResult<Self> {
        serde_json::to_value(value)
            .map(RequestBody::Json)
            .map_err(|e| RestError::malformed(format!("Failed to serialize request body: {}", e)))
    }

    /// JSON payload with attachments; plain JSON when there are none.
    pub fn with_files(payload_json: Option<serde_json::Value>, files: Vec<FileAttachment>) -> Self {
        match (payload_json, files.is_empty()) {
            (Some(payload), true) => RequestBody::Json(payload),
            (None, true) => RequestBody::Empty,
            (payload_json, false) => RequestBody::Multipart {
                payload_json,
                files,
            },
        }
    }

    /// Whether there is nothing to send.
    pub fn is_empty(&self) -> bool {
        matches!(self, RequestBody::Empty)
    }

    /// Short description for logs; file contents are never logged.
    pub fn describe(&self) -> String {
        match self {
            RequestBody::Empty => "empty".to_string(),
            RequestBody::Json(value) => value.to_string(),
            RequestBody::Multipart {
                payload_json,
                files,
            } => format!(
                "multipart with {} file(s){}",
                files.len(),
                payload_json
                    .as_ref()
                    .map(|p| format!(" and payload {}", p))
                    .unwrap_or_default()
            ),
        }
    }

    /// Build the reqwest multipart form for a multipart body.
    ///
    /// Returns `None` for bodies that are not multipart.
    pub(crate) fn to_form(&self) -> RestResult<Option<reqwest::multipart::Form>> {
        let RequestBody::Multipart {
            payload_json,
            files,
        } = self
        else {
            return Ok(None);
        };

        let mut form = reqwest::multipart::Form::new();
        if let Some(payload) = payload_json {
            let part = reqwest::multipart::Part::text(payload.to_string())
                .mime_str("application/json")
                .map_err(|e| RestError::malformed(format!("Invalid payload_json part: {}", e)))?;
            form = form.part("payload_json", part);
        }
        for (index, file) in files.iter().enumerate() {
            let mut part = reqwest::multipart::Part::bytes(file.data.clone())
                .file_name(file.filename.clone());
            if let Some(content_type) = &file.content_type {
                part = part.mime_str(content_type).map_err(|e| {
                    RestError::malformed(format!(
                        "Invalid content type '{}' for {}: {}",
                        content_type, file.filename, e
                    ))
                })?;
            }
            form = form.part(format!("files[{}]", index), part);
        }
        Ok(Some(form))
    }
}
