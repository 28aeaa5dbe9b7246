//! The structured result the shader-generation service returns.
//!
//! ```json
//! { "success": true,
//!   "data": { "vertexShader": "...", "fragmentShader": "...", "combinedShader": "..." },
//!   "error": "...", "rawOutput": "..." }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::extract::extract_shader_code;
use crate::resolve::ShaderSource;

/// Reported when a failed result carries no message of its own.
const DEFAULT_FAILURE: &str = "Failed to generate shader";

/// Reported when a successful result carries no shader code.
const NO_DATA: &str = "No shader code generated";

/// Reported by [`GenerationResult::from_model_output`] when the model's
/// answer has no fenced code block.
const NOTHING_EXTRACTED: &str = "Could not extract valid shader code from the response";

/// The shader fields of a result. Any subset may be present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShaderPayload {
    /// Vertex stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertex_shader: Option<String>,
    /// Fragment stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fragment_shader: Option<String>,
    /// Unlabeled snippet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combined_shader: Option<String>,
}

impl ShaderPayload {
    /// Whether no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertex_shader.is_none()
            && self.fragment_shader.is_none()
            && self.combined_shader.is_none()
    }
}

impl From<ShaderPayload> for ShaderSource {
    fn from(payload: ShaderPayload) -> Self {
        Self {
            vertex: payload.vertex_shader,
            fragment: payload.fragment_shader,
            combined: payload.combined_shader,
        }
    }
}

/// What the generation service hands back for one prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    /// Whether `data` holds usable shader code.
    pub success: bool,
    /// Extracted shader code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ShaderPayload>,
    /// Human-readable failure reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// The model's unprocessed answer, for display or debugging.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_output: Option<String>,
}

impl GenerationResult {
    /// Parse the service's JSON body.
    ///
    /// # Errors
    ///
    /// [`SessionError::Upstream`] if the body is not a valid result; a
    /// garbled response is treated like an unreachable service.
    pub fn from_json(body: &str) -> Result<Self, SessionError> {
        serde_json::from_str(body).map_err(|e| {
            SessionError::upstream(format!("Invalid response from shader service: {e}"))
        })
    }

    /// Build the result for a model's free-form answer, the way the service
    /// does before replying.
    #[must_use]
    pub fn from_model_output(text: &str) -> Self {
        let payload = extract_shader_code(text);
        if payload.is_empty() {
            Self {
                success: false,
                data: None,
                error: Some(NOTHING_EXTRACTED.to_owned()),
                raw_output: Some(text.to_owned()),
            }
        } else {
            Self {
                success: true,
                data: Some(payload),
                error: None,
                raw_output: Some(text.to_owned()),
            }
        }
    }

    /// A failed result carrying `error`.
    pub fn failure<S: Into<String>>(error: S) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Serialize for the wire.
    ///
    /// # Errors
    ///
    /// Propagates the serializer's error; not expected for this type.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// The shader source to render.
    ///
    /// # Errors
    ///
    /// [`SessionError::Upstream`] with the service's message when
    /// `success` is false, or when a successful result has no `data`.
    pub fn into_source(self) -> Result<ShaderSource, SessionError> {
        if !self.success {
            return Err(SessionError::upstream(
                self.error.unwrap_or_else(|| DEFAULT_FAILURE.to_owned()),
            ));
        }
        self.data
            .map(ShaderSource::from)
            .ok_or_else(|| SessionError::upstream(NO_DATA))
    }
}
