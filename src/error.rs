//! Error taxonomy for session attempts.
//!
//! Every variant is terminal for the attempt that produced it; nothing here
//! is retried automatically.

use std::fmt;

use thiserror::Error;

/// A programmable pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// The vertex stage.
    Vertex,
    /// The fragment stage.
    Fragment,
}

impl ShaderStage {
    /// The GL enum for `glCreateShader`.
    #[must_use]
    pub fn gl_kind(self) -> u32 {
        match self {
            Self::Vertex => glow::VERTEX_SHADER,
            Self::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
        })
    }
}

/// Why a session could not be created or kept alive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The surface has no usable graphics context. Not retryable.
    #[error("No suitable graphics context is available for this surface")]
    ContextUnavailable,

    /// A shader stage failed to compile. `log` is the driver's raw output.
    #[error("Could not compile {stage} shader: {log}")]
    Compile {
        /// Stage that failed.
        stage: ShaderStage,
        /// Raw info log.
        log: String,
    },

    /// The program failed to link.
    #[error("Could not link program: {log}")]
    Link {
        /// Raw info log.
        log: String,
    },

    /// The generation collaborator reported failure or could not be read.
    #[error("{0}")]
    Upstream(String),

    /// The driver refused to create a GPU object.
    #[error("Could not allocate GPU resource: {0}")]
    Allocation(String),
}

impl SessionError {
    /// Build an [`Upstream`](Self::Upstream) error.
    pub fn upstream<S: Into<String>>(msg: S) -> Self {
        Self::Upstream(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_error_names_the_stage() {
        let err = SessionError::Compile {
            stage: ShaderStage::Fragment,
            log: "0:3: syntax error".into(),
        };
        assert_eq!(
            err.to_string(),
            "Could not compile fragment shader: 0:3: syntax error"
        );
    }

    #[test]
    fn upstream_message_is_passed_through_verbatim() {
        assert_eq!(SessionError::upstream("rate limited").to_string(), "rate limited");
    }
}
