//! Turns the optional source fields handed over by the generation
//! collaborator into a concrete vertex/fragment pair.

use crate::geometry::GeometryKind;
use crate::shaders::{DEFAULT_FRAGMENT_SRC, DEFAULT_VERTEX_SRC, MVP_UNIFORM};

/// Shader text as delivered from outside. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderSource {
    /// Vertex stage.
    pub vertex: Option<String>,
    /// Fragment stage.
    pub fragment: Option<String>,
    /// A single unlabeled snippet, treated as the fragment stage.
    pub combined: Option<String>,
}

impl ShaderSource {
    /// A source with only the combined snippet set.
    pub fn combined<S: Into<String>>(text: S) -> Self {
        Self {
            combined: Some(text.into()),
            ..Self::default()
        }
    }
}

/// A renderable vertex/fragment pair plus the mesh it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedShader {
    /// Vertex stage text.
    pub vertex_text: String,
    /// Fragment stage text.
    pub fragment_text: String,
    /// `true` iff [`vertex_text`](Self::vertex_text) mentions
    /// [`MVP_UNIFORM`]. Computed here once; rendering never re-scans text.
    pub requires_model_view_projection: bool,
}

impl ResolvedShader {
    /// The mesh this shader is drawn with.
    #[must_use]
    pub fn geometry(&self) -> GeometryKind {
        GeometryKind::select(self.requires_model_view_projection)
    }
}

/// Resolve `source`, substituting built-in fallbacks for missing stages.
///
/// Never fails: the all-default result is always renderable.
#[must_use]
pub fn resolve(source: &ShaderSource) -> ResolvedShader {
    let vertex_text = source
        .vertex
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_VERTEX_SRC)
        .to_owned();
    let fragment_text = source
        .fragment
        .as_deref()
        .filter(|s| !s.is_empty())
        .or_else(|| source.combined.as_deref().filter(|s| !s.is_empty()))
        .unwrap_or(DEFAULT_FRAGMENT_SRC)
        .to_owned();
    let requires_model_view_projection = vertex_text.contains(MVP_UNIFORM);

    ResolvedShader {
        vertex_text,
        fragment_text,
        requires_model_view_projection,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLASMA: &str = "#version 300 es\nprecision highp float;\nuniform float u_time;\n\
                          out vec4 c;\nvoid main() { c = vec4(sin(u_time)); }";

    #[test]
    fn combined_only_becomes_the_fragment_stage() {
        let resolved = resolve(&ShaderSource::combined(PLASMA));
        assert_eq!(resolved.fragment_text, PLASMA);
        assert_eq!(resolved.vertex_text, DEFAULT_VERTEX_SRC);
        assert!(!resolved.requires_model_view_projection);
    }

    #[test]
    fn empty_source_resolves_to_both_defaults() {
        let resolved = resolve(&ShaderSource::default());
        assert_eq!(
            resolved,
            ResolvedShader {
                vertex_text: DEFAULT_VERTEX_SRC.to_owned(),
                fragment_text: DEFAULT_FRAGMENT_SRC.to_owned(),
                requires_model_view_projection: false,
            }
        );
        assert_eq!(resolved.geometry(), GeometryKind::Quad);
    }

    #[test]
    fn fragment_wins_over_combined() {
        let source = ShaderSource {
            fragment: Some("frag".into()),
            combined: Some("combined".into()),
            ..ShaderSource::default()
        };
        assert_eq!(resolve(&source).fragment_text, "frag");
    }

    #[test]
    fn empty_strings_count_as_missing() {
        let source = ShaderSource {
            vertex: Some(String::new()),
            fragment: Some(String::new()),
            combined: Some(String::new()),
        };
        assert_eq!(resolve(&source), resolve(&ShaderSource::default()));
    }

    #[test]
    fn mvp_token_in_vertex_selects_cube() {
        let source = ShaderSource {
            vertex: Some(format!("uniform mat4 {MVP_UNIFORM};")),
            ..ShaderSource::default()
        };
        let resolved = resolve(&source);
        assert!(resolved.requires_model_view_projection);
        assert_eq!(resolved.geometry(), GeometryKind::Cube);
    }

    #[test]
    fn mvp_token_in_fragment_does_not_count() {
        let source = ShaderSource {
            fragment: Some(format!("uniform mat4 {MVP_UNIFORM};")),
            ..ShaderSource::default()
        };
        assert!(!resolve(&source).requires_model_view_projection);
    }
}
