//! Pulls shader code out of free-form model output.
//!
//! Models answer with prose around fenced code blocks. A block's info string
//! (`vertex`, `fragment`, `glsl` or nothing) says which stage it is; for
//! unlabeled blocks the surrounding prose is used as a hint.

use crate::generation::ShaderPayload;

const FENCE: &str = "```";

/// A fenced block: its lowercased info string and trimmed body.
#[derive(Debug, PartialEq, Eq)]
struct Block<'a> {
    label: String,
    body: &'a str,
}

/// Every closed fenced block in `text`, in order. An unterminated trailing
/// block is dropped.
fn fenced_blocks(text: &str) -> Vec<Block<'_>> {
    let mut blocks = Vec::new();
    let mut open: Option<(String, usize)> = None;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();

        let trimmed = line.trim_start();
        let Some(info) = trimmed.strip_prefix(FENCE) else {
            continue;
        };
        match open.take() {
            None => {
                let label = info
                    .split_whitespace()
                    .next()
                    .unwrap_or_default()
                    .to_ascii_lowercase();
                open = Some((label, offset));
            }
            Some((label, body_start)) => {
                let body = text[body_start..line_start].trim();
                blocks.push(Block { label, body });
            }
        }
    }

    blocks
}

/// Sort the fenced blocks of `text` into vertex, fragment and combined
/// sources.
///
/// - `vertex` / `fragment` blocks fill their stage; the first one wins.
/// - An unlabeled or `glsl` block is the vertex stage if the prose mentions
///   a "vertex shader" and none was found yet, the fragment stage if a vertex
///   stage exists and the prose mentions a "fragment shader", and otherwise
///   the combined snippet.
/// - When both stages are present the combined snippet is dropped.
///
/// Returns an empty payload if `text` has no fenced block.
#[must_use]
pub fn extract_shader_code(text: &str) -> ShaderPayload {
    let lower = text.to_ascii_lowercase();
    let mentions_vertex = lower.contains("vertex shader");
    let mentions_fragment = lower.contains("fragment shader");

    let mut payload = ShaderPayload::default();
    for Block { label, body } in fenced_blocks(text) {
        if body.is_empty() {
            continue;
        }
        let slot = match label.as_str() {
            "vertex" | "vert" => &mut payload.vertex_shader,
            "fragment" | "frag" => &mut payload.fragment_shader,
            _ if mentions_vertex && payload.vertex_shader.is_none() => &mut payload.vertex_shader,
            _ if mentions_fragment
                && payload.vertex_shader.is_some()
                && payload.fragment_shader.is_none() =>
            {
                &mut payload.fragment_shader
            }
            _ => &mut payload.combined_shader,
        };
        slot.get_or_insert_with(|| body.to_owned());
    }

    if payload.vertex_shader.is_some() && payload.fragment_shader.is_some() {
        payload.combined_shader = None;
    }
    payload
}
