//! Rendering an assembled graph as JSON or as an embeddable script tag.

use crate::types::SchemaGraph;

/// Pretty-printed JSON. Key order is deterministic: it follows the order
/// properties were assembled in, which follows template declaration order.
pub fn to_json(graph: &SchemaGraph) -> String {
    serde_json::to_string_pretty(graph.as_value())
        .expect("assembled graph is always serializable JSON")
}

/// Wrap the JSON in a `<script type="application/ld+json">` block, ready for
/// direct embedding.
///
/// The only escaping applied is `</` → `<\/` inside the payload: an escaped
/// solidus is still valid JSON, and it keeps any close-tag sequence from
/// terminating the surrounding script element. Nothing else is escaped.
pub fn to_script_tag(graph: &SchemaGraph) -> String {
    let payload = to_json(graph).replace("</", r"<\/");
    format!("<script type=\"application/ld+json\">\n{payload}\n</script>")
}
