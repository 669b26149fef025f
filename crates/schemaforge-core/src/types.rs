//! Common types shared across the generation pipeline.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::template::SchemaType;

/// A question/answer pair scraped from the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

/// Normalized facts pulled from a single page.
///
/// Created fresh per extraction call and immutable once produced. Absent
/// signals yield `None`/empty fields; extraction failure is per-field, not
/// per-call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntermediateRecord {
    /// Page URL the record was extracted from.
    pub url: String,
    /// Scraped page title (og:title wins over `<title>`).
    pub name: String,
    pub description: Option<String>,
    /// Ordered, deduplicated, bounded image URLs.
    pub images: Vec<String>,
    /// Canonical organization name supplied by the page itself.
    pub organization_name: Option<String>,
    pub address: Option<String>,
    pub price_hint: Option<String>,
    pub faqs: Vec<Faq>,
    pub body_text: Option<String>,
}

/// An assembled JSON-LD document: `@context` plus a `@graph` of `@id`-linked
/// entities.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SchemaGraph(JsonValue);

impl SchemaGraph {
    pub(crate) fn from_nodes(nodes: Vec<JsonValue>) -> Self {
        let mut doc = serde_json::Map::new();
        doc.insert(
            "@context".to_string(),
            JsonValue::String("https://schema.org".to_string()),
        );
        doc.insert("@graph".to_string(), JsonValue::Array(nodes));
        SchemaGraph(JsonValue::Object(doc))
    }

    pub fn as_value(&self) -> &JsonValue {
        &self.0
    }

    /// Entities in the `@graph` array.
    pub fn nodes(&self) -> &[JsonValue] {
        self.0
            .get("@graph")
            .and_then(JsonValue::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// `@id` values defined by entities of this graph.
    pub fn defined_ids(&self) -> BTreeSet<String> {
        self.nodes()
            .iter()
            .filter_map(|node| node.get("@id").and_then(JsonValue::as_str))
            .map(str::to_string)
            .collect()
    }

    /// `@id` values referenced (as bare `{"@id": …}` objects) anywhere in the
    /// graph. Every one of these must appear in [`defined_ids`](Self::defined_ids).
    pub fn referenced_ids(&self) -> BTreeSet<String> {
        let mut ids = BTreeSet::new();
        for node in self.nodes() {
            if let Some(object) = node.as_object() {
                for (key, value) in object {
                    if key != "@id" {
                        collect_references(value, &mut ids);
                    }
                }
            }
        }
        ids
    }
}

fn collect_references(value: &JsonValue, ids: &mut BTreeSet<String>) {
    match value {
        JsonValue::Object(object) => {
            // A bare {"@id": …} object is a reference, not a definition.
            if object.len() == 1 {
                if let Some(id) = object.get("@id").and_then(JsonValue::as_str) {
                    ids.insert(id.to_string());
                    return;
                }
            }
            for nested in object.values() {
                collect_references(nested, ids);
            }
        }
        JsonValue::Array(items) => {
            for item in items {
                collect_references(item, ids);
            }
        }
        _ => {}
    }
}

/// The record returned to callers of the workflow. Transient, not persisted.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationResult {
    /// Serialized output: pretty JSON, or the embeddable script tag when
    /// requested.
    pub schema: String,
    /// The assembled graph the serialization was produced from.
    pub graph: SchemaGraph,
    /// Extraction metadata used during assembly.
    pub record: IntermediateRecord,
    pub schema_type: SchemaType,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn graph_exposes_nodes_and_context() {
        let graph = SchemaGraph::from_nodes(vec![json!({"@type": "Thing", "@id": "x#1"})]);
        assert_eq!(graph.as_value()["@context"], "https://schema.org");
        assert_eq!(graph.nodes().len(), 1);
        assert!(graph.defined_ids().contains("x#1"));
    }

    #[test]
    fn reference_collection_skips_definitions() {
        let graph = SchemaGraph::from_nodes(vec![
            json!({"@type": "Product", "@id": "p#1", "offers": {"@id": "o#1"}}),
            json!({"@type": "Offer", "@id": "o#1", "seller": {"@id": "org#1"}}),
            json!({"@type": "Organization", "@id": "org#1", "name": "Acme"}),
        ]);

        let referenced = graph.referenced_ids();
        assert!(referenced.contains("o#1"));
        assert!(referenced.contains("org#1"));
        assert!(!referenced.contains("p#1"));
        assert!(referenced.is_subset(&graph.defined_ids()));
    }
}
