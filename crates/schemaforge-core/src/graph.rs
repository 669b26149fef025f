//! Graph assembly: merge an extracted record through a template into a
//! schema.org JSON-LD graph.
//!
//! Every omission is traceable to a named rule: a declared property is either
//! populated from its record field, replaced by its documented fallback,
//! omitted because the template marks it optional, or assembly fails with
//! [`Error::IncompleteSchema`]. Nested entities are linked by `@id`
//! reference, never duplicated inline.

use chrono::{Duration, Utc};
use serde_json::{Map, Value as JsonValue, json};

use crate::error::Error;
use crate::template::{FieldSource, PropertySpec, SchemaTemplate};
use crate::types::{IntermediateRecord, SchemaGraph};
use crate::url_utils::organization_id;

/// Assemble an `IntermediateRecord` into a [`SchemaGraph`] using `template`.
///
/// `name` is the caller-supplied display name; it wins over the scraped title
/// wherever both are present.
pub fn assemble(
    record: &IntermediateRecord,
    template: &SchemaTemplate,
    name: &str,
) -> Result<SchemaGraph, Error> {
    let ids = GraphIds::for_page(&record.url, template);
    let display_name = resolve_display_name(record, name);

    let mut nodes = Vec::new();
    nodes.push(build_root_node(record, template, name, &ids)?);

    if let Some(offer) = &template.offer {
        let mut node = Map::new();
        node.insert("@type".to_string(), json!("Offer"));
        node.insert("@id".to_string(), json!(ids.offer));
        if let Some(offer_name) = &display_name {
            node.insert("name".to_string(), json!(offer_name));
        }
        let price = record
            .price_hint
            .clone()
            .unwrap_or_else(|| offer.price.to_string());
        node.insert("price".to_string(), json!(price));
        node.insert("priceCurrency".to_string(), json!(offer.currency));
        node.insert("availability".to_string(), json!(offer.availability));
        node.insert(
            "priceValidUntil".to_string(),
            json!(price_valid_until(offer.validity_days)),
        );
        node.insert("url".to_string(), json!(record.url));
        nodes.push(JsonValue::Object(node));
    }

    if template.companion_product {
        let mut node = Map::new();
        node.insert("@type".to_string(), json!("Product"));
        node.insert("@id".to_string(), json!(ids.product));
        if let Some(product_name) = &display_name {
            node.insert("name".to_string(), json!(product_name));
        }
        if let Some(description) = &record.description {
            node.insert("description".to_string(), json!(description));
        }
        if let Some(image) = record.images.first() {
            node.insert("image".to_string(), json!(image));
        }
        node.insert("url".to_string(), json!(record.url));
        node.insert("offers".to_string(), json!({ "@id": ids.offer }));
        nodes.push(JsonValue::Object(node));
    }

    if template.include_faq && !record.faqs.is_empty() {
        nodes.push(build_faq_node(record, &ids));
    }

    nodes.push(build_webpage_node(record, &ids, &display_name));

    if !template.org_links.is_empty() {
        nodes.push(build_organization_node(record, &ids, &display_name));
    }

    Ok(SchemaGraph::from_nodes(nodes))
}

/// Default `priceValidUntil`: an ISO date `days` from today.
pub fn price_valid_until(days: i64) -> String {
    (Utc::now().date_naive() + Duration::days(days)).to_string()
}

struct GraphIds {
    root: String,
    offer: String,
    product: String,
    webpage: String,
    faq: String,
    organization: String,
}

impl GraphIds {
    fn for_page(page_url: &str, template: &SchemaTemplate) -> Self {
        let organization = organization_id(page_url);
        let root = if template.org_links.is_empty() {
            // The root entity is the Organization itself.
            organization.clone()
        } else {
            format!("{page_url}{}", template.root_fragment)
        };
        GraphIds {
            root,
            offer: format!("{page_url}#Offer"),
            product: format!("{page_url}#Product"),
            webpage: format!("{page_url}#WebPage"),
            faq: format!("{page_url}#FAQPage"),
            organization,
        }
    }
}

fn resolve_display_name(record: &IntermediateRecord, name: &str) -> Option<String> {
    non_empty(name).or_else(|| non_empty(&record.name))
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn build_root_node(
    record: &IntermediateRecord,
    template: &SchemaTemplate,
    name: &str,
    ids: &GraphIds,
) -> Result<JsonValue, Error> {
    let mut node = Map::new();
    node.insert("@type".to_string(), json!(template.root_type));
    node.insert("@id".to_string(), json!(ids.root));

    for spec in template.properties {
        match resolve_property(spec, record, name) {
            Some(value) => {
                node.insert(spec.name.to_string(), value);
            }
            None => {
                if let Some(fallback) = spec.fallback {
                    node.insert(spec.name.to_string(), json!(fallback));
                } else if spec.required {
                    return Err(Error::IncompleteSchema {
                        schema_type: template.schema_type.tag(),
                        property: spec.name,
                    });
                }
                // Optional with no fallback: omitted by rule.
            }
        }
    }

    if !template.properties.iter().any(|spec| spec.name == "url") {
        node.insert("url".to_string(), json!(record.url));
    }
    node.insert(
        "mainEntityOfPage".to_string(),
        json!({ "@id": ids.webpage }),
    );
    for link in template.org_links {
        node.insert(link.to_string(), json!({ "@id": ids.organization }));
    }
    if template.offer.is_some() {
        node.insert("offers".to_string(), json!({ "@id": ids.offer }));
    }

    Ok(JsonValue::Object(node))
}

fn resolve_property(
    spec: &PropertySpec,
    record: &IntermediateRecord,
    name: &str,
) -> Option<JsonValue> {
    let text = match spec.source {
        FieldSource::DisplayName => resolve_display_name(record, name),
        FieldSource::Description => record.description.clone(),
        FieldSource::PrimaryImage => record.images.first().cloned(),
        FieldSource::PageUrl => Some(record.url.clone()),
        FieldSource::Address => record.address.clone(),
        FieldSource::PriceHint => record.price_hint.clone(),
        FieldSource::BodyText => record.body_text.clone(),
        FieldSource::WordCount => {
            return record
                .body_text
                .as_ref()
                .map(|body| json!(body.split_whitespace().count()));
        }
    };
    text.filter(|value| !value.is_empty()).map(JsonValue::from)
}

fn build_faq_node(record: &IntermediateRecord, ids: &GraphIds) -> JsonValue {
    let entities: Vec<JsonValue> = record
        .faqs
        .iter()
        .map(|faq| {
            json!({
                "@type": "Question",
                "name": faq.question,
                "acceptedAnswer": { "@type": "Answer", "text": faq.answer },
            })
        })
        .collect();

    let mut node = Map::new();
    node.insert("@type".to_string(), json!("FAQPage"));
    node.insert("@id".to_string(), json!(ids.faq));
    node.insert("mainEntity".to_string(), JsonValue::Array(entities));
    JsonValue::Object(node)
}

fn build_webpage_node(
    record: &IntermediateRecord,
    ids: &GraphIds,
    display_name: &Option<String>,
) -> JsonValue {
    let mut node = Map::new();
    node.insert("@type".to_string(), json!("WebPage"));
    node.insert("@id".to_string(), json!(ids.webpage));
    node.insert("url".to_string(), json!(record.url));
    if let Some(name) = display_name {
        node.insert("name".to_string(), json!(name));
    }
    if let Some(description) = &record.description {
        node.insert("description".to_string(), json!(description));
    }
    node.insert("publisher".to_string(), json!({ "@id": ids.organization }));
    JsonValue::Object(node)
}

fn build_organization_node(
    record: &IntermediateRecord,
    ids: &GraphIds,
    display_name: &Option<String>,
) -> JsonValue {
    // Canonical page-supplied organization name wins over the display name.
    let org_name = record
        .organization_name
        .clone()
        .or_else(|| display_name.clone());

    let mut node = Map::new();
    node.insert("@type".to_string(), json!("Organization"));
    node.insert("@id".to_string(), json!(ids.organization));
    if let Some(name) = org_name {
        node.insert("name".to_string(), json!(name));
    }
    node.insert(
        "url".to_string(),
        json!(crate::url_utils::normalize_origin(&record.url)),
    );
    if let Some(logo) = record.images.first() {
        node.insert("logo".to_string(), json!(logo));
    }
    if let Some(address) = &record.address {
        node.insert("address".to_string(), json!(address));
    }
    JsonValue::Object(node)
}
