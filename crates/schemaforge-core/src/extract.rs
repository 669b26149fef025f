//! Content extraction: raw markup in, normalized [`IntermediateRecord`] out.
//!
//! Extraction degrades per field: a page missing a title, description, or
//! images yields empty/`None` fields. Only content that is not markup at all
//! raises [`Error::Extraction`].

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value as JsonValue;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::types::{Faq, IntermediateRecord};

/// Upper bound on collected image URLs.
const MAX_IMAGES: usize = 8;

/// Elements that can introduce an FAQ question outside `<details>` markup.
const FAQ_HEADING_TAGS: &[&str] = &["h2", "h3", "button"];

static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("invalid whitespace regex"));

static SELECTORS: Lazy<Selectors> = Lazy::new(Selectors::new);

struct Selectors {
    title: Selector,
    meta: Selector,
    img: Selector,
    script: Selector,
    address: Selector,
    itemprop_price: Selector,
    details: Selector,
    summary: Selector,
    faq_heading: Selector,
    body_candidates: Vec<Selector>,
}

impl Selectors {
    fn new() -> Self {
        let parse = |css: &str| Selector::parse(css).expect("invalid static selector");
        Selectors {
            title: parse("title"),
            meta: parse("meta"),
            img: parse("img[src]"),
            script: parse("script"),
            address: parse("address"),
            itemprop_price: parse("[itemprop=price]"),
            details: parse("details"),
            summary: parse("summary"),
            faq_heading: parse(&FAQ_HEADING_TAGS.join(", ")),
            body_candidates: vec![
                parse("article"),
                parse("main"),
                parse("[role=main]"),
                parse("body"),
            ],
        }
    }
}

/// Parse `raw_content` into a normalized record.
///
/// `url` is the page the content came from; relative image URLs are resolved
/// against it.
pub fn extract(raw_content: &str, url: &str) -> Result<IntermediateRecord, Error> {
    if raw_content.trim().is_empty() {
        return Err(Error::Extraction {
            reason: "empty content".to_string(),
        });
    }
    if !raw_content.contains('<') {
        return Err(Error::Extraction {
            reason: "no markup tags present".to_string(),
        });
    }

    let document = Html::parse_document(raw_content);
    let base = Url::parse(url).ok();

    let name = page_name(&document);
    let description = first_non_empty(&[
        meta_named(&document, "description"),
        meta_property(&document, "og:description"),
    ]);
    let images = collect_images(&document, base.as_ref());
    let organization_name = first_non_empty(&[
        json_ld_organization_name(&document),
        meta_property(&document, "og:site_name"),
        meta_named(&document, "application-name"),
    ]);
    let address = document
        .select(&SELECTORS.address)
        .map(|el| clean_text(&el.text().collect::<String>()))
        .find(|text| !text.is_empty());
    let price_hint = price_hint(&document);
    let faqs = extract_faqs(&document);
    let body_text = extract_body_text(&document);

    debug!(
        url,
        images = images.len(),
        faqs = faqs.len(),
        has_description = description.is_some(),
        "extracted page record"
    );

    Ok(IntermediateRecord {
        url: url.to_string(),
        name,
        description,
        images,
        organization_name,
        address,
        price_hint,
        faqs,
        body_text,
    })
}

/// Normalize whitespace and invisible characters in scraped text.
pub fn clean_text(value: &str) -> String {
    let replaced = value.replace('\u{a0}', " ").replace('\u{200b}', "");
    WHITESPACE_RE.replace_all(&replaced, " ").trim().to_string()
}

fn first_non_empty(candidates: &[Option<String>]) -> Option<String> {
    candidates
        .iter()
        .flatten()
        .find(|value| !value.is_empty())
        .cloned()
}

fn meta_content(document: &Html, attr: &str, value: &str) -> Option<String> {
    document
        .select(&SELECTORS.meta)
        .find(|el| el.value().attr(attr) == Some(value))
        .and_then(|el| el.value().attr("content"))
        .map(clean_text)
        .filter(|content| !content.is_empty())
}

fn meta_named(document: &Html, name: &str) -> Option<String> {
    meta_content(document, "name", name)
}

fn meta_property(document: &Html, property: &str) -> Option<String> {
    meta_content(document, "property", property)
}

/// og:title wins over the `<title>` element.
fn page_name(document: &Html) -> String {
    if let Some(og_title) = meta_property(document, "og:title") {
        return og_title;
    }
    document
        .select(&SELECTORS.title)
        .next()
        .map(|el| clean_text(&el.text().collect::<String>()))
        .unwrap_or_default()
}

fn resolve_image(src: &str, base: Option<&Url>) -> Option<String> {
    let src = src.trim();
    if src.is_empty() || src.starts_with("data:") {
        return None;
    }
    match base {
        Some(base) => base.join(src).ok().map(String::from),
        None => Some(src.to_string()),
    }
}

/// og:image first, then `<img>` sources in document order, deduplicated and
/// capped at [`MAX_IMAGES`].
fn collect_images(document: &Html, base: Option<&Url>) -> Vec<String> {
    let mut images: Vec<String> = Vec::new();

    let push = |candidate: Option<String>, images: &mut Vec<String>| {
        if let Some(resolved) = candidate {
            if images.len() < MAX_IMAGES && !images.contains(&resolved) {
                images.push(resolved);
            }
        }
    };

    if let Some(og_image) = meta_property(document, "og:image") {
        push(resolve_image(&og_image, base), &mut images);
    }

    for img in document.select(&SELECTORS.img) {
        if images.len() >= MAX_IMAGES {
            break;
        }
        if let Some(src) = img.value().attr("src") {
            push(resolve_image(src, base), &mut images);
        }
    }

    images
}

/// Organization name from JSON-LD already on the page. Page-supplied
/// canonical data wins ties against inferred meta signals.
fn json_ld_organization_name(document: &Html) -> Option<String> {
    for script in document.select(&SELECTORS.script) {
        // Matches variations like "application/ld+json; charset=utf-8".
        let script_type = script
            .value()
            .attr("type")
            .map(|t| t.trim().to_ascii_lowercase())
            .unwrap_or_default();
        if !script_type.contains("ld+json") {
            continue;
        }
        let raw = script.text().collect::<String>();
        let Ok(parsed) = serde_json::from_str::<JsonValue>(raw.trim()) else {
            continue;
        };
        if let Some(name) = organization_name_in(&parsed) {
            return Some(name);
        }
    }
    None
}

fn organization_name_in(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Object(object) => {
            if has_type(object.get("@type"), "Organization") {
                if let Some(name) = object.get("name").and_then(JsonValue::as_str) {
                    let name = clean_text(name);
                    if !name.is_empty() {
                        return Some(name);
                    }
                }
            }
            object
                .get("@graph")
                .and_then(organization_name_in)
                .or_else(|| {
                    object
                        .values()
                        .filter(|nested| nested.is_object() || nested.is_array())
                        .find_map(organization_name_in)
                })
        }
        JsonValue::Array(items) => items.iter().find_map(organization_name_in),
        _ => None,
    }
}

fn has_type(type_value: Option<&JsonValue>, target: &str) -> bool {
    match type_value {
        Some(JsonValue::String(s)) => s == target,
        Some(JsonValue::Array(items)) => items.iter().any(|item| item.as_str() == Some(target)),
        _ => false,
    }
}

fn price_hint(document: &Html) -> Option<String> {
    if let Some(price) = meta_property(document, "product:price:amount") {
        return Some(price);
    }
    document.select(&SELECTORS.itemprop_price).find_map(|el| {
        let value = el
            .value()
            .attr("content")
            .map(clean_text)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| clean_text(&el.text().collect::<String>()));
        (!value.is_empty()).then_some(value)
    })
}

/// `<details><summary>` pairs first, then a generic heading/button-with-`?`
/// heuristic; duplicates dropped.
fn extract_faqs(document: &Html) -> Vec<Faq> {
    let mut faqs: Vec<Faq> = Vec::new();

    for details in document.select(&SELECTORS.details) {
        let Some(summary) = details.select(&SELECTORS.summary).next() else {
            continue;
        };
        let question = clean_text(&summary.text().collect::<String>());
        let answer = details_answer_text(details);
        push_faq(&mut faqs, question, answer);
    }

    if faqs.is_empty() {
        for heading in document.select(&SELECTORS.faq_heading) {
            let question = clean_text(&heading.text().collect::<String>());
            if question.is_empty() || !question.contains('?') {
                continue;
            }
            let answer = next_sibling_text(heading);
            push_faq(&mut faqs, question, answer);
        }
    }

    faqs
}

fn push_faq(faqs: &mut Vec<Faq>, question: String, answer: String) {
    if question.is_empty() || answer.is_empty() {
        return;
    }
    let faq = Faq { question, answer };
    if !faqs.contains(&faq) {
        faqs.push(faq);
    }
}

/// Text of a `<details>` panel with the `<summary>` label excluded.
fn details_answer_text(details: ElementRef<'_>) -> String {
    let mut chunks = Vec::new();
    for child in details.children() {
        if let Some(element) = ElementRef::wrap(child) {
            if element.value().name() == "summary" {
                continue;
            }
            let text = clean_text(&element.text().collect::<String>());
            if !text.is_empty() {
                chunks.push(text);
            }
        } else if let Some(text) = child.value().as_text() {
            let text = clean_text(text);
            if !text.is_empty() {
                chunks.push(text);
            }
        }
    }
    chunks.join(" ")
}

/// Text of the element following a question heading. Another question
/// heading in that position means the question has no inline answer, so the
/// caller drops it instead of pairing it with the next question's answer.
fn next_sibling_text(element: ElementRef<'_>) -> String {
    match element.next_siblings().find_map(ElementRef::wrap) {
        Some(sibling) if !FAQ_HEADING_TAGS.contains(&sibling.value().name()) => {
            clean_text(&sibling.text().collect::<String>())
        }
        _ => String::new(),
    }
}

// Elements whose text never belongs in the flattened body.
const BODY_KILL_LIST: &[&str] = &[
    "script", "style", "noscript", "template", "svg", "canvas", "iframe", "form", "button",
    "select", "input", "textarea", "header", "footer", "nav",
];

/// Flatten the main content region to a single-line cleaned string.
fn extract_body_text(document: &Html) -> Option<String> {
    for selector in &SELECTORS.body_candidates {
        if let Some(candidate) = document.select(selector).next() {
            let mut out = String::new();
            collect_visible_text(candidate, &mut out);
            let text = clean_text(&out);
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

fn collect_visible_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(nested) = ElementRef::wrap(child) {
            if BODY_KILL_LIST.contains(&nested.value().name()) {
                continue;
            }
            collect_visible_text(nested, out);
        } else if let Some(text) = child.value().as_text() {
            out.push_str(text);
            out.push(' ');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://example.com/card";

    #[test]
    fn og_title_wins_over_title_element() {
        let html = r#"
            <html><head>
                <title>Plain Title</title>
                <meta property="og:title" content="Preferred Title">
            </head><body></body></html>
        "#;
        let record = extract(html, URL).unwrap();
        assert_eq!(record.name, "Preferred Title");
    }

    #[test]
    fn falls_back_to_title_element() {
        let html = "<html><head><title>  Example Card – Apply Now </title></head></html>";
        let record = extract(html, URL).unwrap();
        assert_eq!(record.name, "Example Card – Apply Now");
    }

    #[test]
    fn meta_description_wins_over_og_description() {
        let html = r#"
            <head>
                <meta name="description" content="Meta description">
                <meta property="og:description" content="OG description">
            </head>
        "#;
        let record = extract(html, URL).unwrap();
        assert_eq!(record.description.as_deref(), Some("Meta description"));
    }

    #[test]
    fn missing_fields_yield_none_not_errors() {
        let html = "<html><body><p>Nothing else here</p></body></html>";
        let record = extract(html, URL).unwrap();
        assert_eq!(record.name, "");
        assert!(record.description.is_none());
        assert!(record.images.is_empty());
        assert!(record.organization_name.is_none());
        assert!(record.address.is_none());
        assert!(record.price_hint.is_none());
        assert!(record.faqs.is_empty());
    }

    #[test]
    fn empty_content_is_an_extraction_error() {
        let err = extract("   ", URL).unwrap_err();
        assert_eq!(err.kind(), "extraction");
    }

    #[test]
    fn tagless_content_is_an_extraction_error() {
        let err = extract("just some plain text, no markup", URL).unwrap_err();
        assert_eq!(err.kind(), "extraction");
    }

    #[test]
    fn images_are_resolved_deduplicated_and_bounded() {
        let mut html = String::from(
            r#"<head><meta property="og:image" content="/hero.png"></head><body>"#,
        );
        for index in 0..12 {
            html.push_str(&format!(r#"<img src="/img/{index}.png">"#));
        }
        // Duplicate of the og:image.
        html.push_str(r#"<img src="https://example.com/hero.png">"#);
        html.push_str("</body>");

        let record = extract(&html, URL).unwrap();
        assert_eq!(record.images.len(), MAX_IMAGES);
        assert_eq!(record.images[0], "https://example.com/hero.png");
        assert_eq!(record.images[1], "https://example.com/img/0.png");
        assert_eq!(
            record
                .images
                .iter()
                .filter(|url| url.as_str() == "https://example.com/hero.png")
                .count(),
            1
        );
    }

    #[test]
    fn data_uris_are_skipped() {
        let html = r#"<body><img src="data:image/gif;base64,AAAA"><img src="/real.png"></body>"#;
        let record = extract(html, URL).unwrap();
        assert_eq!(record.images, vec!["https://example.com/real.png"]);
    }

    #[test]
    fn json_ld_organization_wins_over_site_name() {
        let html = r#"
            <head>
                <meta property="og:site_name" content="Inferred Name">
                <script type="application/ld+json">
                {"@context": "https://schema.org", "@graph": [
                    {"@type": "WebSite", "name": "Site"},
                    {"@type": "Organization", "name": "Canonical Org"}
                ]}
                </script>
            </head>
        "#;
        let record = extract(html, URL).unwrap();
        assert_eq!(record.organization_name.as_deref(), Some("Canonical Org"));
    }

    #[test]
    fn site_name_used_when_no_json_ld_org() {
        let html = r#"<head><meta property="og:site_name" content="Example Inc"></head>"#;
        let record = extract(html, URL).unwrap();
        assert_eq!(record.organization_name.as_deref(), Some("Example Inc"));
    }

    #[test]
    fn malformed_json_ld_is_ignored() {
        let html = r#"
            <head>
                <script type="application/ld+json">{not valid json</script>
                <meta name="application-name" content="App Name">
            </head>
        "#;
        let record = extract(html, URL).unwrap();
        assert_eq!(record.organization_name.as_deref(), Some("App Name"));
    }

    #[test]
    fn address_and_price_hint_are_collected() {
        let html = r#"
            <head><meta property="product:price:amount" content="19.99"></head>
            <body><address>1 Main St,
                Springfield</address></body>
        "#;
        let record = extract(html, URL).unwrap();
        assert_eq!(record.address.as_deref(), Some("1 Main St, Springfield"));
        assert_eq!(record.price_hint.as_deref(), Some("19.99"));
    }

    #[test]
    fn itemprop_price_is_a_fallback() {
        let html = r#"<body><span itemprop="price" content="42.00">$42.00</span></body>"#;
        let record = extract(html, URL).unwrap();
        assert_eq!(record.price_hint.as_deref(), Some("42.00"));
    }

    #[test]
    fn faqs_from_details_elements() {
        let html = r#"
            <body>
                <details>
                    <summary>What does it cost?</summary>
                    <p>Nothing at all.</p>
                </details>
                <details>
                    <summary>What does it cost?</summary>
                    <p>Nothing at all.</p>
                </details>
            </body>
        "#;
        let record = extract(html, URL).unwrap();
        assert_eq!(record.faqs.len(), 1);
        assert_eq!(record.faqs[0].question, "What does it cost?");
        assert_eq!(record.faqs[0].answer, "Nothing at all.");
    }

    #[test]
    fn faqs_from_heading_heuristic() {
        let html = r#"
            <body>
                <h3>How do I apply?</h3>
                <p>Fill in the online form.</p>
                <h3>Not a question at all</h3>
                <p>Ignored.</p>
            </body>
        "#;
        let record = extract(html, URL).unwrap();
        assert_eq!(record.faqs.len(), 1);
        assert_eq!(record.faqs[0].question, "How do I apply?");
        assert_eq!(record.faqs[0].answer, "Fill in the online form.");
    }

    #[test]
    fn consecutive_question_headings_do_not_answer_each_other() {
        let html = r#"
            <body>
                <h2>What does it cost?</h2>
                <h2>Is it available everywhere?</h2>
                <p>Yes, in every region.</p>
            </body>
        "#;
        let record = extract(html, URL).unwrap();
        // The first heading has no inline answer: it must be dropped, not
        // paired with the second heading or its answer.
        assert_eq!(record.faqs.len(), 1);
        assert_eq!(record.faqs[0].question, "Is it available everywhere?");
        assert_eq!(record.faqs[0].answer, "Yes, in every region.");
    }

    #[test]
    fn body_text_prefers_article_and_strips_chrome() {
        let html = r#"
            <body>
                <nav>Navigation links</nav>
                <article>
                    Real   content
                    <script>ignored()</script>
                    <footer>page footer</footer>
                    continues here.
                </article>
            </body>
        "#;
        let record = extract(html, URL).unwrap();
        let body = record.body_text.unwrap();
        assert_eq!(body, "Real content continues here.");
    }

    #[test]
    fn clean_text_collapses_whitespace() {
        assert_eq!(clean_text("  a\u{a0}\n\t b \u{200b}c "), "a b c");
    }
}
