//! The generation workflow: fetch → extract → assemble → serialize.

use tracing::{debug, info};

use crate::error::{Stage, WorkflowError};
use crate::fetch::{Fetcher, PageCache};
use crate::types::GenerationResult;
use crate::{extract, graph, serialize, template};

/// Generate a schema.org JSON-LD graph for `url`.
///
/// Sequences the pipeline stages and propagates component failures unchanged,
/// tagged with the stage that failed. Schema-type validation happens before
/// any network I/O.
pub async fn generate_schema(
    url: &str,
    name: &str,
    schema_type: &str,
    as_script: bool,
) -> Result<GenerationResult, WorkflowError> {
    let html = {
        let tpl = template::resolve(schema_type).map_err(WorkflowError::at(Stage::ResolveType))?;
        debug!(url, schema_type = tpl.schema_type.tag(), "starting generation");

        let fetcher = Fetcher::new().map_err(WorkflowError::at(Stage::Fetch))?;
        fetcher
            .fetch(url)
            .await
            .map_err(WorkflowError::at(Stage::Fetch))?
    };

    finish(url, name, schema_type, as_script, &html)
}

/// Like [`generate_schema`], but consults and fills a caller-supplied page
/// cache before going to the network.
pub async fn generate_schema_with_cache(
    url: &str,
    name: &str,
    schema_type: &str,
    as_script: bool,
    cache: &mut PageCache,
) -> Result<GenerationResult, WorkflowError> {
    template::resolve(schema_type).map_err(WorkflowError::at(Stage::ResolveType))?;

    if let Some(cached) = cache.get(url) {
        debug!(url, "serving page from cache");
        let cached = cached.to_string();
        return finish(url, name, schema_type, as_script, &cached);
    }

    let fetcher = Fetcher::new().map_err(WorkflowError::at(Stage::Fetch))?;
    let html = fetcher
        .fetch(url)
        .await
        .map_err(WorkflowError::at(Stage::Fetch))?;
    cache.insert(url, html.clone());

    finish(url, name, schema_type, as_script, &html)
}

/// Shared tail of the pipeline once raw content is in hand.
fn finish(
    url: &str,
    name: &str,
    schema_type: &str,
    as_script: bool,
    html: &str,
) -> Result<GenerationResult, WorkflowError> {
    // Already validated by the caller; re-resolving keeps this function
    // usable on its own and cannot fail differently.
    let tpl = template::resolve(schema_type).map_err(WorkflowError::at(Stage::ResolveType))?;

    let record = extract::extract(html, url).map_err(WorkflowError::at(Stage::Extract))?;
    let graph =
        graph::assemble(&record, tpl, name).map_err(WorkflowError::at(Stage::Assemble))?;

    let schema = if as_script {
        serialize::to_script_tag(&graph)
    } else {
        serialize::to_json(&graph)
    };

    info!(
        url,
        schema_type = tpl.schema_type.tag(),
        nodes = graph.nodes().len(),
        "generated schema graph"
    );

    Ok(GenerationResult {
        schema,
        graph,
        record,
        schema_type: tpl.schema_type,
    })
}
