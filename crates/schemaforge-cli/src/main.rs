use std::env;
use std::process::ExitCode;

use anyhow::{Result, anyhow};
use serde_json::json;

use schemaforge_core::{SchemaType, generate_schema};

const APP_NAME: &str = "schemaforge";
const VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_SCHEMA_TYPE: &str = "organization";

struct CliOptions {
    url: String,
    name: String,
    schema_type: String,
    as_script: bool,
    schema_only: bool,
}

enum CliCommand {
    Run(CliOptions),
    Help,
    Version,
}

fn parse_arguments(args: &[String]) -> Result<CliCommand> {
    if args.is_empty() {
        return Ok(CliCommand::Help);
    }

    let mut positionals: Vec<String> = Vec::new();
    let mut schema_type: Option<String> = None;
    let mut as_script = false;
    let mut schema_only = false;
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];

        if matches!(arg.as_str(), "-h" | "--help") {
            return Ok(CliCommand::Help);
        }

        if matches!(arg.as_str(), "-v" | "--version") {
            return Ok(CliCommand::Version);
        }

        if arg == "--schema-type" {
            if schema_type.is_some() {
                return Err(anyhow!("--schema-type specified multiple times"));
            }
            let value = args
                .get(i + 1)
                .ok_or_else(|| anyhow!("--schema-type requires a value"))?;
            schema_type = Some(value.clone());
            i += 2;
            continue;
        }

        if let Some(value) = arg.strip_prefix("--schema-type=") {
            if schema_type.is_some() {
                return Err(anyhow!("--schema-type specified multiple times"));
            }
            schema_type = Some(value.to_string());
            i += 1;
            continue;
        }

        if arg == "--script" {
            as_script = true;
            i += 1;
            continue;
        }

        if arg == "--schema-only" {
            schema_only = true;
            i += 1;
            continue;
        }

        if arg.starts_with('-') {
            return Err(anyhow!("unknown flag: {arg}"));
        }

        positionals.push(arg.clone());
        i += 1;
    }

    let mut positionals = positionals.into_iter();
    let url = positionals
        .next()
        .ok_or_else(|| anyhow!("missing <url> argument"))?;
    let name = positionals
        .next()
        .ok_or_else(|| anyhow!("missing <name> argument"))?;
    if let Some(extra) = positionals.next() {
        return Err(anyhow!("unexpected additional argument: {extra}"));
    }

    Ok(CliCommand::Run(CliOptions {
        url,
        name,
        schema_type: schema_type.unwrap_or_else(|| DEFAULT_SCHEMA_TYPE.to_string()),
        as_script,
        schema_only,
    }))
}

fn print_help() {
    println!("{APP_NAME} — schema.org JSON-LD generator");
    println!("Usage: {APP_NAME} [OPTIONS] <URL> <NAME>\n");
    println!("Arguments:");
    println!("  <URL>                   Page to inspect");
    println!("  <NAME>                  Display name for the resource");
    println!("\nOptions:");
    println!("  --schema-type <TAG>     Schema type to generate (default: {DEFAULT_SCHEMA_TYPE})");
    println!("  --script                Emit an embeddable <script> tag instead of raw JSON");
    println!("  --schema-only           Emit only the schema.org graph, without metadata");
    println!("  -v, --version           Show version information");
    println!("  -h, --help              Show this help message");
    println!("\nSupported schema types:");
    for ty in SchemaType::ALL {
        println!("  {}", ty.tag());
    }
}

fn print_version() {
    println!("{APP_NAME} {VERSION}");
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let raw_args = env::args().skip(1).collect::<Vec<_>>();
    let options = match parse_arguments(&raw_args) {
        Ok(CliCommand::Help) => {
            print_help();
            return ExitCode::SUCCESS;
        }
        Ok(CliCommand::Version) => {
            print_version();
            return ExitCode::SUCCESS;
        }
        Ok(CliCommand::Run(options)) => options,
        Err(err) => {
            eprintln!("usage: {err}");
            return ExitCode::from(2);
        }
    };

    let result = match generate_schema(
        &options.url,
        &options.name,
        &options.schema_type,
        options.as_script,
    )
    .await
    {
        Ok(result) => result,
        Err(err) => {
            eprintln!("{}: {err}", err.kind());
            return ExitCode::FAILURE;
        }
    };

    if options.as_script {
        println!("{}", result.schema);
    } else if options.schema_only {
        println!("{}", result.schema);
    } else {
        let document = json!({
            "url": result.record.url,
            "name": options.name,
            "schema_type": result.schema_type,
            "extracted": result.record,
            "schema": result.graph,
        });
        match serde_json::to_string_pretty(&document) {
            Ok(rendered) => println!("{rendered}"),
            Err(err) => {
                eprintln!("serialize: {err}");
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
