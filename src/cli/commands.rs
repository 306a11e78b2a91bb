use crate::broadcast::{Broadcaster, Consumer, Event};
use crate::config::ParserConfig;
use crate::diagnostics::Diagnostics;
use crate::ir::{Ir, IrSchema, LogicalOperator};
use crate::resolve::{parse_spec, resolve_document};
use crate::spec::load_document;
use anyhow::Context as _;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Command-line interface for openapi-ir
#[derive(Parser)]
#[command(name = "openapi-ir")]
#[command(about = "Resolve Swagger/OpenAPI documents into a version-agnostic IR", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a document and report the traversal events and diagnostics
    Inspect {
        /// Path to the Swagger/OpenAPI document (YAML or JSON)
        #[arg(short, long)]
        spec: PathBuf,

        /// Only resolve entities whose pointer matches this regex
        #[arg(long)]
        include: Option<String>,

        /// Skip entities whose pointer matches this regex
        #[arg(long)]
        exclude: Option<String>,

        /// YAML parser configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// URL the document is published at (repeatable)
        #[arg(long = "location")]
        locations: Vec<String>,

        /// Print the IR and diagnostics as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

/// Run a parsed command line, writing the report to `out`.
///
/// # Errors
///
/// Any fatal condition: unreadable files, an invalid filter, an unsupported
/// document version, a dangling `$ref`.
pub fn run_cli(cli: &Cli, out: &mut dyn Write) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Inspect {
            spec,
            include,
            exclude,
            config,
            locations,
            json,
        } => {
            let mut parser_config = match config {
                Some(path) => ParserConfig::from_file(path)?,
                None => ParserConfig::default(),
            }
            .with_env_overrides();
            if include.is_some() {
                parser_config.include = include.clone();
            }
            if exclude.is_some() {
                parser_config.exclude = exclude.clone();
            }
            parser_config.input_locations.extend(locations.iter().cloned());
            parser_config.input_locations.push(spec.display().to_string());

            let resolver_config = parser_config.compile().context("Invalid parser configuration")?;
            let document = load_document(spec)?;
            info!(spec = %spec.display(), "inspecting document");

            if *json {
                let resolution = resolve_document(&document, &resolver_config)
                    .with_context(|| format!("Failed to resolve {}", spec.display()))?;
                let report = JsonReport {
                    ir: &resolution.ir,
                    diagnostics: &resolution.diagnostics,
                };
                serde_json::to_writer_pretty(&mut *out, &report)?;
                writeln!(out)?;
                return Ok(());
            }

            let resolution = {
                let mut broadcaster = Broadcaster::new();
                broadcaster.register(EventPrinter::new(&mut *out));
                parse_spec(&document, &resolver_config, &mut broadcaster)
                    .with_context(|| format!("Failed to resolve {}", spec.display()))?
            };
            print_diagnostics(spec, &resolution.diagnostics, out)?;
            Ok(())
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    ir: &'a Ir,
    diagnostics: &'a Diagnostics,
}

fn print_diagnostics(
    spec: &Path,
    diagnostics: &Diagnostics,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    if diagnostics.is_empty() {
        writeln!(out, "{}: no diagnostics", spec.display())?;
        return Ok(());
    }
    writeln!(out, "{}: {} diagnostic(s)", spec.display(), diagnostics.len())?;
    for diagnostic in diagnostics {
        writeln!(out, "  {diagnostic}")?;
    }
    Ok(())
}

/// Consumer that writes one summary line per event.
pub struct EventPrinter<'w> {
    out: &'w mut dyn Write,
}

impl<'w> EventPrinter<'w> {
    pub fn new(out: &'w mut dyn Write) -> Self {
        EventPrinter { out }
    }
}

impl Consumer for EventPrinter<'_> {
    fn on_event(&mut self, event: &Event<'_>) -> anyhow::Result<()> {
        match event {
            Event::Before(ir) => writeln!(
                self.out,
                "before: {} schemas, {} parameters, {} request bodies, {} servers",
                ir.components.schemas.len(),
                ir.components.parameters.len(),
                ir.components.request_bodies.len(),
                ir.servers.len()
            )?,
            Event::Schema { name, schema } => writeln!(self.out, "schema {name}: {}", describe(schema))?,
            Event::Parameter { name, parameter } => writeln!(
                self.out,
                "parameter {name}: {} in {}",
                describe(&parameter.schema),
                parameter.location
            )?,
            Event::RequestBody { name, body } => writeln!(
                self.out,
                "requestBody {name}: {} ({})",
                describe(&body.schema),
                body.media_type.as_deref().unwrap_or("no content")
            )?,
            Event::Operation {
                path,
                method,
                operation,
            } => writeln!(
                self.out,
                "operation {} {path} -> {}",
                method.as_str().to_uppercase(),
                operation.id
            )?,
            Event::Webhook {
                name,
                method,
                operation,
            } => writeln!(
                self.out,
                "webhook {} {name} -> {}",
                method.as_str().to_uppercase(),
                operation.id
            )?,
            Event::After(ir) => writeln!(self.out, "after: {} operations", ir.operations().count())?,
        }
        Ok(())
    }
}

/// Short one-line rendering of a schema node.
fn describe(schema: &IrSchema) -> String {
    if let Some(reference) = &schema.reference {
        return format!("$ref {reference}");
    }
    match schema.logical_operator {
        Some(LogicalOperator::And) => format!("and[{}]", schema.items.len()),
        Some(LogicalOperator::Or) => format!("or[{}]", schema.items.len()),
        None => schema
            .schema_type
            .map_or_else(|| "unknown".to_string(), |t| t.to_string()),
    }
}
