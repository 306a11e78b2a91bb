//! # CLI Module
//!
//! Command-line front end of the `openapi-ir` binary.
//!
//! ## Commands
//!
//! ### `inspect`
//!
//! Resolve a Swagger 2.0 / OpenAPI 3.x document and print one line per
//! traversal event, followed by the diagnostics:
//!
//! ```bash
//! openapi-ir inspect --spec openapi.yaml
//! ```
//!
//! Options:
//! - `--spec <FILE>` - Path to the document, YAML or JSON (required)
//! - `--include <REGEX>` - Only resolve entities whose pointer matches
//! - `--exclude <REGEX>` - Skip entities whose pointer matches
//! - `--config <FILE>` - YAML parser configuration
//! - `--location <URL>` - Where the document is published (server fallback)
//! - `--json` - Print the IR and diagnostics as JSON instead
//!
//! Flags win over `OPENAPI_IR_*` environment variables, which win over the
//! config file. Nothing is written to disk; stdout carries the report and
//! stderr the logs.
//!
//! ## Examples
//!
//! ```bash
//! # Only the public API
//! openapi-ir inspect --spec petstore.yaml --exclude '^#/paths/admin'
//!
//! # Feed the IR to another tool
//! openapi-ir inspect --spec petstore.yaml --json | jq '.ir.paths'
//! ```

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{run_cli, Cli, Commands, EventPrinter};
