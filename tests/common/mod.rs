#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use openapi_ir::config::ParserConfig;
use openapi_ir::resolve::{resolve_document, Resolution};
use openapi_ir::spec::parse_document;
use openapi_ir::ResolveError;

/// Resolve an inline YAML/JSON document with the default configuration.
pub fn resolve_yaml(content: &str) -> Resolution {
    resolve_with(content, &ParserConfig::default())
}

/// Resolve an inline YAML/JSON document with `config`.
pub fn resolve_with(content: &str, config: &ParserConfig) -> Resolution {
    try_resolve_with(content, config).expect("document should resolve")
}

/// Resolve, keeping the fatal error for inspection.
pub fn try_resolve(content: &str) -> Result<Resolution, ResolveError> {
    try_resolve_with(content, &ParserConfig::default())
}

pub fn try_resolve_with(content: &str, config: &ParserConfig) -> Result<Resolution, ResolveError> {
    let document = parse_document(content).expect("document should parse");
    let config = config.compile()?;
    resolve_document(&document, &config)
}

/// Configuration with only an exclude filter set.
pub fn excluding(pattern: &str) -> ParserConfig {
    ParserConfig {
        exclude: Some(pattern.to_string()),
        ..ParserConfig::default()
    }
}

pub mod temp_files {
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Write `content` to a fresh temporary file ending in `.{ext}`.
    ///
    /// The file is removed when the returned handle is dropped.
    pub fn create_temp_spec(content: &str, ext: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .prefix("openapi_ir_test_")
            .suffix(&format!(".{ext}"))
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    /// Creates a temporary file with yaml extension
    pub fn create_temp_yaml(content: &str) -> NamedTempFile {
        create_temp_spec(content, "yaml")
    }

    /// Creates a temporary file with json extension
    pub fn create_temp_json(content: &str) -> NamedTempFile {
        create_temp_spec(content, "json")
    }
}
