//! # Parser Configuration
//!
//! [`ParserConfig`] is the user-facing configuration for one resolution run.
//! It can be written in YAML, built in code, and overridden from environment
//! variables. [`ParserConfig::compile`] turns it into the immutable
//! [`ResolverConfig`] the engine reads, with every pattern already compiled.
//!
//! ## YAML
//!
//! ```yaml
//! include: "^#/(components/schemas|paths/pets)"
//! exclude: "^#/paths/admin"
//! pagination:
//!   keywords: [after, before, cursor, offset, page, start]
//! input_locations:
//!   - https://api.example.com/openapi.json
//! ```
//!
//! ## Environment Variables
//!
//! ### `OPENAPI_IR_INCLUDE` / `OPENAPI_IR_EXCLUDE`
//!
//! Replace the include/exclude filter. Filters are plain regular expressions
//! tested against entity pointers:
//!
//! - `#/components/schemas/{name}`
//! - `#/components/parameters/{name}`
//! - `#/components/requestBodies/{name}`
//! - `#/paths{path}/{method}`
//!
//! Exclude wins when both match.
//!
//! ### `OPENAPI_IR_PAGINATION_KEYWORDS`
//!
//! Comma-separated keyword list replacing the pagination keywords, e.g.
//! `cursor,page,offset`. A name is a pagination hint when it starts with one
//! of the keywords.
//!
//! ## Usage
//!
//! ```rust
//! use openapi_ir::config::ParserConfig;
//!
//! let config = ParserConfig::from_yaml_str("exclude: '^#/paths/admin'")
//!     .unwrap()
//!     .with_env_overrides()
//!     .compile()
//!     .unwrap();
//! assert!(!config.is_included("#/paths/admin/users/get"));
//! ```

use crate::error::ResolveError;
use anyhow::Context as _;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Keywords a pagination parameter or field name starts with, unless configured otherwise.
pub const DEFAULT_PAGINATION_KEYWORDS: [&str; 6] = ["after", "before", "cursor", "offset", "page", "start"];

static DEFAULT_KEYWORD_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new("^(after|before|cursor|offset|page|start)")
        .expect("default pagination keyword regex should be valid")
});

/// User-facing configuration for one resolution run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Only entities whose pointer matches are resolved
    pub include: Option<String>,
    /// Entities whose pointer matches are skipped (wins over `include`)
    pub exclude: Option<String>,
    /// Pagination heuristic tuning
    pub pagination: PaginationConfig,
    /// Where the document was read from; used only for server URL fallback
    pub input_locations: Vec<String>,
}

/// Pagination heuristic tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Name prefixes that mark a parameter or field as a pagination control
    pub keywords: Vec<String>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        PaginationConfig {
            keywords: DEFAULT_PAGINATION_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            include: None,
            exclude: None,
            pagination: PaginationConfig::default(),
            input_locations: Vec::new(),
        }
    }
}

impl ParserConfig {
    /// Parse a YAML configuration document.
    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(content).context("Failed to parse parser configuration")?;
        Ok(config)
    }

    /// Read a YAML configuration file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&content)
    }

    /// Apply `OPENAPI_IR_*` environment overrides.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| env::var(key).ok())
    }

    /// Apply overrides read through `lookup` (same keys as the environment).
    #[must_use]
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(include) = lookup("OPENAPI_IR_INCLUDE").filter(|v| !v.is_empty()) {
            self.include = Some(include);
        }
        if let Some(exclude) = lookup("OPENAPI_IR_EXCLUDE").filter(|v| !v.is_empty()) {
            self.exclude = Some(exclude);
        }
        if let Some(keywords) = lookup("OPENAPI_IR_PAGINATION_KEYWORDS") {
            let keywords: Vec<String> = keywords
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string)
                .collect();
            if !keywords.is_empty() {
                self.pagination.keywords = keywords;
            }
        }
        self
    }

    /// Compile every pattern.
    pub fn compile(&self) -> Result<ResolverConfig, ResolveError> {
        Ok(ResolverConfig {
            include: self.include.as_deref().map(compile_pattern).transpose()?,
            exclude: self.exclude.as_deref().map(compile_pattern).transpose()?,
            pagination_keywords: keyword_pattern(&self.pagination.keywords)?,
            input_locations: self.input_locations.clone(),
        })
    }
}

fn compile_pattern(pattern: &str) -> Result<Regex, ResolveError> {
    Regex::new(pattern).map_err(|source| ResolveError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

fn keyword_pattern(keywords: &[String]) -> Result<Option<Regex>, ResolveError> {
    if keywords.is_empty() {
        return Ok(None);
    }
    let alternatives: Vec<String> = keywords.iter().map(|k| regex::escape(k)).collect();
    compile_pattern(&format!("^({})", alternatives.join("|"))).map(Some)
}

/// Compiled, immutable configuration read by the engine.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    include: Option<Regex>,
    exclude: Option<Regex>,
    pagination_keywords: Option<Regex>,
    input_locations: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            include: None,
            exclude: None,
            pagination_keywords: Some(DEFAULT_KEYWORD_REGEX.clone()),
            input_locations: Vec::new(),
        }
    }
}

impl ResolverConfig {
    /// Whether the entity at `pointer` should be resolved.
    #[must_use]
    pub fn is_included(&self, pointer: &str) -> bool {
        if self.exclude.as_ref().is_some_and(|re| re.is_match(pointer)) {
            return false;
        }
        self.include.as_ref().map_or(true, |re| re.is_match(pointer))
    }

    /// Whether `name` looks like a pagination control.
    #[must_use]
    pub fn is_pagination_keyword(&self, name: &str) -> bool {
        self.pagination_keywords
            .as_ref()
            .is_some_and(|re| re.is_match(name))
    }

    /// Raw input locations of the document.
    #[must_use]
    pub fn input_locations(&self) -> &[String] {
        &self.input_locations
    }

    /// Replace the input locations.
    #[must_use]
    pub fn with_input_locations(mut self, locations: Vec<String>) -> Self {
        self.input_locations = locations;
        self
    }
}
