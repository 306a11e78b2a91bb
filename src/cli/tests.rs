//! Unit tests for CLI commands

use crate::cli::{Cli, Commands};
use clap::Parser;

#[test]
fn test_inspect_command_exists() {
    let cli = Cli::try_parse_from(["openapi-ir", "inspect", "--spec", "test.yaml"]).unwrap();

    match cli.command {
        Commands::Inspect { spec, json, .. } => {
            assert_eq!(spec.to_string_lossy(), "test.yaml");
            assert!(!json);
        }
    }
}

#[test]
fn test_inspect_command_with_flags() {
    let cli = Cli::try_parse_from([
        "openapi-ir",
        "inspect",
        "--spec",
        "test.yaml",
        "--include",
        "^#/paths/pets",
        "--exclude",
        "^#/paths/admin",
        "--location",
        "https://api.example.com/openapi.yaml",
        "--json",
    ])
    .unwrap();

    let Commands::Inspect {
        include,
        exclude,
        locations,
        json,
        config,
        ..
    } = cli.command;
    assert_eq!(include.as_deref(), Some("^#/paths/pets"));
    assert_eq!(exclude.as_deref(), Some("^#/paths/admin"));
    assert_eq!(locations, vec!["https://api.example.com/openapi.yaml"]);
    assert!(json);
    assert!(config.is_none());
}

#[test]
fn test_spec_is_required() {
    assert!(Cli::try_parse_from(["openapi-ir", "inspect"]).is_err());
}
