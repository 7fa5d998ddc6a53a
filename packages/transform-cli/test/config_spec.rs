//! Config File Tests
//!
//! Plain option files and tsconfig plugin entries.

use internal_api_transform::{OutputArtifact, ResolvedOptions};
use internal_api_transform_cli::ConfigFile;

#[test]
fn should_read_a_plain_options_file() {
    let config = ConfigFile::parse(
        r#"{ "outputArtifact": "runtime", "internalPrefix": "_p_", "warnFunction": "log.warn" }"#,
    )
    .unwrap();
    assert_eq!(config.entries.len(), 1);

    let options = ResolvedOptions::resolve(&config.select(None)).unwrap();
    assert_eq!(options.output_artifact, OutputArtifact::Runtime);
    assert_eq!(options.internal_prefix, "_p_");
    assert_eq!(options.warn_function, "log.warn");
}

#[test]
fn should_read_tsconfig_plugin_entries() {
    let tsconfig = r#"{
        "compilerOptions": {
            "outDir": "lib",
            "plugins": [
                { "transform": "some-other-plugin" },
                { "transform": "transform-internal", "transformType": ".js" },
                { "transform": "transform-internal", "transformType": ".d.ts", "afterDeclarations": true }
            ]
        }
    }"#;
    let config = ConfigFile::parse(tsconfig).unwrap();
    assert_eq!(config.entries.len(), 2);

    let runtime = ResolvedOptions::resolve(&config.select(None)).unwrap();
    assert_eq!(runtime.output_artifact, OutputArtifact::Runtime);

    let declarations =
        ResolvedOptions::resolve(&config.select(Some(OutputArtifact::Declarations))).unwrap();
    assert_eq!(declarations.output_artifact, OutputArtifact::Declarations);
}

#[test]
fn tsconfig_without_entries_is_an_error() {
    let err = ConfigFile::parse(r#"{ "compilerOptions": { "plugins": [] } }"#).unwrap_err();
    assert!(err.to_string().contains("no plugin entry"));
}

#[test]
fn invalid_json_is_an_error() {
    assert!(ConfigFile::parse("{ outputArtifact: runtime }").is_err());
}

#[test]
fn missing_files_report_their_path() {
    let err = ConfigFile::load(std::path::Path::new("/nonexistent/internalize.json")).unwrap_err();
    assert!(format!("{:#}", err).contains("/nonexistent/internalize.json"));
}

#[test]
fn should_read_tsconfig_with_comments_and_trailing_commas() {
    let tsconfig = r#"{
        // Generated by tsc --init
        "compilerOptions": {
            /* Emit */
            "outDir": "lib", // build output
            "plugins": [
                {
                    "transform": "transform-internal",
                    "outputArtifact": "declarations",
                    "internalPrefix": "__hidden_",
                },
            ],
        },
    }"#;
    let config = ConfigFile::parse(tsconfig).unwrap();
    assert_eq!(config.entries.len(), 1);

    let options = ResolvedOptions::resolve(&config.select(None)).unwrap();
    assert_eq!(options.output_artifact, OutputArtifact::Declarations);
    assert_eq!(options.internal_prefix, "__hidden_");
}
