/**
 * internalize
 *
 * Rewrites @internal declarations behind warning forwarders
 */
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::{Path, PathBuf};
use std::process;

use internal_api_transform::logging::{ConsoleLogger, LogLevel};
use internal_api_transform::{OutputArtifact, ResolvedOptions, TransformOptions};
use internal_api_transform_cli::{expand_inputs, run, ConfigFile, DriverSettings};

fn command() -> Command {
    Command::new("internalize")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Hide @internal declarations behind warning forwarders")
        .arg(
            Arg::new("inputs")
                .value_name("INPUT")
                .help("Files or glob patterns to transform")
                .num_args(1..)
                .required(true),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .help("JSON options file, or tsconfig.json with a plugin entry"),
        )
        .arg(
            Arg::new("artifact")
                .short('a')
                .long("artifact")
                .value_name("KIND")
                .help("runtime | declarations (overrides config)"),
        )
        .arg(
            Arg::new("prefix")
                .long("prefix")
                .value_name("PREFIX")
                .help("Prefix for mangled names"),
        )
        .arg(
            Arg::new("message")
                .long("message")
                .value_name("TEMPLATE")
                .help("Warning text; {{name}} is replaced with the declaration name"),
        )
        .arg(
            Arg::new("delete")
                .long("delete")
                .action(ArgAction::SetTrue)
                .help("Drop the public names instead of forwarding them"),
        )
        .arg(
            Arg::new("tag")
                .short('t')
                .long("tag")
                .value_name("TAG")
                .action(ArgAction::Append)
                .help("Documentation tag marking a declaration internal (repeatable)"),
        )
        .arg(
            Arg::new("warn-fn")
                .long("warn-fn")
                .value_name("EXPR")
                .help("Function called with the warning text"),
        )
        .arg(
            Arg::new("out-dir")
                .short('o')
                .long("out-dir")
                .value_name("DIR")
                .help("Write outputs here (stdout when absent)"),
        )
        .arg(
            Arg::new("keep-types")
                .long("keep-types")
                .action(ArgAction::SetTrue)
                .help("Keep TypeScript syntax in runtime output"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Log more (-vv for debug output)"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .action(ArgAction::SetTrue)
                .conflicts_with("verbose")
                .help("Only log errors"),
        )
}

fn log_level(matches: &ArgMatches) -> LogLevel {
    if matches.get_flag("quiet") {
        return LogLevel::Error;
    }
    match matches.get_count("verbose") {
        0 => LogLevel::Warn,
        1 => LogLevel::Info,
        _ => LogLevel::Debug,
    }
}

/// Options given on the command line. Unset flags leave the config alone.
fn overrides(matches: &ArgMatches) -> TransformOptions {
    let tags: Option<Vec<String>> = matches
        .get_many::<String>("tag")
        .map(|tags| tags.cloned().collect());
    TransformOptions {
        output_artifact: matches.get_one::<String>("artifact").cloned(),
        internal_prefix: matches.get_one::<String>("prefix").cloned(),
        message_template: matches.get_one::<String>("message").cloned(),
        delete_replacement: matches.get_flag("delete").then_some(true),
        internal_mark_tags: tags,
        warn_function: matches.get_one::<String>("warn-fn").cloned(),
    }
}

fn resolve_options(matches: &ArgMatches) -> anyhow::Result<ResolvedOptions> {
    let overrides = overrides(matches);
    let base = match matches.get_one::<String>("config") {
        Some(path) => {
            let config = ConfigFile::load(Path::new(path))?;
            let artifact = overrides
                .output_artifact
                .as_deref()
                .map(str::parse::<OutputArtifact>)
                .transpose()?;
            config.select(artifact)
        }
        None => TransformOptions::default(),
    };
    Ok(ResolvedOptions::resolve(&base.merge(overrides))?)
}

fn main() {
    let matches = command().get_matches();
    let logger = ConsoleLogger::new(log_level(&matches));

    let options = match resolve_options(&matches) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(2);
        }
    };

    let patterns: Vec<String> = matches
        .get_many::<String>("inputs")
        .map(|inputs| inputs.cloned().collect())
        .unwrap_or_default();
    let files = match expand_inputs(&patterns) {
        Ok(files) if files.is_empty() => {
            eprintln!("Error: no input files matched");
            process::exit(2);
        }
        Ok(files) => files,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(2);
        }
    };

    let settings = DriverSettings {
        out_dir: matches.get_one::<String>("out-dir").map(PathBuf::from),
        base_dir: std::env::current_dir().unwrap_or_default(),
        keep_types: matches.get_flag("keep-types"),
    };

    if let Err(e) = run(&files, &options, &settings, &logger) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_is_well_formed() {
        command().debug_assert();
    }

    #[test]
    fn flags_override_options() {
        let matches = command().get_matches_from([
            "internalize", "-a", ".d.ts", "--prefix", "_x_", "-t", "internal", "-t", "@hidden",
            "--delete", "a.ts",
        ]);
        let options = ResolvedOptions::resolve(&overrides(&matches)).unwrap();
        assert_eq!(options.output_artifact, OutputArtifact::Declarations);
        assert_eq!(options.internal_prefix, "_x_");
        assert!(options.delete_replacement);
        assert!(options.is_mark_tag("hidden"));
    }

    #[test]
    fn verbosity_maps_to_levels() {
        let matches = command().get_matches_from(["internalize", "-vv", "a.ts"]);
        assert_eq!(log_level(&matches), LogLevel::Debug);
        let matches = command().get_matches_from(["internalize", "-q", "a.ts"]);
        assert_eq!(log_level(&matches), LogLevel::Error);
    }
}
