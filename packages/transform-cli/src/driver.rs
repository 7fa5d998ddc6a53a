// Transform Driver
//
// Expands input patterns, transforms every unit in parallel and writes the
// results.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use internal_api_transform::emit::{output_file_name, strip_types};
use internal_api_transform::logging::Logger;
use internal_api_transform::{transform_source, ResolvedOptions};
use rayon::prelude::*;

/// Where and how outputs are written.
#[derive(Debug, Clone, Default)]
pub struct DriverSettings {
    /// Output root. Without one the single result goes to stdout.
    pub out_dir: Option<PathBuf>,
    /// Inputs are written below `out_dir` relative to this directory.
    pub base_dir: PathBuf,
    /// Keep TypeScript syntax in runtime output.
    pub keep_types: bool,
}

/// Result of one unit.
#[derive(Debug, Clone)]
pub struct UnitOutput {
    pub input: PathBuf,
    /// `None` when written to stdout.
    pub output: Option<PathBuf>,
    pub code: String,
    pub rewrites: usize,
}

/// Expand file paths and glob patterns. Plain paths must exist; patterns may
/// match nothing.
pub fn expand_inputs(patterns: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        if !pattern.contains(['*', '?', '[']) {
            let path = PathBuf::from(pattern);
            if !path.is_file() {
                anyhow::bail!("input file {} does not exist", pattern);
            }
            files.push(path);
            continue;
        }

        let paths = glob::glob(pattern)
            .with_context(|| format!("invalid glob pattern '{}'", pattern))?;
        for entry in paths {
            let path = entry?;
            if path.is_file() {
                files.push(path);
            }
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

/// Where `input` is written.
pub fn output_path(input: &Path, settings: &DriverSettings, strip: bool) -> Option<PathBuf> {
    let out_dir = settings.out_dir.as_ref()?;
    let relative = input
        .strip_prefix(&settings.base_dir)
        .ok()
        .filter(|rel| rel.is_relative() && !rel.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .or_else(|| input.file_name().map(PathBuf::from))
        .unwrap_or_else(|| input.to_path_buf());
    Some(output_file_name(&out_dir.join(relative), strip))
}

/// Transform one unit into its final text.
pub fn transform_file(
    input: &Path,
    options: &ResolvedOptions,
    settings: &DriverSettings,
    logger: &dyn Logger,
) -> anyhow::Result<UnitOutput> {
    let path = input.to_string_lossy();
    let source = fs::read_to_string(input)
        .with_context(|| format!("cannot read {}", input.display()))?;

    let output = transform_source(&source, &path, options, logger)
        .with_context(|| format!("cannot transform {}", input.display()))?;

    let strip = options.is_runtime() && !settings.keep_types;
    let code = if strip {
        strip_types(&output.code, &path)
            .with_context(|| format!("cannot emit {}", input.display()))?
    } else {
        output.code
    };

    Ok(UnitOutput {
        input: input.to_path_buf(),
        output: output_path(input, settings, strip),
        code,
        rewrites: output.rewrites.len(),
    })
}

/// Transform `files` in parallel and write the results.
///
/// Every unit is attempted. Failures are logged and reported together once
/// all units are done.
pub fn run(
    files: &[PathBuf],
    options: &ResolvedOptions,
    settings: &DriverSettings,
    logger: &dyn Logger,
) -> anyhow::Result<Vec<UnitOutput>> {
    if settings.out_dir.is_none() && files.len() > 1 {
        anyhow::bail!("{} inputs need an output directory", files.len());
    }

    let start = Instant::now();
    logger.info(&format!(
        "Transforming {} file(s) for {} output...",
        files.len(),
        options.output_artifact
    ));

    let results: Vec<anyhow::Result<UnitOutput>> = files
        .par_iter()
        .map(|input| -> anyhow::Result<UnitOutput> {
            let unit = transform_file(input, options, settings, logger)?;
            write_output(&unit)?;
            Ok(unit)
        })
        .collect();

    let mut outputs = Vec::with_capacity(results.len());
    let mut failures = 0usize;
    for result in results {
        match result {
            Ok(unit) => outputs.push(unit),
            Err(e) => {
                failures += 1;
                logger.error(&format!("{:#}", e));
            }
        }
    }

    logger.info(&format!("Transform finished in {:?}", start.elapsed()));
    if failures > 0 {
        anyhow::bail!("{} of {} file(s) failed", failures, files.len());
    }
    Ok(outputs)
}

fn write_output(unit: &UnitOutput) -> anyhow::Result<()> {
    let Some(path) = &unit.output else {
        print!("{}", unit.code);
        return Ok(());
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    fs::write(path, &unit.code).with_context(|| format!("cannot write {}", path.display()))
}
