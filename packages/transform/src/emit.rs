// Emit
//
// Printing of rewritten units and type erasure for runtime output.

use std::path::{Path, PathBuf};

use oxc_allocator::Allocator;
use oxc_ast::ast::Program;
use oxc_codegen::Codegen;
use oxc_parser::Parser;
use oxc_semantic::SemanticBuilder;
use oxc_span::SourceType;
use oxc_transformer::Transformer;

use crate::error::{TransformError, TransformResult};

/// Source type for a unit path. Unknown extensions are treated as TypeScript.
pub fn source_type_for(path: &str) -> SourceType {
    SourceType::from_path(path).unwrap_or_else(|_| SourceType::ts())
}

pub fn print(program: &Program<'_>) -> String {
    Codegen::new().build(program).code
}

/// Strip TypeScript syntax from `code`, producing plain JavaScript.
/// JavaScript and definition files are returned unchanged.
pub fn strip_types(code: &str, path: &str) -> TransformResult<String> {
    let source_type = source_type_for(path);
    if !source_type.is_typescript() || source_type.is_typescript_definition() {
        return Ok(code.to_string());
    }

    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, code, source_type).parse();
    if !ret.errors.is_empty() {
        return Err(TransformError::Emit {
            path: path.to_string(),
            messages: ret.errors.iter().map(|e| e.to_string()).collect(),
        });
    }
    let mut program = ret.program;

    let semantic = SemanticBuilder::new()
        .with_excess_capacity(0.0)
        .build(&program);
    let scoping = semantic.semantic.into_scoping();

    let options = oxc_transformer::TransformOptions::default();
    let ret = Transformer::new(&allocator, Path::new(path), &options)
        .build_with_scoping(scoping, &mut program);
    if !ret.errors.is_empty() {
        return Err(TransformError::Emit {
            path: path.to_string(),
            messages: ret.errors.iter().map(|e| e.to_string()).collect(),
        });
    }

    Ok(print(&program))
}

/// Path of the printed unit. TypeScript extensions map to their JavaScript
/// counterparts when types were stripped.
pub fn output_file_name(input: &Path, strip: bool) -> PathBuf {
    let name = input.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    if !strip || name.ends_with(".d.ts") {
        return input.to_path_buf();
    }
    for (from, to) in [(".tsx", ".js"), (".mts", ".mjs"), (".cts", ".cjs"), (".ts", ".js")] {
        if let Some(stem) = name.strip_suffix(from) {
            return input.with_file_name(format!("{}{}", stem, to));
        }
    }
    input.to_path_buf()
}
