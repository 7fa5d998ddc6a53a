//! Shared Test Helpers
//!
//! Option presets, a transform shortcut and a warning-call counter that
//! inspects printed output with the same parser the transform uses.

#![allow(dead_code)]

use internal_api_transform::logging::NullLogger;
use internal_api_transform::{
    transform_source, OutputArtifact, ResolvedOptions, TransformError, TransformOutput,
};
use oxc_allocator::Allocator;
use oxc_ast::ast::*;
use oxc_ast_visit::{walk, Visit};
use oxc_parser::Parser;
use oxc_span::SourceType;

pub fn runtime() -> ResolvedOptions {
    ResolvedOptions::new(OutputArtifact::Runtime)
}

pub fn declarations() -> ResolvedOptions {
    ResolvedOptions::new(OutputArtifact::Declarations)
}

pub fn transform(source: &str, path: &str, options: &ResolvedOptions) -> TransformOutput {
    transform_source(source, path, options, &NullLogger)
        .unwrap_or_else(|e| panic!("transform of {} failed: {}", path, e))
}

pub fn transform_err(source: &str, path: &str, options: &ResolvedOptions) -> TransformError {
    match transform_source(source, path, options, &NullLogger) {
        Ok(output) => panic!("expected an error, got:\n{}", output.code),
        Err(e) => e,
    }
}

pub fn fixture(name: &str) -> String {
    let path = format!("{}/test/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("cannot read {}: {}", path, e))
}

/// Calls to `console.warn` in printed output.
#[derive(Debug, Default)]
pub struct WarnCalls {
    /// Calls that run when the module is evaluated.
    pub top_level: usize,
    /// Calls inside some function body.
    pub nested: usize,
}

pub fn warn_calls(code: &str, path: &str) -> WarnCalls {
    let allocator = Allocator::default();
    let source_type = SourceType::from_path(path).unwrap_or_else(|_| SourceType::ts());
    let ret = Parser::new(&allocator, code, source_type).parse();
    assert!(ret.errors.is_empty(), "output does not parse:\n{}", code);

    let mut counter = WarnCounter::default();
    counter.visit_program(&ret.program);
    counter.calls
}

#[derive(Default)]
struct WarnCounter {
    depth: usize,
    calls: WarnCalls,
}

impl<'a> Visit<'a> for WarnCounter {
    fn visit_function_body(&mut self, it: &FunctionBody<'a>) {
        self.depth += 1;
        walk::walk_function_body(self, it);
        self.depth -= 1;
    }

    fn visit_call_expression(&mut self, it: &CallExpression<'a>) {
        if let Expression::StaticMemberExpression(member) = &it.callee {
            let is_console = matches!(&member.object, Expression::Identifier(id) if id.name.as_str() == "console");
            if is_console && member.property.name.as_str() == "warn" {
                if self.depth == 0 {
                    self.calls.top_level += 1;
                } else {
                    self.calls.nested += 1;
                }
            }
        }
        walk::walk_call_expression(self, it);
    }
}

/// Source of the function declared as `function name(`, braces included.
pub fn function_source<'c>(code: &'c str, name: &str) -> &'c str {
    let header = format!("function {}(", name);
    let start = code
        .find(&header)
        .unwrap_or_else(|| panic!("no function {} in:\n{}", name, code));
    let open = start + code[start..].find('{').expect("function has a body");

    let mut depth = 0usize;
    for (offset, c) in code[open..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return &code[start..open + offset + 1];
                }
            }
            _ => {}
        }
    }
    panic!("unbalanced body for {}", name)
}
