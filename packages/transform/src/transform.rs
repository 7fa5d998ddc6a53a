// Unit Transform
//
// Runs one compilation unit through parsing, semantic analysis,
// classification, planning, rewriting and printing.

use oxc_allocator::Allocator;
use oxc_parser::Parser;
use oxc_semantic::SemanticBuilder;

use crate::classifier::{classify, InternalDeclaration};
use crate::config::ResolvedOptions;
use crate::emit;
use crate::error::{TransformError, TransformResult};
use crate::logging::Logger;
use crate::plan::{RewritePlans, Strategy};
use crate::rewriter::{RewriteRecord, Rewriter};

/// Result of transforming one unit.
#[derive(Debug, Clone)]
pub struct TransformOutput {
    /// The rewritten unit, types preserved.
    pub code: String,
    /// Every internal declaration found, rewritten or not.
    pub declarations: Vec<InternalDeclaration>,
    /// One entry per mangled declaration.
    pub rewrites: Vec<RewriteRecord>,
}

impl TransformOutput {
    pub fn is_unchanged(&self) -> bool {
        self.rewrites.is_empty()
    }
}

/// Transform `source`, read from `path`.
///
/// The path picks the language (TypeScript, JavaScript, definition file) and
/// labels errors. A unit without internal declarations is printed unchanged
/// apart from formatting.
pub fn transform_source(
    source: &str,
    path: &str,
    options: &ResolvedOptions,
    logger: &dyn Logger,
) -> TransformResult<TransformOutput> {
    let source_type = emit::source_type_for(path);
    if !options.is_runtime() && !source_type.is_typescript() {
        return Err(TransformError::InvalidConfig(format!(
            "{} is not a TypeScript unit and has no declarations to rewrite",
            path
        )));
    }

    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, source_type).parse();
    if !ret.errors.is_empty() {
        return Err(TransformError::Parse {
            path: path.to_string(),
            messages: ret.errors.iter().map(|e| e.to_string()).collect(),
        });
    }
    let mut program = ret.program;

    let semantic = SemanticBuilder::new()
        .with_excess_capacity(0.0)
        .build(&program);
    if !semantic.errors.is_empty() {
        return Err(TransformError::Semantic {
            path: path.to_string(),
            messages: semantic.errors.iter().map(|e| e.to_string()).collect(),
        });
    }
    let scoping = semantic.semantic.into_scoping();

    let declarations = classify(
        &program,
        source,
        source_type.is_typescript_definition(),
        options,
    )?;
    logger.debug(&format!(
        "{}: {} internal declaration(s)",
        path,
        declarations.len()
    ));
    for declaration in &declarations {
        logger.debug(&format!(
            "{}: @{} marks {} `{}`",
            path, declaration.matched_tag, declaration.kind, declaration.display_name
        ));
    }

    let plans = RewritePlans::build(&declarations, options);
    for plan in plans.passthrough() {
        if let Strategy::Passthrough(reason) = plan.strategy {
            logger.debug(&format!(
                "{}: leaving {} `{}` as is ({:?})",
                path, plan.kind, plan.display_name, reason
            ));
        }
    }

    let rewrites =
        Rewriter::new(&allocator, source, source_type, options, &scoping, &plans, logger)
            .rewrite(&mut program)?;
    for record in &rewrites {
        logger.info(&format!(
            "{}: `{}` -> `{}` ({} reference(s){})",
            path,
            record.display_name,
            record.mangled_name,
            record.references,
            if record.forwarded { ", forwarded" } else { "" }
        ));
    }

    Ok(TransformOutput {
        code: emit::print(&program),
        declarations,
        rewrites,
    })
}
