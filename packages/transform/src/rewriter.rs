// Reference Rewriter
//
// Renames internal declarations and every reference to them, then splices a
// forwarder under the public name right after each rewritten declaration.

use std::collections::HashMap;

use oxc_allocator::{Allocator, Vec as ArenaVec};
use oxc_ast::ast::*;
use oxc_ast::AstBuilder;
use oxc_ast_visit::{walk_mut, VisitMut};
use oxc_span::{GetSpan, SourceType};
use oxc_syntax::symbol::SymbolId;

use crate::config::ResolvedOptions;
use crate::error::{TransformError, TransformResult};
use crate::logging::Logger;
use crate::plan::{RewritePlan, RewritePlans, Strategy};
use crate::resolver::SymbolResolver;
use crate::synthesizer::{parse_statements, ExportForm, FunctionSignature, Synthesizer};

/// What happened to one mangled declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteRecord {
    pub display_name: String,
    pub local_name: String,
    pub mangled_name: String,
    pub strategy: Strategy,
    /// References renamed to the mangled name.
    pub references: usize,
    /// Whether a forwarder was emitted.
    pub forwarded: bool,
}

/// Per-statement decision, taken before the statement is mutated.
enum Action<'r> {
    Keep,
    Function {
        plan: &'r RewritePlan,
        forward: Option<String>,
    },
    DefaultFunction {
        plan: &'r RewritePlan,
        forward: Option<String>,
        last: bool,
    },
    Variable {
        name: String,
        forward: Option<String>,
    },
    ExportList {
        extra: String,
    },
}

pub struct Rewriter<'a, 'r, R: SymbolResolver + ?Sized> {
    allocator: &'a Allocator,
    ast: AstBuilder<'a>,
    source: &'r str,
    source_type: SourceType,
    options: &'r ResolvedOptions,
    resolver: &'r R,
    plans: &'r RewritePlans,
    synthesizer: Synthesizer<'r>,
    logger: &'r dyn Logger,
    references: HashMap<SymbolId, usize>,
    /// Nesting of `typeof` type queries, which name values from type position.
    type_query_depth: usize,
    error: Option<TransformError>,
}

impl<'a, 'r, R: SymbolResolver + ?Sized> Rewriter<'a, 'r, R> {
    pub fn new(
        allocator: &'a Allocator,
        source: &'r str,
        source_type: SourceType,
        options: &'r ResolvedOptions,
        resolver: &'r R,
        plans: &'r RewritePlans,
        logger: &'r dyn Logger,
    ) -> Self {
        Self {
            allocator,
            ast: AstBuilder::new(allocator),
            source,
            source_type,
            options,
            resolver,
            plans,
            synthesizer: Synthesizer::new(options, source_type),
            logger,
            references: HashMap::new(),
            type_query_depth: 0,
            error: None,
        }
    }

    /// Rewrite `program` in place.
    pub fn rewrite(mut self, program: &mut Program<'a>) -> TransformResult<Vec<RewriteRecord>> {
        if self.plans.is_empty() {
            return Ok(Vec::new());
        }
        self.visit_program(program);
        if let Some(error) = self.error {
            return Err(error);
        }

        let records = self
            .plans
            .rewritten()
            .map(|plan| RewriteRecord {
                display_name: plan.display_name.clone(),
                local_name: plan.local_name.clone(),
                mangled_name: plan.mangled_name.clone(),
                strategy: plan.strategy,
                references: plan
                    .symbol_id
                    .and_then(|id| self.references.get(&id).copied())
                    .unwrap_or(0),
                forwarded: plan.emit_forward,
            })
            .collect();
        Ok(records)
    }

    fn plan_for_symbol(&self, symbol_id: Option<SymbolId>) -> Option<&'r RewritePlan> {
        let plans: &'r RewritePlans = self.plans;
        plans.get(symbol_id?)
    }

    fn plan_for_reference(&self, ident: &IdentifierReference<'a>) -> Option<&'r RewritePlan> {
        self.plan_for_symbol(self.resolver.resolve(ident))
    }

    fn plan_for_function(&self, func: &Function<'a>) -> Option<&'r RewritePlan> {
        self.plan_for_symbol(func.id.as_ref()?.symbol_id.get())
    }

    fn plan_for_binding(&self, pattern: &BindingPattern<'a>) -> Option<&'r RewritePlan> {
        match &pattern.kind {
            BindingPatternKind::BindingIdentifier(id) => self.plan_for_symbol(id.symbol_id.get()),
            _ => None,
        }
    }

    fn text(&self, span: oxc_span::Span) -> &'r str {
        self.source
            .get(span.start as usize..span.end as usize)
            .unwrap_or_default()
    }

    /// Index of the last statement declaring each planned function. Overloads
    /// get a single forwarder, after the last of them.
    fn last_declarations(&self, stmts: &ArenaVec<'a, Statement<'a>>) -> HashMap<SymbolId, usize> {
        stmts
            .iter()
            .enumerate()
            .filter_map(|(index, stmt)| {
                let (func, _) = function_target(stmt)?;
                let plan = self.plan_for_function(func)?;
                Some((plan.symbol_id?, index))
            })
            .collect()
    }

    fn decide(
        &self,
        stmt: &Statement<'a>,
        index: usize,
        last: &HashMap<SymbolId, usize>,
    ) -> Action<'r> {
        if let Some((func, export)) = function_target(stmt) {
            let Some(plan) = self.plan_for_function(func) else {
                return Action::Keep;
            };
            let is_last = plan.symbol_id.and_then(|id| last.get(&id)) == Some(&index);
            let forward = (plan.emit_forward && is_last).then(|| {
                let signature = FunctionSignature {
                    type_parameters: func.type_parameters.as_ref().map(|tp| self.text(tp.span)),
                    return_type: func
                        .return_type
                        .as_ref()
                        .map(|rt| self.text(rt.type_annotation.span())),
                };
                self.synthesizer.function_forward(plan, export, &signature)
            });
            return match export {
                ExportForm::Default => Action::DefaultFunction {
                    plan,
                    forward,
                    last: is_last,
                },
                _ => Action::Function { plan, forward },
            };
        }

        if let Some((var, export)) = variable_target(stmt) {
            let planned: Vec<&'r RewritePlan> = var
                .declarations
                .iter()
                .filter_map(|declarator| self.plan_for_binding(&declarator.id))
                .collect();
            let Some(first) = planned.first() else {
                return Action::Keep;
            };
            let forward = first
                .emit_forward
                .then(|| self.synthesizer.variable_forward(&planned, export));
            return Action::Variable {
                name: first.display_name.clone(),
                forward,
            };
        }

        if let Statement::ExportNamedDeclaration(export) = stmt {
            if export.declaration.is_none()
                && export.source.is_none()
                && !export.export_kind.is_type()
                && !self.options.delete_replacement
            {
                let entries = self.mangled_exports(export);
                if !entries.is_empty() {
                    return Action::ExportList {
                        extra: self.synthesizer.export_list(&entries),
                    };
                }
            }
        }

        Action::Keep
    }

    /// `(mangled local, mangled exported)` for each specifier of a local
    /// export list naming a mangled declaration.
    fn mangled_exports(&self, export: &ExportNamedDeclaration<'a>) -> Vec<(String, String)> {
        export
            .specifiers
            .iter()
            .filter(|specifier| !specifier.export_kind.is_type())
            .filter_map(|specifier| {
                let ModuleExportName::IdentifierReference(local) = &specifier.local else {
                    return None;
                };
                let plan = self.plan_for_reference(local)?;
                let exported = match &specifier.exported {
                    ModuleExportName::IdentifierName(name) => name.name.as_str(),
                    ModuleExportName::IdentifierReference(name) => name.name.as_str(),
                    ModuleExportName::StringLiteral(_) => return None,
                };
                Some((plan.mangled_name.clone(), self.options.mangle(exported)))
            })
            .collect()
    }

    fn apply(
        &mut self,
        mut stmt: Statement<'a>,
        action: Action<'r>,
    ) -> TransformResult<Vec<Statement<'a>>> {
        let mut out = Vec::with_capacity(1);
        match action {
            Action::Keep => {
                self.visit_statement(&mut stmt);
                out.push(stmt);
            }
            Action::Function { plan, forward } => {
                if let Some(func) = function_target_mut(&mut stmt) {
                    self.rename_function(func, plan);
                }
                self.visit_statement(&mut stmt);
                out.push(stmt);
                if let Some(text) = forward {
                    out.extend(self.parse(&plan.display_name, &text)?);
                }
            }
            Action::DefaultFunction {
                plan,
                forward,
                last,
            } => {
                let mut stmt = take_default_function(stmt).ok_or_else(|| {
                    TransformError::unsupported(
                        plan.display_name.clone(),
                        "default export is not a function declaration",
                    )
                })?;
                if let Statement::FunctionDeclaration(func) = &mut stmt {
                    self.rename_function(func, plan);
                }
                self.visit_statement(&mut stmt);
                out.push(stmt);
                if last {
                    let names = [(plan.mangled_name.clone(), plan.mangled_name.clone())];
                    let export = self.synthesizer.export_list(&names);
                    out.extend(self.parse(&plan.display_name, &export)?);
                }
                if let Some(text) = forward {
                    out.extend(self.parse(&plan.display_name, &text)?);
                }
            }
            Action::Variable { name, forward } => {
                if let Some(var) = variable_target_mut(&mut stmt) {
                    for declarator in var.declarations.iter_mut() {
                        let Some(plan) = self.plan_for_binding(&declarator.id) else {
                            continue;
                        };
                        if let BindingPatternKind::BindingIdentifier(id) = &mut declarator.id.kind {
                            id.name = self.ast.atom(&plan.mangled_name);
                        }
                        self.logger.debug(&format!(
                            "mangled {} `{}` as `{}`",
                            plan.kind, plan.display_name, plan.mangled_name
                        ));
                    }
                }
                self.visit_statement(&mut stmt);
                out.push(stmt);
                if let Some(text) = forward {
                    out.extend(self.parse(&name, &text)?);
                }
            }
            Action::ExportList { extra } => {
                self.visit_statement(&mut stmt);
                out.push(stmt);
                out.extend(self.parse("export list", &extra)?);
            }
        }
        Ok(out)
    }

    fn rename_function(&self, func: &mut Function<'a>, plan: &RewritePlan) {
        if let Some(id) = func.id.as_mut() {
            id.name = self.ast.atom(&plan.mangled_name);
            self.logger.debug(&format!(
                "mangled {} `{}` as `{}`",
                plan.kind, plan.display_name, plan.mangled_name
            ));
        }
    }

    fn parse(&self, name: &str, text: &str) -> TransformResult<Vec<Statement<'a>>> {
        parse_statements(self.allocator, self.source_type, name, text)
    }
}

impl<'a, R: SymbolResolver + ?Sized> VisitMut<'a> for Rewriter<'a, '_, R> {
    fn visit_statements(&mut self, stmts: &mut ArenaVec<'a, Statement<'a>>) {
        if self.error.is_some() {
            return;
        }
        let last = self.last_declarations(stmts);
        let old = std::mem::replace(stmts, self.ast.vec());

        for (index, stmt) in old.into_iter().enumerate() {
            let action = self.decide(&stmt, index, &last);
            match self.apply(stmt, action) {
                Ok(rewritten) => {
                    for stmt in rewritten {
                        stmts.push(stmt);
                    }
                }
                Err(error) => {
                    self.error.get_or_insert(error);
                    return;
                }
            }
        }
    }

    fn visit_identifier_reference(&mut self, ident: &mut IdentifierReference<'a>) {
        // A type merged with the value keeps its name.
        if self.type_query_depth == 0 && !self.resolver.is_value_reference(ident) {
            return;
        }
        let Some(plan) = self.plan_for_reference(ident) else {
            return;
        };
        ident.name = self.ast.atom(&plan.mangled_name);
        if let Some(symbol_id) = plan.symbol_id {
            *self.references.entry(symbol_id).or_insert(0) += 1;
        }
    }

    fn visit_ts_type_query(&mut self, it: &mut TSTypeQuery<'a>) {
        self.type_query_depth += 1;
        walk_mut::walk_ts_type_query(self, it);
        self.type_query_depth -= 1;
    }

    fn visit_export_named_declaration(&mut self, it: &mut ExportNamedDeclaration<'a>) {
        if it.declaration.is_some() {
            walk_mut::walk_export_named_declaration(self, it);
            return;
        }
        // Re-exports name another module's bindings. Local lists keep the
        // public name unless forwarders are being deleted.
        if it.source.is_some() || !self.options.delete_replacement {
            return;
        }

        for specifier in it.specifiers.iter_mut() {
            let plan = match &specifier.local {
                ModuleExportName::IdentifierReference(ident) => self.plan_for_reference(ident),
                _ => None,
            };
            let Some(plan) = plan else {
                continue;
            };
            if let ModuleExportName::IdentifierReference(ident) = &mut specifier.local {
                ident.name = self.ast.atom(&plan.mangled_name);
            }
            if let ModuleExportName::IdentifierName(name) = &mut specifier.exported {
                let mangled = self.options.mangle(name.name.as_str());
                name.name = self.ast.atom(&mangled);
            }
        }
    }

    fn visit_export_default_declaration(&mut self, it: &mut ExportDefaultDeclaration<'a>) {
        if !self.options.delete_replacement {
            if let ExportDefaultDeclarationKind::Identifier(ident) = &it.declaration {
                if self.plan_for_reference(ident).is_some() {
                    return;
                }
            }
        }
        walk_mut::walk_export_default_declaration(self, it);
    }

    fn visit_object_property(&mut self, it: &mut ObjectProperty<'a>) {
        walk_mut::walk_object_property(self, it);
        // `{ foo }` must become `{ foo: __INTERNAL_foo }` once the value is renamed.
        if it.shorthand {
            let renamed = match (&it.key, &it.value) {
                (PropertyKey::StaticIdentifier(key), Expression::Identifier(value)) => {
                    key.name != value.name
                }
                _ => false,
            };
            if renamed {
                it.shorthand = false;
            }
        }
    }
}

fn function_target<'s, 'a>(stmt: &'s Statement<'a>) -> Option<(&'s Function<'a>, ExportForm)> {
    match stmt {
        Statement::FunctionDeclaration(func) => Some((func, ExportForm::Local)),
        Statement::ExportNamedDeclaration(export) => match &export.declaration {
            Some(Declaration::FunctionDeclaration(func)) => Some((func, ExportForm::Named)),
            _ => None,
        },
        Statement::ExportDefaultDeclaration(export) => match &export.declaration {
            ExportDefaultDeclarationKind::FunctionDeclaration(func) => {
                Some((func, ExportForm::Default))
            }
            _ => None,
        },
        _ => None,
    }
}

fn function_target_mut<'s, 'a>(stmt: &'s mut Statement<'a>) -> Option<&'s mut Function<'a>> {
    match stmt {
        Statement::FunctionDeclaration(func) => Some(func),
        Statement::ExportNamedDeclaration(export) => match &mut export.declaration {
            Some(Declaration::FunctionDeclaration(func)) => Some(func),
            _ => None,
        },
        _ => None,
    }
}

fn variable_target<'s, 'a>(
    stmt: &'s Statement<'a>,
) -> Option<(&'s VariableDeclaration<'a>, ExportForm)> {
    match stmt {
        Statement::VariableDeclaration(var) => Some((var, ExportForm::Local)),
        Statement::ExportNamedDeclaration(export) => match &export.declaration {
            Some(Declaration::VariableDeclaration(var)) => Some((var, ExportForm::Named)),
            _ => None,
        },
        _ => None,
    }
}

fn variable_target_mut<'s, 'a>(
    stmt: &'s mut Statement<'a>,
) -> Option<&'s mut VariableDeclaration<'a>> {
    match stmt {
        Statement::VariableDeclaration(var) => Some(var),
        Statement::ExportNamedDeclaration(export) => match &mut export.declaration {
            Some(Declaration::VariableDeclaration(var)) => Some(var),
            _ => None,
        },
        _ => None,
    }
}

/// `export default function f() {}` becomes the bare `function f() {}`.
fn take_default_function(stmt: Statement<'_>) -> Option<Statement<'_>> {
    let Statement::ExportDefaultDeclaration(export) = stmt else {
        return None;
    };
    match export.unbox().declaration {
        ExportDefaultDeclarationKind::FunctionDeclaration(func) => {
            Some(Statement::FunctionDeclaration(func))
        }
        _ => None,
    }
}
