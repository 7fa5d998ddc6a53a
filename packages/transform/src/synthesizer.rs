// Forwarder Synthesis
//
// Builds the declarations that keep a public name alive after the original
// has been mangled. Forwarders are rendered as source text and parsed into
// the unit's arena, the same way generated code is spliced elsewhere in the
// pipeline.

use oxc_allocator::Allocator;
use oxc_ast::ast::Statement;
use oxc_ast_visit::VisitMut;
use oxc_parser::Parser;
use oxc_span::{SourceType, Span, SPAN};

use crate::config::ResolvedOptions;
use crate::error::{TransformError, TransformResult};
use crate::plan::RewritePlan;

/// How the original declaration was exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportForm {
    Local,
    Named,
    Default,
}

impl ExportForm {
    fn keyword(&self) -> &'static str {
        match self {
            ExportForm::Local => "",
            ExportForm::Named => "export ",
            ExportForm::Default => "export default ",
        }
    }
}

/// Source text of the parts of a function signature a forwarder copies.
#[derive(Debug, Clone, Copy, Default)]
pub struct FunctionSignature<'s> {
    /// `<T extends U>`, brackets included.
    pub type_parameters: Option<&'s str>,
    /// The return type without its colon.
    pub return_type: Option<&'s str>,
}

/// Proxy handler traps installed on variable forwarders. Each one warns and
/// then defers to `Reflect`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trap {
    /// Property reads. Function-valued properties are bound to the target so
    /// methods keep working through the proxy.
    Get,
    /// Calls.
    Apply,
    /// `new`. Constructing the forwarder itself constructs the target.
    Construct,
}

impl Trap {
    pub const ALL: [Trap; 3] = [Trap::Get, Trap::Apply, Trap::Construct];

    pub fn render(&self, binding: &str, warning: &str) -> String {
        match self {
            Trap::Get => format!(
                "get(target, key) {{\n{warning}\nconst value = Reflect.get(target, key, target);\nreturn typeof value === \"function\" ? value.bind(target) : value;\n}}"
            ),
            Trap::Apply => format!(
                "apply(target, thisArg, args) {{\n{warning}\nreturn Reflect.apply(target, thisArg, args);\n}}"
            ),
            Trap::Construct => format!(
                "construct(target, args, newTarget) {{\n{warning}\nreturn Reflect.construct(target, args, newTarget === {binding} ? target : newTarget);\n}}"
            ),
        }
    }
}

/// Renders forwarders for one unit.
pub struct Synthesizer<'o> {
    options: &'o ResolvedOptions,
    typescript: bool,
}

impl<'o> Synthesizer<'o> {
    pub fn new(options: &'o ResolvedOptions, source_type: SourceType) -> Self {
        Self {
            options,
            typescript: source_type.is_typescript(),
        }
    }

    /// `warn("message");`
    pub fn warning(&self, plan: &RewritePlan) -> String {
        let message = serde_json::Value::from(plan.message.as_str());
        format!("{}({});", self.options.warn_function, message)
    }

    fn declare_keyword(&self, plan: &RewritePlan, export: ExportForm) -> &'static str {
        if plan.declare_forward && export != ExportForm::Default {
            "declare "
        } else {
            ""
        }
    }

    /// A function under the public name that warns and calls the mangled one.
    /// Declaration output gets the signature alone.
    pub fn function_forward(
        &self,
        plan: &RewritePlan,
        export: ExportForm,
        signature: &FunctionSignature<'_>,
    ) -> String {
        let name = &plan.local_name;
        let mangled = &plan.mangled_name;
        let type_parameters = signature.type_parameters.unwrap_or_default();

        if !self.options.is_runtime() {
            let return_type = match signature.return_type {
                Some(return_type) => return_type.to_string(),
                None => format!("ReturnType<typeof {}>", mangled),
            };
            return format!(
                "{}{}function {}{}(...args: Parameters<typeof {}>): {};",
                export.keyword(),
                self.declare_keyword(plan, export),
                name,
                type_parameters,
                mangled,
                return_type,
            );
        }

        let (params, return_type) = if self.typescript {
            (
                format!(": Parameters<typeof {}>", mangled),
                signature
                    .return_type
                    .map(|r| format!(": {}", r))
                    .unwrap_or_default(),
            )
        } else {
            (String::new(), String::new())
        };
        let type_parameters = if self.typescript { type_parameters } else { "" };

        format!(
            "{}function {}{}(...args{}){} {{\n{}\nreturn {}(...args);\n}}",
            export.keyword(),
            name,
            type_parameters,
            params,
            return_type,
            self.warning(plan),
            mangled,
        )
    }

    /// One declaration statement re-binding every planned name of a variable
    /// statement. All plans share the statement's keyword.
    pub fn variable_forward(&self, plans: &[&RewritePlan], export: ExportForm) -> String {
        let Some(first) = plans.first() else {
            return String::new();
        };
        let keyword = first.variable_kind().map(|k| k.keyword()).unwrap_or("const");

        if !self.options.is_runtime() {
            let declarators: Vec<String> = plans
                .iter()
                .map(|plan| format!("{}: typeof {}", plan.local_name, plan.mangled_name))
                .collect();
            return format!(
                "{}{}{} {};",
                export.keyword(),
                self.declare_keyword(first, export),
                keyword,
                declarators.join(", "),
            );
        }

        let declarators: Vec<String> = plans
            .iter()
            .map(|plan| {
                let annotation = if self.typescript {
                    format!(": typeof {}", plan.mangled_name)
                } else {
                    String::new()
                };
                let warning = self.warning(plan);
                let traps: Vec<String> = Trap::ALL
                    .iter()
                    .map(|trap| trap.render(&plan.local_name, &warning))
                    .collect();
                format!(
                    "{}{} = new Proxy(Object({}), {{\n{}\n}})",
                    plan.local_name,
                    annotation,
                    plan.mangled_name,
                    traps.join(",\n"),
                )
            })
            .collect();

        format!("{}{} {};", export.keyword(), keyword, declarators.join(",\n"))
    }

    /// `export { local as exported, ... };`
    pub fn export_list(&self, entries: &[(String, String)]) -> String {
        let specifiers: Vec<String> = entries
            .iter()
            .map(|(local, exported)| {
                if local == exported {
                    local.clone()
                } else {
                    format!("{} as {}", local, exported)
                }
            })
            .collect();
        format!("export {{ {} }};", specifiers.join(", "))
    }
}

/// Parse generated `text` into statements owned by `allocator`.
///
/// Spans point into the generated text, not the unit, so they are reset
/// before the statements are spliced in.
pub fn parse_statements<'a>(
    allocator: &'a Allocator,
    source_type: SourceType,
    name: &str,
    text: &str,
) -> TransformResult<Vec<Statement<'a>>> {
    let text = allocator.alloc_str(text);
    let ret = Parser::new(allocator, text, source_type.with_module(true)).parse();
    if !ret.errors.is_empty() {
        return Err(TransformError::Synthesis {
            name: name.to_string(),
            messages: ret.errors.iter().map(|e| e.to_string()).collect(),
        });
    }

    let mut program = ret.program;
    SpanReset.visit_program(&mut program);
    Ok(program.body.into_iter().collect())
}

struct SpanReset;

impl<'a> VisitMut<'a> for SpanReset {
    fn visit_span(&mut self, span: &mut Span) {
        *span = SPAN;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{DeclarationKind, InternalDeclaration, VariableKind};
    use crate::config::OutputArtifact;

    fn plan(kind: DeclarationKind, name: &str, options: &ResolvedOptions) -> RewritePlan {
        let declaration = InternalDeclaration {
            kind,
            symbol_id: None,
            local_name: name.to_string(),
            display_name: name.to_string(),
            matched_tag: "internal".to_string(),
            declare: false,
            in_ambient_context: false,
            span: Span::default(),
        };
        RewritePlan::new(&declaration, options)
    }

    #[test]
    fn warning_escapes_the_message() {
        let options = ResolvedOptions::new(OutputArtifact::Runtime)
            .with_message_template("\"{{name}}\" is internal\n")
            .with_warn_function("log.warn");
        let synthesizer = Synthesizer::new(&options, SourceType::ts());
        let plan = plan(DeclarationKind::Function, "f", &options);
        assert_eq!(synthesizer.warning(&plan), r#"log.warn("\"f\" is internal\n");"#);
    }

    #[test]
    fn typescript_thunk_keeps_signature_types() {
        let options = ResolvedOptions::new(OutputArtifact::Runtime);
        let synthesizer = Synthesizer::new(&options, SourceType::ts());
        let plan = plan(DeclarationKind::Function, "f", &options);
        let text = synthesizer.function_forward(
            &plan,
            ExportForm::Named,
            &FunctionSignature {
                type_parameters: Some("<T>"),
                return_type: Some("T[]"),
            },
        );
        assert!(text.starts_with(
            "export function f<T>(...args: Parameters<typeof __INTERNAL_f>): T[] {"
        ));
        assert!(text.contains("return __INTERNAL_f(...args);"));
    }

    #[test]
    fn javascript_thunk_has_no_types() {
        let options = ResolvedOptions::new(OutputArtifact::Runtime);
        let synthesizer = Synthesizer::new(&options, SourceType::mjs());
        let plan = plan(DeclarationKind::Function, "f", &options);
        let text = synthesizer.function_forward(
            &plan,
            ExportForm::Local,
            &FunctionSignature {
                type_parameters: Some("<T>"),
                return_type: Some("T"),
            },
        );
        assert!(text.starts_with("function f(...args) {"));
    }

    #[test]
    fn declaration_thunk_is_a_signature() {
        let options = ResolvedOptions::new(OutputArtifact::Declarations);
        let synthesizer = Synthesizer::new(&options, SourceType::d_ts());
        let plan = plan(DeclarationKind::Function, "f", &options);

        let text = synthesizer.function_forward(&plan, ExportForm::Named, &FunctionSignature::default());
        assert_eq!(
            text,
            "export declare function f(...args: Parameters<typeof __INTERNAL_f>): ReturnType<typeof __INTERNAL_f>;"
        );

        let text = synthesizer.function_forward(
            &plan,
            ExportForm::Default,
            &FunctionSignature {
                type_parameters: None,
                return_type: Some("void"),
            },
        );
        assert_eq!(
            text,
            "export default function f(...args: Parameters<typeof __INTERNAL_f>): void;"
        );
    }

    #[test]
    fn proxy_installs_every_trap() {
        let options = ResolvedOptions::new(OutputArtifact::Runtime);
        let synthesizer = Synthesizer::new(&options, SourceType::ts());
        let plan = plan(DeclarationKind::Variable(VariableKind::Let), "x", &options);
        let text = synthesizer.variable_forward(&[&plan], ExportForm::Named);

        assert!(text.starts_with("export let x: typeof __INTERNAL_x = new Proxy(Object(__INTERNAL_x), {"));
        assert_eq!(text.matches("console.warn(").count(), 3);
        assert!(text.contains("newTarget === x ? target : newTarget"));
        assert!(text.contains("value.bind(target)"));
    }

    #[test]
    fn declaration_proxy_is_typed_by_the_mangled_value() {
        let options = ResolvedOptions::new(OutputArtifact::Declarations);
        let synthesizer = Synthesizer::new(&options, SourceType::d_ts());
        let a = plan(DeclarationKind::Variable(VariableKind::Const), "a", &options);
        let b = plan(DeclarationKind::Variable(VariableKind::Const), "b", &options);
        assert_eq!(
            synthesizer.variable_forward(&[&a, &b], ExportForm::Local),
            "declare const a: typeof __INTERNAL_a, b: typeof __INTERNAL_b;"
        );
    }

    #[test]
    fn export_list_aliases_only_when_names_differ() {
        let options = ResolvedOptions::new(OutputArtifact::Runtime);
        let synthesizer = Synthesizer::new(&options, SourceType::ts());
        let entries = vec![
            ("__INTERNAL_a".to_string(), "__INTERNAL_a".to_string()),
            ("__INTERNAL_b".to_string(), "__INTERNAL_c".to_string()),
        ];
        assert_eq!(
            synthesizer.export_list(&entries),
            "export { __INTERNAL_a, __INTERNAL_b as __INTERNAL_c };"
        );
    }

    #[test]
    fn generated_text_parses_into_the_arena() {
        let options = ResolvedOptions::new(OutputArtifact::Runtime);
        let synthesizer = Synthesizer::new(&options, SourceType::ts());
        let plan = plan(DeclarationKind::Variable(VariableKind::Const), "x", &options);
        let text = synthesizer.variable_forward(&[&plan], ExportForm::Named);

        let allocator = Allocator::default();
        let statements = parse_statements(&allocator, SourceType::ts(), "x", &text).unwrap();
        assert_eq!(statements.len(), 1);
        assert!(matches!(statements[0], Statement::ExportNamedDeclaration(_)));
    }

    #[test]
    fn broken_text_is_a_synthesis_error() {
        let allocator = Allocator::default();
        let err = parse_statements(&allocator, SourceType::ts(), "f", "function (").unwrap_err();
        assert!(matches!(err, TransformError::Synthesis { ref name, .. } if name == "f"));
    }
}
