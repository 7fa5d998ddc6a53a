// Declaration Classifier
//
// Finds the declarations whose documentation carries a marker tag and works
// out the name a consumer would see them under.

use std::collections::HashSet;
use std::fmt;

use oxc_allocator::Vec as ArenaVec;
use oxc_ast::ast::*;
use oxc_ast_visit::{walk, Visit};
use oxc_span::{GetSpan, Span};
use oxc_syntax::symbol::SymbolId;

use crate::config::ResolvedOptions;
use crate::error::{TransformError, TransformResult};
use crate::jsdoc;

/// `var` / `let` / `const` / `using`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableKind {
    Var,
    Let,
    Const,
    Using,
}

impl VariableKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            VariableKind::Var => "var",
            VariableKind::Let => "let",
            VariableKind::Const => "const",
            VariableKind::Using => "using",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessorKind {
    Get,
    Set,
}

/// Every kind of declaration the classifier recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    Function,
    Variable(VariableKind),
    Accessor(AccessorKind),
    ClassMember,
    Constructor,
    Class,
    Interface,
    TypeAlias,
    Enum,
    EnumMember,
    Namespace,
}

impl DeclarationKind {
    /// Declarations with no runtime artifact.
    pub fn is_type_only(&self) -> bool {
        matches!(
            self,
            DeclarationKind::Interface
                | DeclarationKind::TypeAlias
                | DeclarationKind::Enum
                | DeclarationKind::EnumMember
        )
    }
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclarationKind::Function => f.write_str("function"),
            DeclarationKind::Variable(kind) => f.write_str(kind.keyword()),
            DeclarationKind::Accessor(AccessorKind::Get) => f.write_str("get accessor"),
            DeclarationKind::Accessor(AccessorKind::Set) => f.write_str("set accessor"),
            DeclarationKind::ClassMember => f.write_str("member"),
            DeclarationKind::Constructor => f.write_str("constructor"),
            DeclarationKind::Class => f.write_str("class"),
            DeclarationKind::Interface => f.write_str("interface"),
            DeclarationKind::TypeAlias => f.write_str("type alias"),
            DeclarationKind::Enum => f.write_str("enum"),
            DeclarationKind::EnumMember => f.write_str("enum member"),
            DeclarationKind::Namespace => f.write_str("namespace"),
        }
    }
}

/// A declaration marked internal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalDeclaration {
    pub kind: DeclarationKind,
    /// The declaring symbol. Members have no binding and therefore none.
    pub symbol_id: Option<SymbolId>,
    pub local_name: String,
    /// Name used in the warning message, e.g. `PublicClass.internalMethod`.
    pub display_name: String,
    /// The marker tag that matched, without `@`.
    pub matched_tag: String,
    /// Written with a `declare` modifier.
    pub declare: bool,
    /// Inside a `declare namespace`, or anywhere in a definition file.
    pub in_ambient_context: bool,
    pub span: Span,
}

impl InternalDeclaration {
    /// No runtime value exists for this declaration.
    pub fn is_ambient(&self) -> bool {
        self.declare || self.in_ambient_context
    }
}

/// Collect every internal declaration of `program`.
///
/// Each declaring symbol is reported once, so overloads show up a single
/// time. Fails on marked shapes that cannot be mangled: anonymous functions
/// and destructuring declarations.
pub fn classify(
    program: &Program<'_>,
    source: &str,
    definition_file: bool,
    options: &ResolvedOptions,
) -> TransformResult<Vec<InternalDeclaration>> {
    let mut classifier = Classifier::new(source, definition_file, options);
    classifier.visit_program(program);
    match classifier.error {
        Some(error) => Err(error),
        None => Ok(classifier.declarations),
    }
}

struct Classifier<'s> {
    source: &'s str,
    options: &'s ResolvedOptions,
    definition_file: bool,
    /// Enclosing containers, innermost last. `None` for anonymous ones.
    containers: Vec<Option<String>>,
    ambient_depth: usize,
    seen: HashSet<SymbolId>,
    declarations: Vec<InternalDeclaration>,
    error: Option<TransformError>,
}

impl<'s> Classifier<'s> {
    fn new(source: &'s str, definition_file: bool, options: &'s ResolvedOptions) -> Self {
        Self {
            source,
            options,
            definition_file,
            containers: Vec::new(),
            ambient_depth: 0,
            seen: HashSet::new(),
            declarations: Vec::new(),
            error: None,
        }
    }

    /// The first marker tag in the documentation before `anchor`.
    fn marker(&self, anchor: u32) -> Option<String> {
        let docs = jsdoc::leading_jsdoc(self.source, anchor)?;
        docs.iter()
            .flat_map(|doc| doc.tags.iter())
            .find(|tag| self.options.is_mark_tag(&tag.name))
            .map(|tag| tag.name.clone())
    }

    fn in_ambient_context(&self) -> bool {
        self.definition_file || self.ambient_depth > 0
    }

    fn parent_name(&self) -> Option<&str> {
        self.containers.last().and_then(|c| c.as_deref())
    }

    fn text(&self, span: Span) -> &'s str {
        self.source
            .get(span.start as usize..span.end as usize)
            .unwrap_or_default()
    }

    /// Property keys as written, with string-literal quotes removed.
    fn key_text(&self, span: Span) -> String {
        let text = self.text(span);
        text.trim_matches(|c| c == '"' || c == '\'' || c == '`')
            .to_string()
    }

    fn fail(&mut self, error: TransformError) {
        self.error.get_or_insert(error);
    }

    fn record(
        &mut self,
        kind: DeclarationKind,
        local_name: &str,
        symbol_id: Option<SymbolId>,
        matched_tag: String,
        declare: bool,
        span: Span,
    ) {
        if let Some(symbol_id) = symbol_id {
            if !self.seen.insert(symbol_id) {
                return;
            }
        }

        let display_name = match (kind, self.parent_name()) {
            (DeclarationKind::Constructor, Some(parent)) => parent.to_string(),
            (_, Some(parent)) => format!("{}.{}", parent, local_name),
            (_, None) => local_name.to_string(),
        };

        self.declarations.push(InternalDeclaration {
            kind,
            symbol_id,
            local_name: local_name.to_string(),
            display_name,
            matched_tag,
            declare,
            in_ambient_context: self.in_ambient_context(),
            span,
        });
    }

    fn classify_statement(&mut self, stmt: &Statement<'_>) {
        let anchor = stmt.span().start;
        match stmt {
            Statement::ExportNamedDeclaration(export) => {
                if let Some(declaration) = &export.declaration {
                    self.classify_declaration(declaration, anchor);
                }
            }
            Statement::ExportDefaultDeclaration(export) => match &export.declaration {
                ExportDefaultDeclarationKind::FunctionDeclaration(func) => {
                    self.classify_function(func, anchor)
                }
                ExportDefaultDeclarationKind::ClassDeclaration(class) => {
                    self.classify_class(class, anchor)
                }
                _ => {}
            },
            Statement::FunctionDeclaration(func) => self.classify_function(func, anchor),
            Statement::VariableDeclaration(var) => self.classify_variable(var, anchor),
            Statement::ClassDeclaration(class) => self.classify_class(class, anchor),
            Statement::TSInterfaceDeclaration(decl) => {
                self.classify_binding(DeclarationKind::Interface, &decl.id, decl.declare, anchor)
            }
            Statement::TSTypeAliasDeclaration(decl) => {
                self.classify_binding(DeclarationKind::TypeAlias, &decl.id, decl.declare, anchor)
            }
            Statement::TSEnumDeclaration(decl) => {
                self.classify_binding(DeclarationKind::Enum, &decl.id, decl.declare, anchor)
            }
            Statement::TSModuleDeclaration(decl) => self.classify_module(decl, anchor),
            _ => {}
        }
    }

    fn classify_declaration(&mut self, declaration: &Declaration<'_>, anchor: u32) {
        match declaration {
            Declaration::FunctionDeclaration(func) => self.classify_function(func, anchor),
            Declaration::VariableDeclaration(var) => self.classify_variable(var, anchor),
            Declaration::ClassDeclaration(class) => self.classify_class(class, anchor),
            Declaration::TSInterfaceDeclaration(decl) => {
                self.classify_binding(DeclarationKind::Interface, &decl.id, decl.declare, anchor)
            }
            Declaration::TSTypeAliasDeclaration(decl) => {
                self.classify_binding(DeclarationKind::TypeAlias, &decl.id, decl.declare, anchor)
            }
            Declaration::TSEnumDeclaration(decl) => {
                self.classify_binding(DeclarationKind::Enum, &decl.id, decl.declare, anchor)
            }
            Declaration::TSModuleDeclaration(decl) => self.classify_module(decl, anchor),
            _ => {}
        }
    }

    fn classify_function(&mut self, func: &Function<'_>, anchor: u32) {
        let Some(tag) = self.marker(anchor) else {
            return;
        };
        match &func.id {
            Some(id) => self.record(
                DeclarationKind::Function,
                id.name.as_str(),
                id.symbol_id.get(),
                tag,
                func.declare,
                func.span,
            ),
            None => self.fail(TransformError::unsupported(
                "default",
                "an anonymous function has no name to mangle",
            )),
        }
    }

    fn classify_variable(&mut self, var: &VariableDeclaration<'_>, anchor: u32) {
        let Some(tag) = self.marker(anchor) else {
            return;
        };
        let kind = match var.kind {
            VariableDeclarationKind::Var => VariableKind::Var,
            VariableDeclarationKind::Let => VariableKind::Let,
            VariableDeclarationKind::Const => VariableKind::Const,
            _ => VariableKind::Using,
        };

        for declarator in &var.declarations {
            match &declarator.id.kind {
                BindingPatternKind::BindingIdentifier(id) => self.record(
                    DeclarationKind::Variable(kind),
                    id.name.as_str(),
                    id.symbol_id.get(),
                    tag.clone(),
                    var.declare,
                    declarator.span,
                ),
                pattern => {
                    let name = self.text(pattern.span()).to_string();
                    self.fail(TransformError::unsupported(
                        name,
                        "destructured declarations cannot be marked internal",
                    ));
                    return;
                }
            }
        }
    }

    fn classify_class(&mut self, class: &Class<'_>, anchor: u32) {
        let Some(tag) = self.marker(anchor) else {
            return;
        };
        if let Some(id) = &class.id {
            self.record(
                DeclarationKind::Class,
                id.name.as_str(),
                id.symbol_id.get(),
                tag,
                class.declare,
                class.span,
            );
        }
    }

    fn classify_module(&mut self, module: &TSModuleDeclaration<'_>, anchor: u32) {
        let Some(tag) = self.marker(anchor) else {
            return;
        };
        if let TSModuleDeclarationName::Identifier(id) = &module.id {
            self.record(
                DeclarationKind::Namespace,
                id.name.as_str(),
                id.symbol_id.get(),
                tag,
                module.declare,
                module.span,
            );
        }
    }

    fn classify_binding(
        &mut self,
        kind: DeclarationKind,
        id: &BindingIdentifier<'_>,
        declare: bool,
        anchor: u32,
    ) {
        if let Some(tag) = self.marker(anchor) {
            self.record(kind, id.name.as_str(), id.symbol_id.get(), tag, declare, id.span);
        }
    }

    fn classify_member(&mut self, kind: DeclarationKind, key: Span, span: Span) {
        if let Some(tag) = self.marker(span.start) {
            let name = self.key_text(key);
            self.record(kind, &name, None, tag, false, span);
        }
    }
}

impl<'a> Visit<'a> for Classifier<'_> {
    fn visit_statements(&mut self, it: &ArenaVec<'a, Statement<'a>>) {
        for stmt in it.iter() {
            if self.error.is_some() {
                return;
            }
            self.classify_statement(stmt);
            self.visit_statement(stmt);
        }
    }

    fn visit_class(&mut self, it: &Class<'a>) {
        self.containers
            .push(it.id.as_ref().map(|id| id.name.to_string()));
        walk::walk_class(self, it);
        self.containers.pop();
    }

    fn visit_method_definition(&mut self, it: &MethodDefinition<'a>) {
        let kind = match it.kind {
            MethodDefinitionKind::Constructor => DeclarationKind::Constructor,
            MethodDefinitionKind::Get => DeclarationKind::Accessor(AccessorKind::Get),
            MethodDefinitionKind::Set => DeclarationKind::Accessor(AccessorKind::Set),
            MethodDefinitionKind::Method => DeclarationKind::ClassMember,
        };
        self.classify_member(kind, it.key.span(), it.span);
        walk::walk_method_definition(self, it);
    }

    fn visit_property_definition(&mut self, it: &PropertyDefinition<'a>) {
        self.classify_member(DeclarationKind::ClassMember, it.key.span(), it.span);
        walk::walk_property_definition(self, it);
    }

    fn visit_ts_enum_declaration(&mut self, it: &TSEnumDeclaration<'a>) {
        self.containers.push(Some(it.id.name.to_string()));
        walk::walk_ts_enum_declaration(self, it);
        self.containers.pop();
    }

    fn visit_ts_enum_member(&mut self, it: &TSEnumMember<'a>) {
        self.classify_member(DeclarationKind::EnumMember, it.id.span(), it.span);
        walk::walk_ts_enum_member(self, it);
    }

    fn visit_ts_module_declaration(&mut self, it: &TSModuleDeclaration<'a>) {
        let name = match &it.id {
            TSModuleDeclarationName::Identifier(id) => Some(id.name.to_string()),
            _ => None,
        };
        let ambient = it.declare || self.in_ambient_context();

        self.containers.push(name);
        if ambient {
            self.ambient_depth += 1;
        }
        walk::walk_ts_module_declaration(self, it);
        if ambient {
            self.ambient_depth -= 1;
        }
        self.containers.pop();
    }

    fn visit_object_expression(&mut self, it: &ObjectExpression<'a>) {
        // Object literals are anonymous: their members get no prefix.
        self.containers.push(None);
        walk::walk_object_expression(self, it);
        self.containers.pop();
    }

    fn visit_object_property(&mut self, it: &ObjectProperty<'a>) {
        let kind = match it.kind {
            PropertyKind::Get => DeclarationKind::Accessor(AccessorKind::Get),
            PropertyKind::Set => DeclarationKind::Accessor(AccessorKind::Set),
            PropertyKind::Init => DeclarationKind::ClassMember,
        };
        self.classify_member(kind, it.key.span(), it.span);
        walk::walk_object_property(self, it);
    }

    fn visit_function_body(&mut self, it: &FunctionBody<'a>) {
        self.containers.push(None);
        walk::walk_function_body(self, it);
        self.containers.pop();
    }

    fn visit_static_block(&mut self, it: &StaticBlock<'a>) {
        // Bindings in a static block are locals, not members.
        self.containers.push(None);
        walk::walk_static_block(self, it);
        self.containers.pop();
    }
}
