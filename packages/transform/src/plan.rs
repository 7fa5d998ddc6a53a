// Rewrite Planning
//
// Decides, per internal declaration, whether it gets mangled and what kind of
// forwarder stands in for it under the public name.

use indexmap::IndexMap;
use oxc_syntax::symbol::SymbolId;

use crate::classifier::{DeclarationKind, InternalDeclaration, VariableKind};
use crate::config::ResolvedOptions;
use crate::template::render_message;

/// Why a declaration is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassthroughReason {
    /// Interfaces, type aliases, enums and their members.
    TypeOnly,
    /// Class and object members, constructors, classes and namespaces.
    NotForwardable,
    /// `using` bindings cannot be re-bound by a forwarder.
    Unbindable,
    /// The name already carries the internal prefix.
    AlreadyMangled,
    /// A `declare`d value has nothing to forward to at runtime.
    Ambient,
}

/// How an internal declaration is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// A warning function forwarding its arguments.
    Thunk,
    /// A warning proxy over the mangled value.
    Proxy,
    Passthrough(PassthroughReason),
}

impl Strategy {
    pub fn rewrites(&self) -> bool {
        matches!(self, Strategy::Thunk | Strategy::Proxy)
    }
}

/// The decision for one internal declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewritePlan {
    pub kind: DeclarationKind,
    pub symbol_id: Option<SymbolId>,
    pub local_name: String,
    pub display_name: String,
    pub mangled_name: String,
    /// Rendered warning text.
    pub message: String,
    pub strategy: Strategy,
    /// A forwarder keeps the public name alive. False when deleting.
    pub emit_forward: bool,
    /// The forwarder needs a `declare` modifier in declaration output.
    pub declare_forward: bool,
}

impl RewritePlan {
    pub fn new(declaration: &InternalDeclaration, options: &ResolvedOptions) -> Self {
        Self {
            kind: declaration.kind,
            symbol_id: declaration.symbol_id,
            local_name: declaration.local_name.clone(),
            display_name: declaration.display_name.clone(),
            mangled_name: options.mangle(&declaration.local_name),
            message: render_message(&options.message_template, &declaration.display_name),
            strategy: choose_strategy(declaration, options),
            emit_forward: !options.delete_replacement,
            declare_forward: declaration.declare || !declaration.in_ambient_context,
        }
    }

    /// The declaration keyword for variable plans.
    pub fn variable_kind(&self) -> Option<VariableKind> {
        match self.kind {
            DeclarationKind::Variable(kind) => Some(kind),
            _ => None,
        }
    }
}

fn choose_strategy(declaration: &InternalDeclaration, options: &ResolvedOptions) -> Strategy {
    if declaration.kind.is_type_only() {
        return Strategy::Passthrough(PassthroughReason::TypeOnly);
    }
    if options.is_mangled(&declaration.local_name) {
        return Strategy::Passthrough(PassthroughReason::AlreadyMangled);
    }

    let strategy = match declaration.kind {
        DeclarationKind::Function => Strategy::Thunk,
        DeclarationKind::Variable(VariableKind::Using) => {
            Strategy::Passthrough(PassthroughReason::Unbindable)
        }
        DeclarationKind::Variable(_) => Strategy::Proxy,
        _ => Strategy::Passthrough(PassthroughReason::NotForwardable),
    };

    if strategy.rewrites() && declaration.is_ambient() && options.is_runtime() {
        return Strategy::Passthrough(PassthroughReason::Ambient);
    }
    strategy
}

/// All plans of a unit.
#[derive(Debug, Clone, Default)]
pub struct RewritePlans {
    /// Declarations that get mangled, keyed by their declaring symbol.
    by_symbol: IndexMap<SymbolId, RewritePlan>,
    passthrough: Vec<RewritePlan>,
}

impl RewritePlans {
    pub fn build(declarations: &[InternalDeclaration], options: &ResolvedOptions) -> Self {
        let mut plans = Self::default();
        for declaration in declarations {
            let plan = RewritePlan::new(declaration, options);
            match plan.symbol_id {
                Some(symbol_id) if plan.strategy.rewrites() => {
                    plans.by_symbol.insert(symbol_id, plan);
                }
                _ => plans.passthrough.push(plan),
            }
        }
        plans
    }

    pub fn get(&self, symbol_id: SymbolId) -> Option<&RewritePlan> {
        self.by_symbol.get(&symbol_id)
    }

    pub fn rewritten(&self) -> impl Iterator<Item = &RewritePlan> {
        self.by_symbol.values()
    }

    pub fn passthrough(&self) -> &[RewritePlan] {
        &self.passthrough
    }

    pub fn is_empty(&self) -> bool {
        self.by_symbol.is_empty()
    }
}
