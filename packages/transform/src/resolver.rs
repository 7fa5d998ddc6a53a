// Symbol Resolution
//
// The rewriter only needs one question answered by the host's semantic
// analysis: which declaration does this identifier refer to.

use oxc_ast::ast::IdentifierReference;
use oxc_semantic::Scoping;
use oxc_syntax::symbol::SymbolId;

/// Maps identifier occurrences to their declaring symbol.
pub trait SymbolResolver {
    /// `None` for globals and unresolved names.
    fn resolve(&self, ident: &IdentifierReference<'_>) -> Option<SymbolId>;

    /// Whether `ident` is read or written as a value. Annotations naming a
    /// type merged with a value are not, and neither are `typeof` queries.
    fn is_value_reference(&self, ident: &IdentifierReference<'_>) -> bool;
}

impl SymbolResolver for Scoping {
    fn resolve(&self, ident: &IdentifierReference<'_>) -> Option<SymbolId> {
        let reference_id = ident.reference_id.get()?;
        self.get_reference(reference_id).symbol_id()
    }

    fn is_value_reference(&self, ident: &IdentifierReference<'_>) -> bool {
        ident
            .reference_id
            .get()
            .is_some_and(|reference_id| self.get_reference(reference_id).is_value())
    }
}
