//! Exhaustive Package Tests
//!
//! Runs the transform over a unit that marks one of every declaration kind
//! internal and checks the contract a consumer relies on.

mod util;

use internal_api_transform::emit::strip_types;
use internal_api_transform::{DeclarationKind, PassthroughReason, Strategy};
use util::*;

const PATH: &str = "exhaustive.ts";

// ============================================================================
// Runtime output
// ============================================================================

#[test]
fn importing_the_unit_does_not_warn() {
    let output = transform(&fixture(PATH), PATH, &runtime());
    let calls = warn_calls(&output.code, PATH);
    assert_eq!(calls.top_level, 0, "{}", output.code);
    // One warning per thunk, three traps per proxy.
    assert_eq!(calls.nested, 1 + 5 * 3, "{}", output.code);
}

#[test]
fn should_mangle_functions_and_bindings() {
    let output = transform(&fixture(PATH), PATH, &runtime());
    let mangled: Vec<(&str, Strategy)> = output
        .rewrites
        .iter()
        .map(|r| (r.local_name.as_str(), r.strategy))
        .collect();

    assert_eq!(
        mangled,
        vec![
            ("internalFunctionDecl", Strategy::Thunk),
            ("internalArrowFunction", Strategy::Proxy),
            ("internalFunctionExpr", Strategy::Proxy),
            ("internalVar", Strategy::Proxy),
            ("internalLet", Strategy::Proxy),
            ("internalConst", Strategy::Proxy),
        ]
    );
}

#[test]
fn function_declaration_forwards_with_one_warning() {
    let output = transform(&fixture(PATH), PATH, &runtime());

    let forward = function_source(&output.code, "internalFunctionDecl");
    assert_eq!(forward.matches("console.warn(").count(), 1);
    assert!(forward.contains("is an internal API and may change without notice"));
    assert!(forward.contains("__INTERNAL_internalFunctionDecl(...args)"));

    let mangled = function_source(&output.code, "__INTERNAL_internalFunctionDecl");
    assert!(!mangled.contains("console.warn"));
}

#[test]
fn unit_references_use_the_mangled_names() {
    let output = transform(&fixture(PATH), PATH, &runtime());
    assert!(output.code.contains("__INTERNAL_internalFunctionDecl();"));
    assert!(output.code.contains("_test = __INTERNAL_internalVar"));

    let calls = output
        .rewrites
        .iter()
        .find(|r| r.local_name == "internalFunctionDecl")
        .unwrap();
    assert_eq!(calls.references, 1);
}

#[test]
fn bindings_forward_through_proxies() {
    let output = transform(&fixture(PATH), PATH, &runtime());
    for name in ["internalArrowFunction", "internalVar", "internalLet", "internalConst"] {
        assert!(
            output
                .code
                .contains(&format!("new Proxy(Object(__INTERNAL_{}),", name)),
            "missing proxy for {}:\n{}",
            name,
            output.code
        );
    }
    assert!(output.code.contains("export var internalVar"));
    assert!(output.code.contains("export let internalLet"));
}

#[test]
fn classes_members_and_types_are_untouched() {
    let output = transform(&fixture(PATH), PATH, &runtime());
    assert!(output.code.contains("export class InternalClass"));
    assert!(output.code.contains("internalMethod()"));
    assert!(output.code.contains("export interface InternalInterface"));
    assert!(output.code.contains("export enum InternalEnum"));
    assert!(output.code.contains("internalEnumMember = 2"));
    assert!(!output.code.contains("__INTERNAL_InternalClass"));
    assert!(!output.code.contains("__INTERNAL_internalMethod"));
}

#[test]
fn should_report_every_internal_declaration() {
    let output = transform(&fixture(PATH), PATH, &runtime());
    let names: Vec<(&str, DeclarationKind)> = output
        .declarations
        .iter()
        .map(|d| (d.display_name.as_str(), d.kind))
        .collect();

    for expected in [
        "InternalClass",
        "PublicClass.internalMethod",
        "PublicClass.internalProperty",
        "PublicClass",
        "InternalInterface",
        "InternalType",
        "InternalEnum",
        "PublicEnum.internalEnumMember",
    ] {
        assert!(
            names.iter().any(|(name, _)| *name == expected),
            "{} not reported in {:?}",
            expected,
            names
        );
    }
    assert!(names.contains(&("PublicClass", DeclarationKind::Constructor)));
    assert!(!names.iter().any(|(name, _)| *name == "PublicEnum.publicEnumMember"));
}

#[test]
fn runtime_output_strips_to_javascript() {
    let output = transform(&fixture(PATH), PATH, &runtime());
    let js = strip_types(&output.code, PATH).unwrap();
    assert!(!js.contains("Parameters<"));
    assert!(!js.contains("interface InternalInterface"));
    assert!(js.contains("__INTERNAL_internalFunctionDecl(...args)"));
    assert_eq!(warn_calls(&js, "exhaustive.js").top_level, 0);
}

// ============================================================================
// Idempotence and delete mode
// ============================================================================

#[test]
fn second_pass_changes_nothing() {
    let first = transform(&fixture(PATH), PATH, &runtime());
    let second = transform(&first.code, PATH, &runtime());

    assert!(second.is_unchanged());
    assert!(!second.code.contains("__INTERNAL___INTERNAL_"));
    for declaration in &second.declarations {
        if declaration.local_name.starts_with("__INTERNAL_") {
            let plan = internal_api_transform::RewritePlan::new(declaration, &runtime());
            assert_eq!(
                plan.strategy,
                Strategy::Passthrough(PassthroughReason::AlreadyMangled)
            );
        }
    }
}

#[test]
fn delete_mode_removes_public_names() {
    let options = runtime().with_delete_replacement(true);
    let output = transform(&fixture(PATH), PATH, &options);

    assert!(output.code.contains("export function __INTERNAL_internalFunctionDecl()"));
    assert!(!output.code.contains("function internalFunctionDecl("));
    assert!(!output.code.contains("new Proxy"));
    assert!(!output.code.contains("console.warn"));
    assert!(output.rewrites.iter().all(|r| !r.forwarded));
}
