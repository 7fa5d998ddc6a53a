#![deny(clippy::all)]

/**
 * Internal API Transform
 *
 * Hides declarations documented `@internal` behind a mangled name and keeps
 * the public name alive as a forwarder that warns on use.
 */

// Options and diagnostics
pub mod config;
pub mod error;
pub mod logging;

// Analysis
pub mod classifier;
pub mod jsdoc;
pub mod plan;
pub mod resolver;

// Rewriting
pub mod emit;
pub mod rewriter;
pub mod synthesizer;
pub mod template;
pub mod transform;

// Re-exports
pub use classifier::{DeclarationKind, InternalDeclaration};
pub use config::{OutputArtifact, ResolvedOptions, TransformOptions};
pub use error::{TransformError, TransformResult};
pub use plan::{PassthroughReason, RewritePlan, Strategy};
pub use rewriter::RewriteRecord;
pub use transform::{transform_source, TransformOutput};
