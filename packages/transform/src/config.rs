// Transform Configuration
//
// Raw options as written in a config file or passed by a host, and the
// validated form every transform pass runs with.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::error::{TransformError, TransformResult};

/// The string prepended to the names of declarations marked internal.
pub const DEFAULT_INTERNAL_PREFIX: &str = "__INTERNAL_";

/// The message a consumer sees when using an internal API by its public name.
/// `{{name}}` is replaced with the declaration's display name.
pub const DEFAULT_MESSAGE_TEMPLATE: &str =
    "{{name}} is an internal API and may change without notice";

/// Documentation tags that mark a declaration internal.
pub const DEFAULT_MARK_TAGS: &[&str] = &["internal"];

/// Expression called with the rendered message by generated forwarders.
pub const DEFAULT_WARN_FUNCTION: &str = "console.warn";

/// Which output the pass produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputArtifact {
    /// Executable code: forwarders carry bodies and initializers.
    Runtime,
    /// Type declarations: forwarders are signatures only.
    Declarations,
}

impl OutputArtifact {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputArtifact::Runtime => "runtime",
            OutputArtifact::Declarations => "declarations",
        }
    }
}

impl fmt::Display for OutputArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputArtifact {
    type Err = TransformError;

    /// Accepts the artifact names plus the `.js` / `.d.ts` spellings used by
    /// compiler plugin configurations.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "runtime" | ".js" | "js" => Ok(OutputArtifact::Runtime),
            "declarations" | ".d.ts" | "d.ts" => Ok(OutputArtifact::Declarations),
            other => Err(TransformError::InvalidConfig(format!(
                "invalid output artifact '{}', must be 'runtime' or 'declarations'",
                other
            ))),
        }
    }
}

/// Options as supplied by the user. Every field is optional; unset fields
/// fall back to the defaults when resolved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransformOptions {
    /// `runtime` or `declarations`. Required.
    #[serde(alias = "transformType")]
    pub output_artifact: Option<String>,
    pub internal_prefix: Option<String>,
    pub message_template: Option<String>,
    pub delete_replacement: Option<bool>,
    pub internal_mark_tags: Option<Vec<String>>,
    pub warn_function: Option<String>,
}

impl TransformOptions {
    /// Layer `overrides` on top of `self`; set fields in `overrides` win.
    pub fn merge(self, overrides: TransformOptions) -> Self {
        Self {
            output_artifact: overrides.output_artifact.or(self.output_artifact),
            internal_prefix: overrides.internal_prefix.or(self.internal_prefix),
            message_template: overrides.message_template.or(self.message_template),
            delete_replacement: overrides.delete_replacement.or(self.delete_replacement),
            internal_mark_tags: overrides.internal_mark_tags.or(self.internal_mark_tags),
            warn_function: overrides.warn_function.or(self.warn_function),
        }
    }
}

/// Validated, immutable configuration for one transform pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOptions {
    pub output_artifact: OutputArtifact,
    pub internal_prefix: String,
    pub message_template: String,
    pub delete_replacement: bool,
    pub internal_mark_tags: IndexSet<String>,
    pub warn_function: String,
}

impl ResolvedOptions {
    /// Defaults for everything but the artifact.
    pub fn new(output_artifact: OutputArtifact) -> Self {
        Self {
            output_artifact,
            internal_prefix: DEFAULT_INTERNAL_PREFIX.to_string(),
            message_template: DEFAULT_MESSAGE_TEMPLATE.to_string(),
            delete_replacement: false,
            internal_mark_tags: DEFAULT_MARK_TAGS.iter().map(|t| t.to_string()).collect(),
            warn_function: DEFAULT_WARN_FUNCTION.to_string(),
        }
    }

    /// Validate raw options. Fails when the artifact is missing or
    /// unrecognized, or when the prefix is empty.
    pub fn resolve(options: &TransformOptions) -> TransformResult<Self> {
        let output_artifact = match options.output_artifact.as_deref() {
            Some(value) => value.parse::<OutputArtifact>()?,
            None => {
                return Err(TransformError::InvalidConfig(
                    "missing output artifact, must be 'runtime' or 'declarations'".to_string(),
                ))
            }
        };

        let mut resolved = Self::new(output_artifact);

        if let Some(prefix) = &options.internal_prefix {
            if prefix.is_empty() {
                return Err(TransformError::InvalidConfig(
                    "internal prefix must not be empty".to_string(),
                ));
            }
            resolved.internal_prefix = prefix.clone();
        }
        if let Some(template) = &options.message_template {
            resolved.message_template = template.clone();
        }
        if let Some(delete) = options.delete_replacement {
            resolved.delete_replacement = delete;
        }
        if let Some(tags) = &options.internal_mark_tags {
            resolved.internal_mark_tags = tags
                .iter()
                .map(|tag| tag.trim_start_matches('@').to_string())
                .filter(|tag| !tag.is_empty())
                .collect();
        }
        if let Some(warn_function) = &options.warn_function {
            if warn_function.trim().is_empty() {
                return Err(TransformError::InvalidConfig(
                    "warn function must not be empty".to_string(),
                ));
            }
            resolved.warn_function = warn_function.trim().to_string();
        }

        Ok(resolved)
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.internal_prefix = prefix.into();
        self
    }

    pub fn with_message_template(mut self, template: impl Into<String>) -> Self {
        self.message_template = template.into();
        self
    }

    pub fn with_delete_replacement(mut self, delete: bool) -> Self {
        self.delete_replacement = delete;
        self
    }

    pub fn with_mark_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.internal_mark_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_warn_function(mut self, warn_function: impl Into<String>) -> Self {
        self.warn_function = warn_function.into();
        self
    }

    /// Whether `tag` (without the leading `@`) marks a declaration internal.
    pub fn is_mark_tag(&self, tag: &str) -> bool {
        self.internal_mark_tags.contains(tag)
    }

    pub fn mangle(&self, local_name: &str) -> String {
        format!("{}{}", self.internal_prefix, local_name)
    }

    pub fn is_mangled(&self, name: &str) -> bool {
        name.starts_with(&self.internal_prefix)
    }

    pub fn is_runtime(&self) -> bool {
        self.output_artifact == OutputArtifact::Runtime
    }
}
