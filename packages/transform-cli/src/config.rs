// Config File Loading
//
// Transform options come either from a plain JSON options file or from the
// plugin entries of a tsconfig.json.

use std::fs;
use std::path::Path;

use anyhow::Context;
use internal_api_transform::{OutputArtifact, TransformOptions};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TsConfig {
    compiler_options: Option<CompilerOptions>,
}

#[derive(Debug, Default, Deserialize)]
struct CompilerOptions {
    #[serde(default)]
    plugins: Vec<Value>,
}

/// Options found in a config file, one entry per plugin configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    pub entries: Vec<TransformOptions>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        // tsconfig files are JSONC
        let content = strip_json_comments(content);
        let value: Value = serde_json::from_str(&content)?;

        if value.get("compilerOptions").is_some() {
            let tsconfig: TsConfig = serde_json::from_value(value)?;
            let plugins = tsconfig
                .compiler_options
                .map(|options| options.plugins)
                .unwrap_or_default();
            let entries = plugins
                .into_iter()
                .filter(is_transform_entry)
                .map(serde_json::from_value)
                .collect::<Result<Vec<TransformOptions>, _>>()?;
            if entries.is_empty() {
                anyhow::bail!("no plugin entry with an outputArtifact or transformType");
            }
            return Ok(Self { entries });
        }

        Ok(Self {
            entries: vec![serde_json::from_value(value)?],
        })
    }

    /// The entry for `artifact`, or the first entry when no artifact is
    /// requested or none matches.
    pub fn select(&self, artifact: Option<OutputArtifact>) -> TransformOptions {
        let matching = artifact.and_then(|wanted| {
            self.entries.iter().find(|entry| {
                entry
                    .output_artifact
                    .as_deref()
                    .and_then(|value| value.parse::<OutputArtifact>().ok())
                    == Some(wanted)
            })
        });
        matching
            .or_else(|| self.entries.first())
            .cloned()
            .unwrap_or_default()
    }
}

fn is_transform_entry(plugin: &Value) -> bool {
    plugin.get("outputArtifact").is_some() || plugin.get("transformType").is_some()
}

/// Remove `//` and `/* */` comments and trailing commas, leaving string
/// literals untouched.
fn strip_json_comments(input: &str) -> String {
    let mut stripped = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            stripped.push(c);
            match c {
                '\\' => stripped.extend(chars.next()),
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match (c, chars.peek()) {
            ('/', Some('/')) => while chars.next_if(|&next| next != '\n').is_some() {},
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
                stripped.push(' ');
            }
            _ => {
                in_string = c == '"';
                stripped.push(c);
            }
        }
    }

    strip_trailing_commas(&stripped)
}

/// Drop commas directly followed (past whitespace) by `}` or `]`.
fn strip_trailing_commas(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut result = String::with_capacity(input.len());
    let mut in_string = false;
    let mut escaped = false;

    for (index, &c) in chars.iter().enumerate() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
        } else if c == '"' {
            in_string = true;
        } else if c == ',' {
            let next = chars[index + 1..].iter().find(|next| !next.is_whitespace());
            if matches!(next, Some('}') | Some(']')) {
                continue;
            }
        }
        result.push(c);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_strip_line_and_block_comments() {
        let input = "{\n  // line\n  \"a\": 1, /* block\n spanning */ \"b\": 2\n}";
        let value: Value = serde_json::from_str(&strip_json_comments(input)).unwrap();
        assert_eq!(value["a"], 1);
        assert_eq!(value["b"], 2);
    }

    #[test]
    fn should_keep_comment_markers_inside_strings() {
        let input = r#"{ "url": "http://example.com/*x*/", "quote": "a\"//b" }"#;
        let value: Value = serde_json::from_str(&strip_json_comments(input)).unwrap();
        assert_eq!(value["url"], "http://example.com/*x*/");
        assert_eq!(value["quote"], "a\"//b");
    }

    #[test]
    fn should_drop_trailing_commas() {
        let input = "{ \"list\": [1, 2, ], \"s\": \",}\", }";
        let value: Value = serde_json::from_str(&strip_json_comments(input)).unwrap();
        assert_eq!(value["list"], serde_json::json!([1, 2]));
        assert_eq!(value["s"], ",}");
    }
}
