// JSDoc Scanner
//
// Finds the documentation blocks written directly in front of a declaration
// and extracts their tags. The parser drops comments from the tree, so the
// scan works on the source text preceding the declaration's span.

/// A single `@tag text` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsDocTag {
    /// Tag name without the `@` (e.g. "internal", "param").
    pub name: String,
    /// Tag text, whitespace-collapsed.
    pub text: String,
}

/// A parsed documentation block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsDoc {
    pub description: String,
    pub tags: Vec<JsDocTag>,
}

impl JsDoc {
    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t.name == name)
    }
}

/// Raw `/** ... */` blocks directly preceding byte offset `start`, in source
/// order. Plain block comments and whole-line `//` comments between the
/// blocks and the declaration are skipped; anything else ends the scan.
pub fn leading_doc_blocks(source: &str, start: u32) -> Vec<&str> {
    let mut end = (start as usize).min(source.len());
    while !source.is_char_boundary(end) {
        end -= 1;
    }

    let mut blocks = Vec::new();
    loop {
        let before = source[..end].trim_end();

        if let Some(body) = before.strip_suffix("*/") {
            let Some(open) = body.rfind("/*") else {
                break;
            };
            let comment = &before[open..];
            if comment.starts_with("/**") && comment != "/**/" {
                blocks.push(comment);
            }
            end = open;
            continue;
        }

        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        if before[line_start..].trim_start().starts_with("//") {
            end = line_start;
            continue;
        }
        break;
    }

    blocks.reverse();
    blocks
}

/// Parse the documentation in front of `start`. `None` when there is no
/// documentation block at all, which lets callers reject most declarations
/// without looking at tags.
pub fn leading_jsdoc(source: &str, start: u32) -> Option<Vec<JsDoc>> {
    let blocks = leading_doc_blocks(source, start);
    if blocks.is_empty() {
        return None;
    }
    Some(blocks.into_iter().map(parse).collect())
}

/// Parse one `/** ... */` comment (delimiters optional).
pub fn parse(comment: &str) -> JsDoc {
    let body = comment.trim();
    let body = body.strip_prefix("/**").unwrap_or(body);
    let body = body.strip_suffix("*/").unwrap_or(body);

    let mut doc = JsDoc::default();
    let mut current_tag: Option<JsDocTag> = None;
    let mut brace_depth = 0usize;

    for line in body.lines() {
        let trimmed = line.trim().trim_start_matches('*').trim();

        for word in trimmed.split_whitespace() {
            if brace_depth == 0 {
                if let Some(name) = tag_name(word) {
                    if let Some(tag) = current_tag.take() {
                        doc.tags.push(tag);
                    }
                    let mut tag = JsDocTag {
                        name: name.to_string(),
                        text: String::new(),
                    };
                    let rest = &word[1 + name.len()..];
                    if !rest.is_empty() {
                        push_word(&mut tag.text, rest);
                    }
                    current_tag = Some(tag);
                    continue;
                }
            }

            brace_depth += word.matches('{').count();
            brace_depth = brace_depth.saturating_sub(word.matches('}').count());

            match current_tag.as_mut() {
                Some(tag) => push_word(&mut tag.text, word),
                None => push_word(&mut doc.description, word),
            }
        }
    }

    if let Some(tag) = current_tag {
        doc.tags.push(tag);
    }

    doc
}

/// `@name...` → `name`, for words that open a block tag.
fn tag_name(word: &str) -> Option<&str> {
    let rest = word.strip_prefix('@')?;
    let len = rest
        .char_indices()
        .find(|(_, c)| !(c.is_alphanumeric() || *c == '_' || *c == '-'))
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    if len == 0 {
        None
    } else {
        Some(&rest[..len])
    }
}

fn push_word(text: &mut String, word: &str) {
    if !text.is_empty() {
        text.push(' ');
    }
    text.push_str(word);
}
