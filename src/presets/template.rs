//! Positional argument templates.
//!
//! Scale templates use sequential `{}` slots, encode templates use indexed
//! `{0}`/`{1}` slots. Anything else between braces is copied through
//! untouched so relay-side placeholders such as `{output}` survive rendering.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Next,
    Index(usize),
}

/// A template with positional slots, parsed once from a static string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    raw: &'static str,
}

impl Template {
    pub const fn new(raw: &'static str) -> Self {
        Self { raw }
    }

    /// Number of distinct values the template consumes.
    pub fn slot_count(&self) -> usize {
        let mut next = 0;
        let mut max_index = 0;
        for (_, slot) in scan(self.raw) {
            match slot {
                Slot::Next => {
                    next += 1;
                    max_index = max_index.max(next);
                }
                Slot::Index(i) => max_index = max_index.max(i + 1),
            }
        }
        max_index
    }

    /// Substitute `args` into the slots.
    ///
    /// A slot without a matching argument renders empty; callers pass exactly
    /// `slot_count()` values and the static tables are checked against that.
    pub fn render(&self, args: &[&dyn fmt::Display]) -> String {
        let mut out = String::with_capacity(self.raw.len() + 16);
        let mut cursor = 0;
        let mut next = 0;

        for (range, slot) in scan(self.raw) {
            out.push_str(&self.raw[cursor..range.0]);
            let idx = match slot {
                Slot::Next => {
                    next += 1;
                    next - 1
                }
                Slot::Index(i) => i,
            };
            match args.get(idx) {
                Some(value) => out.push_str(&value.to_string()),
                None => tracing::warn!(template = self.raw, slot = idx, "missing template value"),
            }
            cursor = range.1;
        }
        out.push_str(&self.raw[cursor..]);
        out
    }

    /// Render, then split on whitespace into discrete argument tokens.
    pub fn render_tokens(&self, args: &[&dyn fmt::Display]) -> Vec<String> {
        self.render(args)
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.raw)
    }
}

/// Locate `{}` and `{N}` slots, returning byte ranges covering the braces.
fn scan(raw: &str) -> Vec<((usize, usize), Slot)> {
    let bytes = raw.as_bytes();
    let mut slots = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'{' {
            i += 1;
            continue;
        }
        let Some(close) = raw[i + 1..].find('}') else {
            break;
        };
        let inner = &raw[i + 1..i + 1 + close];
        let end = i + close + 2;
        if inner.is_empty() {
            slots.push(((i, end), Slot::Next));
        } else if let Ok(index) = inner.parse::<usize>() {
            slots.push(((i, end), Slot::Index(index)));
        }
        i = end;
    }

    slots
}

/// True when the text still carries a positional slot.
pub fn has_unresolved_slot(text: &str) -> bool {
    !scan(text).is_empty()
}
