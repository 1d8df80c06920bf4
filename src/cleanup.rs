//! Text cleanup — literal, case-insensitive character substitution.
//!
//! OCR output routinely confuses a handful of glyphs (`©` for `c`, `|`
//! for `I`, ...). The built-in table covers the common ones; arbitrary
//! pairs go through the same `replace_literal`.

use regex::{NoExpand, RegexBuilder};
use serde::Serialize;

/// A target → replacement pair offered as a one-click cleanup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Substitution {
    pub id: &'static str,
    pub target: &'static str,
    pub replacement: &'static str,
}

pub const BUILTIN_SUBSTITUTIONS: [Substitution; 4] = [
    Substitution {
        id: "copyright",
        target: "©",
        replacement: "c",
    },
    Substitution {
        id: "euro",
        target: "€",
        replacement: "c",
    },
    Substitution {
        id: "cent",
        target: "¢",
        replacement: "c",
    },
    Substitution {
        id: "pipe",
        target: "|",
        replacement: "I",
    },
];

/// Replace every case-insensitive occurrence of `target` in `text`.
///
/// `target` is matched as literal text (regex metacharacters escaped) and
/// `replacement` is inserted verbatim, `$` included. Empty `text` or
/// `target` leaves the text unchanged.
///
/// Case folding is Unicode simple folding, not ASCII-only: `k` also
/// matches KELVIN SIGN (U+212A) and `s` matches LONG S (U+017F).
pub fn replace_literal(text: &str, target: &str, replacement: &str) -> String {
    if text.is_empty() || target.is_empty() {
        return text.to_string();
    }

    let pattern = match RegexBuilder::new(&regex::escape(target))
        .case_insensitive(true)
        .build()
    {
        Ok(p) => p,
        Err(e) => {
            // Only reachable for targets past the regex size limit.
            log::warn!("[CLEANUP] Cannot build pattern for {:?}: {}", target, e);
            return text.to_string();
        }
    };

    pattern.replace_all(text, NoExpand(replacement)).into_owned()
}
