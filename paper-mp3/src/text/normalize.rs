//! Substitution of code points that speech synthesizers mispronounce.

/// Ligatures and symbols with their spoken replacements.
const SUBSTITUTIONS: &[(char, &str)] = &[
    ('\u{fb00}', "ff"),                   // Latin small ligature ff
    ('\u{fb01}', "fi"),                   // Latin small ligature fi
    ('\u{fb02}', "fl"),                   // Latin small ligature fl
    ('\u{fb03}', "ffi"),                  // Latin small ligature ffi
    ('\u{fb04}', "ffl"),                  // Latin small ligature ffl
    ('\u{fb05}', "st"),                   // Latin small ligature long s t
    ('\u{fb06}', "st"),                   // Latin small ligature st
    ('\u{226a}', "is much less than"),    // Much less-than
    ('\u{226b}', "is much greater than"), // Much greater-than
];

/// Replace ligatures and math symbols with ASCII text.
///
/// Everything outside the substitution table passes through unchanged, so
/// line structure (and therefore heading detection) is preserved.
pub fn normalize_text(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for c in text.chars() {
        match SUBSTITUTIONS.iter().find(|(ch, _)| *ch == c) {
            Some((_, replacement)) => result.push_str(replacement),
            None => result.push(c),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ligatures() {
        assert_eq!(normalize_text("\u{fb01}nal \u{fb02}ow"), "final flow");
        assert_eq!(normalize_text("e\u{fb00}ort, o\u{fb03}ce, wa\u{fb04}e"), "effort, office, waffle");
    }

    #[test]
    fn test_math_symbols() {
        assert_eq!(
            normalize_text("x \u{226a} y and y \u{226b} x"),
            "x is much less than y and y is much greater than x"
        );
    }

    #[test]
    fn test_unmapped_pass_through() {
        let text = "# Caf\u{e9}\n\u{201c}Quoted\u{201d} \u{2014} 100%\n";
        assert_eq!(normalize_text(text), text);
    }

    #[test]
    fn test_empty() {
        assert_eq!(normalize_text(""), "");
    }
}
