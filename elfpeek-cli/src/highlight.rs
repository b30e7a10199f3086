//! Colour highlighting applied to already rendered text.

use colored::{Color, Colorize};

/// What a rule matches at the current position.
enum Pattern {
    /// A word, compared ASCII case-insensitively.
    Word(&'static str),
    /// `0x` followed by one or more lowercase hex digits.
    HexLiteral,
}

/// Checked in order at every position; the first match wins.
const RULES: &[(Pattern, Color)] = &[
    (Pattern::Word("section"), Color::Blue),
    (Pattern::Word("program"), Color::Green),
    (Pattern::HexLiteral, Color::Magenta),
];

impl Pattern {
    /// Length in bytes of the match at the start of `s`, if any.
    fn match_len(&self, s: &str) -> Option<usize> {
        match self {
            Pattern::Word(word) => s
                .get(..word.len())
                .filter(|head| head.eq_ignore_ascii_case(word))
                .map(str::len),
            Pattern::HexLiteral => {
                let digits = s
                    .strip_prefix("0x")?
                    .bytes()
                    .take_while(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
                    .count();
                (digits > 0).then_some(2 + digits)
            }
        }
    }
}

/// Wraps every rule match in `text` with its colour.
///
/// Whether escape codes are actually emitted is up to `colored`'s global override.
pub fn highlight(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(ch) = rest.chars().next() {
        let hit = RULES
            .iter()
            .find_map(|(pattern, color)| pattern.match_len(rest).map(|len| (len, *color)));
        let len = match hit {
            Some((len, color)) => {
                out.push_str(&rest[..len].color(color).to_string());
                len
            }
            None => {
                out.push(ch);
                ch.len_utf8()
            }
        };
        rest = &rest[len..];
    }
    out
}
