//! Pattern compilation.
//!
//! Trigger text is compiled once, at registration, into a [`CompiledPattern`]:
//! an ordered token sequence plus the metadata the sorter needs (feature
//! flags, literal-word count, weight) and a canonical text form.
//!
//! ## Pattern syntax
//!
//! ```text
//! hello there        literals, one input word each
//! *  _  #            any words / alphabetic words / digit words (1+ words)
//! (how are|how r)    alternation: one literal alternative, captured
//! [please|pls]       optional: zero or one literal alternative
//! @colors  (@colors) array reference, bare or captured
//! {weight=10}        tag, stripped from the text
//! ```
//!
//! Wildcards and groups that capture are numbered in declaration order,
//! starting at 1. Groups hold literal alternatives only.

use crate::error::{Error, Result};
use std::fmt::Write as _;

/// Content constraint of a wildcard token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum WildKind {
    /// `*`: any word.
    Any,
    /// `_`: words made of alphabetic characters only.
    Alpha,
    /// `#`: words made of digits only.
    Number,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Literal(String),
    Wild(WildKind),
    /// `(a|b c)`; each alternative is a non-empty word sequence.
    Alternation(Vec<Vec<String>>),
    /// `[a|b c]`
    Optional(Vec<Vec<String>>),
    /// `@name` or `(@name)`.
    Array { name: String, capture: bool },
}

impl Token {
    /// Whether this token produces a numbered capture.
    pub(crate) fn captures(&self) -> bool {
        match self {
            Token::Wild(_) | Token::Alternation(_) => true,
            Token::Array { capture, .. } => *capture,
            Token::Literal(_) | Token::Optional(_) => false,
        }
    }
}

bitflags::bitflags! {
    /// Which non-literal token kinds a pattern uses.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PatternFlags: u8 {
        const WILD_ANY    = 1 << 0;
        const WILD_ALPHA  = 1 << 1;
        const WILD_NUMBER = 1 << 2;
        const ALTERNATION = 1 << 3;
        const OPTIONAL    = 1 << 4;
        const ARRAY       = 1 << 5;
    }
}

/// A pattern after tokenization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CompiledPattern {
    /// Canonical text: lowercased, single-spaced, tags removed.
    pub text: String,
    pub tokens: Vec<Token>,
    pub flags: PatternFlags,
    /// Number of `Literal` tokens.
    pub literal_words: usize,
    /// Number of capturing tokens.
    pub captures: usize,
    /// Value of a `{weight=N}` tag, 0 when absent.
    pub weight: u32,
}

/// Compile `raw` pattern text.
///
/// Fails with [`Error::MalformedPattern`] when the text cannot be tokenized;
/// the caller decides whether that aborts anything beyond this one trigger.
pub(crate) fn compile(raw: &str) -> Result<CompiledPattern> {
    let (body, weight) = strip_tags(raw)?;
    let lowered = body.to_lowercase();

    let mut tokens: Vec<Token> = Vec::new();
    let mut word = String::new();
    // (opening bracket, buffered group content)
    let mut group: Option<(char, String)> = None;

    for ch in lowered.chars() {
        if let Some((open, buf)) = group.as_mut() {
            match ch {
                ')' | ']' if ch == closing(*open) => {
                    tokens.push(group_token(raw, *open, buf)?);
                    group = None;
                }
                ')' | ']' => return Err(Error::malformed(raw, format!("unexpected '{ch}' inside group"))),
                '(' | '[' => return Err(Error::malformed(raw, "nested groups are not supported")),
                _ => buf.push(ch),
            }
            continue;
        }

        match ch {
            '(' | '[' => {
                flush_word(raw, &mut word, &mut tokens)?;
                group = Some((ch, String::new()));
            }
            ')' | ']' => return Err(Error::malformed(raw, format!("unbalanced '{ch}'"))),
            c if c.is_whitespace() => flush_word(raw, &mut word, &mut tokens)?,
            c => word.push(c),
        }
    }

    if let Some((open, _)) = group {
        return Err(Error::malformed(raw, format!("unclosed '{open}'")));
    }
    flush_word(raw, &mut word, &mut tokens)?;

    if tokens.is_empty() {
        return Err(Error::malformed(raw, "empty pattern"));
    }

    let mut flags = PatternFlags::empty();
    for token in &tokens {
        flags |= match token {
            Token::Literal(_) => PatternFlags::empty(),
            Token::Wild(WildKind::Any) => PatternFlags::WILD_ANY,
            Token::Wild(WildKind::Alpha) => PatternFlags::WILD_ALPHA,
            Token::Wild(WildKind::Number) => PatternFlags::WILD_NUMBER,
            Token::Alternation(_) => PatternFlags::ALTERNATION,
            Token::Optional(_) => PatternFlags::OPTIONAL,
            Token::Array { .. } => PatternFlags::ARRAY,
        };
    }

    Ok(CompiledPattern {
        text: canonical_text(&tokens),
        literal_words: tokens.iter().filter(|t| matches!(t, Token::Literal(_))).count(),
        captures: tokens.iter().filter(|t| t.captures()).count(),
        tokens,
        flags,
        weight,
    })
}

/// Remove `{...}` tags, returning the remaining text and the trigger weight.
fn strip_tags(raw: &str) -> Result<(String, u32)> {
    let mut weight = 0;
    for caps in regex!(r"\{([^{}]*)\}").captures_iter(raw) {
        let tag = caps[1].trim().to_lowercase();
        match regex!(r"^weight\s*=\s*(\S+)$").captures(&tag) {
            Some(w) => {
                weight = w[1]
                    .parse::<u32>()
                    .map_err(|_| Error::malformed(raw, format!("invalid weight '{}'", &w[1])))?;
            }
            None => return Err(Error::malformed(raw, format!("unsupported tag '{{{tag}}}'"))),
        }
    }

    let body = regex!(r"\{[^{}]*\}").replace_all(raw, " ");
    if body.contains(['{', '}']) {
        return Err(Error::malformed(raw, "unbalanced tag braces"));
    }
    Ok((body.into_owned(), weight))
}

fn closing(open: char) -> char {
    if open == '(' { ')' } else { ']' }
}

fn flush_word(raw: &str, word: &mut String, tokens: &mut Vec<Token>) -> Result<()> {
    if word.is_empty() {
        return Ok(());
    }
    let token = match word.as_str() {
        "*" => Token::Wild(WildKind::Any),
        "_" => Token::Wild(WildKind::Alpha),
        "#" => Token::Wild(WildKind::Number),
        w if w.starts_with('@') => Token::Array { name: array_name(raw, &w[1..])?, capture: false },
        w if w.contains('*') => {
            return Err(Error::malformed(raw, format!("wildcard '*' must stand alone, found '{w}'")));
        }
        w => Token::Literal(w.to_string()),
    };
    tokens.push(token);
    word.clear();
    Ok(())
}

fn group_token(raw: &str, open: char, content: &str) -> Result<Token> {
    let content = content.trim();
    if content.is_empty() {
        return Err(Error::malformed(raw, "empty group"));
    }

    if open == '(' && content.starts_with('@') && !content.contains('|') {
        return Ok(Token::Array { name: array_name(raw, &content[1..])?, capture: true });
    }

    let mut alternatives = Vec::new();
    for alt in content.split('|') {
        let words: Vec<String> = alt.split_whitespace().map(str::to_string).collect();
        if words.is_empty() {
            return Err(Error::malformed(raw, "empty alternative in group"));
        }
        if let Some(bad) = words.iter().find(|w| matches!(w.as_str(), "_" | "#") || w.contains('*') || w.starts_with('@'))
        {
            return Err(Error::malformed(raw, format!("'{bad}' is not allowed inside a group")));
        }
        alternatives.push(words);
    }

    Ok(if open == '(' { Token::Alternation(alternatives) } else { Token::Optional(alternatives) })
}

fn array_name(raw: &str, name: &str) -> Result<String> {
    if regex!(r"^[a-z0-9_]+$").is_match(name) {
        Ok(name.to_string())
    } else {
        Err(Error::malformed(raw, format!("invalid array name '{name}'")))
    }
}

fn canonical_text(tokens: &[Token]) -> String {
    let mut out = String::new();
    for (idx, token) in tokens.iter().enumerate() {
        if idx > 0 {
            out.push(' ');
        }
        match token {
            Token::Literal(w) => out.push_str(w),
            Token::Wild(WildKind::Any) => out.push('*'),
            Token::Wild(WildKind::Alpha) => out.push('_'),
            Token::Wild(WildKind::Number) => out.push('#'),
            Token::Alternation(alts) => {
                let _ = write!(out, "({})", join_alternatives(alts));
            }
            Token::Optional(alts) => {
                let _ = write!(out, "[{}]", join_alternatives(alts));
            }
            Token::Array { name, capture: true } => {
                let _ = write!(out, "(@{name})");
            }
            Token::Array { name, capture: false } => {
                let _ = write!(out, "@{name}");
            }
        }
    }
    out
}

fn join_alternatives(alts: &[Vec<String>]) -> String {
    alts.iter().map(|words| words.join(" ")).collect::<Vec<_>>().join("|")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(w: &str) -> Token {
        Token::Literal(w.to_string())
    }

    #[test]
    fn compiles_literals_and_wildcards_in_order() {
        let p = compile("_ told me to say *").unwrap();
        assert_eq!(
            p.tokens,
            vec![Token::Wild(WildKind::Alpha), lit("told"), lit("me"), lit("to"), lit("say"), Token::Wild(WildKind::Any)]
        );
        assert_eq!(p.literal_words, 4);
        assert_eq!(p.captures, 2);
        assert_eq!(p.flags, PatternFlags::WILD_ALPHA | PatternFlags::WILD_ANY);
    }

    #[test]
    fn canonicalizes_case_and_spacing() {
        let p = compile("  My   Age is  # ").unwrap();
        assert_eq!(p.text, "my age is #");
        assert_eq!(p.tokens.last(), Some(&Token::Wild(WildKind::Number)));
    }

    #[test]
    fn groups_keep_capture_numbering() {
        let p = compile("(hi|hello there) [please] _ @names (@colors)").unwrap();
        assert_eq!(
            p.tokens,
            vec![
                Token::Alternation(vec![vec!["hi".into()], vec!["hello".into(), "there".into()]]),
                Token::Optional(vec![vec!["please".into()]]),
                Token::Wild(WildKind::Alpha),
                Token::Array { name: "names".into(), capture: false },
                Token::Array { name: "colors".into(), capture: true },
            ]
        );
        assert_eq!(p.captures, 3);
        assert_eq!(p.literal_words, 0);
        assert_eq!(p.text, "(hi|hello there) [please] _ @names (@colors)");
    }

    #[test]
    fn weight_tag_is_stripped() {
        let p = compile("hello {weight=25} bot").unwrap();
        assert_eq!(p.weight, 25);
        assert_eq!(p.text, "hello bot");
    }

    #[test]
    fn weight_tag_ignores_case() {
        let p = compile("hello {Weight = 5}").unwrap();
        assert_eq!(p.weight, 5);
        assert_eq!(p.text, "hello");
    }

    #[test]
    fn underscore_inside_word_is_literal() {
        let p = compile("snake_case").unwrap();
        assert_eq!(p.tokens, vec![lit("snake_case")]);
        assert!(p.flags.is_empty());
    }

    #[test]
    fn rejects_malformed_patterns() {
        for bad in [
            "",
            "   ",
            "(a|b",
            "a|b)",
            "[a (b)]",
            "()",
            "(a||b)",
            "[a|*]",
            "hel*o",
            "@Bad-Name",
            "hi {random}",
            "hi {weight=x}",
            "hi }",
        ] {
            match compile(bad) {
                Err(Error::MalformedPattern { pattern, .. }) => assert_eq!(pattern, bad),
                other => panic!("expected MalformedPattern for {bad:?}, got {other:?}"),
            }
        }
    }
}
