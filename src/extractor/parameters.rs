//! Parameter-list classification.
//!
//! A declaration's parameter list is split on commas at nesting depth zero, then each
//! token is matched against one ordered rule table. The first rule that matches decides
//! the token's [`ParameterBinding`].

use crate::extractor::{ParameterBinding, ParameterInfo};
use regex::Regex;
use std::sync::LazyLock;

/// Type recorded for a body parameter declared without a type.
pub const UNKNOWN_TYPE: &str = "unknown";

const IDENT: &str = r"[A-Za-z_]\w*";

#[derive(Debug, Clone, Copy)]
enum BindingKind {
    Path,
    Body,
    Plain,
}

#[derive(Debug, Clone, Copy)]
enum Shape {
    /// `name: Type`
    NameFirst,
    /// `Type name`
    TypeFirst,
    /// `name` with no type
    NameOnly,
}

struct Rule {
    regex: Regex,
    kind: BindingKind,
    shape: Shape,
}

impl Rule {
    fn new(pattern: &str, kind: BindingKind, shape: Shape) -> Self {
        Self {
            regex: Regex::new(pattern).expect("parameter rule pattern is valid"),
            kind,
            shape,
        }
    }
}

fn annotated(marker: &str, shape: Shape) -> String {
    let prefix = format!(r"{}(?:\([^)]*\))?\s+", regex::escape(marker));
    match shape {
        Shape::NameFirst => format!(r"{}(?:(?:val|var)\s+)?({})\s*:\s*(.+?)(?:\s*=.*)?$", prefix, IDENT),
        Shape::TypeFirst => format!(r"{}(?:final\s+)?(.+?)\s+({})$", prefix, IDENT),
        Shape::NameOnly => format!(r"{}({})$", prefix, IDENT),
    }
}

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new(&annotated("@PathVariable", Shape::NameFirst), BindingKind::Path, Shape::NameFirst),
        Rule::new(&annotated("@PathVariable", Shape::TypeFirst), BindingKind::Path, Shape::TypeFirst),
        Rule::new(&annotated("@RequestBody", Shape::NameFirst), BindingKind::Body, Shape::NameFirst),
        Rule::new(&annotated("@RequestBody", Shape::TypeFirst), BindingKind::Body, Shape::TypeFirst),
        Rule::new(&annotated("@RequestBody", Shape::NameOnly), BindingKind::Body, Shape::NameOnly),
        Rule::new(
            &format!(r"^(?:(?:val|var)\s+)?({})\s*:\s*(.+?)(?:\s*=.*)?$", IDENT),
            BindingKind::Plain,
            Shape::NameFirst,
        ),
        Rule::new(
            &format!(r"^(?:final\s+)?(.+?)\s+({})$", IDENT),
            BindingKind::Plain,
            Shape::TypeFirst,
        ),
    ]
});

static LEADING_ANNOTATIONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:@[\w.]+(?:\([^)]*\))?\s*)+").expect("annotation pattern is valid"));

/// Classifies the parameters of a declaration.
pub struct ParameterClassifier;

impl ParameterClassifier {
    /// Classifies every top-level token of `list`, skipping tokens no rule matches.
    pub fn classify_list(list: &str) -> Vec<ParameterInfo> {
        split_top_level(list)
            .iter()
            .filter_map(|token| Self::classify(token))
            .collect()
    }

    /// Classifies a single parameter token.
    pub fn classify(token: &str) -> Option<ParameterInfo> {
        let token = collapse_whitespace(token);
        if token.is_empty() {
            return None;
        }

        for rule in RULES.iter() {
            // plain rules see the token with annotations like @RequestParam removed
            let candidate = match rule.kind {
                BindingKind::Plain => LEADING_ANNOTATIONS.replace(&token, "").to_string(),
                _ => token.clone(),
            };
            let Some(caps) = rule.regex.captures(&candidate) else {
                continue;
            };

            let (name, type_name) = match rule.shape {
                Shape::NameFirst => (caps[1].to_string(), caps[2].trim().to_string()),
                Shape::TypeFirst => (caps[2].to_string(), caps[1].trim().to_string()),
                Shape::NameOnly => (caps[1].to_string(), UNKNOWN_TYPE.to_string()),
            };

            let binding = match rule.kind {
                BindingKind::Path => ParameterBinding::Path { name, type_name },
                BindingKind::Body => ParameterBinding::Body { name, type_name },
                BindingKind::Plain => ParameterBinding::Plain { name, type_name },
            };
            return Some(ParameterInfo::new(binding));
        }

        None
    }
}

/// Splits on commas that are not nested inside `<>`, `()`, `[]`, `{}` or a string
/// literal. Empty tokens are dropped.
pub fn split_top_level(list: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut depth: i32 = 0;
    let mut in_string = false;
    let mut prev = '\0';

    for ch in list.chars() {
        if in_string {
            current.push(ch);
            if ch == '"' && prev != '\\' {
                in_string = false;
            }
            prev = ch;
            continue;
        }

        match ch {
            '"' => in_string = true,
            '<' | '(' | '[' | '{' => depth += 1,
            // `->` in function types is not a closing bracket
            '>' if prev == '-' => {}
            '>' | ')' | ']' | '}' => depth -= 1,
            ',' if depth <= 0 => {
                push_token(&mut tokens, &current);
                current.clear();
                prev = ch;
                continue;
            }
            _ => {}
        }
        current.push(ch);
        prev = ch;
    }
    push_token(&mut tokens, &current);

    tokens
}

fn push_token(tokens: &mut Vec<String>, token: &str) {
    let token = token.trim();
    if !token.is_empty() {
        tokens.push(token.to_string());
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
