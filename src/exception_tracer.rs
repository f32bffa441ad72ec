//! Raised-error tracing and the static error catalog.
//!
//! Two sources feed an endpoint's error list: the endpoint's own method body, and every
//! business-logic file of the controller's module (a file whose name contains one of the
//! configured role keywords). The second source is a co-location heuristic: it has no
//! call graph, so it can both over- and under-attribute errors.
//!
//! Both sources go through the same ordered raise-shape rules and land in one
//! [`ErrorAccumulator`], which keeps the first occurrence of each error type.

use crate::extractor::signature::{is_method_start, Declaration};
use crate::extractor::ErrorInfo;
use crate::parser::{SourceFile, SourceModule};
use log::debug;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Code assigned to error types missing from the catalog.
pub const FALLBACK_CODE: &str = "500";
/// Message assigned to error types missing from the catalog.
pub const FALLBACK_MESSAGE: &str = "An unknown error occurred";

/// Error type name to (code, default message).
const ERROR_CATALOG: &[(&str, &str, &str)] = &[
    ("UserNotFoundException", "404", "User not found"),
    ("BookingNotFoundException", "404", "Booking not found"),
    ("StockNotFoundException", "404", "Stock not found"),
    ("ValidationException", "400", "Invalid request"),
    ("UnauthorizedException", "401", "Authentication required"),
    ("ForbiddenException", "403", "Access denied"),
    ("ConflictException", "409", "Resource conflict"),
    ("InternalServerException", "500", "Internal server error"),
];

const TYPE_NAME: &str = r"((?:[a-z_]\w*\.)*[A-Z]\w*)";

/// A member declaration line: modifiers, then `fun`/`val`/`var`/`class`/`object`, or a
/// visibility-prefixed type-first member.
static MEMBER_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?:(?:private|internal|protected|public|override|open|suspend|inline|operator|data)\s+)*(?:fun|val|var|class|object|interface)\s|(?:private|protected|public|static)\s)",
    )
    .expect("member declaration pattern is valid")
});

/// `throw X("literal")` / `throw new X("literal")`
static LITERAL_RAISE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r#"\bthrow\s+(?:new\s+)?{}\s*\(\s*"([^"]*)"\s*\)"#, TYPE_NAME))
        .expect("raise pattern is valid")
});

/// `throw X(...)` / `throw new X(...)`
static RAISE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\bthrow\s+(?:new\s+)?{}\s*\(", TYPE_NAME)).expect("raise pattern is valid")
});

/// `orElseThrow { X(...) }`, `orElseThrow(() -> new X(...))`, `orElseThrow(X::new)`
static SUPPLIER_RAISE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"\borElseThrow\s*(?:\{{\s*(?:new\s+)?{ty}\s*\(\s*(?:"([^"]*)"\s*\))?|\(\s*\(\s*\)\s*->\s*(?:new\s+)?{ty}\s*\(\s*(?:"([^"]*)"\s*\))?|\(\s*{ty}::new\b)"#,
        ty = TYPE_NAME
    ))
    .expect("supplier pattern is valid")
});

/// A raised error found on one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaiseSite {
    pub error_type: String,
    pub message: Option<String>,
}

/// Matches one line against the raise shapes, in order. The first match wins.
pub fn match_raise(line: &str) -> Option<RaiseSite> {
    if let Some(caps) = LITERAL_RAISE.captures(line) {
        return Some(RaiseSite {
            error_type: simple_name(&caps[1]),
            message: Some(caps[2].to_string()),
        });
    }

    if let Some(caps) = RAISE.captures(line) {
        return Some(RaiseSite {
            error_type: simple_name(&caps[1]),
            message: None,
        });
    }

    let caps = SUPPLIER_RAISE.captures(line)?;
    // (type group, message group) per alternative
    let (type_match, message) = [(1, Some(2)), (3, Some(4)), (5, None)]
        .into_iter()
        .find_map(|(ty, msg)| {
            caps.get(ty)
                .map(|m| (m.as_str(), msg.and_then(|i| caps.get(i)).map(|m| m.as_str().to_string())))
        })?;
    Some(RaiseSite {
        error_type: simple_name(type_match),
        message,
    })
}

fn simple_name(qualified: &str) -> String {
    qualified.rsplit('.').next().unwrap_or(qualified).to_string()
}

/// HTTP status code for an error type.
pub fn error_code(error_type: &str) -> &'static str {
    ERROR_CATALOG
        .iter()
        .find(|(name, _, _)| *name == error_type)
        .map(|(_, code, _)| *code)
        .unwrap_or(FALLBACK_CODE)
}

/// Default display message for an error type.
pub fn default_message(error_type: &str) -> &'static str {
    ERROR_CATALOG
        .iter()
        .find(|(name, _, _)| *name == error_type)
        .map(|(_, _, message)| *message)
        .unwrap_or(FALLBACK_MESSAGE)
}

impl From<RaiseSite> for ErrorInfo {
    fn from(site: RaiseSite) -> Self {
        let code = error_code(&site.error_type).to_string();
        let display_message = site
            .message
            .clone()
            .unwrap_or_else(|| default_message(&site.error_type).to_string());
        ErrorInfo {
            error_type: site.error_type,
            message: site.message,
            code,
            display_message,
        }
    }
}

/// Ordered error list, deduplicated by error type (first occurrence kept).
#[derive(Debug, Default)]
pub struct ErrorAccumulator {
    seen: HashSet<String>,
    errors: Vec<ErrorInfo>,
}

impl ErrorAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `error` unless its type is already present. Returns true if it was added.
    pub fn push(&mut self, error: ErrorInfo) -> bool {
        if !self.seen.insert(error.error_type.clone()) {
            return false;
        }
        self.errors.push(error);
        true
    }

    pub fn extend(&mut self, errors: impl IntoIterator<Item = ErrorInfo>) {
        for error in errors {
            self.push(error);
        }
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_vec(self) -> Vec<ErrorInfo> {
        self.errors
    }
}

fn ends_expression_body(trimmed: &str) -> bool {
    trimmed.starts_with('@') || is_method_start(trimmed) || MEMBER_DECLARATION.is_match(trimmed)
}

/// Traces raised errors through method bodies and business-logic files.
pub struct ExceptionTracer<'a> {
    modules: &'a [SourceModule],
    keywords: &'a [String],
}

impl<'a> ExceptionTracer<'a> {
    pub fn new(modules: &'a [SourceModule], keywords: &'a [String]) -> Self {
        Self { modules, keywords }
    }

    /// Scans a method body starting at its declaration's first line.
    ///
    /// The scan ends on the line where the brace depth returns to zero. If no brace has
    /// opened by the end of the declaration (expression-bodied functions), it also ends
    /// at the next annotation or member declaration, or where the enclosing class closes.
    pub fn trace_method_body(&self, lines: &[&str], declaration: &Declaration, errors: &mut ErrorAccumulator) {
        let mut depth: i32 = 0;
        let mut opened = false;

        for (index, line) in lines.iter().enumerate().skip(declaration.start_line) {
            let trimmed = line.trim();
            if !opened && index > declaration.end_line && ends_expression_body(trimmed) {
                break;
            }

            if let Some(site) = match_raise(trimmed) {
                debug!("Line {}: raises {}", index + 1, site.error_type);
                errors.push(site.into());
            }

            for ch in trimmed.chars() {
                match ch {
                    '{' => {
                        depth += 1;
                        opened = true;
                    }
                    '}' => depth -= 1,
                    _ => {}
                }
            }
            // a closing brace with nothing opened is the end of the enclosing class
            if (opened && depth <= 0) || depth < 0 {
                break;
            }
        }
    }

    /// Errors raised anywhere in the business-logic files of `module`.
    pub fn business_errors(&self, module: &str) -> Vec<ErrorInfo> {
        let mut errors = ErrorAccumulator::new();

        for file in self.business_files(module) {
            let before = errors.len();
            for line in file.lines() {
                if let Some(site) = match_raise(line.trim()) {
                    errors.push(site.into());
                }
            }
            debug!(
                "Business file {}: {} new error types",
                file.file_name(),
                errors.len() - before
            );
        }

        errors.into_vec()
    }

    fn business_files(&self, module: &str) -> Vec<&'a SourceFile> {
        self.modules
            .iter()
            .filter(|m| m.name == module)
            .flat_map(|m| m.files.iter())
            .filter(|f| {
                let name = f.file_name();
                self.keywords.iter().any(|k| !k.is_empty() && name.contains(k.as_str()))
            })
            .collect()
    }
}
