//! Recovery of endpoint method declarations from raw source lines.
//!
//! Starting below an HTTP-method annotation, lines are captured from the first
//! method-start line while three independent depth counters (parentheses, braces,
//! angle brackets) are kept. Capture ends once parentheses and angle brackets are
//! balanced and a return-type separator or body brace has been seen, or as soon as a
//! body brace is open.

use crate::extractor::parameters::{ParameterClassifier, UNKNOWN_TYPE};
use crate::extractor::{ParameterBinding, ParameterInfo};
use crate::parser::Dialect;
use log::debug;
use regex::Regex;
use std::sync::LazyLock;

/// Line prefixes that open a method declaration.
pub const METHOD_START_TOKENS: &[&str] = &[
    "fun ",
    "suspend fun ",
    "override fun ",
    "internal fun ",
    "public ",
    "protected ",
];

static NAME_FIRST_RETURN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*:\s*([A-Za-z_][\w.<>?,\[\] ]*?)\s*(?:\{|=|$)").expect("return type pattern is valid")
});

static TYPE_FIRST_RETURN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?:public|protected|private|static|final|synchronized|abstract|default)\s+)*(.+?)\s+[A-Za-z_]\w*\s*$",
    )
    .expect("return type pattern is valid")
});

static METHOD_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z_]\w*)\s*$").expect("method name pattern is valid"));

/// The joined text of one method declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Captured lines, trimmed and joined with single spaces
    pub text: String,
    pub dialect: Dialect,
    /// Index of the method-start line
    pub start_line: usize,
    /// Index of the last captured line
    pub end_line: usize,
}

/// Captures method declarations below HTTP-method annotations.
pub struct SignatureExtractor;

impl SignatureExtractor {
    /// Captures the declaration of the method annotated at `annotation_index`.
    ///
    /// Returns `None` when no method-start line follows the annotation.
    pub fn extract(lines: &[&str], annotation_index: usize, dialect: Dialect) -> Option<Declaration> {
        let mut captured: Vec<&str> = Vec::new();
        let mut start_line = None;
        let mut end_line = annotation_index;
        let mut paren_depth: i32 = 0;
        let mut brace_depth: i32 = 0;
        let mut angle_depth: i32 = 0;
        let mut seen_terminator = false;

        for (index, line) in lines.iter().enumerate().skip(annotation_index + 1) {
            let trimmed = line.trim();

            if start_line.is_none() {
                if !is_method_start(trimmed) {
                    continue;
                }
                start_line = Some(index);
            }

            captured.push(trimmed);
            end_line = index;

            paren_depth += count(trimmed, '(') - count(trimmed, ')');
            brace_depth += count(trimmed, '{') - count(trimmed, '}');
            angle_depth += count(trimmed, '<') - count(trimmed, '>');
            seen_terminator |= has_terminator(trimmed, dialect);

            if paren_depth <= 0 && angle_depth <= 0 && seen_terminator {
                break;
            }
            if brace_depth > 0 {
                break;
            }
        }

        let Some(start_line) = start_line else {
            debug!("No method declaration after annotation on line {}", annotation_index + 1);
            return None;
        };

        let text = captured.join(" ");
        debug!("Method declaration: {}", text);

        Some(Declaration {
            text,
            dialect,
            start_line,
            end_line,
        })
    }
}

/// Whether a trimmed line opens a method declaration.
pub fn is_method_start(trimmed: &str) -> bool {
    METHOD_START_TOKENS.iter().any(|t| trimmed.starts_with(t))
}

fn count(text: &str, ch: char) -> i32 {
    text.chars().filter(|c| *c == ch).count() as i32
}

fn has_terminator(line: &str, dialect: Dialect) -> bool {
    match dialect {
        Dialect::NameFirst => line.contains(':') || line.contains('{'),
        // interface-style declarations end in `;`
        Dialect::TypeFirst => line.contains('{') || line.contains(';'),
    }
}

impl Declaration {
    /// Byte range of the outermost parameter list, excluding the parentheses.
    ///
    /// An unclosed list runs to the end of the text.
    fn parameter_span(&self) -> Option<(usize, usize)> {
        let open = self.text.find('(')?;
        let mut depth = 0;
        for (offset, ch) in self.text[open..].char_indices() {
            match ch {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some((open + 1, open + offset));
                    }
                }
                _ => {}
            }
        }
        Some((open + 1, self.text.len()))
    }

    /// Raw text between the outermost parentheses.
    pub fn parameter_list(&self) -> &str {
        match self.parameter_span() {
            Some((start, end)) => &self.text[start..end],
            None => "",
        }
    }

    /// Name of the declared method, if one precedes the parameter list.
    pub fn method_name(&self) -> Option<String> {
        let open = self.text.find('(')?;
        METHOD_NAME
            .captures(&self.text[..open])
            .map(|caps| caps[1].to_string())
    }

    pub fn parameters(&self) -> Vec<ParameterInfo> {
        ParameterClassifier::classify_list(self.parameter_list())
    }

    /// Request type name: the body parameter's type, else the first path variable's
    /// type, else empty.
    pub fn request_type(&self) -> String {
        let parameters = self.parameters();
        let body = parameters.iter().find_map(|p| match &p.binding {
            ParameterBinding::Body { type_name, .. } if type_name != UNKNOWN_TYPE => Some(type_name.clone()),
            _ => None,
        });
        body.or_else(|| {
            parameters.iter().find_map(|p| match &p.binding {
                ParameterBinding::Path { type_name, .. } => Some(type_name.clone()),
                _ => None,
            })
        })
        .unwrap_or_default()
    }

    /// Response type name.
    ///
    /// When the wrapper token is present, the result is everything between its opening
    /// `<` and the last `>` in the declaration. That match is greedy: an unrelated `>`
    /// later in the declaration (a generic parameter type, a comparison in a default
    /// value) is swallowed into the result.
    pub fn response_type(&self, wrapper: &str) -> String {
        let marker = format!("{}<", wrapper);
        if let Some(pos) = self.text.find(&marker) {
            let start = pos + marker.len();
            if let Some(end) = self.text.rfind('>') {
                if end > start {
                    return self.text[start..end].trim().to_string();
                }
            }
        }

        match self.dialect {
            Dialect::NameFirst => {
                let Some((_, close)) = self.parameter_span() else {
                    return String::new();
                };
                let rest = self.text.get(close + 1..).unwrap_or("");
                NAME_FIRST_RETURN
                    .captures(rest)
                    .map(|caps| caps[1].trim().to_string())
                    .unwrap_or_default()
            }
            Dialect::TypeFirst => {
                let Some(open) = self.text.find('(') else {
                    return String::new();
                };
                TYPE_FIRST_RETURN
                    .captures(&self.text[..open])
                    .map(|caps| caps[1].trim().to_string())
                    .unwrap_or_default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn extract(source: &str, dialect: Dialect) -> Option<Declaration> {
        let lines: Vec<&str> = source.lines().collect();
        let annotation = lines
            .iter()
            .position(|l| l.trim().starts_with("@GetMapping") || l.trim().starts_with("@PutMapping"))
            .unwrap();
        SignatureExtractor::extract(&lines, annotation, dialect)
    }

    #[test]
    fn test_single_line_name_first() {
        let source = r#"
    @GetMapping("/{id}")
    fun getBookingById(@PathVariable id: Long): ResponseEntity<BookingResponse> {
        val booking = bookingService.getBookingById(id)
    }
"#;
        let decl = extract(source, Dialect::NameFirst).unwrap();

        assert_eq!(decl.start_line, 2);
        assert_eq!(decl.end_line, 2);
        assert_eq!(decl.method_name().as_deref(), Some("getBookingById"));
        assert_eq!(decl.parameter_list(), "@PathVariable id: Long");
        assert_eq!(decl.request_type(), "Long");
        assert_eq!(decl.response_type("ResponseEntity"), "BookingResponse");
    }

    #[test]
    fn test_multi_line_matches_single_line() {
        let multi = r#"
    @PutMapping("/{id}")
    fun updateBooking(
        @PathVariable id: Long,
        @RequestBody request: UpdateBookingRequest
    ): ResponseEntity<BookingResponse> {
        return ResponseEntity.ok(x)
    }
"#;
        let single = r#"
    @PutMapping("/{id}")
    fun updateBooking(@PathVariable id: Long, @RequestBody request: UpdateBookingRequest): ResponseEntity<BookingResponse> {
    }
"#;
        let multi = extract(multi, Dialect::NameFirst).unwrap();
        let single = extract(single, Dialect::NameFirst).unwrap();

        assert_eq!(multi.end_line, 5);
        assert_eq!(multi.parameters(), single.parameters());
        assert_eq!(multi.request_type(), "UpdateBookingRequest");
        assert_eq!(multi.response_type("ResponseEntity"), single.response_type("ResponseEntity"));
    }

    #[test]
    fn test_type_first_declaration() {
        let source = r#"
    @GetMapping("/sector/{sector}")
    public ResponseEntity<List<StockResponse>> getStocksBySector(@PathVariable String sector) {
        return ResponseEntity.ok(stocks);
    }
"#;
        let decl = extract(source, Dialect::TypeFirst).unwrap();

        assert_eq!(decl.method_name().as_deref(), Some("getStocksBySector"));
        assert_eq!(decl.request_type(), "String");
        assert_eq!(decl.response_type("ResponseEntity"), "List<StockResponse>");
    }

    #[test]
    fn test_type_first_multi_line_with_nested_generics() {
        let source = r#"
    @PutMapping("/prices")
    public ResponseEntity<Map<String, Double>> updatePrices(
            @PathVariable Long id,
            @RequestBody Map<String, Double> prices) {
        return null;
    }
"#;
        let decl = extract(source, Dialect::TypeFirst).unwrap();
        let params = decl.parameters();

        assert_eq!(decl.end_line, 4);
        assert_eq!(params.len(), 2);
        assert_eq!(decl.request_type(), "Map<String, Double>");
    }

    #[test]
    fn test_response_without_wrapper() {
        let name_first = r#"
    @GetMapping
    fun all(): List<BookingResponse> = service.all()
"#;
        let type_first = r#"
    @GetMapping
    public List<StockResponse> all() {
"#;
        let decl = extract(name_first, Dialect::NameFirst).unwrap();
        assert_eq!(decl.response_type("ResponseEntity"), "List<BookingResponse>");

        let decl = extract(type_first, Dialect::TypeFirst).unwrap();
        assert_eq!(decl.response_type("ResponseEntity"), "List<StockResponse>");
    }

    #[test]
    fn test_greedy_response_capture_over_captures() {
        let source = r#"
    @GetMapping
    public ResponseEntity<StockResponse> filter(@RequestBody List<Long> ids) {
"#;
        let decl = extract(source, Dialect::TypeFirst).unwrap();
        // the last `>` belongs to the parameter type
        assert_eq!(
            decl.response_type("ResponseEntity"),
            "StockResponse> filter(@RequestBody List<Long"
        );
    }

    #[test]
    fn test_annotations_between_are_skipped() {
        let source = r#"
    @GetMapping("/top")
    @ResponseStatus(HttpStatus.OK)
    // cached
    fun top(): ResponseEntity<Void> {
"#;
        let decl = extract(source, Dialect::NameFirst).unwrap();
        assert_eq!(decl.start_line, 4);
        assert_eq!(decl.response_type("ResponseEntity"), "Void");
        assert_eq!(decl.request_type(), "");
    }

    #[test]
    fn test_no_method_start_returns_none() {
        let source = "@GetMapping(\"/x\")\nval notAMethod = 1\n";
        assert!(extract(source, Dialect::NameFirst).is_none());
    }

    #[test]
    fn test_is_method_start() {
        assert!(is_method_start("fun list(): String"));
        assert!(is_method_start("suspend fun list(): String"));
        assert!(is_method_start("public ResponseEntity<Void> delete(@PathVariable Long id) {"));
        assert!(!is_method_start("private val service: Service"));
    }
}
