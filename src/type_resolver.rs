use crate::extractor::parameters::split_top_level;
use crate::extractor::{FieldInfo, ResponseDetails};
use crate::parser::{Dialect, SourceFile, SourceModule};
use log::{debug, warn};
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;

/// Type resolver - recovers the field list of a request/response type by name.
///
/// Every module's files are searched for a declaration of the name. Two declaration
/// shapes are understood:
///
/// - inline parameter list: `data class Name(val a: A, ...)` or `record Name(A a, ...)`,
///   possibly spread over several lines
/// - class body: `class Name {` followed by one field per line, each starting with an
///   access-level token, up to the closing `}`
///
/// Types are matched by simple name only. When several files (or modules) declare the
/// same name, their fields are concatenated into one list; the lookup reports every
/// source so the ambiguity is visible to callers.
pub struct TypeResolver<'a> {
    modules: &'a [SourceModule],
}

/// Outcome of a field lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldLookup {
    /// At least one declaration was found and parsed cleanly
    Resolved {
        fields: Vec<FieldInfo>,
        /// Files that contributed fields, in module order
        sources: Vec<PathBuf>,
    },
    /// No file declares the type
    NotFound,
    /// A declaration was found but could not be parsed completely
    Malformed {
        /// Fields recovered before and around the problem
        fields: Vec<FieldInfo>,
        file: PathBuf,
        reason: String,
    },
}

impl FieldLookup {
    pub fn into_fields(self) -> Vec<FieldInfo> {
        match self {
            FieldLookup::Resolved { fields, .. } | FieldLookup::Malformed { fields, .. } => fields,
            FieldLookup::NotFound => Vec::new(),
        }
    }

    /// True when more than one file declared the type.
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, FieldLookup::Resolved { sources, .. } if sources.len() > 1)
    }
}

/// Fields captured from one declaration.
struct Capture {
    fields: Vec<FieldInfo>,
    problem: Option<String>,
}

const COLLECTION_WRAPPERS: &[&str] = &[
    "List",
    "MutableList",
    "ArrayList",
    "Set",
    "MutableSet",
    "HashSet",
    "Collection",
    "Iterable",
    "Array",
];

const BUILTIN_TYPES: &[&str] = &[
    "String", "Long", "Int", "Integer", "Short", "Byte", "Double", "Float", "Boolean", "Char",
    "Character", "Void", "Unit", "Any", "Object", "Map", "BigDecimal", "BigInteger", "LocalDate",
    "LocalDateTime", "Instant", "UUID", "long", "int", "short", "byte", "double", "float",
    "boolean", "char", "void",
];

static NAME_FIRST_PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:@[\w.]+(?:\([^)]*\))?\s+)*(?:(?:private|public|protected|internal|override|open)\s+)*(?:(?:val|var)\s+)?([A-Za-z_]\w*)\s*:\s*(.+?)(?:\s*=.*)?$",
    )
    .expect("field pattern is valid")
});

static NAME_FIRST_PROPERTY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?:private|public|protected|internal|override|open|lateinit)\s+)*(?:val|var)\s+([A-Za-z_]\w*)\s*:\s*(.+?)(?:\s*=.*)?$",
    )
    .expect("field pattern is valid")
});

static TYPE_FIRST_COMPONENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:@[\w.]+(?:\([^)]*\))?\s+)*(?:final\s+)?(.+?)\s+([A-Za-z_]\w*)$")
        .expect("field pattern is valid")
});

static TYPE_FIRST_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:private|public|protected)\s+(?:(?:final|transient|volatile)\s+)*([^()=;]+?)\s+([A-Za-z_]\w*)\s*(?:=[^;]*)?;$",
    )
    .expect("field pattern is valid")
});

impl<'a> TypeResolver<'a> {
    pub fn new(modules: &'a [SourceModule]) -> Self {
        debug!("Initializing TypeResolver with {} modules", modules.len());
        Self { modules }
    }

    /// Looks up the fields of `type_name`.
    ///
    /// Collection wrappers are unwrapped first, so `List<BookingResponse>` resolves
    /// `BookingResponse`. Built-in scalar types are never searched.
    pub fn lookup(&self, type_name: &str) -> FieldLookup {
        let name = target_type_name(type_name);
        if name.is_empty() || is_builtin_type(&name) {
            debug!("Skipping lookup for {:?}", type_name);
            return FieldLookup::NotFound;
        }

        let declared = declaration_pattern(&name);
        let mut fields = Vec::new();
        let mut sources = Vec::new();
        let mut malformed: Option<(PathBuf, String)> = None;

        for module in self.modules {
            for file in &module.files {
                if !declared.is_match(&file.content) {
                    continue;
                }

                let captures = parse_declarations(file, &name);
                if captures.is_empty() && malformed.is_none() {
                    malformed = Some((file.path.clone(), "declaration shape not recognised".to_string()));
                }
                for capture in captures {
                    fields.extend(capture.fields);
                    if let Some(reason) = capture.problem {
                        malformed.get_or_insert_with(|| (file.path.clone(), reason));
                    }
                }
                debug!("Type {} declared in {}", name, file.path.display());
                sources.push(file.path.clone());
            }
        }

        if sources.is_empty() {
            debug!("Type {} not found", name);
            return FieldLookup::NotFound;
        }

        if sources.len() > 1 {
            warn!(
                "Type {} is declared in {} files; concatenating their fields",
                name,
                sources.len()
            );
        }

        match malformed {
            Some((file, reason)) => {
                warn!("Malformed declaration of {} in {}: {}", name, file.display(), reason);
                FieldLookup::Malformed { fields, file, reason }
            }
            None => {
                debug!("Resolved {} fields for {}", fields.len(), name);
                FieldLookup::Resolved { fields, sources }
            }
        }
    }

    /// Builds the response details for a raw response type.
    pub fn response_details(&self, raw_type: &str) -> ResponseDetails {
        let element_type = collection_element(raw_type);
        let target = element_type.as_deref().unwrap_or(raw_type);
        let fields = if target.trim().is_empty() {
            Vec::new()
        } else {
            self.lookup(target).into_fields()
        };

        ResponseDetails {
            raw_type: raw_type.to_string(),
            is_collection: element_type.is_some(),
            element_type,
            fields,
        }
    }
}

/// Element type of a collection type (`List<T>`, `Set<T>`, `T[]`, ...), if it is one.
pub fn collection_element(raw_type: &str) -> Option<String> {
    let ty = raw_type.trim().trim_end_matches('?').trim();

    if let Some(element) = ty.strip_suffix("[]") {
        return Some(element.trim().to_string());
    }

    let open = ty.find('<')?;
    if !ty.ends_with('>') {
        return None;
    }
    let wrapper = ty[..open].trim();
    let wrapper = wrapper.rsplit('.').next().unwrap_or(wrapper);
    if !COLLECTION_WRAPPERS.contains(&wrapper) {
        return None;
    }
    let element = ty[open + 1..ty.len() - 1].trim();
    (!element.is_empty()).then(|| element.to_string())
}

/// Simple name to search for: collections unwrapped, nullability and package removed.
pub fn target_type_name(raw_type: &str) -> String {
    let mut ty = raw_type.trim().to_string();
    while let Some(element) = collection_element(&ty) {
        ty = element;
    }
    let leading: String = ty
        .trim()
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '.')
        .collect();
    leading.rsplit('.').next().unwrap_or("").to_string()
}

pub fn is_builtin_type(name: &str) -> bool {
    BUILTIN_TYPES.contains(&name)
}

fn declaration_pattern(name: &str) -> Regex {
    Regex::new(&format!(r"\b(?:class|record)\s+{}\b", regex::escape(name)))
        .expect("escaped declaration pattern is valid")
}

fn header_pattern(name: &str) -> Regex {
    Regex::new(&format!(
        r"^(?:(?:public|private|protected|internal|open|final|abstract|static|data|sealed|enum)\s+)*(?:class|record)\s+{}\b(.*)$",
        regex::escape(name)
    ))
    .expect("escaped header pattern is valid")
}

/// Captures every declaration of `name` in one file.
fn parse_declarations(file: &SourceFile, name: &str) -> Vec<Capture> {
    let header = header_pattern(name);
    let lines = file.lines();
    let mut captures = Vec::new();
    let mut index = 0;

    while index < lines.len() {
        let trimmed = lines[index].trim();
        let Some(caps) = header.captures(trimmed) else {
            index += 1;
            continue;
        };

        let rest = skip_type_parameters(caps[1].trim_start());
        let (capture, next) = if let Some(after_paren) = rest.strip_prefix('(') {
            parse_inline(&lines, index, after_paren, file.dialect)
        } else {
            parse_body(&lines, index, rest, file.dialect)
        };
        debug!(
            "Captured {} fields for {} in {}",
            capture.fields.len(),
            name,
            file.file_name()
        );
        captures.push(capture);
        index = next;
    }

    captures
}

/// Skips a leading `<...>` type-parameter list.
fn skip_type_parameters(rest: &str) -> &str {
    if !rest.starts_with('<') {
        return rest;
    }
    let mut depth = 0;
    for (offset, ch) in rest.char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => {
                depth -= 1;
                if depth == 0 {
                    return rest[offset + 1..].trim_start();
                }
            }
            _ => {}
        }
    }
    ""
}

/// Inline parameter-list shape. Returns the capture and the next line to inspect.
fn parse_inline(lines: &[&str], header_index: usize, after_paren: &str, dialect: Dialect) -> (Capture, usize) {
    let mut text = String::new();
    // the opening parenthesis is already consumed
    let mut depth = 1;
    let mut closed = scan_parameter_text(after_paren, &mut depth, &mut text);
    let mut index = header_index + 1;

    while !closed && index < lines.len() {
        let trimmed = lines[index].trim();
        text.push(' ');
        if trimmed.starts_with(')') {
            closed = true;
        } else {
            closed = scan_parameter_text(trimmed, &mut depth, &mut text);
        }
        index += 1;
    }

    let mut problem = (!closed).then(|| "parameter list not closed".to_string());
    let mut fields = Vec::new();
    for token in split_top_level(&text) {
        match parse_inline_field(&token, dialect) {
            Some(field) => fields.push(field),
            None => {
                problem.get_or_insert_with(|| format!("unparseable field `{}`", token));
            }
        }
    }

    (Capture { fields, problem }, index)
}

/// Appends `line` to `text` until the parameter list closes. Returns true once closed.
fn scan_parameter_text(line: &str, depth: &mut i32, text: &mut String) -> bool {
    let mut in_string = false;
    let mut prev = '\0';

    for ch in line.chars() {
        if in_string {
            if ch == '"' && prev != '\\' {
                in_string = false;
            }
        } else {
            match ch {
                '"' => in_string = true,
                '(' => *depth += 1,
                ')' => {
                    *depth -= 1;
                    if *depth == 0 {
                        return true;
                    }
                }
                _ => {}
            }
        }
        text.push(ch);
        prev = ch;
    }
    false
}

/// Class-body shape. Returns the capture and the next line to inspect.
fn parse_body(lines: &[&str], header_index: usize, rest: &str, dialect: Dialect) -> (Capture, usize) {
    let mut fields = Vec::new();

    // `class Empty {}` on one line
    if rest.contains('{') && rest.contains('}') {
        return (Capture { fields, problem: None }, header_index + 1);
    }

    // no body at all, unless the brace opens on the next line
    let brace_below = lines
        .get(header_index + 1)
        .is_some_and(|next| next.trim_start().starts_with('{'));
    if !rest.contains('{') && !brace_below {
        return (Capture { fields, problem: None }, header_index + 1);
    }

    for (index, line) in lines.iter().enumerate().skip(header_index + 1) {
        let trimmed = line.trim();
        if trimmed.starts_with('}') {
            return (Capture { fields, problem: None }, index + 1);
        }
        if starts_with_access_token(trimmed, dialect) {
            if let Some(field) = parse_body_field(trimmed, dialect) {
                fields.push(field);
            }
        }
    }

    let problem = Some("class body not closed".to_string());
    (Capture { fields, problem }, lines.len())
}

fn starts_with_access_token(trimmed: &str, dialect: Dialect) -> bool {
    let tokens: &[&str] = match dialect {
        Dialect::NameFirst => &["private ", "public ", "protected ", "internal ", "val ", "var ", "lateinit "],
        Dialect::TypeFirst => &["private ", "public ", "protected "],
    };
    tokens.iter().any(|t| trimmed.starts_with(t))
}

fn parse_inline_field(token: &str, dialect: Dialect) -> Option<FieldInfo> {
    let token = token.split_whitespace().collect::<Vec<_>>().join(" ");
    match dialect {
        Dialect::NameFirst => {
            let caps = NAME_FIRST_PARAM.captures(&token)?;
            Some(name_first_field(&caps[1], &caps[2]))
        }
        Dialect::TypeFirst => {
            let caps = TYPE_FIRST_COMPONENT.captures(&token)?;
            Some(FieldInfo::new(&caps[2], caps[1].trim(), false))
        }
    }
}

fn parse_body_field(line: &str, dialect: Dialect) -> Option<FieldInfo> {
    let line = line.trim_end_matches(|c| c == ',' || c == ' ');
    match dialect {
        Dialect::NameFirst => {
            let line = line.trim_end_matches(';');
            let caps = NAME_FIRST_PROPERTY.captures(line)?;
            Some(name_first_field(&caps[1], &caps[2]))
        }
        Dialect::TypeFirst => {
            let caps = TYPE_FIRST_FIELD.captures(line)?;
            let type_name = caps[1].trim();
            if type_name.split_whitespace().any(|w| w == "static") {
                return None;
            }
            Some(FieldInfo::new(&caps[2], type_name, false))
        }
    }
}

fn name_first_field(name: &str, raw_type: &str) -> FieldInfo {
    let raw_type = raw_type.trim();
    match raw_type.strip_suffix('?') {
        Some(base) => FieldInfo::new(name, base.trim(), true),
        None => FieldInfo::new(name, raw_type, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn module(name: &str, files: Vec<SourceFile>) -> SourceModule {
        SourceModule {
            name: name.to_string(),
            files,
        }
    }

    fn kt(path: &str, content: &str) -> SourceFile {
        SourceFile::new(path, "m", Dialect::NameFirst, content)
    }

    fn java(path: &str, content: &str) -> SourceFile {
        SourceFile::new(path, "m", Dialect::TypeFirst, content)
    }

    fn field(name: &str, ty: &str, nullable: bool) -> FieldInfo {
        FieldInfo::new(name, ty, nullable)
    }

    #[test]
    fn test_inline_single_line() {
        let modules = vec![module(
            "booking",
            vec![kt("Dto.kt", "data class UpdateBookingStatusRequest(val status: BookingStatus)\n")],
        )];
        let resolver = TypeResolver::new(&modules);

        assert_eq!(
            resolver.lookup("UpdateBookingStatusRequest"),
            FieldLookup::Resolved {
                fields: vec![field("status", "BookingStatus", false)],
                sources: vec![PathBuf::from("Dto.kt")],
            }
        );
    }

    #[test]
    fn test_inline_multi_line_with_defaults_and_nullability() {
        let source = r#"
data class CreateBookingRequest(
    val userId: Long,
    val serviceName: String,
    val tags: Map<String, List<String>> = emptyMap(),
    val notes: String? = null
) {
    companion object {
        val EMPTY = 1
    }
}
"#;
        let modules = vec![module("booking", vec![kt("Dto.kt", source)])];
        let fields = TypeResolver::new(&modules).lookup("CreateBookingRequest").into_fields();

        assert_eq!(
            fields,
            vec![
                field("userId", "Long", false),
                field("serviceName", "String", false),
                field("tags", "Map<String, List<String>>", false),
                field("notes", "String", true),
            ]
        );
    }

    #[test]
    fn test_body_shape_type_first() {
        let source = r#"
public class StockResponse {
    private static final long serialVersionUID = 1L;
    private Long id;
    private String symbol;
    private List<String> tags = new ArrayList<>();

    public StockResponse() {}

    public Long getId() {
        return id;
    }
}
"#;
        let modules = vec![module("stock", vec![java("StockResponse.java", source)])];
        let fields = TypeResolver::new(&modules).lookup("StockResponse").into_fields();

        assert_eq!(
            fields,
            vec![
                field("id", "Long", false),
                field("symbol", "String", false),
                field("tags", "List<String>", false),
            ]
        );
    }

    #[test]
    fn test_body_shape_name_first() {
        let source = "class UserProfile {\n    val name: String = \"\"\n    var email: String? = null\n    fun greet(): String = name\n}\n";
        let modules = vec![module("user", vec![kt("UserProfile.kt", source)])];
        let fields = TypeResolver::new(&modules).lookup("UserProfile").into_fields();

        assert_eq!(fields, vec![field("name", "String", false), field("email", "String", true)]);
    }

    #[test]
    fn test_record_declaration() {
        let source = "public record PriceView(Long id, Map<String, Double> prices) {}\n";
        let modules = vec![module("stock", vec![java("PriceView.java", source)])];
        let fields = TypeResolver::new(&modules).lookup("PriceView").into_fields();

        assert_eq!(fields, vec![field("id", "Long", false), field("prices", "Map<String, Double>", false)]);
    }

    #[test]
    fn test_exact_name_only() {
        let source = "data class BookingResponseV2(val id: Long)\n";
        let modules = vec![module("booking", vec![kt("Dto.kt", source)])];
        assert_eq!(TypeResolver::new(&modules).lookup("BookingResponse"), FieldLookup::NotFound);
    }

    #[test]
    fn test_collection_is_unwrapped() {
        let modules = vec![module("booking", vec![kt("Dto.kt", "data class BookingResponse(val id: Long)\n")])];
        let resolver = TypeResolver::new(&modules);

        let details = resolver.response_details("List<BookingResponse>");
        assert!(details.is_collection);
        assert_eq!(details.element_type.as_deref(), Some("BookingResponse"));
        assert_eq!(details.fields, vec![field("id", "Long", false)]);

        let details = resolver.response_details("BookingResponse");
        assert!(!details.is_collection);
        assert_eq!(details.element_type, None);
        assert_eq!(details.fields.len(), 1);
    }

    #[test]
    fn test_same_name_in_two_modules_concatenates() {
        let modules = vec![
            module("booking", vec![kt("a/Summary.kt", "data class Summary(val total: Long)\n")]),
            module("stock", vec![java("b/Summary.java", "public class Summary {\n    private Double average;\n}\n")]),
        ];
        let lookup = TypeResolver::new(&modules).lookup("Summary");

        assert!(lookup.is_ambiguous());
        assert_eq!(
            lookup.into_fields(),
            vec![field("total", "Long", false), field("average", "Double", false)]
        );
    }

    #[test]
    fn test_unclosed_parameter_list_is_malformed() {
        let source = "data class Broken(\n    val id: Long,\n    val name: String\n";
        let modules = vec![module("m", vec![kt("Broken.kt", source)])];

        match TypeResolver::new(&modules).lookup("Broken") {
            FieldLookup::Malformed { fields, file, reason } => {
                assert_eq!(fields.len(), 2);
                assert_eq!(file, PathBuf::from("Broken.kt"));
                assert_eq!(reason, "parameter list not closed");
            }
            other => panic!("expected malformed lookup, got {:?}", other),
        }
    }

    #[test]
    fn test_unrecognised_shape_is_malformed() {
        let source = "// see class Ghost for details\n";
        let modules = vec![module("m", vec![kt("Notes.kt", source)])];
        assert!(matches!(
            TypeResolver::new(&modules).lookup("Ghost"),
            FieldLookup::Malformed { .. }
        ));
    }

    #[test]
    fn test_builtin_types_are_not_searched() {
        let modules = vec![module("m", vec![kt("Weird.kt", "class String(val x: Int)\n")])];
        let resolver = TypeResolver::new(&modules);
        assert_eq!(resolver.lookup("String"), FieldLookup::NotFound);
        assert_eq!(resolver.lookup(""), FieldLookup::NotFound);
    }

    #[test]
    fn test_collection_element() {
        assert_eq!(collection_element("List<BookingResponse>").as_deref(), Some("BookingResponse"));
        assert_eq!(collection_element("java.util.Set<Stock>").as_deref(), Some("Stock"));
        assert_eq!(collection_element("StockResponse[]").as_deref(), Some("StockResponse"));
        assert_eq!(collection_element("List<Map<String, Long>>").as_deref(), Some("Map<String, Long>"));
        assert_eq!(collection_element("ArrayListHolder"), None);
        assert_eq!(collection_element("Map<String, Long>"), None);
    }

    #[test]
    fn test_target_type_name() {
        assert_eq!(target_type_name("List<List<BookingResponse>>"), "BookingResponse");
        assert_eq!(target_type_name("com.example.dto.UserResponse?"), "UserResponse");
        assert_eq!(target_type_name("StockResponse> filter(@RequestBody List<Long"), "StockResponse");
    }
}
