//! Controller extraction and the endpoint data model.
//!
//! [`ControllerExtractor`] walks a controller source line by line. The first
//! route-annotation line sets the base path, the first `class` line naming a controller
//! sets the class name, and every line starting with an HTTP-method annotation becomes
//! an [`EndpointInfo`]:
//!
//! - [`signature`] recovers the annotated method's declaration text
//! - [`parameters`] classifies its parameter list
//! - [`crate::type_resolver`] resolves request/response fields
//! - [`crate::exception_tracer`] collects the errors the endpoint can raise
//!
//! # Example
//!
//! ```no_run
//! use controller_docs::config::AnalysisConfig;
//! use controller_docs::exception_tracer::ExceptionTracer;
//! use controller_docs::extractor::ControllerExtractor;
//! use controller_docs::parser::{Dialect, SourceFile, SourceModule};
//! use controller_docs::type_resolver::TypeResolver;
//!
//! let config = AnalysisConfig::default();
//! let modules: Vec<SourceModule> = Vec::new();
//! let resolver = TypeResolver::new(&modules);
//! let tracer = ExceptionTracer::new(&modules, &config.business_keywords);
//! let extractor = ControllerExtractor::new(&config, &resolver, &tracer);
//!
//! let file = SourceFile::new("UserController.kt", "user", Dialect::NameFirst, "...");
//! let controller = extractor.extract(&file);
//! println!("{} endpoints", controller.endpoints.len());
//! ```

pub mod parameters;
pub mod signature;

use crate::config::{AnalysisConfig, MethodAnnotation};
use crate::exception_tracer::{ErrorAccumulator, ExceptionTracer};
use crate::parser::SourceFile;
use crate::type_resolver::TypeResolver;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use signature::SignatureExtractor;

/// HTTP methods an endpoint annotation can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }
}

/// One controller source and its endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerInfo {
    pub module: String,
    pub file_name: String,
    pub class_name: String,
    /// Set once, from the first route-annotation line
    pub base_path: String,
    pub endpoints: Vec<EndpointInfo>,
}

/// A single endpoint recovered from an HTTP-method annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointInfo {
    pub method: HttpMethod,
    /// Base path joined with the relative route
    pub path: String,
    /// Annotated method name, empty if no declaration was found
    pub handler_name: String,
    pub request_type: String,
    pub response_type: String,
    pub request_details: RequestDetails,
    pub response_details: ResponseDetails,
    /// Deduplicated by error type, first occurrence kept
    pub errors: Vec<ErrorInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDetails {
    pub parameters: Vec<ParameterInfo>,
    pub body_type: Option<String>,
    pub path_variables: Vec<String>,
    /// Resolved fields of the body type
    pub body_fields: Vec<FieldInfo>,
}

/// How a handler parameter is bound to the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "binding", rename_all = "camelCase")]
pub enum ParameterBinding {
    Path {
        name: String,
        #[serde(rename = "type")]
        type_name: String,
    },
    Body {
        name: String,
        #[serde(rename = "type")]
        type_name: String,
    },
    Plain {
        name: String,
        #[serde(rename = "type")]
        type_name: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterInfo {
    #[serde(flatten)]
    pub binding: ParameterBinding,
    /// Always true: optional parameters are not recognised
    pub required: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseDetails {
    pub raw_type: String,
    pub is_collection: bool,
    pub element_type: Option<String>,
    pub fields: Vec<FieldInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub nullable: bool,
    /// Never populated: doc comments are not read
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    pub error_type: String,
    /// Literal message passed at the raise site, if any
    pub message: Option<String>,
    pub code: String,
    /// The literal message if present, else the catalog default
    pub display_message: String,
}

impl ParameterBinding {
    pub fn name(&self) -> &str {
        match self {
            ParameterBinding::Path { name, .. }
            | ParameterBinding::Body { name, .. }
            | ParameterBinding::Plain { name, .. } => name,
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            ParameterBinding::Path { type_name, .. }
            | ParameterBinding::Body { type_name, .. }
            | ParameterBinding::Plain { type_name, .. } => type_name,
        }
    }
}

impl ParameterInfo {
    pub fn new(binding: ParameterBinding) -> Self {
        Self {
            binding,
            required: true,
        }
    }
}

impl FieldInfo {
    pub fn new(name: &str, type_name: &str, nullable: bool) -> Self {
        Self {
            name: name.to_string(),
            type_name: type_name.to_string(),
            nullable,
            description: None,
        }
    }
}

impl RequestDetails {
    pub fn from_parameters(parameters: Vec<ParameterInfo>) -> Self {
        let mut path_variables = Vec::new();
        let mut body_type = None;

        for parameter in &parameters {
            match &parameter.binding {
                ParameterBinding::Path { name, .. } => path_variables.push(name.clone()),
                ParameterBinding::Body { type_name, .. } if body_type.is_none() => {
                    body_type = Some(type_name.clone());
                }
                _ => {}
            }
        }

        Self {
            parameters,
            body_type,
            path_variables,
            body_fields: Vec::new(),
        }
    }
}

/// Extracts controllers from flagged source files.
pub struct ControllerExtractor<'a> {
    config: &'a AnalysisConfig,
    resolver: &'a TypeResolver<'a>,
    tracer: &'a ExceptionTracer<'a>,
}

impl<'a> ControllerExtractor<'a> {
    pub fn new(config: &'a AnalysisConfig, resolver: &'a TypeResolver<'a>, tracer: &'a ExceptionTracer<'a>) -> Self {
        Self {
            config,
            resolver,
            tracer,
        }
    }

    /// Builds the controller model for one flagged file.
    pub fn extract(&self, file: &SourceFile) -> ControllerInfo {
        let lines = file.lines();
        let mut base_path: Option<String> = None;
        let mut class_name: Option<String> = None;
        let mut endpoints = Vec::new();

        // business-logic files are shared by every endpoint of the controller
        let business_errors = self.tracer.business_errors(&file.module);

        for (index, line) in lines.iter().enumerate() {
            let trimmed = line.trim();

            if base_path.is_none() && trimmed.starts_with(&self.config.route_annotation) {
                let path = first_quoted(trimmed).unwrap_or_default();
                debug!("Base path: {:?}", path);
                base_path = Some(path);
            }

            if class_name.is_none() {
                if let Some(name) = controller_class_name(trimmed) {
                    debug!("Controller class: {}", name);
                    class_name = Some(name);
                }
            }

            if let Some(annotation) = self.match_method_annotation(trimmed) {
                let base = base_path.as_deref().unwrap_or("");
                let endpoint = self.extract_endpoint(file, &lines, index, annotation, base, &business_errors);
                endpoints.push(endpoint);
            }
        }

        let class_name = class_name.unwrap_or_else(|| file.file_stem());
        info!(
            "Controller {} ({}): {} endpoints",
            class_name,
            file.module,
            endpoints.len()
        );

        ControllerInfo {
            module: file.module.clone(),
            file_name: file.file_name(),
            class_name,
            base_path: base_path.unwrap_or_default(),
            endpoints,
        }
    }

    fn match_method_annotation(&self, trimmed: &str) -> Option<&'a MethodAnnotation> {
        self.config.method_annotations.iter().find(|a| {
            trimmed
                .strip_prefix(a.token.as_str())
                .is_some_and(|rest| !rest.starts_with(|c: char| c.is_alphanumeric() || c == '_'))
        })
    }

    fn extract_endpoint(
        &self,
        file: &SourceFile,
        lines: &[&str],
        index: usize,
        annotation: &MethodAnnotation,
        base_path: &str,
        business_errors: &[ErrorInfo],
    ) -> EndpointInfo {
        let annotation_line = lines[index].trim();
        let relative = first_quoted(annotation_line).unwrap_or_default();
        let path = join_route(base_path, &relative);
        debug!("{} {}", annotation.method.as_str(), path);

        let declaration = SignatureExtractor::extract(lines, index, file.dialect);

        let (handler_name, request_type, response_type, parameters) = match &declaration {
            Some(decl) => (
                decl.method_name().unwrap_or_default(),
                decl.request_type(),
                decl.response_type(&self.config.response_wrapper),
                decl.parameters(),
            ),
            None => (String::new(), String::new(), String::new(), Vec::new()),
        };

        let mut request_details = RequestDetails::from_parameters(parameters);
        if let Some(body_type) = &request_details.body_type {
            request_details.body_fields = self.resolver.lookup(body_type).into_fields();
        }

        let response_details = self.resolver.response_details(&response_type);

        let mut errors = ErrorAccumulator::new();
        if let Some(decl) = &declaration {
            self.tracer.trace_method_body(lines, decl, &mut errors);
        }
        errors.extend(business_errors.iter().cloned());

        EndpointInfo {
            method: annotation.method,
            path,
            handler_name,
            request_type,
            response_type,
            request_details,
            response_details,
            errors: errors.into_vec(),
        }
    }
}

/// Joins a base path and a relative route with exactly one `/` between segments.
///
/// The result always starts with `/` and never ends with one (except for the root).
pub fn join_route(base: &str, relative: &str) -> String {
    let segments: Vec<&str> = base
        .split('/')
        .chain(relative.split('/'))
        .filter(|s| !s.is_empty())
        .collect();
    format!("/{}", segments.join("/"))
}

/// First double-quoted string on a line.
pub fn first_quoted(line: &str) -> Option<String> {
    let start = line.find('"')? + 1;
    let len = line[start..].find('"')?;
    Some(line[start..start + len].to_string())
}

/// Class name from a `class` declaration line whose name mentions `Controller`.
fn controller_class_name(trimmed: &str) -> Option<String> {
    let after = if let Some(rest) = trimmed.strip_prefix("class ") {
        rest
    } else {
        let pos = trimmed.find(" class ")?;
        &trimmed[pos + " class ".len()..]
    };
    let name: String = after
        .trim_start()
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    (!name.is_empty() && name.contains("Controller")).then_some(name)
}
