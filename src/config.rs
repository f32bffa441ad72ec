//! Analysis configuration.
//!
//! Every knob the pipeline consults lives in [`AnalysisConfig`]. Values come from the
//! built-in defaults, optionally overlaid by a YAML file, and finally by command-line
//! flags (see [`crate::cli`]).

use crate::error::{Error, Result};
use crate::extractor::HttpMethod;
use crate::parser::Dialect;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for a single analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Where the HTML report is written (always overwritten)
    pub output_file: PathBuf,
    /// Scan name-first (`name: Type`, `.kt`) sources
    pub include_name_first: bool,
    /// Scan type-first (`Type name`, `.java`) sources
    pub include_type_first: bool,
    /// Directory names under the root that are never treated as modules
    pub exclude_dirs: Vec<String>,
    /// A file containing any of these tokens is a controller source
    pub controller_markers: Vec<String>,
    /// File whose presence marks a root child directory as a module
    pub module_marker: String,
    /// Annotation carrying the controller's base path
    pub route_annotation: String,
    /// Per-endpoint annotations and the HTTP method each one selects
    pub method_annotations: Vec<MethodAnnotation>,
    /// Generic wrapper around handler return types (e.g. `ResponseEntity<T>`)
    pub response_wrapper: String,
    /// File-name keywords identifying business-logic files
    pub business_keywords: Vec<String>,
    /// Heading of the rendered report
    pub title: String,
}

/// Maps an HTTP-method annotation token to its method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodAnnotation {
    pub token: String,
    pub method: HttpMethod,
}

/// A source root probed inside every module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRoot {
    /// Path relative to the module directory
    pub subpath: PathBuf,
    /// File extension accepted under this root
    pub extension: &'static str,
    pub dialect: Dialect,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            output_file: PathBuf::from("build/controller-docs.html"),
            include_name_first: true,
            include_type_first: true,
            exclude_dirs: strings(&["build", "gradle", ".git"]),
            controller_markers: strings(&["@RestController", "@Controller"]),
            module_marker: "build.gradle.kts".to_string(),
            route_annotation: "@RequestMapping".to_string(),
            method_annotations: vec![
                MethodAnnotation::new("@GetMapping", HttpMethod::Get),
                MethodAnnotation::new("@PostMapping", HttpMethod::Post),
                MethodAnnotation::new("@PutMapping", HttpMethod::Put),
                MethodAnnotation::new("@DeleteMapping", HttpMethod::Delete),
                MethodAnnotation::new("@PatchMapping", HttpMethod::Patch),
            ],
            response_wrapper: "ResponseEntity".to_string(),
            business_keywords: strings(&[
                "Service",
                "Manager",
                "Processor",
                "Analyzer",
                "Engine",
                "Orchestrator",
            ]),
            title: "API Documentation".to_string(),
        }
    }
}

impl MethodAnnotation {
    pub fn new(token: &str, method: HttpMethod) -> Self {
        Self {
            token: token.to_string(),
            method,
        }
    }
}

impl AnalysisConfig {
    /// Loads a configuration from a YAML file. Missing keys keep their defaults.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());
        let content = fs::read_to_string(path).map_err(|source| Error::ReadFailure {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: AnalysisConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Rejects configurations that cannot find anything.
    pub fn validate(&self) -> Result<()> {
        if !self.include_name_first && !self.include_type_first {
            return Err(Error::InvalidConfig(
                "both source dialects are disabled".to_string(),
            ));
        }
        if self.controller_markers.iter().all(|m| m.trim().is_empty()) {
            return Err(Error::InvalidConfig(
                "at least one controller marker is required".to_string(),
            ));
        }
        if self.method_annotations.is_empty() {
            return Err(Error::InvalidConfig(
                "at least one HTTP-method annotation is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Source roots enabled by the dialect flags, name-first root first.
    pub fn source_roots(&self) -> Vec<SourceRoot> {
        let mut roots = Vec::new();
        if self.include_name_first {
            roots.push(SourceRoot {
                subpath: PathBuf::from("src/main/kotlin"),
                extension: "kt",
                dialect: Dialect::NameFirst,
            });
        }
        if self.include_type_first {
            roots.push(SourceRoot {
                subpath: PathBuf::from("src/main/java"),
                extension: "java",
                dialect: Dialect::TypeFirst,
            });
        }
        roots
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
