//! Controller Docs - API documentation from Spring-style controller sources.
//!
//! This library scans a multi-module project for REST controllers written in a
//! name-first (`name: Type`, Kotlin-style) or type-first (`Type name`, Java-style)
//! dialect and produces one static HTML page describing every endpoint. It works on
//! source text only, line by line with regular expressions; nothing is compiled and no
//! syntax tree is built, so the results are heuristic by nature.
//!
//! # Architecture
//!
//! 1. [`config`] - Analysis configuration (defaults, YAML overlay, validation)
//! 2. [`scanner`] - Discovers modules and their source files
//! 3. [`parser`] - Loads discovered files into memory
//! 4. [`detector`] - Flags controller sources by marker token
//! 5. [`extractor`] - Walks controllers, captures method signatures, classifies parameters
//! 6. [`type_resolver`] - Recovers request/response fields by type name
//! 7. [`exception_tracer`] - Collects raised errors and maps them to codes and messages
//! 8. [`report`] / [`analyzer`] - Assemble the complete report model
//! 9. [`renderer`] / [`serializer`] - Render the HTML page and write it out
//!
//! # Example Usage
//!
//! ```no_run
//! use controller_docs::{analyzer::analyze, config::AnalysisConfig, renderer::render_html, serializer::write_to_file};
//! use std::path::Path;
//!
//! let config = AnalysisConfig::default();
//! let report = analyze(&config, Path::new("./platform")).unwrap();
//! let html = render_html(&report).unwrap();
//! write_to_file(&html, Path::new("./platform/build/controller-docs.html")).unwrap();
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod detector;
pub mod error;
pub mod exception_tracer;
pub mod extractor;
pub mod parser;
pub mod renderer;
pub mod report;
pub mod scanner;
pub mod serializer;
pub mod type_resolver;
