//! Pipeline driver: scan, load, detect, extract.
//!
//! Every stage works on in-memory values built by the previous one. The only fatal
//! failures are an invalid configuration, a missing project root, or a source file that
//! cannot be read; pattern misses never abort the run.

use crate::config::AnalysisConfig;
use crate::detector::ControllerDetector;
use crate::error::Result;
use crate::exception_tracer::ExceptionTracer;
use crate::extractor::ControllerExtractor;
use crate::parser::SourceLoader;
use crate::report::{ApiReport, ReportBuilder};
use crate::scanner::FileScanner;
use crate::type_resolver::TypeResolver;
use log::{info, warn};
use std::path::Path;

/// Analyzes the project at `root` and returns the full report model.
///
/// # Errors
///
/// - [`crate::error::Error::InvalidConfig`] if `config` fails validation
/// - [`crate::error::Error::IoError`] if `root` is not a directory
/// - [`crate::error::Error::ReadFailure`] if a discovered source file cannot be read
pub fn analyze(config: &AnalysisConfig, root: &Path) -> Result<ApiReport> {
    config.validate()?;

    info!("Scanning {}", root.display());
    let scan_result = FileScanner::new(root.to_path_buf(), config).scan()?;
    info!(
        "Found {} source files in {} modules",
        scan_result.file_count(),
        scan_result.modules.len()
    );

    let modules = SourceLoader::load_modules(&scan_result)?;

    let resolver = TypeResolver::new(&modules);
    let tracer = ExceptionTracer::new(&modules, &config.business_keywords);
    let detector = ControllerDetector::new(&config.controller_markers);
    let extractor = ControllerExtractor::new(config, &resolver, &tracer);

    let mut builder = ReportBuilder::new(root)
        .with_title(&config.title)
        .with_module_count(modules.len());

    for module in &modules {
        let controllers = detector.detect(&module.files);
        info!("Module {}: {} controller sources", module.name, controllers.len());
        for file in controllers {
            builder.add_controller(extractor.extract(file));
        }
    }

    let report = builder.build();
    if report.summary.controllers == 0 {
        warn!("No controllers found under {}", root.display());
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, relative: &str, content: &str) {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_analyze_small_project() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "user/build.gradle.kts", "");
        write(
            root,
            "user/src/main/kotlin/UserController.kt",
            "@RestController\n@RequestMapping(\"/users\")\nclass UserController {\n    @GetMapping\n    fun list(): ResponseEntity<List<String>> {\n        return ResponseEntity.ok(listOf())\n    }\n}\n",
        );

        let report = analyze(&AnalysisConfig::default(), root).unwrap();

        assert_eq!(report.summary.modules, 1);
        assert_eq!(report.summary.controllers, 1);
        assert_eq!(report.summary.endpoints, 1);
        let endpoint = &report.controllers[0].endpoints[0];
        assert_eq!(endpoint.path, "/users");
        assert!(endpoint.response_details.is_collection);
    }

    #[test]
    fn test_analyze_rejects_invalid_config() {
        let temp_dir = TempDir::new().unwrap();
        let config = AnalysisConfig {
            include_name_first: false,
            include_type_first: false,
            ..AnalysisConfig::default()
        };

        let result = analyze(&config, temp_dir.path());
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_analyze_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");

        let result = analyze(&AnalysisConfig::default(), &missing);
        assert!(matches!(result, Err(Error::IoError(_))));
    }
}
