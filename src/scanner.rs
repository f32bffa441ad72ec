use crate::config::AnalysisConfig;
use crate::error::{Error, Result};
use crate::parser::Dialect;
use log::{debug, warn};
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Module discovery over a multi-module repository.
///
/// A directory counts as a module when it is a direct child of the root, its name is
/// not in the configured exclude list, and it contains the module-marker file
/// (`build.gradle.kts` by default). Inside each module the enabled source roots are
/// walked and files with the matching extension are collected.
///
/// Modules and files are sorted by name so the report is identical across platforms.
///
/// # Example
///
/// ```no_run
/// use controller_docs::config::AnalysisConfig;
/// use controller_docs::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let config = AnalysisConfig::default();
/// let scanner = FileScanner::new(PathBuf::from("."), &config);
/// let result = scanner.scan().unwrap();
/// println!("Found {} modules", result.modules.len());
/// ```
pub struct FileScanner<'a> {
    root_path: PathBuf,
    config: &'a AnalysisConfig,
}

/// Result of module discovery.
pub struct ScanResult {
    /// Modules in name order
    pub modules: Vec<ModuleFiles>,
    /// Warning messages for entries that could not be accessed
    pub warnings: Vec<String>,
}

/// Source files discovered for one module.
#[derive(Debug, Clone)]
pub struct ModuleFiles {
    pub name: String,
    pub path: PathBuf,
    pub files: Vec<DiscoveredFile>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub dialect: Dialect,
}

impl ScanResult {
    pub fn file_count(&self) -> usize {
        self.modules.iter().map(|m| m.files.len()).sum()
    }
}

impl<'a> FileScanner<'a> {
    pub fn new(root_path: PathBuf, config: &'a AnalysisConfig) -> Self {
        Self { root_path, config }
    }

    /// Enumerates modules and their candidate source files.
    ///
    /// # Errors
    ///
    /// Returns an error if the root is not a readable directory. Inaccessible entries
    /// below the root are recorded as warnings and skipped.
    pub fn scan(&self) -> Result<ScanResult> {
        if !self.root_path.is_dir() {
            return Err(Error::IoError(io::Error::new(
                io::ErrorKind::NotFound,
                format!("not a directory: {}", self.root_path.display()),
            )));
        }

        let mut modules = Vec::new();
        let mut warnings = Vec::new();

        for entry in WalkDir::new(&self.root_path)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                    continue;
                }
            };

            if !entry.file_type().is_dir() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().to_string();
            if self.config.exclude_dirs.iter().any(|d| *d == name) {
                debug!("Skipping excluded directory: {}", name);
                continue;
            }
            if !entry.path().join(&self.config.module_marker).is_file() {
                debug!("Skipping {}: no {}", name, self.config.module_marker);
                continue;
            }

            let files = self.collect_module_files(entry.path(), &mut warnings);
            debug!("Module {}: {} source files", name, files.len());
            modules.push(ModuleFiles {
                name,
                path: entry.path().to_path_buf(),
                files,
            });
        }

        Ok(ScanResult { modules, warnings })
    }

    fn collect_module_files(&self, module_path: &Path, warnings: &mut Vec<String>) -> Vec<DiscoveredFile> {
        let mut files = Vec::new();

        for root in self.config.source_roots() {
            let source_dir = module_path.join(&root.subpath);
            if !source_dir.is_dir() {
                continue;
            }

            for entry in WalkDir::new(&source_dir).sort_by_file_name() {
                match entry {
                    Ok(entry) => {
                        let path = entry.path();
                        if entry.file_type().is_file()
                            && path.extension().and_then(|s| s.to_str()) == Some(root.extension)
                        {
                            files.push(DiscoveredFile {
                                path: path.to_path_buf(),
                                dialect: root.dialect,
                            });
                        }
                    }
                    Err(e) => {
                        let warning = format!("Failed to access path: {}", e);
                        warn!("{}", warning);
                        warnings.push(warning);
                    }
                }
            }
        }

        files
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn file_names(module: &ModuleFiles) -> Vec<String> {
        module
            .files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_scan_requires_module_marker() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        touch(root, "booking/build.gradle.kts", "");
        touch(root, "booking/src/main/kotlin/a/BookingController.kt", "class A");
        touch(root, "docs/src/main/kotlin/a/Readme.kt", "class B");

        let config = AnalysisConfig::default();
        let result = FileScanner::new(root.to_path_buf(), &config).scan().unwrap();

        assert_eq!(result.modules.len(), 1);
        assert_eq!(result.modules[0].name, "booking");
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_scan_skips_excluded_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        touch(root, "build/build.gradle.kts", "");
        touch(root, "build/src/main/kotlin/Generated.kt", "class G");
        touch(root, "user/build.gradle.kts", "");

        let config = AnalysisConfig::default();
        let result = FileScanner::new(root.to_path_buf(), &config).scan().unwrap();

        let names: Vec<_> = result.modules.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["user"]);
    }

    #[test]
    fn test_scan_sorts_modules_and_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        touch(root, "zeta/build.gradle.kts", "");
        touch(root, "alpha/build.gradle.kts", "");
        touch(root, "alpha/src/main/kotlin/b/Second.kt", "");
        touch(root, "alpha/src/main/kotlin/a/First.kt", "");
        touch(root, "alpha/src/main/java/c/Third.java", "");

        let config = AnalysisConfig::default();
        let result = FileScanner::new(root.to_path_buf(), &config).scan().unwrap();

        let names: Vec<_> = result.modules.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert_eq!(file_names(&result.modules[0]), vec!["First.kt", "Second.kt", "Third.java"]);
        assert_eq!(result.modules[0].files[2].dialect, Dialect::TypeFirst);
        assert_eq!(result.file_count(), 3);
    }

    #[test]
    fn test_scan_filters_by_extension_per_root() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        touch(root, "stock/build.gradle.kts", "");
        touch(root, "stock/src/main/java/Stock.java", "");
        touch(root, "stock/src/main/java/notes.md", "");
        touch(root, "stock/src/main/kotlin/Stray.java", "");

        let config = AnalysisConfig::default();
        let result = FileScanner::new(root.to_path_buf(), &config).scan().unwrap();

        assert_eq!(file_names(&result.modules[0]), vec!["Stock.java"]);
    }

    #[test]
    fn test_scan_honours_dialect_flags() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        touch(root, "mixed/build.gradle.kts", "");
        touch(root, "mixed/src/main/kotlin/A.kt", "");
        touch(root, "mixed/src/main/java/B.java", "");

        let config = AnalysisConfig {
            include_type_first: false,
            ..AnalysisConfig::default()
        };
        let result = FileScanner::new(root.to_path_buf(), &config).scan().unwrap();

        assert_eq!(file_names(&result.modules[0]), vec!["A.kt"]);
    }

    #[test]
    fn test_scan_missing_root_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let config = AnalysisConfig::default();
        let scanner = FileScanner::new(temp_dir.path().join("missing"), &config);
        assert!(scanner.scan().is_err());
    }
}
