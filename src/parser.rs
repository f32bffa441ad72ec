use crate::error::{Error, Result};
use crate::scanner::ScanResult;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Declaration grammar of a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dialect {
    /// `name: Type` parameters and fields, nullable types end in `?` (`.kt` sources)
    NameFirst,
    /// `Type name` parameters and fields, no nullability marker (`.java` sources)
    TypeFirst,
}

/// A source file held in memory for the duration of one run.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Name of the module the file was discovered in
    pub module: String,
    pub dialect: Dialect,
    pub content: String,
}

/// All loaded files of one module, in discovery order.
#[derive(Debug, Clone)]
pub struct SourceModule {
    pub name: String,
    pub files: Vec<SourceFile>,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, module: &str, dialect: Dialect, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            module: module.to_string(),
            dialect,
            content: content.into(),
        }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    pub fn file_stem(&self) -> String {
        self.path
            .file_stem()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    pub fn lines(&self) -> Vec<&str> {
        self.content.lines().collect()
    }
}

/// Reads discovered files into memory.
///
/// There is no syntax tree: every later stage works on the raw text line by line.
/// A file that cannot be read aborts the run.
pub struct SourceLoader;

impl SourceLoader {
    pub fn load_file(path: &Path, module: &str, dialect: Dialect) -> Result<SourceFile> {
        debug!("Reading file: {}", path.display());
        let content = fs::read_to_string(path).map_err(|source| Error::ReadFailure {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(SourceFile::new(path, module, dialect, content))
    }

    /// Loads every file of every scanned module.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReadFailure`] for the first file that cannot be read.
    pub fn load_modules(scan: &ScanResult) -> Result<Vec<SourceModule>> {
        let mut modules = Vec::with_capacity(scan.modules.len());

        for module in &scan.modules {
            let files = module
                .files
                .iter()
                .map(|f| Self::load_file(&f.path, &module.name, f.dialect))
                .collect::<Result<Vec<_>>>()?;
            debug!("Loaded {} files for module {}", files.len(), module.name);
            modules.push(SourceModule {
                name: module.name.clone(),
                files,
            });
        }

        Ok(modules)
    }
}
