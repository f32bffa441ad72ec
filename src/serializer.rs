//! Serialization of the report model and writing of the output artifact.

use crate::error::Result;
use crate::report::ApiReport;
use log::debug;
use std::fs;
use std::path::Path;

/// Serializes a report to pretty-printed JSON.
///
/// This is the snapshot embedded in the rendered page; it round-trips through
/// `serde_json::from_str::<ApiReport>`.
///
/// # Errors
///
/// Returns [`crate::error::Error::SerializationError`] if serialization fails.
pub fn serialize_json(report: &ApiReport) -> Result<String> {
    debug!("Serializing report to JSON");
    Ok(serde_json::to_string_pretty(report)?)
}

/// Writes `content` to `path`, creating parent directories as needed.
///
/// An existing file is always overwritten.
///
/// # Errors
///
/// Returns [`crate::error::Error::IoError`] if a directory or the file cannot be written.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(path, content)?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReportBuilder;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_serialize_json_shape() {
        let report = ReportBuilder::new(Path::new("/project")).with_module_count(3).build();
        let json = serialize_json(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["title"], "API Documentation");
        assert_eq!(value["summary"]["modules"], 3);
        assert!(value["controllers"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_write_creates_parent_dirs_and_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("build").join("docs").join("index.html");

        write_to_file("first", &path).unwrap();
        write_to_file("second", &path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn test_write_bare_file_name() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.html");
        write_to_file("<html></html>", &path).unwrap();
        assert!(path.exists());
    }
}
