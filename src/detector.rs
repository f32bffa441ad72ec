use crate::parser::SourceFile;
use log::debug;

/// Flags controller sources by marker-token presence.
///
/// The test is a plain substring search over the whole file, so a marker inside a
/// comment or string literal also flags the file. Files flagged this way simply
/// yield controllers without endpoints.
pub struct ControllerDetector<'a> {
    markers: &'a [String],
}

impl<'a> ControllerDetector<'a> {
    pub fn new(markers: &'a [String]) -> Self {
        Self { markers }
    }

    /// Returns true if `content` contains any non-empty marker token.
    pub fn is_controller(&self, content: &str) -> bool {
        self.markers
            .iter()
            .filter(|m| !m.is_empty())
            .any(|m| content.contains(m.as_str()))
    }

    /// Filters `files` down to controller sources, preserving order.
    pub fn detect<'f>(&self, files: &'f [SourceFile]) -> Vec<&'f SourceFile> {
        files
            .iter()
            .filter(|f| {
                let hit = self.is_controller(&f.content);
                if hit {
                    debug!("Controller source: {}", f.path.display());
                }
                hit
            })
            .collect()
    }
}
