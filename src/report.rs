use crate::extractor::ControllerInfo;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Counts shown in the report header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Modules that contributed at least one source file
    pub modules: usize,
    pub controllers: usize,
    pub endpoints: usize,
    /// Error descriptors across all endpoints (an error type counts once per endpoint)
    pub errors: usize,
}

/// The complete analysis result handed to the renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiReport {
    pub title: String,
    /// Project root the report was generated from
    pub root: PathBuf,
    pub summary: ReportSummary,
    pub controllers: Vec<ControllerInfo>,
}

/// Collects controllers into an [`ApiReport`].
pub struct ReportBuilder {
    title: String,
    root: PathBuf,
    modules: usize,
    controllers: Vec<ControllerInfo>,
}

impl ReportBuilder {
    pub fn new(root: &Path) -> Self {
        debug!("Initializing ReportBuilder for {}", root.display());
        Self {
            title: "API Documentation".to_string(),
            root: root.to_path_buf(),
            modules: 0,
            controllers: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn with_module_count(mut self, modules: usize) -> Self {
        self.modules = modules;
        self
    }

    pub fn add_controller(&mut self, controller: ControllerInfo) {
        debug!(
            "Adding controller {} with {} endpoints",
            controller.class_name,
            controller.endpoints.len()
        );
        self.controllers.push(controller);
    }

    pub fn build(self) -> ApiReport {
        let endpoints = self.controllers.iter().map(|c| c.endpoints.len()).sum();
        let errors = self
            .controllers
            .iter()
            .flat_map(|c| c.endpoints.iter())
            .map(|e| e.errors.len())
            .sum();

        ApiReport {
            title: self.title,
            root: self.root,
            summary: ReportSummary {
                modules: self.modules,
                controllers: self.controllers.len(),
                endpoints,
                errors,
            },
            controllers: self.controllers,
        }
    }
}
