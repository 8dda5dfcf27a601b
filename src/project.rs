use std::path::PathBuf;
use chrono::{DateTime, Utc};

/// A directory discovered by the scanner.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDir {
    pub name: String,
    pub path: PathBuf,
    pub is_project: bool,
    pub has_subdirs: bool,
    pub last_modified: Option<DateTime<Utc>>,
    pub marker: Option<String>,
    /// name of the enclosing folder, set only for nested git repositories
    pub parent: Option<String>,
    pub is_subdirectory: bool,
}

impl ProjectDir {
    /// label shown in the list and matched by the search,
    /// `parent/name` for nested git repositories
    pub fn display_name(&self) -> String {
        match &self.parent {
            Some(parent) if self.is_subdirectory => format!("{}/{}", parent, self.name),
            _ => self.name.clone(),
        }
    }
}
