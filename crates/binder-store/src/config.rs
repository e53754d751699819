//! Workspace configuration (§6, §10.3): `config.yaml` at the parent of the
//! log directory, with environment variable overrides.

use crate::error::StoreResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

///
/// WorkspaceConfig
///

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    #[serde(default = "default_author")]
    pub author: String,
    #[serde(default = "default_docs_path")]
    pub docs_path: PathBuf,
}

fn default_author() -> String {
    "unknown".to_string()
}

fn default_docs_path() -> PathBuf {
    PathBuf::from(".")
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self { author: default_author(), docs_path: default_docs_path() }
    }
}

impl WorkspaceConfig {
    /// Load `config.yaml` from `dir`, falling back to defaults when the
    /// file is absent. `BINDER_AUTHOR` / `BINDER_DOCS_PATH` override
    /// whatever was loaded (or the defaults), same as `icydb-paths`'
    /// env-var override convention.
    pub fn load(dir: &Path) -> StoreResult<Self> {
        let path = dir.join("config.yaml");
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(&path)?;
            serde_yaml::from_str(&text)?
        } else {
            Self::default()
        };

        if let Ok(author) = std::env::var("BINDER_AUTHOR") {
            config.author = author;
        }
        if let Ok(docs_path) = std::env::var("BINDER_DOCS_PATH") {
            config.docs_path = PathBuf::from(docs_path);
        }

        Ok(config)
    }

    pub fn save(&self, dir: &Path) -> StoreResult<()> {
        let path = dir.join("config.yaml");
        let text = serde_yaml::to_string(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }
}
