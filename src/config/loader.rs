use super::{get_global_config_dir, AppConfig};
use crate::error::{common, LegalFormError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

pub const CONFIG_FILE_NAME: &str = "legalform.toml";

/// Loads [`AppConfig`] from TOML files and the environment
pub struct ConfigLoader {
    project_dir: PathBuf,
    global_dir: Option<PathBuf>,
    use_env: bool,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            project_dir: PathBuf::from("."),
            global_dir: get_global_config_dir(),
            use_env: true,
        }
    }

    /// Look for the project file in `dir` instead of the working directory
    pub fn with_project_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.project_dir = dir.into();
        self
    }

    /// Look for the global file in `dir`; `None` disables the global layer
    pub fn with_global_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.global_dir = dir;
        self
    }

    /// Skip environment overrides
    pub fn without_env(mut self) -> Self {
        self.use_env = false;
        self
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the project file wins over
    /// the global file and defaults are used when neither exists.
    pub async fn load(&self, explicit: Option<&Path>) -> Result<AppConfig> {
        let mut config = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(common::config_not_found(path));
                }
                Self::read_file(path).await?
            }
            None => match self.discover() {
                Some(path) => Self::read_file(&path).await?,
                None => {
                    debug!("No configuration file found, using defaults");
                    AppConfig::default()
                }
            },
        };

        if self.use_env {
            config.merge_env_vars();
        }

        config.validate()?;
        Ok(config)
    }

    fn discover(&self) -> Option<PathBuf> {
        let project = self.project_dir.join(CONFIG_FILE_NAME);
        if project.exists() {
            return Some(project);
        }

        self.global_dir
            .as_ref()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .filter(|path| path.exists())
    }

    async fn read_file(path: &Path) -> Result<AppConfig> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| LegalFormError::from(e).with_context(path.display()))?;
        let config: AppConfig = toml::from_str(&content)
            .map_err(|e| LegalFormError::from(e).with_context(path.display()))?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
