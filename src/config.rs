//! Configuration file handling for the proceeds CLI.
//!
//! The configuration file is stored at `$PROCEEDS_HOME/config.json` and
//! contains settings for the application, including the number of backup
//! copies to keep. Project files live under `$PROCEEDS_HOME/projects`.

use crate::backup::Backup;
use crate::store::JsonStore;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "proceeds";
const CONFIG_VERSION: u8 = 1;
const BACKUP_COPIES: u32 = 5;
const BACKUPS: &str = ".backups";
const PROJECTS: &str = "projects";
const CONFIG_JSON: &str = "config.json";

/// The `Config` object represents the configuration of the app. You
/// instantiate it by providing the path to `$PROCEEDS_HOME` and from there it
/// loads `$PROCEEDS_HOME/config.json`. It provides paths to other items that
/// are expected in known locations within the proceeds home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    backups: PathBuf,
    projects: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the data directory, its subdirectories, and an initial
    /// `config.json` with default settings.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of the data directory,
    ///   e.g. `$HOME/proceeds`
    ///
    /// # Errors
    /// - Returns an error if any file operations fail.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        // Create the directory if it does not exist
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the proceeds home directory")?;

        // Canonicalize the directory path
        let root = utils::canonicalize(&maybe_relative).await?;

        // Create the subdirectories
        let backups_dir = root.join(BACKUPS);
        utils::make_dir(&backups_dir).await?;
        let projects_dir = root.join(PROJECTS);
        utils::make_dir(&projects_dir).await?;

        // Create and save an initial ConfigFile in the data directory
        let config_path = root.join(CONFIG_JSON);
        let config_file = ConfigFile::default();
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            backups: backups_dir,
            projects: projects_dir,
            config_path,
            config_file,
        })
    }

    /// This will
    /// - validate that the `proceeds_home` exists and that the config file exists
    /// - load the config file
    /// - validate that the backups and projects directories exist
    /// - return the loaded configuration object
    pub async fn load(proceeds_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = proceeds_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("Proceeds home is missing, run 'proceeds init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let config = Self {
            root: root.clone(),
            backups: root.join(BACKUPS),
            projects: root.join(PROJECTS),
            config_path,
            config_file,
        };
        if !config.backups.is_dir() {
            bail!(
                "The backups directory is missing '{}'",
                config.backups.display()
            )
        }
        if !config.projects.is_dir() {
            bail!(
                "The projects directory is missing '{}'",
                config.projects.display()
            )
        }
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backups(&self) -> &Path {
        &self.backups
    }

    pub fn projects(&self) -> &Path {
        &self.projects
    }

    pub fn backup_copies(&self) -> u32 {
        self.config_file.backup_copies
    }

    /// Creates a new `Backup` instance for managing backup files.
    pub fn backup(&self) -> Backup {
        Backup::new(self)
    }

    /// Creates a new `JsonStore` for the projects directory.
    pub fn store(&self) -> JsonStore {
        JsonStore::new(self)
    }
}

/// Represents the serialization and deserialization format of the
/// configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "proceeds",
///   "config_version": 1,
///   "backup_copies": 5
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "proceeds"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Number of backup copies to keep
    backup_copies: u32,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            backup_copies: BACKUP_COPIES,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;

        // Validate app_name
        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}
