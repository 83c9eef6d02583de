//! The persistence seam between the table engine and whatever stores project
//! data. The engine only ever sees [`ProjectStore`]; the CLI supplies
//! [`JsonStore`].

use crate::backup::{Backup, SAVE_PRE};
use crate::model::ProjectData;
use crate::{utils, Config, Result};
use anyhow::{ensure, Context};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

/// Loads and saves project data. Implementations own durability; the table
/// engine only hands over the full reconciled record set.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn load(&self, project_id: &str) -> Result<ProjectData>;
    async fn save(&self, project: &ProjectData) -> Result<()>;
}

/// Stores each project as pretty-printed JSON at
/// `$PROCEEDS_HOME/projects/{project_id}.json`, snapshotting the previous
/// contents to the backups directory before every overwrite.
#[derive(Debug, Clone)]
pub struct JsonStore {
    projects_dir: PathBuf,
    backup: Backup,
}

impl JsonStore {
    pub fn new(config: &Config) -> Self {
        Self {
            projects_dir: config.projects().to_path_buf(),
            backup: config.backup(),
        }
    }

    /// The file path for a project id.
    pub fn path(&self, project_id: &str) -> PathBuf {
        self.projects_dir.join(format!("{project_id}.json"))
    }

    /// True if a project file already exists for this id.
    pub fn exists(&self, project_id: &str) -> bool {
        self.path(project_id).is_file()
    }
}

#[async_trait]
impl ProjectStore for JsonStore {
    async fn load(&self, project_id: &str) -> Result<ProjectData> {
        let path = self.path(project_id);
        ensure!(
            path.is_file(),
            "no project '{project_id}' found at {}; create it with 'proceeds new'",
            path.display()
        );
        let project: ProjectData = utils::deserialize(&path).await?;
        ensure!(
            project.project_id() == project_id,
            "project file {} claims id '{}', expected '{project_id}'",
            path.display(),
            project.project_id()
        );
        Ok(project)
    }

    async fn save(&self, project: &ProjectData) -> Result<()> {
        let path = self.path(project.project_id());

        // Snapshot whatever is on disk before overwriting it.
        if path.is_file() {
            let previous: ProjectData = utils::deserialize(&path).await?;
            let backup_path = self.backup.save_json(SAVE_PRE, &previous).await?;
            debug!("saved backup to {}", backup_path.display());
        }

        let json = serde_json::to_string_pretty(project)
            .context("Failed to serialize project data to JSON")?;
        utils::write(&path, json).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let env = TestEnv::new().await;
        let store = env.config().store();
        let project = env.sample_project("proj-1");

        store.save(&project).await.unwrap();
        let loaded = store.load("proj-1").await.unwrap();
        assert_eq!(loaded, project);
    }

    #[tokio::test]
    async fn test_load_missing_project_is_an_error() {
        let env = TestEnv::new().await;
        let store = env.config().store();
        let err = store.load("nope").await.unwrap_err();
        assert!(err.to_string().contains("no project 'nope'"));
    }

    #[tokio::test]
    async fn test_load_rejects_mismatched_id() {
        let env = TestEnv::new().await;
        let store = env.config().store();
        let project = env.sample_project("proj-1");
        let json = serde_json::to_string_pretty(&project).unwrap();
        utils::write(&store.path("other"), json).await.unwrap();
        assert!(store.load("other").await.is_err());
    }

    #[tokio::test]
    async fn test_overwrite_creates_backup() {
        let env = TestEnv::new().await;
        let store = env.config().store();
        let project = env.sample_project("proj-1");

        store.save(&project).await.unwrap();
        // First save has nothing to snapshot.
        let mut count = 0;
        let mut dir = utils::read_dir(env.config().backups()).await.unwrap();
        while dir.next_entry().await.unwrap().is_some() {
            count += 1;
        }
        assert_eq!(count, 0);

        store.save(&project).await.unwrap();
        let mut count = 0;
        let mut dir = utils::read_dir(env.config().backups()).await.unwrap();
        while dir.next_entry().await.unwrap().is_some() {
            count += 1;
        }
        assert_eq!(count, 1);
    }
}
