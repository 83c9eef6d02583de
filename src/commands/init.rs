//! The `proceeds init` command.

use crate::commands::Out;
use crate::{Config, Result};
use std::path::Path;

/// Creates the proceeds home directory, its subdirectories, and an initial
/// configuration file. Running it against an existing home is harmless; the
/// config file is rewritten with default settings.
pub async fn init(home: &Path) -> Result<Out<()>> {
    let config = Config::create(home).await?;
    Ok(Out::new_message(format!(
        "Initialized proceeds home at {}",
        config.root().display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_creates_home() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("proceeds");
        let out = init(&home).await.unwrap();
        assert!(out.message().starts_with("Initialized proceeds home"));
        assert!(Config::load(&home).await.is_ok());
    }
}
