//! Append-only JSON file kept as a backup of every contact submission.

use std::{io::ErrorKind, path::PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::{fs, sync::Mutex};

use crate::{
    application::contact::{LoggedSubmission, SubmissionLog},
    infra::error::InfraError,
};

/// Stores submissions as one pretty-printed JSON array.
#[derive(Debug)]
pub struct JsonFileSubmissionLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileSubmissionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn read_all(&self) -> Result<Vec<Value>, InfraError> {
        match fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl SubmissionLog for JsonFileSubmissionLog {
    async fn append(&self, entry: &LoggedSubmission) -> Result<(), InfraError> {
        let _guard = self.write_lock.lock().await;

        let mut submissions = self.read_all().await?;
        submissions.push(serde_json::to_value(entry)?);

        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(&submissions)?).await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Value>, InfraError> {
        self.read_all().await
    }
}
