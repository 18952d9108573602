use std::path::PathBuf;

use crate::error::{AppError, Result};
use crate::ids::random_hex;
use crate::services::{AppServices, ExternalClients};
use lens_db::{Db, KEY_SUBJECT_ID};

/// Paths and files needed to run the local backend.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub db_path: PathBuf,
}

/// Application state shared by frontend backends (HTTP, CLI).
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub services: AppServices,
}

impl AppState {
    pub fn new(db_path: PathBuf, clients: ExternalClients) -> Self {
        let config = AppConfig { db_path };
        let services = AppServices::new(&config, clients);
        Self { config, services }
    }

    pub fn is_fresh_db(&self) -> bool {
        !self.config.db_path.exists()
    }

    pub fn setup_db(&self) -> Result<()> {
        setup_db(&self.config.db_path)
    }

    pub fn initialize(&self) -> Result<()> {
        self.setup_db()
            .map_err(|err| AppError::Message(format!("initialize db: {}", err)))?;
        self.ensure_subject_id()?;
        // Pick up a ledger persisted before this process existed; on a fresh
        // install the table was only just created.
        self.services.quota.reload();
        Ok(())
    }

    pub fn open_db(&self) -> Result<Db> {
        Ok(Db::open(&self.config.db_path)?)
    }

    fn ensure_subject_id(&self) -> Result<()> {
        let db = self.open_db()?;
        if db.get_setting(KEY_SUBJECT_ID)?.is_none() {
            db.set_setting(KEY_SUBJECT_ID, &random_hex(12))?;
        }
        Ok(())
    }
}

pub fn setup_db(path: &std::path::Path) -> Result<()> {
    let mut db = Db::open(path)?;
    db.migrate()?;
    Ok(())
}
