use rusqlite::params;

use crate::Db;
use crate::Result;

/// Fixed keys under which the quota ledger persists.
pub const KEY_SUBSCRIPTION_TIER: &str = "subscription_tier";
pub const KEY_SCANS_USED_TODAY: &str = "scans_used_today";
pub const KEY_LAST_RESET_DATE: &str = "last_reset_date";
pub const KEY_SUBJECT_ID: &str = "subject_id";

impl Db {
    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM app_setting WHERE key = ?1")?;
        let mut rows = stmt.query([key])?;
        if let Some(row) = rows.next()? {
            Ok(Some(row.get::<_, String>(0)?))
        } else {
            Ok(None)
        }
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO app_setting (key, value)
            VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// Write a batch of settings in one transaction. The quota ledger spans
    /// three keys and must never be persisted half-updated.
    pub fn replace_settings(&mut self, entries: &[(&str, String)]) -> Result<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO app_setting (key, value)
                VALUES (?1, ?2)
                ON CONFLICT(key) DO UPDATE SET value = excluded.value
                "#,
            )?;
            for (key, value) in entries {
                stmt.execute(params![key, value])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}
