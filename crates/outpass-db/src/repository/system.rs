//! SurrealDB implementation of [`SystemRepository`].
//!
//! Counters are one record per name in `system_counter`; the configuration
//! is a single well-known `system_config` record.

use outpass_core::error::OutpassResult;
use outpass_core::models::system::SystemConfig;
use outpass_core::repository::SystemRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;

use crate::error::DbError;

/// Record id of the single configuration row.
const CONFIG_ID: &str = "main";

#[derive(Debug, SurrealValue)]
struct CounterRow {
    value: u64,
}

#[derive(Debug, SurrealValue)]
struct ConfigRow {
    otp_ttl_secs: u64,
    otp_max_attempts: u32,
    min_password_length: u64,
}

impl ConfigRow {
    fn into_config(self) -> SystemConfig {
        SystemConfig {
            otp_ttl_secs: self.otp_ttl_secs,
            otp_max_attempts: self.otp_max_attempts,
            min_password_length: self.min_password_length as usize,
        }
    }
}

/// SurrealDB implementation of the system repository.
#[derive(Clone)]
pub struct SurrealSystemRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealSystemRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> SystemRepository for SurrealSystemRepository<C> {
    async fn increment_counter(&self, name: &str) -> OutpassResult<u64> {
        // The coalesce covers first touch, where the record is created and
        // `value` is still unset when the SET clause runs.
        let result = self
            .db
            .query(
                "UPSERT type::record('system_counter', $name) \
                 SET value = (value ?? 0) + 1",
            )
            .bind(("name", name.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<CounterRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "system_counter".into(),
            id: name.to_string(),
        })?;

        Ok(row.value)
    }

    async fn counter(&self, name: &str) -> OutpassResult<u64> {
        let mut result = self
            .db
            .query("SELECT `value` FROM type::record('system_counter', $name)")
            .bind(("name", name.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CounterRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.value).unwrap_or(0))
    }

    async fn load_config(&self) -> OutpassResult<Option<SystemConfig>> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('system_config', $id)")
            .bind(("id", CONFIG_ID.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ConfigRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.into_iter().next().map(ConfigRow::into_config))
    }

    async fn store_config(&self, config: &SystemConfig) -> OutpassResult<()> {
        self.db
            .query(
                "UPSERT type::record('system_config', $id) SET \
                 otp_ttl_secs = $otp_ttl_secs, \
                 otp_max_attempts = $otp_max_attempts, \
                 min_password_length = $min_password_length",
            )
            .bind(("id", CONFIG_ID.to_string()))
            .bind(("otp_ttl_secs", config.otp_ttl_secs))
            .bind(("otp_max_attempts", config.otp_max_attempts))
            .bind(("min_password_length", config.min_password_length as u64))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(())
    }
}
