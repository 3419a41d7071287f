//! PostgreSQL-backed lookup store.

use postgres::{Client, NoTls};

use super::{LookupStore, TransactionId, TransactionPayload};
use crate::config::StoreConfig;
use crate::error::HarvestError;

/// Synchronous PostgreSQL client wrapper. Each pipeline stage opens its
/// own connection and drops it when the stage completes.
pub struct PgStore {
    client: Client,
}

impl PgStore {
    /// Connects with the given parameters. Connection failure is
    /// stage-fatal.
    pub fn connect(config: &StoreConfig) -> Result<Self, HarvestError> {
        let client = postgres::Config::new()
            .host(&config.host)
            .port(config.port)
            .dbname(&config.dbname)
            .user(&config.user)
            .password(&config.password)
            .connect(NoTls)
            .map_err(|source| HarvestError::StoreConnect {
                message: source.to_string(),
            })?;
        Ok(Self { client })
    }
}

impl LookupStore for PgStore {
    fn filenames_for_transaction(
        &mut self,
        id: TransactionId,
    ) -> Result<Vec<String>, HarvestError> {
        let rows = self
            .client
            .query(
                "SELECT file_name FROM image_info WHERE transaction_log_id = $1",
                &[&id.as_i64()],
            )
            .map_err(store_error)?;
        Ok(rows.iter().map(|row| row.get(0)).collect())
    }

    fn payload_for_filename(
        &mut self,
        file_name: &str,
    ) -> Result<Option<TransactionPayload>, HarvestError> {
        // response_dict is cast in SQL so text and jsonb columns read the
        // same way.
        let row = self
            .client
            .query_opt(
                "SELECT tl.id, tl.response_dict::text \
                 FROM image_info ii \
                 JOIN transaction_log tl ON ii.transaction_log_id = tl.id \
                 WHERE ii.file_name = $1",
                &[&file_name],
            )
            .map_err(store_error)?;
        Ok(row.map(|row| TransactionPayload {
            transaction_id: TransactionId::new(row.get(0)),
            response: row.get(1),
        }))
    }
}

fn store_error(source: postgres::Error) -> HarvestError {
    HarvestError::Store {
        message: source.to_string(),
    }
}
