//! Database migration functionality
//!
//! Installs the subscriber and subscriber-meta tables. Installation is
//! idempotent: existing tables only gain the columns and indexes they lack.

use std::sync::Arc;

use crate::core::ListHaus;
use crate::errors::ListHausError;
use crate::subscribers::FixedAddress;

impl ListHaus {
    /// Create or upgrade every listhaus table.
    /// If recreate is true, drops the existing tables first
    pub async fn auto_migrate(&self, recreate: bool) -> Result<(), ListHausError> {
        let subscribers = self.subscriber_store(Arc::new(FixedAddress::default()))?;
        let meta = self.meta_store()?;

        if recreate {
            for table in [meta.table_name(), subscribers.table_name()] {
                let drop_sql = format!("DROP TABLE IF EXISTS {}", table);
                debug_log!(sql = drop_sql.as_str(), "dropping table");
                sqlx::query(&drop_sql).execute(self.pool()).await?;
            }
        }

        subscribers.create_table().await?;
        meta.create_table().await?;

        debug_log!(
            subscribers = subscribers.table_name(),
            meta = meta.table_name(),
            "tables installed"
        );
        Ok(())
    }
}
