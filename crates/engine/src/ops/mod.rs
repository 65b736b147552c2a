use chrono::NaiveDate;
use chrono_tz::Tz;
use sea_orm::DatabaseConnection;
use tokio::sync::broadcast;

use crate::{
    DayWindow, ResultEngine,
    products::cache::{CacheEvent, ProductCache},
};

mod closings;
mod ledger;
mod products;
mod sales;

pub use closings::MAX_CLOSINGS_LIMIT;

/// Timezone of the register when none is configured.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::America::Argentina::Buenos_Aires;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    mirror: DatabaseConnection,
    timezone: Tz,
    products: ProductCache,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// The local business day `date` as a UTC window.
    pub fn day_window(&self, date: NaiveDate) -> ResultEngine<DayWindow> {
        DayWindow::new(date, self.timezone)
    }

    /// Listen to product cache invalidations.
    pub fn subscribe_products(&self) -> broadcast::Receiver<CacheEvent> {
        self.products.subscribe()
    }

    pub async fn cached_products(&self) -> usize {
        self.products.len().await
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    mirror: Option<DatabaseConnection>,
    timezone: Option<Tz>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Database holding the product mirror. Defaults to the main database.
    pub fn mirror(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.mirror = Some(db);
        self
    }

    pub fn timezone(mut self, timezone: Tz) -> EngineBuilder {
        self.timezone = Some(timezone);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let mirror = self.mirror.unwrap_or_else(|| self.database.clone());
        Ok(Engine {
            database: self.database,
            mirror,
            timezone: self.timezone.unwrap_or(DEFAULT_TIMEZONE),
            products: ProductCache::new(),
        })
    }
}
