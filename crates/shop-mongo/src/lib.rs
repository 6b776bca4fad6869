//! # shop-mongo
//!
//! MongoDB-backed implementations of the `shop-core` store traits.
//!
//! Documents are the `shop-core` types serialized as-is; every collection
//! carries a unique index on the entity `id` field, and the invariants the
//! store contracts demand are enforced with indexes and single-document
//! updates:
//!
//! - one active cart per user — partial unique index on
//!   `(user_id, state == "active")`, upsert-backed `ensure_active`
//! - `line_count` never drifting from the lines — line change and count
//!   adjust share one update document
//! - one order per provider capture — unique index on
//!   `payment.capture_id`

pub mod cart;
pub mod catalog;
pub mod order;
pub mod user;

pub use cart::MongoCartStore;
pub use catalog::MongoCatalog;
pub use order::MongoOrderStore;
pub use user::MongoUserStore;

use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::{Client, Database};
use shop_core::{ShopError, ShopResult};
use tracing::info;

/// Mongo server error code for a unique-index violation
const DUPLICATE_KEY: i32 = 11000;

/// The full set of Mongo-backed stores over one database
#[derive(Clone)]
pub struct MongoStores {
    pub catalog: MongoCatalog,
    pub carts: MongoCartStore,
    pub orders: MongoOrderStore,
    pub users: MongoUserStore,
}

impl MongoStores {
    /// Connect and ensure every index the store contracts rely on
    pub async fn connect(uri: &str, database: &str) -> ShopResult<Self> {
        let client = Client::with_uri_str(uri).await.map_err(storage_err)?;
        let db = client.database(database);
        let stores = Self::from_database(&db);
        stores.ensure_indexes().await?;
        info!("Connected to MongoDB database '{}'", database);
        Ok(stores)
    }

    pub fn from_database(db: &Database) -> Self {
        Self {
            catalog: MongoCatalog::new(db),
            carts: MongoCartStore::new(db),
            orders: MongoOrderStore::new(db),
            users: MongoUserStore::new(db),
        }
    }

    pub async fn ensure_indexes(&self) -> ShopResult<()> {
        self.catalog.ensure_indexes().await?;
        self.carts.ensure_indexes().await?;
        self.orders.ensure_indexes().await?;
        self.users.ensure_indexes().await?;
        Ok(())
    }
}

pub(crate) fn storage_err(e: mongodb::error::Error) -> ShopError {
    ShopError::Storage(e.to_string())
}

pub(crate) fn bson_err(e: mongodb::bson::ser::Error) -> ShopError {
    ShopError::Serialization(e.to_string())
}

/// True when the error is a unique-index violation
pub(crate) fn is_duplicate_key(e: &mongodb::error::Error) -> bool {
    match e.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(we)) => we.code == DUPLICATE_KEY,
        ErrorKind::Command(ce) => ce.code == DUPLICATE_KEY,
        _ => false,
    }
}

/// RFC 3339 timestamp for `$set` updates that bypass struct serialization
pub(crate) fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
