//! Order store over the `orders` collection. Append-only; the unique
//! index on `payment.capture_id` is what makes the order writer
//! idempotent per capture.

use crate::{is_duplicate_key, storage_err};
use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Collection, Database, IndexModel};
use shop_core::{Order, OrderStore, ShopError, ShopResult};

const COLLECTION: &str = "orders";

#[derive(Clone)]
pub struct MongoOrderStore {
    collection: Collection<Order>,
}

impl MongoOrderStore {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(COLLECTION),
        }
    }

    pub async fn ensure_indexes(&self) -> ShopResult<()> {
        self.collection
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "id": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
            )
            .await
            .map_err(storage_err)?;

        // Exactly one order per provider capture
        self.collection
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "payment.capture_id": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
            )
            .await
            .map_err(storage_err)?;
        Ok(())
    }
}

#[async_trait]
impl OrderStore for MongoOrderStore {
    async fn insert(&self, order: &Order) -> ShopResult<()> {
        match self.collection.insert_one(order).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Err(ShopError::Conflict(format!(
                "order already exists for capture {}",
                order.payment.capture_id
            ))),
            Err(e) => Err(storage_err(e)),
        }
    }

    async fn find_by_capture_id(&self, capture_id: &str) -> ShopResult<Option<Order>> {
        self.collection
            .find_one(doc! { "payment.capture_id": capture_id })
            .await
            .map_err(storage_err)
    }

    async fn find_confirmed_by_user(&self, user_id: &str) -> ShopResult<Vec<Order>> {
        let cursor = self
            .collection
            .find(doc! { "user_id": user_id, "status": "confirmed" })
            .sort(doc! { "created_at": -1 })
            .await
            .map_err(storage_err)?;
        cursor.try_collect().await.map_err(storage_err)
    }
}
