//! Cart store over the `carts` collection.
//!
//! A partial unique index on `(user_id, state == "active")` backs the
//! one-active-cart-per-user constraint, so `ensure_active` is an upsert,
//! never a read-then-write. Line mutations either touch a single document
//! atomically (`$inc` on line and count together) or compare-and-swap on
//! the cart `version`.

use crate::{bson_err, is_duplicate_key, now_rfc3339, storage_err};
use async_trait::async_trait;
use mongodb::bson::{doc, to_bson};
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Collection, Database, IndexModel};
use shop_core::{Cart, CartStore, ShopError, ShopResult};
use tracing::debug;

const COLLECTION: &str = "carts";
const ACTIVE: &str = "active";

/// Attempts before a compare-and-swap gives up with `Conflict`
const CAS_ATTEMPTS: u32 = 3;

#[derive(Clone)]
pub struct MongoCartStore {
    collection: Collection<Cart>,
}

impl MongoCartStore {
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

        // One active cart per user
        self.collection
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "user_id": 1 })
                    .options(
                        IndexOptions::builder()
                            .unique(true)
                            .partial_filter_expression(doc! { "state": ACTIVE })
                            .build(),
                    )
                    .build(),
            )
            .await
            .map_err(storage_err)?;
        Ok(())
    }

    /// Write the recomputed lines back, guarded by the version read.
    /// Returns `false` when another writer got there first.
    async fn cas_write(&self, before_version: u64, cart: &Cart) -> ShopResult<bool> {
        let result = self
            .collection
            .update_one(
                doc! { "id": cart.id.as_str(), "version": before_version as i64 },
                doc! {
                    "$set": {
                        "lines": to_bson(&cart.lines).map_err(bson_err)?,
                        "line_count": cart.line_count as i64,
                        "updated_at": now_rfc3339(),
                    },
                    "$inc": { "version": 1 },
                },
            )
            .await
            .map_err(storage_err)?;
        Ok(result.matched_count == 1)
    }
}

#[async_trait]
impl CartStore for MongoCartStore {
    async fn ensure_active(&self, user_id: &str) -> ShopResult<Cart> {
        let fresh = Cart::new(user_id);
        let result = self
            .collection
            .find_one_and_update(
                doc! { "user_id": user_id, "state": ACTIVE },
                doc! {
                    "$setOnInsert": {
                        "id": fresh.id.as_str(),
                        "lines": [],
                        "line_count": 0,
                        "version": 0,
                        "created_at": fresh.created_at.to_rfc3339(),
                        "updated_at": fresh.updated_at.to_rfc3339(),
                    }
                },
            )
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await;

        match result {
            Ok(Some(cart)) => Ok(cart),
            Ok(None) => Err(ShopError::Storage(
                "upsert returned no cart document".to_string(),
            )),
            // Lost the upsert race to a concurrent request for the same
            // user; the winner's cart is now there to read.
            Err(e) if is_duplicate_key(&e) => {
                debug!("concurrent cart upsert for user {}, re-reading", user_id);
                self.find_active(user_id)
                    .await?
                    .ok_or_else(|| ShopError::Storage("active cart vanished after upsert race".to_string()))
            }
            Err(e) => Err(storage_err(e)),
        }
    }

    async fn find_active(&self, user_id: &str) -> ShopResult<Option<Cart>> {
        self.collection
            .find_one(doc! { "user_id": user_id, "state": ACTIVE })
            .await
            .map_err(storage_err)
    }

    async fn find_active_by_id(&self, cart_id: &str) -> ShopResult<Option<Cart>> {
        self.collection
            .find_one(doc! { "id": cart_id, "state": ACTIVE })
            .await
            .map_err(storage_err)
    }

    async fn add_or_increment_line(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: u32,
    ) -> ShopResult<Cart> {
        let quantity = quantity as i64;

        for _ in 0..CAS_ATTEMPTS {
            // Existing line: bump its quantity and the count in one update
            let incremented = self
                .collection
                .update_one(
                    doc! {
                        "user_id": user_id,
                        "state": ACTIVE,
                        "lines.product_id": product_id,
                    },
                    doc! {
                        "$inc": {
                            "lines.$.quantity": quantity,
                            "line_count": quantity,
                            "version": 1,
                        },
                        "$set": { "updated_at": now_rfc3339() },
                    },
                )
                .await
                .map_err(storage_err)?;

            if incremented.matched_count == 1 {
                break;
            }

            // No line yet: append one, still adjusting the count atomically
            let appended = self
                .collection
                .update_one(
                    doc! {
                        "user_id": user_id,
                        "state": ACTIVE,
                        "lines.product_id": { "$ne": product_id },
                    },
                    doc! {
                        "$push": { "lines": { "product_id": product_id, "quantity": quantity } },
                        "$inc": { "line_count": quantity, "version": 1 },
                        "$set": { "updated_at": now_rfc3339() },
                    },
                )
                .await
                .map_err(storage_err)?;

            if appended.matched_count == 1 {
                break;
            }

            // Neither matched: either no active cart, or a concurrent
            // writer appended the line between the two updates. Retry
            // after confirming the cart still exists.
            if self.find_active(user_id).await?.is_none() {
                return Err(ShopError::CartNotFound);
            }
        }

        self.find_active(user_id)
            .await?
            .ok_or(ShopError::CartNotFound)
    }

    async fn set_line_quantity(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> ShopResult<Cart> {
        for _ in 0..CAS_ATTEMPTS {
            let mut cart = self
                .find_active(user_id)
                .await?
                .ok_or(ShopError::CartNotFound)?;
            let before = cart.version;

            if cart.line(product_id).is_none() {
                return Err(ShopError::LineNotFound {
                    product_id: product_id.to_string(),
                });
            }

            if quantity <= 0 {
                cart.lines.retain(|l| l.product_id != product_id);
            } else if let Some(line) = cart.lines.iter_mut().find(|l| l.product_id == product_id) {
                line.quantity = quantity as u32;
            }
            cart.recount();
            cart.version += 1;

            if self.cas_write(before, &cart).await? {
                return Ok(cart);
            }
        }

        Err(ShopError::Conflict(
            "cart changed concurrently, giving up".to_string(),
        ))
    }

    async fn remove_line(&self, user_id: &str, product_id: &str) -> ShopResult<Cart> {
        for _ in 0..CAS_ATTEMPTS {
            let mut cart = self
                .find_active(user_id)
                .await?
                .ok_or(ShopError::CartNotFound)?;
            let before = cart.version;

            cart.lines.retain(|l| l.product_id != product_id);
            cart.recount();
            cart.version += 1;

            if self.cas_write(before, &cart).await? {
                return Ok(cart);
            }
        }

        Err(ShopError::Conflict(
            "cart changed concurrently, giving up".to_string(),
        ))
    }

    async fn complete_active(&self, user_id: &str) -> ShopResult<()> {
        self.collection
            .update_one(
                doc! { "user_id": user_id, "state": ACTIVE },
                doc! {
                    "$set": { "state": "completed", "updated_at": now_rfc3339() },
                    "$inc": { "version": 1 },
                },
            )
            .await
            .map_err(storage_err)?;
        Ok(())
    }
}
