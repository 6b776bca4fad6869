//! User store over the `users` collection.

use crate::{is_duplicate_key, storage_err};
use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Collection, Database, IndexModel};
use shop_core::{ShopError, ShopResult, User, UserStore};

const COLLECTION: &str = "users";

#[derive(Clone)]
pub struct MongoUserStore {
    collection: Collection<User>,
}

impl MongoUserStore {
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

        self.collection
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "email": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
            )
            .await
            .map_err(storage_err)?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn insert(&self, user: &User) -> ShopResult<()> {
        match self.collection.insert_one(user).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Err(ShopError::UserAlreadyExists {
                email: user.email.clone(),
            }),
            Err(e) => Err(storage_err(e)),
        }
    }

    async fn find_by_email(&self, email: &str) -> ShopResult<Option<User>> {
        self.collection
            .find_one(doc! { "email": email })
            .await
            .map_err(storage_err)
    }

    async fn find_by_id(&self, user_id: &str) -> ShopResult<Option<User>> {
        self.collection
            .find_one(doc! { "id": user_id })
            .await
            .map_err(storage_err)
    }

    async fn update(&self, user: &User) -> ShopResult<()> {
        let result = self
            .collection
            .replace_one(doc! { "id": user.id.as_str() }, user)
            .await
            .map_err(storage_err)?;

        if result.matched_count == 0 {
            return Err(ShopError::UserNotFound {
                user_id: user.id.clone(),
            });
        }
        Ok(())
    }
}
