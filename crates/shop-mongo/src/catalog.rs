//! Product catalog over the `products` collection.

use crate::storage_err;
use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::options::IndexOptions;
use mongodb::{Collection, Database, IndexModel};
use shop_core::{
    CatalogStore, PriceRange, Product, ProductCategory, ProductPage, ProductPatch, ProductQuery,
    ProductSort, ShopError, ShopResult,
};

const COLLECTION: &str = "products";

#[derive(Clone)]
pub struct MongoCatalog {
    collection: Collection<Product>,
}

impl MongoCatalog {
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
        Ok(())
    }
}

/// Translate the catalog query into a Mongo filter document
fn list_filter(query: &ProductQuery) -> Document {
    let mut filter = doc! { "published": query.published_filter() };

    if let Some(category) = query.category {
        filter.insert("attributes.category", category.as_str());
    }

    if let Some(range) = query.price_range {
        let bounds = match range {
            PriceRange::Below => doc! { "$lt": PriceRange::LOW },
            PriceRange::Between => doc! { "$gte": PriceRange::LOW, "$lte": PriceRange::HIGH },
            PriceRange::Above => doc! { "$gt": PriceRange::HIGH },
        };
        filter.insert("price.amount", bounds);
    }

    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = regex_escape(search);
        filter.insert(
            "$or",
            vec![
                doc! { "name": { "$regex": pattern.as_str(), "$options": "i" } },
                doc! { "description": { "$regex": pattern.as_str(), "$options": "i" } },
            ],
        );
    }

    filter
}

fn sort_doc(sort: ProductSort) -> Document {
    match sort {
        ProductSort::Newest => doc! { "created_at": -1 },
        ProductSort::PriceAsc => doc! { "price.amount": 1 },
        ProductSort::PriceDesc => doc! { "price.amount": -1 },
    }
}

/// Escape regex metacharacters so user search terms match literally
fn regex_escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if "\\.+*?()|[]{}^$".contains(ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[async_trait]
impl CatalogStore for MongoCatalog {
    async fn find_by_id(&self, product_id: &str) -> ShopResult<Option<Product>> {
        self.collection
            .find_one(doc! { "id": product_id })
            .await
            .map_err(storage_err)
    }

    async fn insert(&self, product: &Product) -> ShopResult<()> {
        self.collection
            .insert_one(product)
            .await
            .map_err(storage_err)?;
        Ok(())
    }

    async fn update(&self, product_id: &str, patch: &ProductPatch) -> ShopResult<Product> {
        let mut product = self
            .find_by_id(product_id)
            .await?
            .ok_or_else(|| ShopError::ProductNotFound {
                product_id: product_id.to_string(),
            })?;
        patch.apply(&mut product);

        self.collection
            .replace_one(doc! { "id": product_id }, &product)
            .await
            .map_err(storage_err)?;
        Ok(product)
    }

    async fn set_stock(&self, product_id: &str, stock: u32) -> ShopResult<Product> {
        let patch = ProductPatch {
            stock: Some(stock),
            ..Default::default()
        };
        self.update(product_id, &patch).await
    }

    async fn list(&self, query: &ProductQuery) -> ShopResult<ProductPage> {
        let filter = list_filter(query);

        let count = self
            .collection
            .count_documents(filter.clone())
            .await
            .map_err(storage_err)?;

        let (page, limit) = query.pagination();
        let total_pages = count.div_ceil(limit);

        let cursor = self
            .collection
            .find(filter)
            .sort(sort_doc(query.sort))
            .skip((page - 1) * limit)
            .limit(limit as i64)
            .await
            .map_err(storage_err)?;

        let products: Vec<Product> = cursor.try_collect().await.map_err(storage_err)?;

        Ok(ProductPage {
            products,
            total_pages,
            count,
        })
    }

    async fn find_duplicate(
        &self,
        name: &str,
        category: ProductCategory,
    ) -> ShopResult<Option<Product>> {
        self.collection
            .find_one(doc! { "name": name, "attributes.category": category.as_str() })
            .await
            .map_err(storage_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_filter_defaults_to_published() {
        let filter = list_filter(&ProductQuery::default());
        assert_eq!(filter.get_bool("published").unwrap(), true);
        assert!(filter.get("attributes.category").is_none());
    }

    #[test]
    fn test_list_filter_combines_conditions() {
        let query = ProductQuery {
            category: Some(ProductCategory::Phone),
            price_range: Some(PriceRange::Between),
            search: Some("pixelon".into()),
            ..Default::default()
        };
        let filter = list_filter(&query);

        assert_eq!(
            filter.get_str("attributes.category").unwrap(),
            "Phone"
        );
        let price = filter.get_document("price.amount").unwrap();
        assert_eq!(price.get_i64("$gte").unwrap(), 20000);
        assert_eq!(price.get_i64("$lte").unwrap(), 75000);
        assert!(filter.get_array("$or").is_ok());
    }

    #[test]
    fn test_regex_metacharacters_are_escaped() {
        assert_eq!(regex_escape("usb-c (2m)"), "usb-c \\(2m\\)");
    }

    #[test]
    fn test_sort_docs() {
        assert_eq!(sort_doc(ProductSort::Newest), doc! { "created_at": -1 });
        assert_eq!(sort_doc(ProductSort::PriceAsc), doc! { "price.amount": 1 });
    }
}
