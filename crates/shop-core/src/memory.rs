//! In-process store backend.
//!
//! Backs tests and document-store-less local runs. Each store serializes
//! its mutations on a single lock, which is what makes the upsert and
//! count-adjustment contracts of [`crate::store`] hold here.

use crate::cart::{Cart, CartLine, CartState};
use crate::error::{ShopError, ShopResult};
use crate::order::{Order, OrderStatus};
use crate::product::{Product, ProductCategory, ProductPage, ProductPatch, ProductQuery, ProductSort};
use crate::store::{CartStore, CatalogStore, OrderStore, UserStore};
use crate::user::User;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default, Clone)]
pub struct MemoryCatalog {
    products: Arc<RwLock<HashMap<String, Product>>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preload products (test fixtures, demo data)
    pub async fn seed(&self, products: impl IntoIterator<Item = Product>) {
        let mut map = self.products.write().await;
        for product in products {
            map.insert(product.id.clone(), product);
        }
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    async fn find_by_id(&self, product_id: &str) -> ShopResult<Option<Product>> {
        Ok(self.products.read().await.get(product_id).cloned())
    }

    async fn insert(&self, product: &Product) -> ShopResult<()> {
        self.products
            .write()
            .await
            .insert(product.id.clone(), product.clone());
        Ok(())
    }

    async fn update(&self, product_id: &str, patch: &ProductPatch) -> ShopResult<Product> {
        let mut map = self.products.write().await;
        let product = map
            .get_mut(product_id)
            .ok_or_else(|| ShopError::ProductNotFound {
                product_id: product_id.to_string(),
            })?;
        patch.apply(product);
        Ok(product.clone())
    }

    async fn set_stock(&self, product_id: &str, stock: u32) -> ShopResult<Product> {
        let mut map = self.products.write().await;
        let product = map
            .get_mut(product_id)
            .ok_or_else(|| ShopError::ProductNotFound {
                product_id: product_id.to_string(),
            })?;
        product.stock = stock;
        product.updated_at = Utc::now();
        Ok(product.clone())
    }

    async fn list(&self, query: &ProductQuery) -> ShopResult<ProductPage> {
        let map = self.products.read().await;
        let published = query.published_filter();
        let search = query.search.as_ref().map(|s| s.to_lowercase());

        let mut matches: Vec<Product> = map
            .values()
            .filter(|p| p.published == published)
            .filter(|p| query.category.map_or(true, |c| p.category() == c))
            .filter(|p| {
                query
                    .price_range
                    .map_or(true, |r| r.contains(p.price.amount))
            })
            .filter(|p| {
                search.as_ref().map_or(true, |s| {
                    p.name.to_lowercase().contains(s)
                        || p.description.to_lowercase().contains(s)
                })
            })
            .cloned()
            .collect();

        match query.sort {
            ProductSort::Newest => matches.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            ProductSort::PriceAsc => matches.sort_by_key(|p| p.price.amount),
            ProductSort::PriceDesc => matches.sort_by_key(|p| std::cmp::Reverse(p.price.amount)),
        }

        let count = matches.len() as u64;
        let (page, limit) = query.pagination();
        let total_pages = count.div_ceil(limit);
        let products = matches
            .into_iter()
            .skip(((page - 1) * limit) as usize)
            .take(limit as usize)
            .collect();

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
        Ok(self
            .products
            .read()
            .await
            .values()
            .find(|p| p.name == name && p.category() == category)
            .cloned())
    }
}

#[derive(Default, Clone)]
pub struct MemoryCartStore {
    carts: Arc<RwLock<HashMap<String, Cart>>>,
}

impl MemoryCartStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn active_mut<'a>(carts: &'a mut HashMap<String, Cart>, user_id: &str) -> Option<&'a mut Cart> {
    carts
        .values_mut()
        .find(|c| c.user_id == user_id && c.is_active())
}

#[async_trait]
impl CartStore for MemoryCartStore {
    async fn ensure_active(&self, user_id: &str) -> ShopResult<Cart> {
        // Check and insert under one write lock: the upsert is atomic.
        let mut carts = self.carts.write().await;
        if let Some(cart) = active_mut(&mut carts, user_id) {
            return Ok(cart.clone());
        }
        let cart = Cart::new(user_id);
        carts.insert(cart.id.clone(), cart.clone());
        Ok(cart)
    }

    async fn find_active(&self, user_id: &str) -> ShopResult<Option<Cart>> {
        Ok(self
            .carts
            .read()
            .await
            .values()
            .find(|c| c.user_id == user_id && c.is_active())
            .cloned())
    }

    async fn find_active_by_id(&self, cart_id: &str) -> ShopResult<Option<Cart>> {
        Ok(self
            .carts
            .read()
            .await
            .get(cart_id)
            .filter(|c| c.is_active())
            .cloned())
    }

    async fn add_or_increment_line(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: u32,
    ) -> ShopResult<Cart> {
        let mut carts = self.carts.write().await;
        let cart = active_mut(&mut carts, user_id).ok_or(ShopError::CartNotFound)?;

        match cart.lines.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => line.quantity += quantity,
            None => cart.lines.push(CartLine {
                product_id: product_id.to_string(),
                quantity,
            }),
        }
        cart.recount();
        cart.version += 1;
        cart.updated_at = Utc::now();
        Ok(cart.clone())
    }

    async fn set_line_quantity(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> ShopResult<Cart> {
        let mut carts = self.carts.write().await;
        let cart = active_mut(&mut carts, user_id).ok_or(ShopError::CartNotFound)?;

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
        cart.updated_at = Utc::now();
        Ok(cart.clone())
    }

    async fn remove_line(&self, user_id: &str, product_id: &str) -> ShopResult<Cart> {
        let mut carts = self.carts.write().await;
        let cart = active_mut(&mut carts, user_id).ok_or(ShopError::CartNotFound)?;

        cart.lines.retain(|l| l.product_id != product_id);
        cart.recount();
        cart.version += 1;
        cart.updated_at = Utc::now();
        Ok(cart.clone())
    }

    async fn complete_active(&self, user_id: &str) -> ShopResult<()> {
        let mut carts = self.carts.write().await;
        if let Some(cart) = active_mut(&mut carts, user_id) {
            cart.state = CartState::Completed;
            cart.version += 1;
            cart.updated_at = Utc::now();
        }
        Ok(())
    }
}

#[derive(Default, Clone)]
pub struct MemoryOrderStore {
    orders: Arc<RwLock<Vec<Order>>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.orders.read().await.len()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn insert(&self, order: &Order) -> ShopResult<()> {
        let mut orders = self.orders.write().await;
        if orders
            .iter()
            .any(|o| o.payment.capture_id == order.payment.capture_id)
        {
            return Err(ShopError::Conflict(format!(
                "order already exists for capture {}",
                order.payment.capture_id
            )));
        }
        orders.push(order.clone());
        Ok(())
    }

    async fn find_by_capture_id(&self, capture_id: &str) -> ShopResult<Option<Order>> {
        Ok(self
            .orders
            .read()
            .await
            .iter()
            .find(|o| o.payment.capture_id == capture_id)
            .cloned())
    }

    async fn find_confirmed_by_user(&self, user_id: &str) -> ShopResult<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .orders
            .read()
            .await
            .iter()
            .filter(|o| o.user_id == user_id && o.status == OrderStatus::Confirmed)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }
}

#[derive(Default, Clone)]
pub struct MemoryUserStore {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: &User) -> ShopResult<()> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(ShopError::UserAlreadyExists {
                email: user.email.clone(),
            });
        }
        users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> ShopResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_id(&self, user_id: &str) -> ShopResult<Option<User>> {
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn update(&self, user: &User) -> ShopResult<()> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(ShopError::UserNotFound {
                user_id: user.id.clone(),
            });
        }
        users.insert(user.id.clone(), user.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::{Currency, Price, ProductAttributes};

    fn accessory(name: &str, price: f64, stock: u32) -> Product {
        Product::new(
            name,
            "https://cdn.example.com/thumb.png",
            Price::new(price, Currency::USD),
            stock,
            ProductAttributes::Accessory {
                accessory_type: "Charger".into(),
                brand: None,
                color: None,
                material: None,
            },
        )
        .published()
    }

    #[tokio::test]
    async fn test_ensure_active_is_single_per_user() {
        let store = MemoryCartStore::new();
        let (a, b) = tokio::join!(store.ensure_active("user-1"), store.ensure_active("user-1"));
        assert_eq!(a.unwrap().id, b.unwrap().id);
    }

    #[tokio::test]
    async fn test_duplicate_capture_conflicts() {
        use crate::order::{CheckoutTotals, Order, PaymentRecord, PaymentStatus, ShippingAddress};

        let store = MemoryOrderStore::new();
        let order = Order::confirmed(
            "user-1",
            CheckoutTotals::zero(Currency::USD),
            ShippingAddress {
                full_name: "Ada".into(),
                address_line1: None,
                city: None,
                state: None,
                postal_code: None,
                country: "GB".into(),
            },
            PaymentRecord {
                provider_order_id: "po-1".into(),
                capture_id: "cap-1".into(),
                status: PaymentStatus::Completed,
                amount: Price::new(1.0, Currency::USD),
                payer_email: "ada@example.com".into(),
                payer_id: "payer-1".into(),
            },
            vec![],
        );

        store.insert(&order).await.unwrap();
        let duplicate = Order { id: "other".into(), ..order };
        assert!(matches!(
            store.insert(&duplicate).await,
            Err(ShopError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_catalog_list_filters_and_pages() {
        let catalog = MemoryCatalog::new();
        catalog
            .seed([
                accessory("Cheap Cable", 19.0, 10),
                accessory("Mid Dock", 300.0, 5),
                accessory("Gold Stand", 900.0, 2),
            ])
            .await;

        let query = ProductQuery {
            price_range: Some(crate::product::PriceRange::Between),
            ..Default::default()
        };
        let page = catalog.list(&query).await.unwrap();
        assert_eq!(page.count, 1);
        assert_eq!(page.products[0].name, "Mid Dock");

        let query = ProductQuery {
            limit: 2,
            sort: ProductSort::PriceAsc,
            ..Default::default()
        };
        let page = catalog.list(&query).await.unwrap();
        assert_eq!(page.count, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.products.len(), 2);
        assert_eq!(page.products[0].name, "Cheap Cable");
    }

    #[tokio::test]
    async fn test_user_email_unique() {
        let store = MemoryUserStore::new();
        let user = User::new("Ada", "Lovelace", "ada@example.com", "555-0101", "digest");
        store.insert(&user).await.unwrap();

        let again = User::new("Ada", "Again", "ada@example.com", "555-0102", "digest");
        assert!(matches!(
            store.insert(&again).await,
            Err(ShopError::UserAlreadyExists { .. })
        ));
    }
}
