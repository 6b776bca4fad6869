//! Cart → review → capture → order workflow, driven end to end over the
//! in-memory store backend with a stub payment gateway.

use async_trait::async_trait;
use shop_core::memory::{MemoryCartStore, MemoryCatalog, MemoryOrderStore};
use shop_core::{
    Capture, CartService, CartStore, CheckoutService, Currency, LineGroup, OrderStatus,
    OrderStore, PaymentGateway, PaymentStatus, Price, Product, ProductAttributes, ProviderOrder,
    RequestedLine, ShippingAddress, ShopError, ShopResult, CAPTURE_COMPLETED,
};
use std::sync::Arc;

/// Gateway stub that captures with a configurable status
struct StubGateway {
    capture_status: String,
}

impl StubGateway {
    fn completed() -> Self {
        Self {
            capture_status: CAPTURE_COMPLETED.to_string(),
        }
    }

    fn declined() -> Self {
        Self {
            capture_status: "DECLINED".to_string(),
        }
    }
}

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn create_order(&self, _amount: &Price) -> ShopResult<ProviderOrder> {
        Ok(ProviderOrder {
            id: "5O190127TN364715T".to_string(),
            status: "CREATED".to_string(),
        })
    }

    async fn capture_order(&self, provider_order_id: &str) -> ShopResult<Capture> {
        Ok(Capture {
            provider_order_id: provider_order_id.to_string(),
            capture_id: format!("cap-{provider_order_id}"),
            status: self.capture_status.clone(),
            amount: Price::new(45.0, Currency::USD),
            payer_email: "payer@example.com".to_string(),
            payer_id: "QYR5Z8XDSY3HA".to_string(),
            shipping: Some(ShippingAddress {
                full_name: "Ada Lovelace".to_string(),
                address_line1: Some("12 Analytical Row".to_string()),
                city: Some("London".to_string()),
                state: None,
                postal_code: Some("N1".to_string()),
                country: "GB".to_string(),
            }),
        })
    }

    fn provider_name(&self) -> &'static str {
        "stub"
    }
}

struct Harness {
    catalog: MemoryCatalog,
    carts: MemoryCartStore,
    orders: MemoryOrderStore,
    cart_service: CartService,
    checkout: CheckoutService,
}

fn harness(gateway: StubGateway) -> Harness {
    let catalog = MemoryCatalog::new();
    let carts = MemoryCartStore::new();
    let orders = MemoryOrderStore::new();

    let cart_service = CartService::new(Arc::new(carts.clone()), Arc::new(catalog.clone()));
    let checkout = CheckoutService::new(
        Arc::new(carts.clone()),
        Arc::new(catalog.clone()),
        Arc::new(orders.clone()),
        Arc::new(gateway),
    );

    Harness {
        catalog,
        carts,
        orders,
        cart_service,
        checkout,
    }
}

fn phone(name: &str, price: f64, stock: u32) -> Product {
    Product::new(
        name,
        "https://cdn.example.com/phone.png",
        Price::new(price, Currency::USD),
        stock,
        ProductAttributes::Phone {
            brand: "Pixelon".into(),
            color: Some("black".into()),
            storage_capacity: Some("128GB".into()),
            screen_size: None,
            battery_capacity: None,
        },
    )
    .published()
}

fn group_for(product_id: &str, quantity: u32, claimed_price: Option<i64>) -> Vec<LineGroup> {
    vec![LineGroup {
        discounts: vec![],
        items: vec![RequestedLine {
            product_id: product_id.to_string(),
            quantity,
            price: claimed_price,
        }],
    }]
}

#[tokio::test]
async fn line_count_tracks_every_mutation() {
    let h = harness(StubGateway::completed());
    let a = phone("Pixelon 9", 100.0, 10);
    let b = phone("Pixelon 9 Pro", 200.0, 10);
    h.catalog.seed([a.clone(), b.clone()]).await;

    let view = h.cart_service.add_item("user-1", &a.id, 3).await.unwrap();
    assert_eq!(view.line_count, 3);

    // Incrementing an existing line merges rather than appending
    let view = h.cart_service.add_item("user-1", &a.id, 2).await.unwrap();
    assert_eq!(view.lines.len(), 1);
    assert_eq!(view.line_count, 5);

    let view = h.cart_service.add_item("user-1", &b.id, 1).await.unwrap();
    assert_eq!(view.lines.len(), 2);
    assert_eq!(view.line_count, 6);

    let view = h
        .cart_service
        .set_item_quantity("user-1", &a.id, 2)
        .await
        .unwrap();
    assert_eq!(view.line_count, 3);

    let view = h.cart_service.remove_item("user-1", &b.id).await.unwrap();
    assert_eq!(view.line_count, 2);

    // The stored cart agrees with the view after every step
    let cart = h.carts.find_active("user-1").await.unwrap().unwrap();
    let summed: u32 = cart.lines.iter().map(|l| l.quantity).sum();
    assert_eq!(cart.line_count, summed);
}

#[tokio::test]
async fn add_beyond_stock_fails_and_leaves_cart_unchanged() {
    let h = harness(StubGateway::completed());
    let a = phone("Pixelon 9", 100.0, 5);
    h.catalog.seed([a.clone()]).await;

    h.cart_service.add_item("user-1", &a.id, 3).await.unwrap();

    let err = h
        .cart_service
        .add_item("user-1", &a.id, 6)
        .await
        .unwrap_err();
    assert!(matches!(err, ShopError::StockExceeded { .. }));

    let cart = h.carts.find_active("user-1").await.unwrap().unwrap();
    assert_eq!(cart.line_count, 3);
    assert_eq!(cart.lines.len(), 1);
}

#[tokio::test]
async fn add_unknown_product_fails() {
    let h = harness(StubGateway::completed());
    let err = h
        .cart_service
        .add_item("user-1", "no-such-product", 1)
        .await
        .unwrap_err();
    assert!(matches!(err, ShopError::ProductNotFound { .. }));
}

#[tokio::test]
async fn set_to_zero_removes_and_missing_line_is_an_error() {
    let h = harness(StubGateway::completed());
    let a = phone("Pixelon 9", 100.0, 10);
    let b = phone("Pixelon 9 Pro", 200.0, 10);
    h.catalog.seed([a.clone(), b.clone()]).await;

    h.cart_service.add_item("user-1", &a.id, 2).await.unwrap();

    let view = h
        .cart_service
        .set_item_quantity("user-1", &a.id, 0)
        .await
        .unwrap();
    assert!(view.lines.is_empty());
    assert_eq!(view.line_count, 0);

    let err = h
        .cart_service
        .set_item_quantity("user-1", &b.id, 4)
        .await
        .unwrap_err();
    assert!(matches!(err, ShopError::LineNotFound { .. }));

    // Removing a line that is not there is a no-op, not an error
    let view = h.cart_service.remove_item("user-1", &b.id).await.unwrap();
    assert_eq!(view.line_count, 0);
}

#[tokio::test]
async fn set_quantity_without_cart_fails() {
    let h = harness(StubGateway::completed());
    let err = h
        .cart_service
        .set_item_quantity("user-1", "p", 1)
        .await
        .unwrap_err();
    assert!(matches!(err, ShopError::CartNotFound));
}

#[tokio::test]
async fn review_uses_catalog_price_not_claimed_price() {
    let h = harness(StubGateway::completed());
    let a = phone("Pixelon 9", 100.0, 10);
    h.catalog.seed([a.clone()]).await;

    let cart = h.cart_service.add_item("user-1", &a.id, 2).await.unwrap();

    // Claim a unit price of $0.01; the catalog says $100.00
    let summary = h
        .checkout
        .review("user-1", &cart.id, &group_for(&a.id, 2, Some(1)))
        .await
        .unwrap();

    assert_eq!(summary.totals.total_price, 20000);
    assert_eq!(summary.totals.grand_total, 20000);
    assert_eq!(summary.groups[0].lines[0].price.amount, 10000);
}

#[tokio::test]
async fn review_drops_dead_lines_and_rejects_empty_groups() {
    let h = harness(StubGateway::completed());
    let a = phone("Pixelon 9", 100.0, 10);
    h.catalog.seed([a.clone()]).await;

    let cart = h.cart_service.add_item("user-1", &a.id, 1).await.unwrap();

    // One resolvable line and one dead reference: the dead line is dropped
    let groups = vec![LineGroup {
        discounts: vec![],
        items: vec![
            RequestedLine {
                product_id: a.id.clone(),
                quantity: 1,
                price: None,
            },
            RequestedLine {
                product_id: "vanished".into(),
                quantity: 5,
                price: None,
            },
        ],
    }];
    let summary = h.checkout.review("user-1", &cart.id, &groups).await.unwrap();
    assert_eq!(summary.groups[0].lines.len(), 1);
    assert_eq!(summary.totals.grand_total, 10000);

    // A group with nothing resolvable fails the review
    let err = h
        .checkout
        .review("user-1", &cart.id, &group_for("vanished", 1, None))
        .await
        .unwrap_err();
    assert!(matches!(err, ShopError::EmptyOrder));
}

#[tokio::test]
async fn review_requires_the_callers_active_cart() {
    let h = harness(StubGateway::completed());
    let a = phone("Pixelon 9", 100.0, 10);
    h.catalog.seed([a.clone()]).await;

    let cart = h.cart_service.add_item("user-1", &a.id, 1).await.unwrap();

    let err = h
        .checkout
        .review("someone-else", &cart.id, &group_for(&a.id, 1, None))
        .await
        .unwrap_err();
    assert!(matches!(err, ShopError::CartNotFound));
}

#[tokio::test]
async fn declined_capture_writes_no_order() {
    let h = harness(StubGateway::declined());
    let a = phone("Pixelon 9", 100.0, 10);
    h.catalog.seed([a.clone()]).await;

    let cart = h.cart_service.add_item("user-1", &a.id, 1).await.unwrap();

    let err = h
        .checkout
        .capture_and_place_order("user-1", "po-1", &cart.id, &group_for(&a.id, 1, None))
        .await
        .unwrap_err();
    assert!(matches!(err, ShopError::PaymentNotCompleted { .. }));
    assert_eq!(h.orders.count().await, 0);

    // The cart is still active after a failed capture
    let cart = h.carts.find_active("user-1").await.unwrap();
    assert!(cart.is_some());
}

#[tokio::test]
async fn repeated_capture_yields_one_order() {
    let h = harness(StubGateway::completed());
    let a = phone("Pixelon 9", 100.0, 10);
    h.catalog.seed([a.clone()]).await;

    let cart = h.cart_service.add_item("user-1", &a.id, 1).await.unwrap();
    let groups = group_for(&a.id, 1, None);

    let first = h
        .checkout
        .capture_and_place_order("user-1", "po-1", &cart.id, &groups)
        .await
        .unwrap();

    // Same provider order id → same capture id → the same persisted order.
    // The cart completed after the first order, so re-add to keep an
    // active cart for the second review pass.
    let cart2 = h.cart_service.add_item("user-1", &a.id, 1).await.unwrap();
    let second = h
        .checkout
        .capture_and_place_order("user-1", "po-1", &cart2.id, &groups)
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(h.orders.count().await, 1);
}

#[tokio::test]
async fn full_purchase_flow() {
    let h = harness(StubGateway::completed());
    let a = phone("Pixelon 9", 100.0, 5);
    h.catalog.seed([a.clone()]).await;

    // Add 3 of a stock-5 product: one line, count 3
    let view = h.cart_service.add_item("user-1", &a.id, 3).await.unwrap();
    assert_eq!(view.lines.len(), 1);
    assert_eq!(view.line_count, 3);

    let groups = group_for(&a.id, 3, Some(1));

    // Review totals come from the catalog price
    let (provider_order, summary) = h
        .checkout
        .create_provider_order("user-1", &view.id, &groups)
        .await
        .unwrap();
    assert_eq!(summary.totals.grand_total, 30000);

    let order = h
        .checkout
        .capture_and_place_order("user-1", &provider_order.id, &view.id, &groups)
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Confirmed);
    assert_eq!(order.payment.status, PaymentStatus::Completed);
    assert_eq!(order.lines.len(), 1);
    assert_eq!(order.lines[0].product_id, a.id);
    assert_eq!(order.lines[0].quantity, 3);
    assert_eq!(order.lines[0].price.amount, 10000);
    assert_eq!(order.lines[0].stock_at_purchase, 5);
    assert_eq!(order.shipping.full_name, "Ada Lovelace");

    // The active cart transitioned to completed after the write
    assert!(h.carts.find_active("user-1").await.unwrap().is_none());

    let confirmed = h.orders.find_confirmed_by_user("user-1").await.unwrap();
    assert_eq!(confirmed.len(), 1);
    assert_eq!(confirmed[0].id, order.id);
}
