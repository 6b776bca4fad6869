//! # Product Types
//!
//! Catalog types for gadget-shop. Products carry a price, a stock level,
//! and a category-specific attribute record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Supported currencies (ISO 4217)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    USD,
    EUR,
    GBP,
    JPY,
    CAD,
    AUD,
    CHF,
    MXN,
}

impl Currency {
    /// Returns the ISO 4217 currency code
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::USD => "usd",
            Currency::EUR => "eur",
            Currency::GBP => "gbp",
            Currency::JPY => "jpy",
            Currency::CAD => "cad",
            Currency::AUD => "aud",
            Currency::CHF => "chf",
            Currency::MXN => "mxn",
        }
    }

    /// Parse an ISO 4217 code, case-insensitive
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_lowercase().as_str() {
            "usd" => Some(Currency::USD),
            "eur" => Some(Currency::EUR),
            "gbp" => Some(Currency::GBP),
            "jpy" => Some(Currency::JPY),
            "cad" => Some(Currency::CAD),
            "aud" => Some(Currency::AUD),
            "chf" => Some(Currency::CHF),
            "mxn" => Some(Currency::MXN),
            _ => None,
        }
    }

    /// Returns the number of decimal places for this currency
    /// (JPY has 0 decimals, most others have 2)
    pub fn decimal_places(&self) -> u8 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Convert a decimal amount to the smallest currency unit (cents, etc.)
    pub fn to_smallest_unit(&self, amount: f64) -> i64 {
        let multiplier = 10_f64.powi(self.decimal_places() as i32);
        (amount * multiplier).round() as i64
    }

    /// Convert from smallest unit back to decimal
    pub fn from_smallest_unit(&self, amount: i64) -> f64 {
        let divisor = 10_f64.powi(self.decimal_places() as i32);
        amount as f64 / divisor
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::USD
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

/// Price with amount in smallest currency unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in smallest currency unit (cents for USD)
    pub amount: i64,
    /// Currency
    pub currency: Currency,
}

impl Price {
    /// Create a new price from decimal amount
    pub fn new(amount: f64, currency: Currency) -> Self {
        Self {
            amount: currency.to_smallest_unit(amount),
            currency,
        }
    }

    /// Create a price from smallest unit (cents)
    pub fn from_cents(amount: i64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Get the decimal amount
    pub fn as_decimal(&self) -> f64 {
        self.currency.from_smallest_unit(self.amount)
    }

    /// Decimal string the payment provider expects (e.g. "45.00")
    pub fn to_decimal_string(&self) -> String {
        format!(
            "{:.*}",
            self.currency.decimal_places() as usize,
            self.as_decimal()
        )
    }

    /// Parse a provider decimal value (e.g. "45.00") into a price
    pub fn from_decimal_str(value: &str, currency: Currency) -> Option<Self> {
        value.parse::<f64>().ok().map(|v| Self::new(v, currency))
    }

    /// Format for display (e.g., "$10.00")
    pub fn display(&self) -> String {
        let symbol = match self.currency {
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
            Currency::JPY => "¥",
            Currency::CAD => "C$",
            Currency::AUD => "A$",
            Currency::CHF => "CHF ",
            Currency::MXN => "MX$",
        };
        if self.currency.decimal_places() == 0 {
            format!("{}{}", symbol, self.amount)
        } else {
            format!("{}{:.2}", symbol, self.as_decimal())
        }
    }
}

/// Product category (closed set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductCategory {
    Phone,
    Watch,
    Tablet,
    Accessory,
}

impl ProductCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Phone => "Phone",
            ProductCategory::Watch => "Watch",
            ProductCategory::Tablet => "Tablet",
            ProductCategory::Accessory => "Accessory",
        }
    }

    /// All categories, for filter validation
    pub fn all() -> [ProductCategory; 4] {
        [
            ProductCategory::Phone,
            ProductCategory::Watch,
            ProductCategory::Tablet,
            ProductCategory::Accessory,
        ]
    }
}

impl std::fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn default_true() -> bool {
    true
}

/// Category-specific attribute record.
///
/// A closed tagged variant over the fixed category set; the tag doubles as
/// the product's category, so there is no separate type field to drift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category")]
pub enum ProductAttributes {
    Phone {
        brand: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<String>,
        /// For example: "64GB", "128GB"
        #[serde(default, skip_serializing_if = "Option::is_none")]
        storage_capacity: Option<String>,
        /// Screen size in inches
        #[serde(default, skip_serializing_if = "Option::is_none")]
        screen_size: Option<String>,
        /// Battery capacity in mAh
        #[serde(default, skip_serializing_if = "Option::is_none")]
        battery_capacity: Option<String>,
    },
    Watch {
        brand: String,
        /// e.g. Smartwatch, Analog, Digital
        watch_type: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<String>,
        /// e.g. Leather, Metal, Silicone
        #[serde(default, skip_serializing_if = "Option::is_none")]
        band_material: Option<String>,
        #[serde(default = "default_true")]
        water_resistant: bool,
    },
    Tablet {
        brand: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        storage_capacity: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        screen_size: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        battery_capacity: Option<String>,
        /// e.g. Android, iPadOS
        #[serde(default, skip_serializing_if = "Option::is_none")]
        operating_system: Option<String>,
    },
    Accessory {
        /// e.g. Charger, Headphones, Case
        accessory_type: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        brand: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        material: Option<String>,
    },
}

impl ProductAttributes {
    /// Category implied by the variant
    pub fn category(&self) -> ProductCategory {
        match self {
            ProductAttributes::Phone { .. } => ProductCategory::Phone,
            ProductAttributes::Watch { .. } => ProductCategory::Watch,
            ProductAttributes::Tablet { .. } => ProductCategory::Tablet,
            ProductAttributes::Accessory { .. } => ProductCategory::Accessory,
        }
    }
}

fn default_rating() -> f64 {
    4.5
}

/// A product in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique product identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// URL slug, derived from the name
    pub slug: String,

    /// Short description
    #[serde(default)]
    pub description: String,

    /// Thumbnail image URL
    pub thumbnail: String,

    /// Price
    pub price: Price,

    /// Units currently in stock
    pub stock: u32,

    /// Category-specific attributes; the variant tag is the category
    pub attributes: ProductAttributes,

    /// Whether this product is visible to shoppers
    #[serde(default)]
    pub published: bool,

    /// Average rating, 1.0 to 5.0, one decimal place
    #[serde(default = "default_rating")]
    pub rating: f64,

    /// Created timestamp
    pub created_at: DateTime<Utc>,

    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Create a new unpublished product with generated id and slug
    pub fn new(
        name: impl Into<String>,
        thumbnail: impl Into<String>,
        price: Price,
        stock: u32,
        attributes: ProductAttributes,
    ) -> Self {
        let name = name.into();
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            slug: slugify(&name),
            name,
            description: String::new(),
            thumbnail: thumbnail.into(),
            price,
            stock,
            attributes,
            published: false,
            rating: default_rating(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Builder: set description
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Builder: mark published
    pub fn published(mut self) -> Self {
        self.published = true;
        self
    }

    /// Category implied by the attribute variant
    pub fn category(&self) -> ProductCategory {
        self.attributes.category()
    }

    /// Set the rating, clamped to [1.0, 5.0] and rounded to one decimal
    pub fn set_rating(&mut self, rating: f64) {
        self.rating = (rating.clamp(1.0, 5.0) * 10.0).round() / 10.0;
    }

    /// Display snapshot (name, price, thumbnail, stock) for cart views
    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            product_id: self.id.clone(),
            name: self.name.clone(),
            price: self.price.clone(),
            thumbnail: self.thumbnail.clone(),
            stock: self.stock,
        }
    }
}

/// Frozen display view of a product at read time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub product_id: String,
    pub name: String,
    pub price: Price,
    pub thumbnail: String,
    pub stock: u32,
}

/// Derive a URL slug from a product name
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Partial update for a product; `None` fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub price: Option<Price>,
    #[serde(default)]
    pub stock: Option<u32>,
    #[serde(default)]
    pub attributes: Option<ProductAttributes>,
    #[serde(default)]
    pub published: Option<bool>,
    #[serde(default)]
    pub rating: Option<f64>,
}

impl ProductPatch {
    /// Apply the patch; renaming also re-derives the slug
    pub fn apply(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.slug = slugify(name);
            product.name = name.clone();
        }
        if let Some(description) = &self.description {
            product.description = description.clone();
        }
        if let Some(thumbnail) = &self.thumbnail {
            product.thumbnail = thumbnail.clone();
        }
        if let Some(price) = &self.price {
            product.price = price.clone();
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(attributes) = &self.attributes {
            product.attributes = attributes.clone();
        }
        if let Some(published) = self.published {
            product.published = published;
        }
        if let Some(rating) = self.rating {
            product.set_rating(rating);
        }
        product.updated_at = Utc::now();
    }
}

/// Price range buckets used by catalog filters (bounds in USD)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceRange {
    /// Under $200
    Below,
    /// $200 to $750 inclusive
    Between,
    /// Over $750
    Above,
}

impl PriceRange {
    /// Lower bucket bound in smallest currency units
    pub const LOW: i64 = 200_00;
    /// Upper bucket bound in smallest currency units
    pub const HIGH: i64 = 750_00;

    pub fn contains(&self, amount: i64) -> bool {
        match self {
            PriceRange::Below => amount < Self::LOW,
            PriceRange::Between => amount >= Self::LOW && amount <= Self::HIGH,
            PriceRange::Above => amount > Self::HIGH,
        }
    }
}

/// Catalog sort order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProductSort {
    /// Newest first
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    10
}

/// Catalog listing filters and pagination
#[derive(Debug, Clone, Deserialize)]
pub struct ProductQuery {
    #[serde(default)]
    pub category: Option<ProductCategory>,
    #[serde(default)]
    pub price_range: Option<PriceRange>,
    /// Case-insensitive match against name and description
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub sort: ProductSort,
    #[serde(default = "default_page")]
    pub page: u32,
    /// `None` lists published products (the shopper default)
    #[serde(default)]
    pub published: Option<bool>,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            category: None,
            price_range: None,
            search: None,
            sort: ProductSort::Newest,
            page: 1,
            published: None,
            limit: 10,
        }
    }
}

impl ProductQuery {
    /// Effective publication filter (shoppers only see published products)
    pub fn published_filter(&self) -> bool {
        self.published.unwrap_or(true)
    }

    /// Page/limit normalized to sane minimums
    pub fn pagination(&self) -> (u64, u64) {
        (self.page.max(1) as u64, self.limit.clamp(1, 100) as u64)
    }
}

/// One page of catalog results
#[derive(Debug, Clone, Serialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total_pages: u64,
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phone_attributes() -> ProductAttributes {
        ProductAttributes::Phone {
            brand: "Pixelon".into(),
            color: Some("black".into()),
            storage_capacity: Some("128GB".into()),
            screen_size: None,
            battery_capacity: None,
        }
    }

    #[test]
    fn test_currency_conversion() {
        let usd = Currency::USD;
        assert_eq!(usd.to_smallest_unit(10.99), 1099);
        assert_eq!(usd.from_smallest_unit(1099), 10.99);

        let jpy = Currency::JPY;
        assert_eq!(jpy.to_smallest_unit(1000.0), 1000);
        assert_eq!(jpy.from_smallest_unit(1000), 1000.0);
    }

    #[test]
    fn test_currency_from_code() {
        assert_eq!(Currency::from_code("USD"), Some(Currency::USD));
        assert_eq!(Currency::from_code("eur"), Some(Currency::EUR));
        assert_eq!(Currency::from_code("XXX"), None);
    }

    #[test]
    fn test_price_decimal_string() {
        assert_eq!(Price::new(45.0, Currency::USD).to_decimal_string(), "45.00");
        assert_eq!(Price::new(10.99, Currency::USD).to_decimal_string(), "10.99");
        assert_eq!(Price::new(1000.0, Currency::JPY).to_decimal_string(), "1000");

        let parsed = Price::from_decimal_str("45.00", Currency::USD).unwrap();
        assert_eq!(parsed.amount, 4500);
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Pixelon 9 Pro (128GB)"), "pixelon-9-pro-128gb");
        assert_eq!(slugify("  Wide   Band  "), "wide-band");
    }

    #[test]
    fn test_attributes_category_tag() {
        let attrs = phone_attributes();
        assert_eq!(attrs.category(), ProductCategory::Phone);

        let json = serde_json::to_value(&attrs).unwrap();
        assert_eq!(json["category"], "Phone");
        assert_eq!(json["brand"], "Pixelon");

        let back: ProductAttributes = serde_json::from_value(json).unwrap();
        assert_eq!(back, attrs);
    }

    #[test]
    fn test_watch_water_resistant_default() {
        let attrs: ProductAttributes = serde_json::from_str(
            r#"{"category":"Watch","brand":"Tici","watch_type":"Smartwatch"}"#,
        )
        .unwrap();
        match attrs {
            ProductAttributes::Watch {
                water_resistant, ..
            } => assert!(water_resistant),
            _ => panic!("expected a watch"),
        }
    }

    #[test]
    fn test_product_rating_clamped() {
        let mut product = Product::new(
            "Pixelon 9",
            "https://cdn.example.com/p9.png",
            Price::new(799.0, Currency::USD),
            10,
            phone_attributes(),
        );
        product.set_rating(5.67);
        assert_eq!(product.rating, 5.0);
        product.set_rating(3.456);
        assert_eq!(product.rating, 3.5);
    }

    #[test]
    fn test_patch_rename_reslugs() {
        let mut product = Product::new(
            "Pixelon 9",
            "https://cdn.example.com/p9.png",
            Price::new(799.0, Currency::USD),
            10,
            phone_attributes(),
        );
        let patch = ProductPatch {
            name: Some("Pixelon 9 Pro".into()),
            ..Default::default()
        };
        patch.apply(&mut product);
        assert_eq!(product.slug, "pixelon-9-pro");
    }

    #[test]
    fn test_price_range_buckets() {
        assert!(PriceRange::Below.contains(199_99));
        assert!(!PriceRange::Below.contains(200_00));
        assert!(PriceRange::Between.contains(200_00));
        assert!(PriceRange::Between.contains(750_00));
        assert!(PriceRange::Above.contains(750_01));
    }
}
