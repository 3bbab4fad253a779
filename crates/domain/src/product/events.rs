//! Product domain events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;
use crate::value_objects::{Money, ProductId};

/// Events that can occur on a product aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ProductEvent {
    /// Product was added to the catalog.
    ProductCreated(ProductCreatedData),

    /// Product price changed.
    ProductPriceChanged(ProductPriceChangedData),

    /// Product stock level was adjusted.
    ProductStockAdjusted(ProductStockAdjustedData),
}

impl DomainEvent for ProductEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ProductEvent::ProductCreated(_) => "ProductCreated",
            ProductEvent::ProductPriceChanged(_) => "ProductPriceChanged",
            ProductEvent::ProductStockAdjusted(_) => "ProductStockAdjusted",
        }
    }
}

impl ProductEvent {
    /// Every product event type tag, for handler registration.
    pub const TYPES: &'static [&'static str] = &[
        "ProductCreated",
        "ProductPriceChanged",
        "ProductStockAdjusted",
    ];
}

/// Data for ProductCreated event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreatedData {
    /// The product's SKU.
    pub product_id: ProductId,

    /// Product name.
    pub name: String,

    /// Category the product is listed under.
    pub category: String,

    /// Initial unit price.
    pub price: Money,

    /// Initial stock level.
    pub stock: i64,

    /// When the product was created.
    pub created_at: DateTime<Utc>,
}

/// Data for ProductPriceChanged event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductPriceChangedData {
    /// Previous price.
    pub old_price: Money,

    /// New price.
    pub new_price: Money,
}

/// Data for ProductStockAdjusted event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductStockAdjustedData {
    /// Previous stock level.
    pub old_stock: i64,

    /// New stock level.
    pub new_stock: i64,
}

// Convenience constructors for events
impl ProductEvent {
    /// Creates a ProductCreated event.
    pub fn product_created(
        product_id: ProductId,
        name: impl Into<String>,
        category: impl Into<String>,
        price: Money,
        stock: i64,
    ) -> Self {
        ProductEvent::ProductCreated(ProductCreatedData {
            product_id,
            name: name.into(),
            category: category.into(),
            price,
            stock,
            created_at: Utc::now(),
        })
    }

    /// Creates a ProductPriceChanged event.
    pub fn price_changed(old_price: Money, new_price: Money) -> Self {
        ProductEvent::ProductPriceChanged(ProductPriceChangedData {
            old_price,
            new_price,
        })
    }

    /// Creates a ProductStockAdjusted event.
    pub fn stock_adjusted(old_stock: i64, new_stock: i64) -> Self {
        ProductEvent::ProductStockAdjusted(ProductStockAdjustedData {
            old_stock,
            new_stock,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_tags() {
        let event = ProductEvent::product_created(
            ProductId::new("SKU-001"),
            "Widget",
            "tools",
            Money::from_cents(1000),
            10,
        );
        assert_eq!(event.event_type(), "ProductCreated");
        assert_eq!(
            ProductEvent::price_changed(Money::from_cents(1000), Money::from_cents(1200))
                .event_type(),
            "ProductPriceChanged"
        );
        assert_eq!(
            ProductEvent::stock_adjusted(10, 8).event_type(),
            "ProductStockAdjusted"
        );
    }

    #[test]
    fn event_serialization_roundtrip() {
        let event = ProductEvent::price_changed(Money::from_cents(1000), Money::from_cents(1200));
        let json = serde_json::to_string(&event).unwrap();
        let deserialized: ProductEvent = serde_json::from_str(&json).unwrap();

        if let ProductEvent::ProductPriceChanged(data) = deserialized {
            assert_eq!(data.old_price.cents(), 1000);
            assert_eq!(data.new_price.cents(), 1200);
        } else {
            panic!("Expected ProductPriceChanged event");
        }
    }
}
