//! Product aggregate implementation.

use common::AggregateId;

use crate::aggregate::Aggregate;
use crate::value_objects::{Money, ProductId};

use super::{ProductError, ProductEvent, events::ProductCreatedData};

/// Catalog product aggregate root.
///
/// Carries only what the audit pipeline needs; catalog business rules
/// (pricing policy, availability) live elsewhere.
#[derive(Debug, Clone, Default)]
pub struct Product {
    /// Stream identity, set by the creation event.
    id: Option<AggregateId>,

    /// The product's SKU.
    product_id: Option<ProductId>,

    /// Product name.
    name: String,

    /// Category the product is listed under.
    category: String,

    /// Current unit price.
    price: Money,

    /// Current stock level.
    stock: i64,
}

impl Aggregate for Product {
    type Event = ProductEvent;
    type Error = ProductError;

    fn aggregate_type() -> &'static str {
        "Product"
    }

    fn id(&self) -> Option<&AggregateId> {
        self.id.as_ref()
    }

    fn apply(&mut self, event: Self::Event) {
        match event {
            ProductEvent::ProductCreated(data) => self.apply_created(data),
            ProductEvent::ProductPriceChanged(data) => {
                self.price = data.new_price;
            }
            ProductEvent::ProductStockAdjusted(data) => {
                self.stock = data.new_stock;
            }
        }
    }
}

// Query methods
impl Product {
    /// Derives the stream key for a product SKU.
    pub fn stream_id(product_id: &ProductId) -> AggregateId {
        AggregateId::new(format!("product-{product_id}"))
    }

    /// Returns the product's SKU.
    pub fn product_id(&self) -> Option<&ProductId> {
        self.product_id.as_ref()
    }

    /// Returns the product name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the category.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Returns the current price.
    pub fn price(&self) -> Money {
        self.price
    }

    /// Returns the current stock level.
    pub fn stock(&self) -> i64 {
        self.stock
    }
}

// Command methods (return events)
impl Product {
    /// Adds the product to the catalog.
    pub fn create(
        &self,
        product_id: ProductId,
        name: impl Into<String>,
        category: impl Into<String>,
        price: Money,
        stock: i64,
    ) -> Result<Vec<ProductEvent>, ProductError> {
        if self.id.is_some() {
            return Err(ProductError::AlreadyCreated);
        }
        if !price.is_positive() {
            return Err(ProductError::InvalidPrice {
                price: price.cents(),
            });
        }
        if stock < 0 {
            return Err(ProductError::InvalidStock { stock });
        }

        Ok(vec![ProductEvent::product_created(
            product_id, name, category, price, stock,
        )])
    }

    /// Changes the product's price.
    pub fn change_price(&self, new_price: Money) -> Result<Vec<ProductEvent>, ProductError> {
        if self.id.is_none() {
            return Err(ProductError::NotCreated);
        }
        if !new_price.is_positive() {
            return Err(ProductError::InvalidPrice {
                price: new_price.cents(),
            });
        }
        if new_price == self.price {
            return Ok(vec![]);
        }

        Ok(vec![ProductEvent::price_changed(self.price, new_price)])
    }

    /// Adjusts the stock level by a delta.
    pub fn adjust_stock(&self, delta: i64) -> Result<Vec<ProductEvent>, ProductError> {
        if self.id.is_none() {
            return Err(ProductError::NotCreated);
        }
        let new_stock = self.stock + delta;
        if new_stock < 0 {
            return Err(ProductError::InvalidStock { stock: new_stock });
        }
        if delta == 0 {
            return Ok(vec![]);
        }

        Ok(vec![ProductEvent::stock_adjusted(self.stock, new_stock)])
    }

    fn apply_created(&mut self, data: ProductCreatedData) {
        self.id = Some(Self::stream_id(&data.product_id));
        self.product_id = Some(data.product_id);
        self.name = data.name;
        self.category = data.category;
        self.price = data.price;
        self.stock = data.stock;
    }
}
