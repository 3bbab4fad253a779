//! Value objects shared by the cart and product domains.

use serde::{Deserialize, Serialize};

/// Product identifier (SKU).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Creates a new product ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the product ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ProductId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Money amount represented in cents to avoid floating point issues.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Money {
    /// Amount in cents (e.g., 1000 = $10.00)
    cents: i64,
}

impl Money {
    /// Creates a new Money amount from cents.
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        self.cents > 0
    }

    /// Multiplies the amount by a quantity.
    pub fn multiply(&self, quantity: u32) -> Self {
        Self {
            cents: self.cents * i64::from(quantity),
        }
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money {
            cents: self.cents + rhs.cents,
        }
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.cents / 100, (self.cents.abs() % 100))
    }
}

/// A line in a shopping cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// The product in the cart.
    pub product_id: ProductId,

    /// Product name at the time of adding.
    pub product_name: String,

    /// Quantity of the product.
    pub quantity: u32,

    /// Unit price at the time of adding.
    pub unit_price: Money,
}

impl CartItem {
    /// Creates a new cart item.
    pub fn new(
        product_id: impl Into<ProductId>,
        product_name: impl Into<String>,
        quantity: u32,
        unit_price: Money,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            product_name: product_name.into(),
            quantity,
            unit_price,
        }
    }

    /// Returns the line total (unit price times quantity).
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_id_roundtrip() {
        let id = ProductId::new("SKU-001");
        assert_eq!(id.as_str(), "SKU-001");
        assert_eq!(id, ProductId::from("SKU-001"));
    }

    #[test]
    fn money_arithmetic() {
        let price = Money::from_cents(1050);
        assert_eq!(price.multiply(3).cents(), 3150);
        assert_eq!((price + Money::from_cents(50)).cents(), 1100);
        assert!(price.is_positive());
        assert!(!Money::zero().is_positive());
    }

    #[test]
    fn money_display() {
        assert_eq!(Money::from_cents(1050).to_string(), "10.50");
        assert_eq!(Money::from_cents(7).to_string(), "0.07");
    }

    #[test]
    fn cart_item_line_total() {
        let item = CartItem::new("SKU-001", "Widget", 3, Money::from_cents(1000));
        assert_eq!(item.line_total().cents(), 3000);
    }
}
