//! Cart domain events.

use chrono::{DateTime, Utc};
use common::AggregateId;
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;
use crate::value_objects::{CartItem, Money, ProductId};

/// Events that can occur on a cart aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum CartEvent {
    /// Cart was created for a user.
    CartCreated(CartCreatedData),

    /// Item was added to the cart.
    ItemAdded(ItemAddedData),

    /// Quantity of an existing item changed.
    ItemQuantityChanged(ItemQuantityChangedData),

    /// Item was removed from the cart.
    ItemRemoved(ItemRemovedData),

    /// All items were removed at once.
    CartCleared(CartClearedData),

    /// Cart was checked out.
    CartCheckedOut(CartCheckedOutData),
}

impl DomainEvent for CartEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CartEvent::CartCreated(_) => "CartCreated",
            CartEvent::ItemAdded(_) => "ItemAdded",
            CartEvent::ItemQuantityChanged(_) => "ItemQuantityChanged",
            CartEvent::ItemRemoved(_) => "ItemRemoved",
            CartEvent::CartCleared(_) => "CartCleared",
            CartEvent::CartCheckedOut(_) => "CartCheckedOut",
        }
    }
}

impl CartEvent {
    /// Every cart event type tag, for handler registration.
    pub const TYPES: &'static [&'static str] = &[
        "CartCreated",
        "ItemAdded",
        "ItemQuantityChanged",
        "ItemRemoved",
        "CartCleared",
        "CartCheckedOut",
    ];
}

/// Data for CartCreated event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartCreatedData {
    /// The cart's stream identity.
    pub cart_id: AggregateId,

    /// The user the cart belongs to.
    pub user_id: String,

    /// When the cart was created.
    pub created_at: DateTime<Utc>,
}

/// Data for ItemAdded event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemAddedData {
    /// The product that was added.
    pub product_id: ProductId,

    /// Product name at the time of adding.
    pub product_name: String,

    /// Quantity added.
    pub quantity: u32,

    /// Unit price at the time of adding.
    pub unit_price: Money,
}

/// Data for ItemQuantityChanged event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemQuantityChangedData {
    /// The product whose quantity changed.
    pub product_id: ProductId,

    /// Previous quantity.
    pub old_quantity: u32,

    /// New quantity.
    pub new_quantity: u32,
}

/// Data for ItemRemoved event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRemovedData {
    /// The product that was removed.
    pub product_id: ProductId,
}

/// Data for CartCleared event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartClearedData {
    /// Number of items removed by the clear.
    pub item_count: usize,
}

/// Data for CartCheckedOut event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartCheckedOutData {
    /// Total amount at checkout.
    pub total_amount: Money,

    /// Number of items checked out.
    pub item_count: usize,

    /// When the checkout happened.
    pub checked_out_at: DateTime<Utc>,
}

// Convenience constructors for events
impl CartEvent {
    /// Creates a CartCreated event.
    pub fn cart_created(cart_id: AggregateId, user_id: impl Into<String>) -> Self {
        CartEvent::CartCreated(CartCreatedData {
            cart_id,
            user_id: user_id.into(),
            created_at: Utc::now(),
        })
    }

    /// Creates an ItemAdded event.
    pub fn item_added(item: &CartItem) -> Self {
        CartEvent::ItemAdded(ItemAddedData {
            product_id: item.product_id.clone(),
            product_name: item.product_name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
        })
    }

    /// Creates an ItemQuantityChanged event.
    pub fn item_quantity_changed(
        product_id: ProductId,
        old_quantity: u32,
        new_quantity: u32,
    ) -> Self {
        CartEvent::ItemQuantityChanged(ItemQuantityChangedData {
            product_id,
            old_quantity,
            new_quantity,
        })
    }

    /// Creates an ItemRemoved event.
    pub fn item_removed(product_id: ProductId) -> Self {
        CartEvent::ItemRemoved(ItemRemovedData { product_id })
    }

    /// Creates a CartCleared event.
    pub fn cart_cleared(item_count: usize) -> Self {
        CartEvent::CartCleared(CartClearedData { item_count })
    }

    /// Creates a CartCheckedOut event.
    pub fn cart_checked_out(total_amount: Money, item_count: usize) -> Self {
        CartEvent::CartCheckedOut(CartCheckedOutData {
            total_amount,
            item_count,
            checked_out_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_tags() {
        let event = CartEvent::cart_created(AggregateId::new("cart-1"), "u-1");
        assert_eq!(event.event_type(), "CartCreated");

        let item = CartItem::new("SKU-001", "Widget", 2, Money::from_cents(1000));
        assert_eq!(CartEvent::item_added(&item).event_type(), "ItemAdded");
        assert_eq!(
            CartEvent::item_quantity_changed(ProductId::new("SKU-001"), 1, 3).event_type(),
            "ItemQuantityChanged"
        );
        assert_eq!(
            CartEvent::item_removed(ProductId::new("SKU-001")).event_type(),
            "ItemRemoved"
        );
        assert_eq!(CartEvent::cart_cleared(2).event_type(), "CartCleared");
        assert_eq!(
            CartEvent::cart_checked_out(Money::from_cents(2000), 2).event_type(),
            "CartCheckedOut"
        );
    }

    #[test]
    fn types_list_covers_every_variant() {
        let item = CartItem::new("SKU-001", "Widget", 2, Money::from_cents(1000));
        let events = vec![
            CartEvent::cart_created(AggregateId::new("cart-1"), "u-1"),
            CartEvent::item_added(&item),
            CartEvent::item_quantity_changed(ProductId::new("SKU-001"), 1, 3),
            CartEvent::item_removed(ProductId::new("SKU-001")),
            CartEvent::cart_cleared(1),
            CartEvent::cart_checked_out(Money::from_cents(2000), 2),
        ];
        for event in events {
            assert!(CartEvent::TYPES.contains(&event.event_type()));
        }
    }

    #[test]
    fn event_serialization_roundtrip() {
        let item = CartItem::new("SKU-001", "Widget", 3, Money::from_cents(1500));
        let event = CartEvent::item_added(&item);

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("ItemAdded"));

        let deserialized: CartEvent = serde_json::from_str(&json).unwrap();
        if let CartEvent::ItemAdded(data) = deserialized {
            assert_eq!(data.product_id.as_str(), "SKU-001");
            assert_eq!(data.quantity, 3);
            assert_eq!(data.unit_price.cents(), 1500);
        } else {
            panic!("Expected ItemAdded event");
        }
    }
}
