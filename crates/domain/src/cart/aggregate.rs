//! Cart aggregate implementation.

use std::collections::HashMap;

use common::AggregateId;

use crate::aggregate::Aggregate;
use crate::value_objects::{CartItem, Money, ProductId};

use super::{
    CartError, CartEvent,
    events::{CartCreatedData, ItemAddedData, ItemQuantityChangedData},
};

/// Shopping cart aggregate root.
///
/// One cart per user; the stream key is derived from the user id. Carts can
/// be modified until checked out.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    /// Stream identity, set by the creation event.
    id: Option<AggregateId>,

    /// User the cart belongs to.
    user_id: Option<String>,

    /// Items in the cart, keyed by product ID.
    items: HashMap<ProductId, CartItem>,

    /// True once the cart has been checked out.
    checked_out: bool,
}

impl Aggregate for Cart {
    type Event = CartEvent;
    type Error = CartError;

    fn aggregate_type() -> &'static str {
        "Cart"
    }

    fn id(&self) -> Option<&AggregateId> {
        self.id.as_ref()
    }

    fn apply(&mut self, event: Self::Event) {
        match event {
            CartEvent::CartCreated(data) => self.apply_created(data),
            CartEvent::ItemAdded(data) => self.apply_item_added(data),
            CartEvent::ItemQuantityChanged(data) => self.apply_quantity_changed(data),
            CartEvent::ItemRemoved(data) => {
                self.items.remove(&data.product_id);
            }
            CartEvent::CartCleared(_) => {
                self.items.clear();
            }
            CartEvent::CartCheckedOut(_) => {
                self.checked_out = true;
            }
        }
    }
}

// Query methods
impl Cart {
    /// Returns the owning user's id.
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Returns all items in the cart.
    pub fn items(&self) -> impl Iterator<Item = &CartItem> {
        self.items.values()
    }

    /// Returns an item by product ID.
    pub fn get_item(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.items.get(product_id)
    }

    /// Returns the number of distinct items.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the cart total.
    pub fn total_amount(&self) -> Money {
        self.items
            .values()
            .fold(Money::zero(), |acc, item| acc + item.line_total())
    }

    /// Returns true once the cart has been checked out.
    pub fn is_checked_out(&self) -> bool {
        self.checked_out
    }
}

// Command methods (return events)
impl Cart {
    /// Creates the cart for a user.
    pub fn create(
        &self,
        cart_id: AggregateId,
        user_id: impl Into<String>,
    ) -> Result<Vec<CartEvent>, CartError> {
        if self.id.is_some() {
            return Err(CartError::AlreadyCreated);
        }

        Ok(vec![CartEvent::cart_created(cart_id, user_id)])
    }

    /// Adds an item to the cart.
    ///
    /// If the product is already in the cart, the quantities are merged into
    /// a quantity-change event instead.
    pub fn add_item(&self, item: CartItem) -> Result<Vec<CartEvent>, CartError> {
        self.ensure_open("add item")?;

        if item.quantity == 0 {
            return Err(CartError::InvalidQuantity {
                quantity: item.quantity,
            });
        }

        if let Some(existing) = self.items.get(&item.product_id) {
            let new_quantity = existing.quantity + item.quantity;
            Ok(vec![CartEvent::item_quantity_changed(
                item.product_id,
                existing.quantity,
                new_quantity,
            )])
        } else {
            Ok(vec![CartEvent::item_added(&item)])
        }
    }

    /// Removes an item from the cart.
    pub fn remove_item(&self, product_id: ProductId) -> Result<Vec<CartEvent>, CartError> {
        self.ensure_open("remove item")?;

        if !self.items.contains_key(&product_id) {
            return Err(CartError::ItemNotFound {
                product_id: product_id.to_string(),
            });
        }

        Ok(vec![CartEvent::item_removed(product_id)])
    }

    /// Removes every item from the cart.
    pub fn clear(&self) -> Result<Vec<CartEvent>, CartError> {
        self.ensure_open("clear")?;

        if self.items.is_empty() {
            return Ok(vec![]);
        }

        Ok(vec![CartEvent::cart_cleared(self.items.len())])
    }

    /// Checks the cart out.
    pub fn checkout(&self) -> Result<Vec<CartEvent>, CartError> {
        self.ensure_open("checkout")?;

        if self.items.is_empty() {
            return Err(CartError::Empty);
        }

        Ok(vec![CartEvent::cart_checked_out(
            self.total_amount(),
            self.items.len(),
        )])
    }

    fn ensure_open(&self, action: &'static str) -> Result<(), CartError> {
        if self.id.is_none() {
            return Err(CartError::NotCreated);
        }
        if self.checked_out {
            return Err(CartError::CheckedOut { action });
        }
        Ok(())
    }

    fn apply_created(&mut self, data: CartCreatedData) {
        self.id = Some(data.cart_id);
        self.user_id = Some(data.user_id);
    }

    fn apply_item_added(&mut self, data: ItemAddedData) {
        self.items.insert(
            data.product_id.clone(),
            CartItem {
                product_id: data.product_id,
                product_name: data.product_name,
                quantity: data.quantity,
                unit_price: data.unit_price,
            },
        );
    }

    fn apply_quantity_changed(&mut self, data: ItemQuantityChangedData) {
        if let Some(item) = self.items.get_mut(&data.product_id) {
            item.quantity = data.new_quantity;
        }
    }
}
