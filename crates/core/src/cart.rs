//! Cart line items and the rules for changing them.
//!
//! A cart is an ordered list of lines. A line is identified by the
//! `(product_id, size, size_type)` tuple, and the list never holds two lines
//! with the same tuple: adding an existing tuple merges quantities into the
//! line that is already there.
//!
//! These rules are pure so that the storefront can apply them to a cart it
//! has loaded (and locked) from the database, then write the result back.

use serde::{Deserialize, Serialize};

use crate::{ProductId, SizeType};

/// Errors raised by cart mutations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// Quantity outside the accepted range for the operation.
    #[error("quantity must be at least {min} (got {got})")]
    InvalidQuantity {
        /// Smallest accepted value.
        min: u32,
        /// Value that was supplied.
        got: i64,
    },

    /// Merging would overflow the line quantity.
    #[error("quantity for {0} is too large")]
    QuantityOverflow(ProductId),

    /// Size label was blank.
    #[error("size is required")]
    MissingSize,

    /// No line matches the requested tuple.
    #[error("item {product_id} (size {size}, {size_type}) is not in the cart")]
    LineNotFound {
        /// Product of the missing line.
        product_id: ProductId,
        /// Size of the missing line.
        size: String,
        /// Size type of the missing line.
        size_type: SizeType,
    },
}

/// Identity of a cart or order line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineKey {
    pub product_id: ProductId,
    pub size: String,
    pub size_type: SizeType,
}

impl LineKey {
    /// Build a key, trimming the size label.
    ///
    /// # Errors
    ///
    /// Returns `CartError::MissingSize` if the size is blank.
    pub fn new(
        product_id: ProductId,
        size: &str,
        size_type: SizeType,
    ) -> Result<Self, CartError> {
        let size = size.trim();
        if size.is_empty() {
            return Err(CartError::MissingSize);
        }
        Ok(Self {
            product_id,
            size: size.to_owned(),
            size_type,
        })
    }

    fn not_found(&self) -> CartError {
        CartError::LineNotFound {
            product_id: self.product_id.clone(),
            size: self.size.clone(),
            size_type: self.size_type,
        }
    }
}

/// One line of a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub size: String,
    pub size_type: SizeType,
    pub quantity: u32,
}

impl CartLine {
    /// Whether this line has the given identity.
    #[must_use]
    pub fn matches(&self, key: &LineKey) -> bool {
        self.product_id == key.product_id && self.size == key.size && self.size_type == key.size_type
    }
}

/// Outcome of [`CartLines::set_quantity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityUpdate {
    /// The line now has this quantity.
    Updated(u32),
    /// Quantity was zero, so the line was dropped.
    Removed,
}

/// Validate a quantity coming from a request body.
///
/// `min` is 1 for adds and 0 for updates (where 0 means "remove").
///
/// # Errors
///
/// Returns `CartError::InvalidQuantity` if `raw` is below `min` or does not
/// fit in a `u32`.
pub fn parse_quantity(raw: i64, min: u32) -> Result<u32, CartError> {
    u32::try_from(raw)
        .ok()
        .filter(|q| *q >= min)
        .ok_or(CartError::InvalidQuantity { min, got: raw })
}

/// Ordered list of cart lines with unique `(product, size, size type)` keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartLines(Vec<CartLine>);

impl CartLines {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Rebuild from stored lines, merging any duplicate keys.
    ///
    /// Stored data should never contain duplicates, but if it does the
    /// quantities are combined into the first occurrence.
    #[must_use]
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let mut cart = Self::new();
        for line in lines {
            match cart.0.iter_mut().find(|l| {
                l.product_id == line.product_id && l.size == line.size && l.size_type == line.size_type
            }) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(line.quantity);
                }
                None if line.quantity > 0 => cart.0.push(line),
                None => {}
            }
        }
        cart
    }

    /// Add `quantity` units of the keyed item.
    ///
    /// Merges into the existing line for the key or appends a new one.
    /// Returns the resulting quantity of that line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` for a zero quantity and
    /// `CartError::QuantityOverflow` if the merged quantity overflows.
    pub fn add(&mut self, key: LineKey, quantity: u32) -> Result<u32, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity { min: 1, got: 0 });
        }

        if let Some(line) = self.0.iter_mut().find(|l| l.matches(&key)) {
            line.quantity = line
                .quantity
                .checked_add(quantity)
                .ok_or_else(|| CartError::QuantityOverflow(key.product_id.clone()))?;
            return Ok(line.quantity);
        }

        self.0.push(CartLine {
            product_id: key.product_id,
            size: key.size,
            size_type: key.size_type,
            quantity,
        });
        Ok(quantity)
    }

    /// Overwrite the quantity of an existing line. Zero removes it.
    ///
    /// # Errors
    ///
    /// Returns `CartError::LineNotFound` if no line has this key.
    pub fn set_quantity(
        &mut self,
        key: &LineKey,
        quantity: u32,
    ) -> Result<QuantityUpdate, CartError> {
        let index = self.position(key).ok_or_else(|| key.not_found())?;

        if quantity == 0 {
            self.0.remove(index);
            return Ok(QuantityUpdate::Removed);
        }

        if let Some(line) = self.0.get_mut(index) {
            line.quantity = quantity;
        }
        Ok(QuantityUpdate::Updated(quantity))
    }

    /// Remove the line with this key, returning it.
    ///
    /// # Errors
    ///
    /// Returns `CartError::LineNotFound` if no line has this key.
    pub fn remove(&mut self, key: &LineKey) -> Result<CartLine, CartError> {
        let index = self.position(key).ok_or_else(|| key.not_found())?;
        Ok(self.0.remove(index))
    }

    /// Drop every line.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Look up a line by key.
    #[must_use]
    pub fn get(&self, key: &LineKey) -> Option<&CartLine> {
        self.0.iter().find(|l| l.matches(key))
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.0.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn as_slice(&self) -> &[CartLine] {
        &self.0
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume into the underlying lines.
    #[must_use]
    pub fn into_inner(self) -> Vec<CartLine> {
        self.0
    }

    fn position(&self, key: &LineKey) -> Option<usize> {
        self.0.iter().position(|l| l.matches(key))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn key(product: i64, size: &str, size_type: SizeType) -> LineKey {
        LineKey::new(ProductId::from_sequence(product).unwrap(), size, size_type).unwrap()
    }

    #[test]
    fn test_repeat_add_merges_quantities() {
        let mut cart = CartLines::new();
        cart.add(key(1, "M", SizeType::Standard), 1).unwrap();
        let quantity = cart.add(key(1, "M", SizeType::Standard), 2).unwrap();

        assert_eq!(quantity, 3);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.as_slice()[0].quantity, 3);
    }

    #[test]
    fn test_different_size_or_size_type_is_a_new_line() {
        let mut cart = CartLines::new();
        cart.add(key(1, "32", SizeType::Waist), 1).unwrap();
        cart.add(key(1, "34", SizeType::Waist), 1).unwrap();
        cart.add(key(1, "32", SizeType::Standard), 1).unwrap();
        cart.add(key(2, "32", SizeType::Waist), 1).unwrap();

        assert_eq!(cart.len(), 4);
        assert_eq!(cart.total_quantity(), 4);
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let mut cart = CartLines::new();
        cart.add(key(3, "S", SizeType::Standard), 1).unwrap();
        cart.add(key(1, "S", SizeType::Standard), 1).unwrap();
        cart.add(key(3, "S", SizeType::Standard), 1).unwrap();

        let ids: Vec<i64> = cart.as_slice().iter().map(|l| l.product_id.sequence()).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_add_zero_rejected() {
        let mut cart = CartLines::new();
        let err = cart.add(key(1, "M", SizeType::Standard), 0).unwrap_err();
        assert!(matches!(err, CartError::InvalidQuantity { min: 1, got: 0 }));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_overflow_rejected() {
        let mut cart = CartLines::new();
        cart.add(key(1, "M", SizeType::Standard), u32::MAX).unwrap();
        let err = cart.add(key(1, "M", SizeType::Standard), 1).unwrap_err();
        assert!(matches!(err, CartError::QuantityOverflow(_)));
        assert_eq!(cart.as_slice()[0].quantity, u32::MAX);
    }

    #[test]
    fn test_set_quantity_zero_removes_then_not_found() {
        let mut cart = CartLines::new();
        let k = key(1, "L", SizeType::Standard);
        cart.add(k.clone(), 2).unwrap();

        assert_eq!(cart.set_quantity(&k, 0).unwrap(), QuantityUpdate::Removed);
        assert!(cart.is_empty());

        let err = cart.set_quantity(&k, 4).unwrap_err();
        assert!(matches!(err, CartError::LineNotFound { .. }));

        // Re-adding makes it updatable again
        cart.add(k.clone(), 1).unwrap();
        assert_eq!(cart.set_quantity(&k, 4).unwrap(), QuantityUpdate::Updated(4));
    }

    #[test]
    fn test_set_quantity_overwrites() {
        let mut cart = CartLines::new();
        let k = key(5, "30", SizeType::Waist);
        cart.add(k.clone(), 3).unwrap();
        cart.set_quantity(&k, 1).unwrap();
        assert_eq!(cart.get(&k).unwrap().quantity, 1);
    }

    #[test]
    fn test_remove() {
        let mut cart = CartLines::new();
        let keep = key(1, "M", SizeType::Standard);
        let drop = key(2, "M", SizeType::Standard);
        cart.add(keep.clone(), 1).unwrap();
        cart.add(drop.clone(), 1).unwrap();

        let removed = cart.remove(&drop).unwrap();
        assert_eq!(removed.product_id.sequence(), 2);
        assert!(cart.get(&keep).is_some());
        assert!(matches!(
            cart.remove(&drop),
            Err(CartError::LineNotFound { .. })
        ));
    }

    #[test]
    fn test_clear_keeps_nothing() {
        let mut cart = CartLines::new();
        cart.add(key(1, "M", SizeType::Standard), 1).unwrap();
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total_quantity(), 0);
    }

    #[test]
    fn test_line_key_trims_and_requires_size() {
        let id = ProductId::from_sequence(1).unwrap();
        assert_eq!(
            LineKey::new(id.clone(), " M ", SizeType::Standard).unwrap().size,
            "M"
        );
        assert_eq!(
            LineKey::new(id, "  ", SizeType::Standard),
            Err(CartError::MissingSize)
        );
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity(3, 1), Ok(3));
        assert_eq!(parse_quantity(0, 0), Ok(0));
        assert!(parse_quantity(0, 1).is_err());
        assert!(parse_quantity(-2, 0).is_err());
        assert!(parse_quantity(i64::from(u32::MAX) + 1, 0).is_err());
    }

    #[test]
    fn test_from_lines_merges_duplicates() {
        let id = ProductId::from_sequence(1).unwrap();
        let line = CartLine {
            product_id: id,
            size: "M".to_owned(),
            size_type: SizeType::Standard,
            quantity: 2,
        };
        let cart = CartLines::from_lines(vec![line.clone(), line]);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total_quantity(), 4);
    }

    #[test]
    fn test_serializes_as_camel_case_array() {
        let mut cart = CartLines::new();
        cart.add(key(1, "32", SizeType::Waist), 2).unwrap();
        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"productId": "PROD-0001", "size": "32", "sizeType": "waist", "quantity": 2}
            ])
        );
    }
}
