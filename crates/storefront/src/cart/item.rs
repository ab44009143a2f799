//! Cart line items and the snapshots derived from them.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use pocket_mall_core::{Price, ProductId};

use crate::catalog::Product;

/// One product's entry in the cart.
///
/// Serialized field names match the persisted layout:
/// `{productId, title, image, brand, price, quantity, selected}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub price: Price,
    pub quantity: u32,
    #[serde(default = "selected_by_default")]
    pub selected: bool,
}

const fn selected_by_default() -> bool {
    true
}

impl CartItem {
    /// New selected line for `product`.
    #[must_use]
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.product_id.clone(),
            title: product.title.clone(),
            image: product.image.clone(),
            brand: product.brand.clone(),
            price: product.price,
            quantity: quantity.max(1),
            selected: true,
        }
    }

    #[must_use]
    pub const fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// Decode persisted cart JSON.
///
/// Quantities below 1 are raised to 1 and repeated product IDs keep only
/// their first record.
///
/// # Errors
///
/// Returns an error when the document is not a JSON array of cart records.
pub fn decode_items(raw: &str) -> Result<Vec<CartItem>, serde_json::Error> {
    let items: Vec<CartItem> = serde_json::from_str(raw)?;
    let mut seen = HashSet::new();
    Ok(items
        .into_iter()
        .filter(|item| seen.insert(item.product_id.clone()))
        .map(|mut item| {
            item.quantity = item.quantity.max(1);
            item
        })
        .collect())
}

/// Cart line with display values computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub item: CartItem,
    pub line_total: Price,
    pub price_label: String,
    pub total_label: String,
}

/// Cart totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CartSummary {
    /// Number of line items.
    pub total_count: usize,
    pub total_price: Price,
    /// Number of selected line items.
    pub selected_count: usize,
    pub selected_price: Price,
}

/// Immutable read view of the cart at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSnapshot {
    pub items: Vec<CartLine>,
    pub summary: CartSummary,
    pub is_empty: bool,
    pub all_selected: bool,
}

impl CartSnapshot {
    #[must_use]
    pub fn from_items(items: &[CartItem]) -> Self {
        let lines: Vec<CartLine> = items
            .iter()
            .map(|item| {
                let line_total = item.line_total();
                CartLine {
                    item: item.clone(),
                    line_total,
                    price_label: item.price.label(),
                    total_label: line_total.label(),
                }
            })
            .collect();

        let selected = || lines.iter().filter(|line| line.item.selected);
        let summary = CartSummary {
            total_count: lines.len(),
            total_price: lines.iter().map(|line| line.line_total).sum(),
            selected_count: selected().count(),
            selected_price: selected().map(|line| line.line_total).sum(),
        };

        Self {
            is_empty: lines.is_empty(),
            all_selected: !lines.is_empty() && summary.selected_count == lines.len(),
            items: lines,
            summary,
        }
    }

    /// Find a line by product.
    #[must_use]
    pub fn line(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.items
            .iter()
            .find(|line| &line.item.product_id == product_id)
    }
}

impl Default for CartSnapshot {
    fn default() -> Self {
        Self::from_items(&[])
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: &str, price: u64, quantity: u32, selected: bool) -> CartItem {
        CartItem {
            product_id: ProductId::from(id),
            title: format!("Product {id}"),
            image: String::new(),
            brand: String::new(),
            price: Price::new(price),
            quantity,
            selected,
        }
    }

    #[test]
    fn test_summary_totals() {
        let snapshot = CartSnapshot::from_items(&[
            item("A", 1000, 2, true),
            item("B", 500, 3, false),
        ]);

        assert_eq!(snapshot.summary.total_count, 2);
        assert_eq!(snapshot.summary.total_price, Price::new(3500));
        assert_eq!(snapshot.summary.selected_count, 1);
        assert_eq!(snapshot.summary.selected_price, Price::new(2000));
        assert!(!snapshot.all_selected);
        assert!(!snapshot.is_empty);
        assert_eq!(snapshot.items[0].total_label, "2,000원");
        assert_eq!(snapshot.items[1].price_label, "500원");
    }

    #[test]
    fn test_empty_cart_is_never_all_selected() {
        let snapshot = CartSnapshot::from_items(&[]);
        assert!(snapshot.is_empty);
        assert!(!snapshot.all_selected);
        assert_eq!(snapshot.summary, CartSummary::default());
    }

    #[test]
    fn test_default_snapshot_is_empty() {
        let snapshot = CartSnapshot::default();
        assert!(snapshot.is_empty);
        assert!(!snapshot.all_selected);
        assert_eq!(snapshot, CartSnapshot::from_items(&[]));
    }

    #[test]
    fn test_decode_sanitizes_records() {
        let raw = r#"[
            {"productId": "A", "title": "a", "image": "", "brand": "", "price": 100, "quantity": 0, "selected": false},
            {"productId": "A", "title": "dup", "price": 1, "quantity": 5},
            {"productId": "B", "title": "b", "price": "250", "quantity": 2}
        ]"#;

        let items = decode_items(raw).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "a");
        assert_eq!(items[0].quantity, 1);
        assert!(!items[0].selected);
        assert_eq!(items[1].price, Price::new(250));
        assert!(items[1].selected);
    }

    #[test]
    fn test_decode_rejects_non_array() {
        assert!(decode_items(r#"{"items": []}"#).is_err());
        assert!(decode_items("not json").is_err());
    }
}
