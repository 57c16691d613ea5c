//! # Stock Deltas
//!
//! Computes how much stock an order update must reserve or release.
//!
//! ## Diffing Line Items
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  current order:  [Widget × 3, Gadget × 2]                               │
//! │  update:         [Widget × 5, Bolt × 1]                                 │
//! │                                                                         │
//! │  per product:    Widget  3 → 5   reserve 2                              │
//! │                  Bolt    0 → 1   reserve 1                              │
//! │                  Gadget  2 → 0   release 2                              │
//! │                                                                         │
//! │  Only the difference touches the catalog; an unchanged line item        │
//! │  reserves nothing.                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use crate::error::ValidationError;
use crate::types::LineItem;
use crate::validation::ValidationResult;
use crate::MAX_QUANTITY;

/// Net stock change for one product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockDelta {
    pub product_id: String,
    /// Positive: reserve this much more. Negative: release.
    pub delta: i64,
}

impl StockDelta {
    pub fn is_reservation(&self) -> bool {
        self.delta > 0
    }
}

fn quantity_out_of_range() -> ValidationError {
    ValidationError::OutOfRange {
        field: "quantity".to_string(),
        min: 1,
        max: MAX_QUANTITY,
    }
}

/// Sums quantities per product, keeping first-appearance order.
///
/// A product whose summed quantity passes `MAX_QUANTITY` is rejected.
fn totals(items: &[LineItem]) -> ValidationResult<Vec<(String, i64)>> {
    let mut order: Vec<(String, i64)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for item in items {
        let total = match index.get(item.product_id.as_str()) {
            Some(&i) => {
                let sum = order[i]
                    .1
                    .checked_add(item.quantity)
                    .ok_or_else(quantity_out_of_range)?;
                order[i].1 = sum;
                sum
            }
            None => {
                index.insert(&item.product_id, order.len());
                order.push((item.product_id.clone(), item.quantity));
                item.quantity
            }
        };

        if total > MAX_QUANTITY {
            return Err(quantity_out_of_range());
        }
    }

    Ok(order)
}

/// Returns the non-zero per-product deltas between two sets of line items.
///
/// Products of `new` come first, in submission order, so insufficient-stock
/// failures name the same product on every run. Products dropped from the
/// order follow, in their original order.
///
/// Fails with `OutOfRange` when a product's summed quantity on either side
/// is above `MAX_QUANTITY`.
pub fn stock_deltas(old: &[LineItem], new: &[LineItem]) -> ValidationResult<Vec<StockDelta>> {
    let old_totals = totals(old)?;
    let new_totals = totals(new)?;

    let old_map: HashMap<&str, i64> = old_totals
        .iter()
        .map(|(id, qty)| (id.as_str(), *qty))
        .collect();
    let new_map: HashMap<&str, i64> = new_totals
        .iter()
        .map(|(id, qty)| (id.as_str(), *qty))
        .collect();

    let mut deltas = Vec::new();

    for (product_id, qty) in &new_totals {
        let before = old_map.get(product_id.as_str()).copied().unwrap_or(0);
        if *qty != before {
            deltas.push(StockDelta {
                product_id: product_id.clone(),
                delta: qty.checked_sub(before).ok_or_else(quantity_out_of_range)?,
            });
        }
    }

    for (product_id, qty) in &old_totals {
        if !new_map.contains_key(product_id.as_str()) {
            deltas.push(StockDelta {
                product_id: product_id.clone(),
                delta: -qty,
            });
        }
    }

    Ok(deltas)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delta(product_id: &str, delta: i64) -> StockDelta {
        StockDelta {
            product_id: product_id.to_string(),
            delta,
        }
    }

    #[test]
    fn test_new_order_reserves_everything() {
        let new = vec![LineItem::new("a", 2), LineItem::new("b", 1)];
        assert_eq!(stock_deltas(&[], &new).unwrap(), vec![delta("a", 2), delta("b", 1)]);
    }

    #[test]
    fn test_unchanged_items_reserve_nothing() {
        let items = vec![LineItem::new("a", 2), LineItem::new("b", 1)];
        assert!(stock_deltas(&items, &items).unwrap().is_empty());
    }

    #[test]
    fn test_mixed_update() {
        let old = vec![LineItem::new("widget", 3), LineItem::new("gadget", 2)];
        let new = vec![LineItem::new("widget", 5), LineItem::new("bolt", 1)];

        assert_eq!(
            stock_deltas(&old, &new).unwrap(),
            vec![delta("widget", 2), delta("bolt", 1), delta("gadget", -2)]
        );
    }

    #[test]
    fn test_duplicate_lines_are_summed() {
        let old = vec![LineItem::new("a", 4)];
        let new = vec![LineItem::new("a", 1), LineItem::new("a", 1)];

        let deltas = stock_deltas(&old, &new).unwrap();
        assert_eq!(deltas, vec![delta("a", -2)]);
        assert!(!deltas[0].is_reservation());
    }

    #[test]
    fn test_release_all() {
        let old = vec![LineItem::new("a", 4), LineItem::new("b", 1)];
        assert_eq!(
            stock_deltas(&old, &[]).unwrap(),
            vec![delta("a", -4), delta("b", -1)]
        );
    }

    #[test]
    fn test_summed_quantity_overflow_is_rejected() {
        let new = vec![LineItem::new("a", i64::MAX), LineItem::new("a", i64::MAX)];
        assert!(matches!(
            stock_deltas(&[LineItem::new("a", 1)], &new),
            Err(ValidationError::OutOfRange { .. })
        ));

        // Each line fits, the sum does not
        let new = vec![
            LineItem::new("a", MAX_QUANTITY),
            LineItem::new("b", 1),
            LineItem::new("a", 1),
        ];
        assert!(stock_deltas(&[], &new).is_err());

        let old = vec![LineItem::new("a", i64::MAX), LineItem::new("a", 1)];
        assert!(stock_deltas(&old, &[]).is_err());
    }

    #[test]
    fn test_quantity_at_cap() {
        let new = vec![LineItem::new("a", MAX_QUANTITY - 1), LineItem::new("a", 1)];
        assert_eq!(
            stock_deltas(&[], &new).unwrap(),
            vec![delta("a", MAX_QUANTITY)]
        );
    }
}
