use std::collections::HashMap;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;

#[derive(Debug, Clone)]
pub struct LineRequest {
    pub product_id: i32,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LineStatus {
    Placed { subtotal: BigDecimal },
    ProductNotFound,
    InsufficientStock { available: i32 },
    InvalidQuantity,
}

impl LineStatus {
    pub fn is_placed(&self) -> bool {
        matches!(self, LineStatus::Placed { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineOutcome {
    pub product_id: i32,
    pub quantity: i32,
    pub status: LineStatus,
}

/// Result of placing an order: the persisted order and the per-line report,
/// in request order.
#[derive(Debug, Clone)]
pub struct Placement {
    pub order_id: i32,
    pub order_date: NaiveDate,
    pub lines: Vec<LineOutcome>,
}

#[derive(Debug, Clone)]
pub struct OrderItemView {
    pub id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub subtotal: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: i32,
    pub customer_id: i32,
    pub order_date: NaiveDate,
    pub items: Vec<OrderItemView>,
}

#[derive(Debug, Clone)]
pub struct ListResult {
    pub items: Vec<OrderView>,
    pub total: i64,
}

/// One page of orders together with the paging that produced it.
#[derive(Debug, Clone)]
pub struct OrderPage {
    pub items: Vec<OrderView>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductRevenue {
    pub product_id: i32,
    pub product_name: String,
    pub total_revenue: BigDecimal,
}

/// Price and remaining stock of a product while an order is being allocated.
#[derive(Debug, Clone)]
pub struct StockLevel {
    pub unit_price: BigDecimal,
    pub stock: i32,
}

/// Decide every requested line against `levels`, decrementing stock for the
/// lines that can be fulfilled.
///
/// Lines are handled in request order and independently of each other, so
/// two lines for the same product draw from the same remaining stock. A
/// product missing from `levels` does not exist.
pub fn allocate(levels: &mut HashMap<i32, StockLevel>, requests: &[LineRequest]) -> Vec<LineOutcome> {
    requests
        .iter()
        .map(|req| {
            let status = match levels.get_mut(&req.product_id) {
                _ if req.quantity <= 0 => LineStatus::InvalidQuantity,
                None => LineStatus::ProductNotFound,
                Some(level) if level.stock < req.quantity => LineStatus::InsufficientStock {
                    available: level.stock,
                },
                Some(level) => {
                    level.stock -= req.quantity;
                    LineStatus::Placed {
                        subtotal: &level.unit_price * BigDecimal::from(req.quantity),
                    }
                }
            };

            if !status.is_placed() {
                log::warn!(
                    "Line for product {} (quantity {}) not placed: {:?}",
                    req.product_id,
                    req.quantity,
                    status
                );
            }

            LineOutcome {
                product_id: req.product_id,
                quantity: req.quantity,
                status,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn levels(entries: &[(i32, &str, i32)]) -> HashMap<i32, StockLevel> {
        entries
            .iter()
            .map(|(id, price, stock)| {
                (
                    *id,
                    StockLevel {
                        unit_price: BigDecimal::from_str(price).expect("valid decimal"),
                        stock: *stock,
                    },
                )
            })
            .collect()
    }

    fn req(product_id: i32, quantity: i32) -> LineRequest {
        LineRequest { product_id, quantity }
    }

    #[test]
    fn fulfilled_line_decrements_stock_and_computes_subtotal() {
        let mut stock = levels(&[(1, "999.99", 50)]);

        let outcome = allocate(&mut stock, &[req(1, 2)]);

        assert_eq!(stock[&1].stock, 48);
        assert_eq!(
            outcome[0].status,
            LineStatus::Placed {
                subtotal: BigDecimal::from_str("1999.98").unwrap()
            }
        );
    }

    #[test]
    fn quantity_equal_to_stock_is_fulfilled() {
        let mut stock = levels(&[(1, "5.00", 3)]);

        let outcome = allocate(&mut stock, &[req(1, 3)]);

        assert!(outcome[0].status.is_placed());
        assert_eq!(stock[&1].stock, 0);
    }

    #[test]
    fn insufficient_stock_leaves_stock_untouched() {
        let mut stock = levels(&[(1, "5.00", 3)]);

        let outcome = allocate(&mut stock, &[req(1, 4)]);

        assert_eq!(outcome[0].status, LineStatus::InsufficientStock { available: 3 });
        assert_eq!(stock[&1].stock, 3);
    }

    #[test]
    fn unknown_product_is_reported_per_line() {
        let mut stock = levels(&[(1, "5.00", 3)]);

        let outcome = allocate(&mut stock, &[req(42, 1), req(1, 1)]);

        assert_eq!(outcome[0].status, LineStatus::ProductNotFound);
        assert!(outcome[1].status.is_placed());
        assert_eq!(stock[&1].stock, 2);
    }

    #[test]
    fn non_positive_quantity_is_rejected() {
        let mut stock = levels(&[(1, "5.00", 3)]);

        let outcome = allocate(&mut stock, &[req(1, 0), req(1, -2), req(77, 0)]);

        assert!(outcome
            .iter()
            .all(|o| o.status == LineStatus::InvalidQuantity));
        assert_eq!(stock[&1].stock, 3);
    }

    #[test]
    fn repeated_product_draws_from_remaining_stock() {
        let mut stock = levels(&[(1, "2.50", 5)]);

        let outcome = allocate(&mut stock, &[req(1, 3), req(1, 3), req(1, 2)]);

        assert!(outcome[0].status.is_placed());
        assert_eq!(outcome[1].status, LineStatus::InsufficientStock { available: 2 });
        assert!(outcome[2].status.is_placed());
        assert_eq!(stock[&1].stock, 0);
    }

    #[test]
    fn outcomes_follow_request_order() {
        let mut stock = levels(&[(1, "1.00", 10), (2, "2.00", 10)]);

        let outcome = allocate(&mut stock, &[req(2, 1), req(1, 1)]);

        let ids: Vec<i32> = outcome.iter().map(|o| o.product_id).collect();
        assert_eq!(ids, vec![2, 1]);
    }
}
