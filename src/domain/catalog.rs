use std::collections::HashMap;

use bigdecimal::BigDecimal;

/// Prices are stored as `NUMERIC(10, 2)`.
pub const PRICE_PRECISION: i64 = 10;
pub const PRICE_SCALE: i64 = 2;
/// Discount percentages: up to `100.0000`.
pub const DISCOUNT_PRECISION: i64 = 7;
pub const DISCOUNT_SCALE: i64 = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub price: BigDecimal,
    pub stock_quantity: i32,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: BigDecimal,
    pub stock_quantity: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// A product reference with a quantity, as found in a shopping cart.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub product_id: i32,
    pub quantity: i32,
}

/// A cart entry that already carries its price and an optional discount.
#[derive(Debug, Clone)]
pub struct PricedItem {
    pub product_id: i32,
    pub price: BigDecimal,
    /// Percentage in `0..=100`.
    pub discount_percentage: BigDecimal,
}

/// One sold quantity of a product, in the order it was recorded.
#[derive(Debug, Clone)]
pub struct SaleLine {
    pub product_id: i32,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopSeller {
    pub product_id: i32,
    pub total_quantity_sold: i64,
}

/// Whether `value` fits a SQL `NUMERIC(precision, scale)` column without
/// rounding. Only digit counts are inspected, so huge exponents stay cheap.
pub fn fits_numeric(value: &BigDecimal, precision: i64, scale: i64) -> bool {
    let (_, mut exponent) = value.as_bigint_and_exponent();
    let mut digits = value.digits() as i64;
    if exponent > scale {
        // trailing zeros may hide behind the scale, e.g. 9.990
        let normalized = value.normalized();
        exponent = normalized.as_bigint_and_exponent().1;
        digits = normalized.digits() as i64;
        if exponent > scale {
            return false;
        }
    }
    digits - exponent <= precision - scale
}

/// Exact, case-insensitive name lookup. Returns the first match in list order.
pub fn search_product<'a>(products: &'a [Product], name: &str) -> Option<&'a Product> {
    let needle = name.to_lowercase();
    products.iter().find(|p| p.name.to_lowercase() == needle)
}

/// Case-insensitive substring search, preserving list order.
pub fn search_products<'a>(products: &'a [Product], fragment: &str) -> Vec<&'a Product> {
    let needle = fragment.to_lowercase();
    products
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&needle))
        .collect()
}

/// Sum of `price * quantity` over the cart. Lines whose product is not in
/// `products` are valued at zero.
pub fn cart_total(cart: &[CartLine], products: &[Product]) -> BigDecimal {
    let prices: HashMap<i32, &BigDecimal> = products.iter().map(|p| (p.id, &p.price)).collect();

    cart.iter().fold(BigDecimal::from(0), |total, line| {
        match prices.get(&line.product_id) {
            Some(price) => total + *price * BigDecimal::from(line.quantity),
            None => {
                log::warn!("Cart references unknown product {}", line.product_id);
                total
            }
        }
    })
}

/// Sum of `price * (1 - discount / 100)` over the items, rounded to cents.
pub fn discounted_total(items: &[PricedItem]) -> BigDecimal {
    let hundred = BigDecimal::from(100);
    let total = items.iter().fold(BigDecimal::from(0), |total, item| {
        let factor = BigDecimal::from(1) - &item.discount_percentage / &hundred;
        total + &item.price * factor
    });
    total.round(2).with_scale(2)
}

/// Aggregate quantities per product and return the `n` best sellers.
///
/// Sorted by descending total; equal totals keep the order in which each
/// product was first seen in `sales`.
pub fn top_selling_products(sales: &[SaleLine], n: usize) -> Vec<TopSeller> {
    let mut index: HashMap<i32, usize> = HashMap::new();
    let mut totals: Vec<TopSeller> = Vec::new();

    for sale in sales {
        match index.get(&sale.product_id) {
            Some(&i) => totals[i].total_quantity_sold += i64::from(sale.quantity),
            None => {
                index.insert(sale.product_id, totals.len());
                totals.push(TopSeller {
                    product_id: sale.product_id,
                    total_quantity_sold: i64::from(sale.quantity),
                });
            }
        }
    }

    // stable sort keeps first-seen order among ties
    totals.sort_by(|a, b| b.total_quantity_sold.cmp(&a.total_quantity_sold));
    totals.truncate(n);
    totals
}
