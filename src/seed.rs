use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;

use crate::domain::catalog::{NewCustomer, NewProduct};
use crate::domain::errors::DomainError;
use crate::domain::order::LineRequest;
use crate::state::AppState;

const CUSTOMERS: [(&str, &str, &str, &str); 2] = [
    ("Alice", "Johnson", "alice.johnson@example.com", "123-456-7890"),
    ("Bob", "Smith", "bob.smith@example.com", "098-765-4321"),
];

const PRODUCTS: [(&str, &str, i32); 3] = [
    ("Laptop", "1000.00", 50),
    ("Tablet", "300.00", 30),
    ("Smartphone", "600.00", 75),
];

/// Insert sample customers, products and orders unless customers already
/// exist. Returns whether anything was written.
pub fn seed_data(state: &AppState) -> Result<bool, DomainError> {
    if state.catalog.has_customers()? {
        log::info!("Database already seeded. Skipping seed data insertion.");
        return Ok(false);
    }

    let mut customers = Vec::with_capacity(CUSTOMERS.len());
    for (first_name, last_name, email, phone) in CUSTOMERS {
        customers.push(state.catalog.add_customer(NewCustomer {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            phone: Some(phone.to_string()),
        })?);
    }

    let mut products = Vec::with_capacity(PRODUCTS.len());
    for (name, price, stock) in PRODUCTS {
        let price = BigDecimal::from_str(price)
            .map_err(|e| DomainError::Internal(format!("bad seed price {price}: {e}")))?;
        products.push(state.catalog.add_product(NewProduct {
            name: name.to_string(),
            price,
            stock_quantity: stock,
        })?);
    }

    let (alice, bob) = (customers[0].id, customers[1].id);
    let (laptop, tablet, phone) = (products[0].id, products[1].id, products[2].id);
    let orders = [
        (alice, (2024, 10, 20), vec![(laptop, 2), (tablet, 1)]),
        (bob, (2024, 10, 21), vec![(phone, 1)]),
        (alice, (2024, 10, 22), vec![(laptop, 1)]),
    ];
    for (customer_id, (year, month, day), lines) in orders {
        let order_date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| DomainError::Internal(format!("bad seed date {year}-{month}-{day}")))?;
        let lines = lines
            .into_iter()
            .map(|(product_id, quantity)| LineRequest {
                product_id,
                quantity,
            })
            .collect();
        state.orders.place_order_on(customer_id, order_date, lines)?;
    }

    log::info!("Sample data added to the database.");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::sync::Arc;
    use std::time::Duration;

    use bigdecimal::BigDecimal;

    use super::seed_data;
    use crate::infrastructure::memory::InMemoryStore;
    use crate::state::AppState;
    use crate::user_directory::UserDirectoryClient;

    fn state() -> AppState {
        let store = Arc::new(InMemoryStore::new());
        let directory = UserDirectoryClient::new("http://127.0.0.1:9/users", Duration::from_secs(1))
            .expect("client should build");
        AppState::new(store.clone(), store, directory)
    }

    #[test]
    fn seeds_once() {
        let state = state();

        assert!(seed_data(&state).expect("seed failed"));
        assert!(!seed_data(&state).expect("second seed failed"));

        let products = state.catalog.list_products().unwrap();
        let stock: Vec<i32> = products.iter().map(|p| p.stock_quantity).collect();
        assert_eq!(stock, vec![47, 29, 74]);
        assert_eq!(state.orders.list_orders(1, 10).unwrap().total, 3);
    }

    #[test]
    fn sample_orders_keep_their_dates() {
        let state = state();
        seed_data(&state).expect("seed failed");

        let dates: Vec<String> = state
            .orders
            .list_orders(1, 10)
            .unwrap()
            .items
            .into_iter()
            .map(|o| o.order_date.to_string())
            .collect();
        assert_eq!(dates, vec!["2024-10-20", "2024-10-21", "2024-10-22"]);
    }

    #[test]
    fn seeded_revenue_matches_sample_orders() {
        let state = state();
        seed_data(&state).expect("seed failed");

        let revenue = state.orders.revenue_by_product().unwrap();
        let totals: Vec<(String, BigDecimal)> = revenue
            .into_iter()
            .map(|r| (r.product_name, r.total_revenue))
            .collect();
        assert_eq!(
            totals,
            vec![
                ("Laptop".to_string(), BigDecimal::from_str("3000.00").unwrap()),
                ("Tablet".to_string(), BigDecimal::from_str("300.00").unwrap()),
                ("Smartphone".to_string(), BigDecimal::from_str("600.00").unwrap()),
            ]
        );
    }
}
