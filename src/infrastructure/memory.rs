//! In-memory repositories, used by tests and for running the API without a
//! database.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use bigdecimal::BigDecimal;
use chrono::NaiveDate;

use crate::domain::catalog::{self, Customer, NewCustomer, NewProduct, Product, SaleLine};
use crate::domain::errors::DomainError;
use crate::domain::order::{
    allocate, LineRequest, LineStatus, ListResult, OrderItemView, OrderView, Placement,
    ProductRevenue, StockLevel,
};
use crate::domain::ports::{CatalogRepository, OrderRepository};

#[derive(Default)]
struct State {
    customers: BTreeMap<i32, Customer>,
    products: BTreeMap<i32, Product>,
    orders: BTreeMap<i32, OrderView>,
    next_customer_id: i32,
    next_product_id: i32,
    next_order_id: i32,
    next_item_id: i32,
}

fn next(counter: &mut i32) -> i32 {
    *counter += 1;
    *counter
}

/// Catalog and order storage behind a single mutex, so a placement is atomic
/// with respect to every other operation.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, DomainError> {
        self.state
            .lock()
            .map_err(|e| DomainError::Internal(format!("store poisoned: {e}")))
    }
}

impl CatalogRepository for InMemoryStore {
    fn add_product(&self, product: NewProduct) -> Result<Product, DomainError> {
        let mut state = self.lock()?;
        let id = next(&mut state.next_product_id);
        let product = Product {
            id,
            name: product.name,
            price: product.price,
            stock_quantity: product.stock_quantity,
        };
        state.products.insert(id, product.clone());
        Ok(product)
    }

    fn list_products(&self) -> Result<Vec<Product>, DomainError> {
        Ok(self.lock()?.products.values().cloned().collect())
    }

    fn find_product(&self, id: i32) -> Result<Option<Product>, DomainError> {
        Ok(self.lock()?.products.get(&id).cloned())
    }

    fn find_product_by_name(&self, name: &str) -> Result<Option<Product>, DomainError> {
        let products = self.list_products()?;
        Ok(catalog::search_product(&products, name).cloned())
    }

    fn search_products(&self, fragment: &str) -> Result<Vec<Product>, DomainError> {
        let products = self.list_products()?;
        Ok(catalog::search_products(&products, fragment)
            .into_iter()
            .cloned()
            .collect())
    }

    fn set_stock(&self, id: i32, stock_quantity: i32) -> Result<Option<Product>, DomainError> {
        let mut state = self.lock()?;
        Ok(state.products.get_mut(&id).map(|p| {
            p.stock_quantity = stock_quantity;
            p.clone()
        }))
    }

    fn add_customer(&self, customer: NewCustomer) -> Result<Customer, DomainError> {
        let mut state = self.lock()?;
        if state.customers.values().any(|c| c.email == customer.email) {
            return Err(DomainError::Conflict(format!(
                "email {} already registered",
                customer.email
            )));
        }
        let id = next(&mut state.next_customer_id);
        let customer = Customer {
            id,
            first_name: customer.first_name,
            last_name: customer.last_name,
            email: customer.email,
            phone: customer.phone,
        };
        state.customers.insert(id, customer.clone());
        Ok(customer)
    }

    fn find_customer(&self, id: i32) -> Result<Option<Customer>, DomainError> {
        Ok(self.lock()?.customers.get(&id).cloned())
    }

    fn has_customers(&self) -> Result<bool, DomainError> {
        Ok(!self.lock()?.customers.is_empty())
    }
}

impl OrderRepository for InMemoryStore {
    fn place(
        &self,
        customer_id: i32,
        order_date: NaiveDate,
        lines: &[LineRequest],
    ) -> Result<Placement, DomainError> {
        let mut state = self.lock()?;

        let mut levels: HashMap<i32, StockLevel> = lines
            .iter()
            .filter_map(|l| state.products.get(&l.product_id))
            .map(|p| {
                (
                    p.id,
                    StockLevel {
                        unit_price: p.price.clone(),
                        stock: p.stock_quantity,
                    },
                )
            })
            .collect();

        let outcomes = allocate(&mut levels, lines);

        for (id, level) in levels {
            if let Some(product) = state.products.get_mut(&id) {
                product.stock_quantity = level.stock;
            }
        }

        let order_id = next(&mut state.next_order_id);
        let mut items = Vec::new();
        for outcome in &outcomes {
            if let LineStatus::Placed { subtotal } = &outcome.status {
                items.push(OrderItemView {
                    id: next(&mut state.next_item_id),
                    product_id: outcome.product_id,
                    quantity: outcome.quantity,
                    subtotal: subtotal.clone(),
                });
            }
        }
        state.orders.insert(
            order_id,
            OrderView {
                id: order_id,
                customer_id,
                order_date,
                items,
            },
        );

        Ok(Placement {
            order_id,
            order_date,
            lines: outcomes,
        })
    }

    fn find_by_id(&self, id: i32) -> Result<Option<OrderView>, DomainError> {
        Ok(self.lock()?.orders.get(&id).cloned())
    }

    fn list(&self, offset: i64, limit: i64) -> Result<ListResult, DomainError> {
        let state = self.lock()?;
        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(0);

        Ok(ListResult {
            items: state
                .orders
                .values()
                .skip(offset)
                .take(limit)
                .cloned()
                .collect(),
            total: state.orders.len() as i64,
        })
    }

    fn customer_of(&self, order_id: i32) -> Result<Option<Customer>, DomainError> {
        let state = self.lock()?;
        Ok(state
            .orders
            .get(&order_id)
            .and_then(|o| state.customers.get(&o.customer_id))
            .cloned())
    }

    fn delete(&self, id: i32) -> Result<bool, DomainError> {
        Ok(self.lock()?.orders.remove(&id).is_some())
    }

    fn revenue_by_product(&self) -> Result<Vec<ProductRevenue>, DomainError> {
        let state = self.lock()?;
        let mut totals: BTreeMap<i32, BigDecimal> = BTreeMap::new();
        for item in state.orders.values().flat_map(|o| &o.items) {
            *totals.entry(item.product_id).or_insert_with(|| BigDecimal::from(0)) +=
                &item.subtotal;
        }

        Ok(totals
            .into_iter()
            .filter_map(|(product_id, total_revenue)| {
                state.products.get(&product_id).map(|p| ProductRevenue {
                    product_id,
                    product_name: p.name.clone(),
                    total_revenue,
                })
            })
            .collect())
    }

    fn revenue_by_customer(&self, customer_id: i32) -> Result<BigDecimal, DomainError> {
        let state = self.lock()?;
        Ok(state
            .orders
            .values()
            .filter(|o| o.customer_id == customer_id)
            .flat_map(|o| &o.items)
            .fold(BigDecimal::from(0), |acc, item| acc + &item.subtotal))
    }

    fn sales(&self) -> Result<Vec<SaleLine>, DomainError> {
        let state = self.lock()?;
        let mut items: Vec<&OrderItemView> =
            state.orders.values().flat_map(|o| &o.items).collect();
        items.sort_by_key(|i| i.id);

        Ok(items
            .into_iter()
            .map(|i| SaleLine {
                product_id: i.product_id,
                quantity: i.quantity,
            })
            .collect())
    }
}
