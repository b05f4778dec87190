use std::collections::HashMap;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use diesel::dsl::sum;
use diesel::prelude::*;

use crate::db::DbPool;
use crate::domain::catalog::{Customer, SaleLine};
use crate::domain::errors::DomainError;
use crate::domain::order::{
    allocate, LineRequest, LineStatus, ListResult, OrderItemView, OrderView, Placement,
    ProductRevenue, StockLevel,
};
use crate::domain::ports::OrderRepository;
use crate::schema::{customers, order_items, orders, products};

use super::models::{
    CustomerRow, NewOrderItemRow, NewOrderRow, OrderItemRow, OrderRow, ProductRow,
};

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_view(order: OrderRow, items: Vec<OrderItemRow>) -> OrderView {
    OrderView {
        id: order.id,
        customer_id: order.customer_id,
        order_date: order.order_date,
        items: items
            .into_iter()
            .map(|i| OrderItemView {
                id: i.id,
                product_id: i.product_id,
                quantity: i.quantity,
                subtotal: i.subtotal,
            })
            .collect(),
    }
}

impl OrderRepository for DieselOrderRepository {
    fn place(
        &self,
        customer_id: i32,
        order_date: NaiveDate,
        lines: &[LineRequest],
    ) -> Result<Placement, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // 1. Lock every requested product row, in id order so that
            //    concurrent placements cannot deadlock on each other.
            let mut ids: Vec<i32> = lines.iter().map(|l| l.product_id).collect();
            ids.sort_unstable();
            ids.dedup();

            let locked = products::table
                .filter(products::id.eq_any(ids))
                .order(products::id.asc())
                .select(ProductRow::as_select())
                .for_update()
                .load(conn)?;

            let stock_before: HashMap<i32, i32> =
                locked.iter().map(|p| (p.id, p.stock_quantity)).collect();
            let mut levels: HashMap<i32, StockLevel> = locked
                .into_iter()
                .map(|p| {
                    (
                        p.id,
                        StockLevel {
                            unit_price: p.price,
                            stock: p.stock_quantity,
                        },
                    )
                })
                .collect();

            // 2. Decide every line against the locked stock
            let outcomes = allocate(&mut levels, lines);

            // 3. Insert the order and its fulfilled items
            let order_id: i32 = diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    customer_id,
                    order_date,
                })
                .returning(orders::id)
                .get_result(conn)?;

            let new_items: Vec<NewOrderItemRow> = outcomes
                .iter()
                .filter_map(|o| match &o.status {
                    LineStatus::Placed { subtotal } => Some(NewOrderItemRow {
                        order_id,
                        product_id: o.product_id,
                        quantity: o.quantity,
                        subtotal: subtotal.clone(),
                    }),
                    _ => None,
                })
                .collect();
            if !new_items.is_empty() {
                diesel::insert_into(order_items::table)
                    .values(&new_items)
                    .execute(conn)?;
            }

            // 4. Write back the stock of every product that changed
            for (id, level) in &levels {
                if stock_before.get(id) != Some(&level.stock) {
                    diesel::update(products::table.filter(products::id.eq(*id)))
                        .set(products::stock_quantity.eq(level.stock))
                        .execute(conn)?;
                }
            }

            log::info!(
                "Order {} placed for customer {}: {}/{} lines fulfilled",
                order_id,
                customer_id,
                new_items.len(),
                lines.len()
            );

            Ok(Placement {
                order_id,
                order_date,
                lines: outcomes,
            })
        })
    }

    fn find_by_id(&self, id: i32) -> Result<Option<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;

        let order = orders::table
            .filter(orders::id.eq(id))
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(order) = order else {
            return Ok(None);
        };

        let items = OrderItemRow::belonging_to(&order)
            .select(OrderItemRow::as_select())
            .order(order_items::id.asc())
            .load(&mut conn)?;

        Ok(Some(to_view(order, items)))
    }

    fn list(&self, offset: i64, limit: i64) -> Result<ListResult, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = orders::table.count().get_result(conn)?;

            let rows = orders::table
                .select(OrderRow::as_select())
                .order(orders::id.asc())
                .limit(limit)
                .offset(offset)
                .load(conn)?;

            let items = OrderItemRow::belonging_to(&rows)
                .select(OrderItemRow::as_select())
                .order(order_items::id.asc())
                .load(conn)?;

            Ok(ListResult {
                items: items
                    .grouped_by(&rows)
                    .into_iter()
                    .zip(rows)
                    .map(|(items, order)| to_view(order, items))
                    .collect(),
                total,
            })
        })
    }

    fn customer_of(&self, order_id: i32) -> Result<Option<Customer>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = orders::table
            .inner_join(customers::table)
            .filter(orders::id.eq(order_id))
            .select(CustomerRow::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(row.map(Customer::from))
    }

    fn delete(&self, id: i32) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            diesel::delete(order_items::table.filter(order_items::order_id.eq(id))).execute(conn)?;
            let deleted = diesel::delete(orders::table.filter(orders::id.eq(id))).execute(conn)?;
            Ok(deleted > 0)
        })
    }

    fn revenue_by_product(&self) -> Result<Vec<ProductRevenue>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows: Vec<(i32, String, Option<BigDecimal>)> = order_items::table
            .inner_join(products::table)
            .group_by((products::id, products::name))
            .select((products::id, products::name, sum(order_items::subtotal)))
            .order(products::id.asc())
            .load(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(|(product_id, product_name, total)| ProductRevenue {
                product_id,
                product_name,
                total_revenue: total.unwrap_or_else(|| BigDecimal::from(0)),
            })
            .collect())
    }

    fn revenue_by_customer(&self, customer_id: i32) -> Result<BigDecimal, DomainError> {
        let mut conn = self.pool.get()?;

        let total: Option<BigDecimal> = order_items::table
            .inner_join(orders::table)
            .filter(orders::customer_id.eq(customer_id))
            .select(sum(order_items::subtotal))
            .get_result(&mut conn)?;

        Ok(total.unwrap_or_else(|| BigDecimal::from(0)))
    }

    fn sales(&self) -> Result<Vec<SaleLine>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows: Vec<(i32, i32)> = order_items::table
            .select((order_items::product_id, order_items::quantity))
            .order(order_items::id.asc())
            .load(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(|(product_id, quantity)| SaleLine {
                product_id,
                quantity,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::sync::Arc;

    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;

    use super::DieselOrderRepository;
    use crate::domain::catalog::{Customer, NewCustomer, NewProduct, Product};
    use crate::domain::order::{LineRequest, LineStatus};
    use crate::domain::ports::{CatalogRepository, OrderRepository};
    use crate::infrastructure::catalog_repo::DieselCatalogRepository;
    use crate::infrastructure::test_support::setup_db;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).expect("valid decimal")
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 10, 22).expect("valid date")
    }

    fn line(product_id: i32, quantity: i32) -> LineRequest {
        LineRequest {
            product_id,
            quantity,
        }
    }

    fn seed_customer(catalog: &DieselCatalogRepository, email: &str) -> Customer {
        catalog
            .add_customer(NewCustomer {
                first_name: "Alice".to_string(),
                last_name: "Johnson".to_string(),
                email: email.to_string(),
                phone: None,
            })
            .expect("add customer failed")
    }

    fn seed_product(
        catalog: &DieselCatalogRepository,
        name: &str,
        price: &str,
        stock: i32,
    ) -> Product {
        catalog
            .add_product(NewProduct {
                name: name.to_string(),
                price: dec(price),
                stock_quantity: stock,
            })
            .expect("add product failed")
    }

    #[tokio::test]
    async fn large_subtotals_are_stored() {
        let (_container, pool) = setup_db().await;
        let catalog = DieselCatalogRepository::new(pool.clone());
        let repo = DieselOrderRepository::new(pool);
        let alice = seed_customer(&catalog, "alice@example.com");
        let laptop = seed_product(&catalog, "Laptop", "1000.00", 20_000_000);
        let tablet = seed_product(&catalog, "Tablet", "99999999.99", i32::MAX);

        let placement = repo
            .place(
                alice.id,
                today(),
                &[line(laptop.id, 10_000_000), line(tablet.id, i32::MAX)],
            )
            .expect("place failed");

        assert!(placement.lines.iter().all(|l| l.status.is_placed()));
        let order = repo.find_by_id(placement.order_id).unwrap().unwrap();
        assert_eq!(order.items[0].subtotal, dec("10000000000.00"));
        assert_eq!(order.items[1].subtotal, dec("214748364678525163.53"));
        assert_eq!(
            repo.revenue_by_customer(alice.id).unwrap(),
            dec("214748374678525163.53")
        );
    }

    #[tokio::test]
    async fn place_decrements_stock_and_writes_subtotals() {
        let (_container, pool) = setup_db().await;
        let catalog = DieselCatalogRepository::new(pool.clone());
        let repo = DieselOrderRepository::new(pool);
        let alice = seed_customer(&catalog, "alice@example.com");
        let laptop = seed_product(&catalog, "Laptop", "999.99", 50);

        let placement = repo
            .place(alice.id, today(), &[line(laptop.id, 2)])
            .expect("place failed");

        assert!(placement.lines[0].status.is_placed());
        let stock = catalog.find_product(laptop.id).unwrap().unwrap().stock_quantity;
        assert_eq!(stock, 48);

        let order = repo
            .find_by_id(placement.order_id)
            .expect("find failed")
            .expect("order should exist");
        assert_eq!(order.customer_id, alice.id);
        assert_eq!(order.order_date, today());
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].quantity, 2);
        assert_eq!(order.items[0].subtotal, dec("1999.98"));
    }

    #[tokio::test]
    async fn place_skips_unfulfillable_lines_without_rollback() {
        let (_container, pool) = setup_db().await;
        let catalog = DieselCatalogRepository::new(pool.clone());
        let repo = DieselOrderRepository::new(pool);
        let alice = seed_customer(&catalog, "alice@example.com");
        let laptop = seed_product(&catalog, "Laptop", "1000.00", 50);
        let tablet = seed_product(&catalog, "Tablet", "300.00", 1);

        let placement = repo
            .place(
                alice.id,
                today(),
                &[line(laptop.id, 1), line(tablet.id, 5), line(tablet.id + 50, 1)],
            )
            .expect("place failed");

        assert!(placement.lines[0].status.is_placed());
        assert_eq!(placement.lines[1].status, LineStatus::InsufficientStock { available: 1 });
        assert_eq!(placement.lines[2].status, LineStatus::ProductNotFound);

        assert_eq!(catalog.find_product(tablet.id).unwrap().unwrap().stock_quantity, 1);
        assert_eq!(catalog.find_product(laptop.id).unwrap().unwrap().stock_quantity, 49);

        let order = repo.find_by_id(placement.order_id).unwrap().unwrap();
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].product_id, laptop.id);
    }

    #[tokio::test]
    async fn order_without_fulfilled_lines_is_still_persisted() {
        let (_container, pool) = setup_db().await;
        let catalog = DieselCatalogRepository::new(pool.clone());
        let repo = DieselOrderRepository::new(pool);
        let alice = seed_customer(&catalog, "alice@example.com");

        let placement = repo.place(alice.id, today(), &[line(999, 1)]).expect("place failed");

        let order = repo.find_by_id(placement.order_id).unwrap().expect("order should exist");
        assert!(order.items.is_empty());
    }

    #[tokio::test]
    async fn concurrent_placements_never_oversell() {
        let (_container, pool) = setup_db().await;
        let catalog = DieselCatalogRepository::new(pool.clone());
        let repo = Arc::new(DieselOrderRepository::new(pool));
        let alice = seed_customer(&catalog, "alice@example.com");
        let phone = seed_product(&catalog, "Smartphone", "600.00", 5);

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let repo = Arc::clone(&repo);
                let (customer_id, product_id) = (alice.id, phone.id);
                std::thread::spawn(move || {
                    repo.place(customer_id, today(), &[line(product_id, 1)])
                        .expect("place failed")
                })
            })
            .collect();

        let placed = handles
            .into_iter()
            .map(|h| h.join().expect("thread panicked"))
            .filter(|p| p.lines[0].status.is_placed())
            .count();

        assert_eq!(placed, 5);
        assert_eq!(catalog.find_product(phone.id).unwrap().unwrap().stock_quantity, 0);
    }

    #[tokio::test]
    async fn find_by_id_returns_none_for_unknown_id() {
        let (_container, pool) = setup_db().await;
        let repo = DieselOrderRepository::new(pool);

        let result = repo.find_by_id(12345).expect("find should not error");

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn list_paginates_in_id_order() {
        let (_container, pool) = setup_db().await;
        let catalog = DieselCatalogRepository::new(pool.clone());
        let repo = DieselOrderRepository::new(pool);
        let alice = seed_customer(&catalog, "alice@example.com");
        let laptop = seed_product(&catalog, "Laptop", "1.00", 100);

        let mut ids = Vec::new();
        for _ in 0..5 {
            ids.push(repo.place(alice.id, today(), &[line(laptop.id, 1)]).unwrap().order_id);
        }

        let page1 = repo.list(0, 3).expect("list page 1 failed");
        assert_eq!(page1.total, 5);
        let page1_ids: Vec<i32> = page1.items.iter().map(|o| o.id).collect();
        assert_eq!(page1_ids, ids[..3].to_vec());
        assert!(page1.items.iter().all(|o| o.items.len() == 1));

        let page2 = repo.list(3, 3).expect("list page 2 failed");
        assert_eq!(page2.items.len(), 2);

        let beyond = repo.list(i64::MAX, 3).expect("list beyond the end failed");
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total, 5);
    }

    #[tokio::test]
    async fn customer_of_and_delete() {
        let (_container, pool) = setup_db().await;
        let catalog = DieselCatalogRepository::new(pool.clone());
        let repo = DieselOrderRepository::new(pool);
        let bob = seed_customer(&catalog, "bob.smith@example.com");
        let tablet = seed_product(&catalog, "Tablet", "300.00", 30);
        let placement = repo.place(bob.id, today(), &[line(tablet.id, 1)]).unwrap();

        let customer = repo
            .customer_of(placement.order_id)
            .expect("lookup failed")
            .expect("customer should exist");
        assert_eq!(customer.email, "bob.smith@example.com");

        assert!(repo.delete(placement.order_id).expect("delete failed"));
        assert!(repo.find_by_id(placement.order_id).unwrap().is_none());
        assert!(repo.customer_of(placement.order_id).unwrap().is_none());
        assert!(!repo.delete(placement.order_id).expect("delete failed"));
    }

    #[tokio::test]
    async fn revenue_queries_sum_subtotals() {
        let (_container, pool) = setup_db().await;
        let catalog = DieselCatalogRepository::new(pool.clone());
        let repo = DieselOrderRepository::new(pool);
        let alice = seed_customer(&catalog, "alice@example.com");
        let bob = seed_customer(&catalog, "bob@example.com");
        let nobody = seed_customer(&catalog, "nobody@example.com");
        let laptop = seed_product(&catalog, "Laptop", "1000.00", 50);
        let tablet = seed_product(&catalog, "Tablet", "300.00", 30);
        seed_product(&catalog, "Smartphone", "600.00", 75);

        repo.place(alice.id, today(), &[line(laptop.id, 2), line(tablet.id, 1)]).unwrap();
        repo.place(bob.id, today(), &[line(tablet.id, 3)]).unwrap();
        repo.place(alice.id, today(), &[line(laptop.id, 1)]).unwrap();

        let by_product = repo.revenue_by_product().expect("revenue failed");
        assert_eq!(by_product.len(), 2);
        assert_eq!(by_product[0].product_name, "Laptop");
        assert_eq!(by_product[0].total_revenue, dec("3000.00"));
        assert_eq!(by_product[1].product_name, "Tablet");
        assert_eq!(by_product[1].total_revenue, dec("1200.00"));

        assert_eq!(repo.revenue_by_customer(alice.id).unwrap(), dec("3300.00"));
        assert_eq!(repo.revenue_by_customer(bob.id).unwrap(), dec("900.00"));
        assert_eq!(repo.revenue_by_customer(nobody.id).unwrap(), BigDecimal::from(0));

        let sales: Vec<(i32, i32)> = repo
            .sales()
            .unwrap()
            .into_iter()
            .map(|s| (s.product_id, s.quantity))
            .collect();
        assert_eq!(
            sales,
            vec![(laptop.id, 2), (tablet.id, 1), (tablet.id, 3), (laptop.id, 1)]
        );
    }
}
