use bigdecimal::BigDecimal;
use chrono::{NaiveDate, Utc};

use crate::domain::catalog::{top_selling_products, Customer, TopSeller};
use crate::domain::errors::DomainError;
use crate::domain::order::{LineRequest, OrderPage, OrderView, Placement, ProductRevenue};
use crate::domain::ports::{CatalogRepository, OrderRepository};

pub const MAX_PAGE_SIZE: i64 = 100;

pub struct OrderService<R, C> {
    repo: R,
    catalog: C,
}

impl<R: OrderRepository, C: CatalogRepository> OrderService<R, C> {
    pub fn new(repo: R, catalog: C) -> Self {
        Self { repo, catalog }
    }

    /// Place an order dated today (UTC). Lines that cannot be fulfilled are
    /// reported in the returned placement; the order itself is always stored.
    pub fn place_order(
        &self,
        customer_id: i32,
        lines: Vec<LineRequest>,
    ) -> Result<Placement, DomainError> {
        self.place_order_on(customer_id, Utc::now().date_naive(), lines)
    }

    /// Same as [`place_order`](Self::place_order) with an explicit order date.
    pub fn place_order_on(
        &self,
        customer_id: i32,
        order_date: NaiveDate,
        lines: Vec<LineRequest>,
    ) -> Result<Placement, DomainError> {
        if self.catalog.find_customer(customer_id)?.is_none() {
            return Err(DomainError::NotFound("Customer"));
        }
        self.repo.place(customer_id, order_date, &lines)
    }

    pub fn get_order(&self, id: i32) -> Result<Option<OrderView>, DomainError> {
        self.repo.find_by_id(id)
    }

    /// Orders by id. `page` is raised to at least 1 and `limit` clamped to
    /// `1..=MAX_PAGE_SIZE`; a page past the end is empty.
    pub fn list_orders(&self, page: i64, limit: i64) -> Result<OrderPage, DomainError> {
        let page = page.max(1);
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        let offset = (page - 1).saturating_mul(limit);

        let result = self.repo.list(offset, limit)?;
        Ok(OrderPage {
            items: result.items,
            total: result.total,
            page,
            limit,
        })
    }

    pub fn customer_of(&self, order_id: i32) -> Result<Customer, DomainError> {
        self.repo
            .customer_of(order_id)?
            .ok_or(DomainError::NotFound("Order"))
    }

    pub fn delete_order(&self, id: i32) -> Result<(), DomainError> {
        if self.repo.delete(id)? {
            log::info!("Order {} and its items deleted", id);
            Ok(())
        } else {
            Err(DomainError::NotFound("Order"))
        }
    }

    pub fn revenue_by_product(&self) -> Result<Vec<ProductRevenue>, DomainError> {
        self.repo.revenue_by_product()
    }

    pub fn revenue_by_customer(&self, customer_id: i32) -> Result<BigDecimal, DomainError> {
        if self.catalog.find_customer(customer_id)?.is_none() {
            return Err(DomainError::NotFound("Customer"));
        }
        self.repo.revenue_by_customer(customer_id)
    }

    pub fn top_selling(&self, n: usize) -> Result<Vec<TopSeller>, DomainError> {
        Ok(top_selling_products(&self.repo.sales()?, n))
    }
}
