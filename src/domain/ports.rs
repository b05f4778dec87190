use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;

use super::catalog::{Customer, NewCustomer, NewProduct, Product, SaleLine};
use super::errors::DomainError;
use super::order::{LineRequest, ListResult, OrderView, Placement, ProductRevenue};

pub trait CatalogRepository: Send + Sync + 'static {
    fn add_product(&self, product: NewProduct) -> Result<Product, DomainError>;
    /// All products, ordered by id.
    fn list_products(&self) -> Result<Vec<Product>, DomainError>;
    fn find_product(&self, id: i32) -> Result<Option<Product>, DomainError>;
    /// Exact, case-insensitive name match; the lowest id wins on duplicates.
    fn find_product_by_name(&self, name: &str) -> Result<Option<Product>, DomainError>;
    /// Case-insensitive substring match on the name, ordered by id.
    fn search_products(&self, fragment: &str) -> Result<Vec<Product>, DomainError>;
    fn set_stock(&self, id: i32, stock_quantity: i32) -> Result<Option<Product>, DomainError>;
    fn add_customer(&self, customer: NewCustomer) -> Result<Customer, DomainError>;
    fn find_customer(&self, id: i32) -> Result<Option<Customer>, DomainError>;
    fn has_customers(&self) -> Result<bool, DomainError>;
}

pub trait OrderRepository: Send + Sync + 'static {
    /// Allocate `lines` against current stock and persist the order with the
    /// fulfilled items. Stock checks and decrements happen atomically with
    /// respect to other placements.
    fn place(
        &self,
        customer_id: i32,
        order_date: NaiveDate,
        lines: &[LineRequest],
    ) -> Result<Placement, DomainError>;
    fn find_by_id(&self, id: i32) -> Result<Option<OrderView>, DomainError>;
    /// Orders by id, skipping `offset` and returning at most `limit`.
    fn list(&self, offset: i64, limit: i64) -> Result<ListResult, DomainError>;
    fn customer_of(&self, order_id: i32) -> Result<Option<Customer>, DomainError>;
    /// Delete the order and its items. Returns `false` when nothing matched.
    fn delete(&self, id: i32) -> Result<bool, DomainError>;
    fn revenue_by_product(&self) -> Result<Vec<ProductRevenue>, DomainError>;
    fn revenue_by_customer(&self, customer_id: i32) -> Result<BigDecimal, DomainError>;
    /// Every order item as a sale, ordered by item id.
    fn sales(&self) -> Result<Vec<SaleLine>, DomainError>;
}

pub type DynCatalogRepository = Arc<dyn CatalogRepository>;
pub type DynOrderRepository = Arc<dyn OrderRepository>;

impl<T: CatalogRepository + ?Sized> CatalogRepository for Arc<T> {
    fn add_product(&self, product: NewProduct) -> Result<Product, DomainError> {
        (**self).add_product(product)
    }

    fn list_products(&self) -> Result<Vec<Product>, DomainError> {
        (**self).list_products()
    }

    fn find_product(&self, id: i32) -> Result<Option<Product>, DomainError> {
        (**self).find_product(id)
    }

    fn find_product_by_name(&self, name: &str) -> Result<Option<Product>, DomainError> {
        (**self).find_product_by_name(name)
    }

    fn search_products(&self, fragment: &str) -> Result<Vec<Product>, DomainError> {
        (**self).search_products(fragment)
    }

    fn set_stock(&self, id: i32, stock_quantity: i32) -> Result<Option<Product>, DomainError> {
        (**self).set_stock(id, stock_quantity)
    }

    fn add_customer(&self, customer: NewCustomer) -> Result<Customer, DomainError> {
        (**self).add_customer(customer)
    }

    fn find_customer(&self, id: i32) -> Result<Option<Customer>, DomainError> {
        (**self).find_customer(id)
    }

    fn has_customers(&self) -> Result<bool, DomainError> {
        (**self).has_customers()
    }
}

impl<T: OrderRepository + ?Sized> OrderRepository for Arc<T> {
    fn place(
        &self,
        customer_id: i32,
        order_date: NaiveDate,
        lines: &[LineRequest],
    ) -> Result<Placement, DomainError> {
        (**self).place(customer_id, order_date, lines)
    }

    fn find_by_id(&self, id: i32) -> Result<Option<OrderView>, DomainError> {
        (**self).find_by_id(id)
    }

    fn list(&self, offset: i64, limit: i64) -> Result<ListResult, DomainError> {
        (**self).list(offset, limit)
    }

    fn customer_of(&self, order_id: i32) -> Result<Option<Customer>, DomainError> {
        (**self).customer_of(order_id)
    }

    fn delete(&self, id: i32) -> Result<bool, DomainError> {
        (**self).delete(id)
    }

    fn revenue_by_product(&self) -> Result<Vec<ProductRevenue>, DomainError> {
        (**self).revenue_by_product()
    }

    fn revenue_by_customer(&self, customer_id: i32) -> Result<BigDecimal, DomainError> {
        (**self).revenue_by_customer(customer_id)
    }

    fn sales(&self) -> Result<Vec<SaleLine>, DomainError> {
        (**self).sales()
    }
}
