use bigdecimal::BigDecimal;

use crate::domain::catalog::{
    cart_total, discounted_total, fits_numeric, CartLine, Customer, NewCustomer, NewProduct,
    PricedItem, Product, DISCOUNT_PRECISION, DISCOUNT_SCALE, PRICE_PRECISION, PRICE_SCALE,
};
use crate::domain::errors::DomainError;
use crate::domain::ports::CatalogRepository;

const MAX_PHONE_LEN: usize = 15;

pub struct CatalogService<C> {
    repo: C,
}

impl<C: CatalogRepository> CatalogService<C> {
    pub fn new(repo: C) -> Self {
        Self { repo }
    }

    pub fn list_products(&self) -> Result<Vec<Product>, DomainError> {
        self.repo.list_products()
    }

    pub fn search_products(&self, fragment: &str) -> Result<Vec<Product>, DomainError> {
        self.repo.search_products(fragment)
    }

    /// Exact, case-insensitive name lookup; the lowest id wins on duplicates.
    pub fn find_by_name(&self, name: &str) -> Result<Product, DomainError> {
        self.repo
            .find_product_by_name(name)?
            .ok_or(DomainError::NotFound("Product"))
    }

    pub fn get_product(&self, id: i32) -> Result<Product, DomainError> {
        self.repo
            .find_product(id)?
            .ok_or(DomainError::NotFound("Product"))
    }

    pub fn add_product(&self, mut product: NewProduct) -> Result<Product, DomainError> {
        if product.name.trim().is_empty() {
            return Err(DomainError::InvalidInput("product name must not be empty".into()));
        }
        if product.price < BigDecimal::from(0) {
            return Err(DomainError::InvalidInput("price must not be negative".into()));
        }
        check_price(&product.price)?;
        check_stock(product.stock_quantity)?;
        product.price = product.price.with_scale(PRICE_SCALE);
        let product = self.repo.add_product(product)?;
        log::info!("Product {} ({}) added", product.id, product.name);
        Ok(product)
    }

    pub fn set_stock(&self, id: i32, stock_quantity: i32) -> Result<Product, DomainError> {
        check_stock(stock_quantity)?;
        self.repo
            .set_stock(id, stock_quantity)?
            .ok_or(DomainError::NotFound("Product"))
    }

    pub fn add_customer(&self, customer: NewCustomer) -> Result<Customer, DomainError> {
        if customer.first_name.trim().is_empty() || customer.last_name.trim().is_empty() {
            return Err(DomainError::InvalidInput("customer name must not be empty".into()));
        }
        if !customer.email.contains('@') {
            return Err(DomainError::InvalidInput(format!(
                "invalid email '{}'",
                customer.email
            )));
        }
        if customer
            .phone
            .as_ref()
            .is_some_and(|p| p.chars().count() > MAX_PHONE_LEN)
        {
            return Err(DomainError::InvalidInput(format!(
                "phone must be at most {MAX_PHONE_LEN} characters"
            )));
        }
        self.repo.add_customer(customer)
    }

    pub fn get_customer(&self, id: i32) -> Result<Customer, DomainError> {
        self.repo
            .find_customer(id)?
            .ok_or(DomainError::NotFound("Customer"))
    }

    pub fn has_customers(&self) -> Result<bool, DomainError> {
        self.repo.has_customers()
    }

    /// Value a cart against the stored catalog.
    pub fn cart_total(&self, cart: &[CartLine]) -> Result<BigDecimal, DomainError> {
        if cart.iter().any(|l| l.quantity < 0) {
            return Err(DomainError::InvalidInput("quantity must not be negative".into()));
        }
        let products = self.repo.list_products()?;
        Ok(cart_total(cart, &products))
    }

    pub fn discounted_total(&self, items: &[PricedItem]) -> Result<BigDecimal, DomainError> {
        let (zero, hundred) = (BigDecimal::from(0), BigDecimal::from(100));
        for item in items {
            check_price(&item.price)?;
            if !fits_numeric(&item.discount_percentage, DISCOUNT_PRECISION, DISCOUNT_SCALE) {
                return Err(DomainError::InvalidInput(format!(
                    "discount for product {} has more than {} decimal places",
                    item.product_id, DISCOUNT_SCALE
                )));
            }
        }
        if let Some(bad) = items
            .iter()
            .find(|i| i.discount_percentage < zero || i.discount_percentage > hundred)
        {
            return Err(DomainError::InvalidInput(format!(
                "discount {} for product {} is outside 0..=100",
                bad.discount_percentage, bad.product_id
            )));
        }
        Ok(discounted_total(items))
    }
}

fn check_price(price: &BigDecimal) -> Result<(), DomainError> {
    if !fits_numeric(price, PRICE_PRECISION, PRICE_SCALE) {
        return Err(DomainError::InvalidInput(format!(
            "price must have at most {} integer digits and {} decimal places",
            PRICE_PRECISION - PRICE_SCALE,
            PRICE_SCALE
        )));
    }
    Ok(())
}

fn check_stock(stock_quantity: i32) -> Result<(), DomainError> {
    if stock_quantity < 0 {
        return Err(DomainError::InvalidInput("stock must not be negative".into()));
    }
    Ok(())
}
