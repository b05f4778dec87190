pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;
pub mod seed;
pub mod state;
pub mod user_directory;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use db::{create_pool, DbPool};
pub use state::AppState;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub type MigrationError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), MigrationError> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    log::info!("Applied {} pending migration(s)", applied.len());
    Ok(())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::products::list_products,
        handlers::products::create_product,
        handlers::products::search_products,
        handlers::products::get_product_by_name,
        handlers::products::get_product,
        handlers::products::update_stock,
        handlers::customers::create_customer,
        handlers::customers::get_customer,
        handlers::customers::customer_revenue,
        handlers::orders::place_order,
        handlers::orders::list_orders,
        handlers::orders::get_order,
        handlers::orders::delete_order,
        handlers::orders::get_order_customer,
        handlers::cart::cart_total,
        handlers::cart::discounted_total,
        handlers::reports::revenue_by_product,
        handlers::reports::top_selling,
        handlers::directory::list_users,
        handlers::directory::get_user,
    ),
    tags(
        (name = "products", description = "Catalog and stock"),
        (name = "customers", description = "Customers and their revenue"),
        (name = "orders", description = "Order placement and lookup"),
        (name = "cart", description = "Cart valuation"),
        (name = "reports", description = "Sales reports"),
        (name = "directory", description = "External user directory"),
    )
)]
pub struct ApiDoc;

/// Register every API route. Handlers expect `web::Data<AppState>`.
pub fn routes(cfg: &mut web::ServiceConfig) {
    use handlers::{cart, customers, directory, orders, products, reports};

    cfg.service(
        web::scope("/products")
            .route("", web::get().to(products::list_products))
            .route("", web::post().to(products::create_product))
            .route("/search", web::get().to(products::search_products))
            .route("/by-name/{name}", web::get().to(products::get_product_by_name))
            .route("/{id}", web::get().to(products::get_product))
            .route("/{id}/stock", web::put().to(products::update_stock)),
    )
    .service(
        web::scope("/customers")
            .route("", web::post().to(customers::create_customer))
            .route("/{id}", web::get().to(customers::get_customer))
            .route("/{id}/revenue", web::get().to(customers::customer_revenue)),
    )
    .service(
        web::scope("/orders")
            .route("", web::post().to(orders::place_order))
            .route("", web::get().to(orders::list_orders))
            .route("/{id}", web::get().to(orders::get_order))
            .route("/{id}", web::delete().to(orders::delete_order))
            .route("/{id}/customer", web::get().to(orders::get_order_customer)),
    )
    .service(
        web::scope("/cart")
            .route("/total", web::post().to(cart::cart_total))
            .route("/discounted-total", web::post().to(cart::discounted_total)),
    )
    .service(
        web::scope("/reports")
            .route("/revenue-by-product", web::get().to(reports::revenue_by_product))
            .route("/top-selling", web::get().to(reports::top_selling)),
    )
    .service(
        web::scope("/directory")
            .route("/users", web::get().to(directory::list_users))
            .route("/users/{id}", web::get().to(directory::get_user)),
    );
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    state: AppState,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(Logger::default())
            .configure(routes)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
