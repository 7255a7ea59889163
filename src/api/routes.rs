// src/api/routes.rs
use actix_web::web;
use crate::api::handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(handlers::health_check))
            .route("/analytics/system", web::get().to(handlers::system_analytics))
            .route("/analytics/customers", web::get().to(handlers::list_customers))
            // Must stay ahead of the {customer_id} route
            .route("/analytics/customers/search", web::get().to(handlers::search_customer))
            .route("/analytics/customers/{customer_id}", web::get().to(handlers::customer_usage))
            .default_service(web::route().to(handlers::not_found))
    );
}
