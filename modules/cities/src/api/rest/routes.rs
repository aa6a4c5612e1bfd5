use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};

use crate::api::rest::handlers;
use crate::config::CitiesConfig;
use crate::domain::service::Service;

/// Mount the cities REST surface on `router`.
///
/// The service is injected here once by the composition root; handlers pull
/// it back out as an `Extension`.
pub fn register_routes(router: Router, service: Arc<Service>, config: &CitiesConfig) -> Router {
    let v1 = Router::new()
        .route("/cities", get(handlers::list_cities))
        .route("/city", post(handlers::create_city))
        .route(
            "/city/{name}",
            get(handlers::get_city)
                .delete(handlers::delete_city)
                .patch(handlers::update_city),
        );

    router
        .route("/", get(handlers::list_all_cities))
        .nest("/v1", v1)
        .layer(Extension(service))
        .layer(Extension(config.clone()))
}
