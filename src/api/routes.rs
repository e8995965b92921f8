use axum::{routing::get, Router};

use crate::api::handlers::{self, AppState};
use crate::store::traits::Store;

pub fn create_router<S: Store + 'static>() -> Router<AppState<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Canonical entity location, target of every self link
        .route("/:repository/:id", get(handlers::get_entity::<S>))
        // Property references
        .route(
            "/:repository/:id/:property",
            get(handlers::follow_property_reference::<S>)
                .post(handlers::append_property_reference::<S>)
                .put(handlers::replace_property_reference::<S>)
                .delete(handlers::delete_property_reference::<S>),
        )
        .route(
            "/:repository/:id/:property/:property_id",
            get(handlers::follow_property_reference_id::<S>)
                .delete(handlers::delete_property_reference_id::<S>),
        )
}
