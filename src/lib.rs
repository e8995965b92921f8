pub mod api;
pub mod config;
pub mod logic;
pub mod model;
pub mod seed;
pub mod store;

use std::sync::Arc;

use anyhow::Result;

// Export API types
pub use api::handlers;
pub use api::routes;

// Export logic types
pub use logic::{
    BaseUriLinks, EventPublisher, LinkEventListener, LinkRenderer, LinkUpdate, LoggingListener,
    ReferenceError, ReferenceService,
};

// Export all model types
pub use model::*;

// Export store types
pub use store::{EntityStore, MemoryStore, PostgresStore, Store};

use crate::api::handlers::AppContext;
use crate::config::AppConfig;

/// Load the configured schema file, or the built-in demo schema
pub fn load_schema(config: &AppConfig) -> Result<Schema> {
    match &config.schema.path {
        Some(path) => {
            log::info!("Loading schema from {}", path);
            Schema::load_from_file(path)
        }
        None => {
            let schema = seed::demo_schema();
            schema.validate()?;
            Ok(schema)
        }
    }
}

/// Build the router for a store and schema, with a logging event listener
pub async fn build_app<S: Store + 'static>(store: S, config: &AppConfig) -> Result<axum::Router> {
    let schema = load_schema(config)?;

    if config.load_seed_data() {
        log::info!("Loading seed data...");
        seed::load_seed_data(&store).await?;
    }

    let events = EventPublisher::new().with_listener(Arc::new(LoggingListener));
    let context =
        AppContext::new(store, schema, events).with_base_uri(config.server.base_uri.clone());

    Ok(api::routes::create_router::<S>().with_state(Arc::new(context)))
}
