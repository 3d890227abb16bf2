use std::sync::{Arc, Mutex};
use std::time::Duration;

use signalpost::auth::{Principal, StaticTokenAuthorizer};
use signalpost::config::load_config;
use signalpost::dispatch::DispatchEngine;
use signalpost::persistence::{MessageStore, SledStore, run_expiry_sweep};
use signalpost::registry::SubscriptionRegistry;
use signalpost::transport::websocket::start_websocket_server;
use signalpost::utils::logging;

#[tokio::main]
async fn main() {
    let config = load_config().expect("Failed to load configuration");
    logging::init(&config.log.level);

    let store = Arc::new(
        SledStore::open(&config.storage.db_path).expect("Failed to open message store"),
    );
    let registry = Arc::new(Mutex::new(SubscriptionRegistry::new()));
    let engine = Arc::new(DispatchEngine::new(
        store.clone(),
        registry,
        config.retention_policy(),
    ));

    let mut authorizer = StaticTokenAuthorizer::new();
    for grant in &config.auth.tokens {
        authorizer.grant(
            &grant.token,
            Principal {
                id: grant.principal.clone(),
                kind: grant.kind,
            },
        );
    }

    let sweep_store: Arc<dyn MessageStore> = store;
    tokio::spawn(run_expiry_sweep(
        sweep_store,
        Duration::from_secs(config.retention.sweep_interval_secs),
    ));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    start_websocket_server(&addr, engine, Arc::new(authorizer)).await;
}
