use std::sync::Arc;

use classhub_api::{build_router, state::AppState};
use classhub_config::Settings;
use classhub_db::{connect, tables::verify_tables};
use classhub_services::notifications::{FileBlobStorage, NotificationService, NotificationStore};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file (silently ignore if missing)
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "classhub_api=debug,classhub_services=debug,classhub_db=debug,tower_http=debug".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::load()?;
    info!("Starting ClassHub API on {}:{}", settings.app.host, settings.app.port);

    let store = connect(&settings).await?;
    if let Err(e) = verify_tables(store.as_ref()).await {
        warn!(error = %e, "Record store tables could not be verified");
    }

    let blob = Arc::new(FileBlobStorage::new(&settings.notifications.storage_path));
    let notification_store = Arc::new(NotificationStore::open(blob).await);
    let notifications = Arc::new(NotificationService::new(notification_store));

    let app_state = AppState::new(store, notifications, settings.clone());

    if settings.reminders.enabled {
        Arc::new(app_state.scheduler()).spawn();
    } else {
        info!("Reminder scheduler disabled");
    }

    let app = build_router(app_state);

    let addr = format!("{}:{}", settings.app.host, settings.app.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
