use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use classhub_api::{build_router, state::AppState};
use classhub_config::{
    AppSettings, NotificationSettings, RecordStoreSettings, ReminderSettings, Settings,
};
use classhub_db::store::MemoryRecordStore;
use classhub_services::notifications::{FileBlobStorage, NotificationService, NotificationStore};
use tempfile::TempDir;
use tokio::net::TcpListener;

/// A running test application backed by an in-memory record store and a
/// notification file in its own temp directory.
pub struct TestApp {
    pub addr: SocketAddr,
    pub base_url: String,
    pub store: Arc<MemoryRecordStore>,
    pub state: AppState,
    pub settings: Settings,
    pub client: reqwest::Client,
    pub notifications_path: PathBuf,
    _data_dir: TempDir,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_settings(|_| {}).await
    }

    /// Spawn a test server with customized settings. The scheduler is never
    /// started; tests drive ticks directly through `state.scheduler()`.
    pub async fn spawn_with_settings(mutator: impl FnOnce(&mut Settings)) -> Self {
        let data_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let notifications_path = data_dir.path().join("notifications.json");

        let mut settings = test_settings(&notifications_path);
        mutator(&mut settings);

        let store = Arc::new(MemoryRecordStore::new());
        let blob = Arc::new(FileBlobStorage::new(&notifications_path));
        let notifications = Arc::new(NotificationService::new(Arc::new(
            NotificationStore::open(blob).await,
        )));
        let state = AppState::new(store.clone(), notifications, settings.clone());
        let app = build_router(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let base_url = format!("http://{}", addr);
        let client = reqwest::Client::builder()
            .build()
            .expect("Failed to build HTTP client");

        Self {
            addr,
            base_url,
            store,
            state,
            settings,
            client,
            notifications_path,
            _data_dir: data_dir,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.get(self.url(path))
    }

    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.post(self.url(path))
    }

    pub fn put(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.put(self.url(path))
    }

    pub fn delete(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.delete(self.url(path))
    }
}

fn test_settings(notifications_path: &std::path::Path) -> Settings {
    Settings {
        app: AppSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec![],
        },
        record_store: RecordStoreSettings {
            url: "memory://test".to_string(),
            project_id: String::new(),
            public_key: String::new(),
            timeout_secs: 5,
            seed_path: None,
        },
        notifications: NotificationSettings {
            storage_path: notifications_path.to_string_lossy().into_owned(),
        },
        reminders: ReminderSettings {
            enabled: false,
            ..ReminderSettings::default()
        },
    }
}
