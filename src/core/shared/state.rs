use crate::contacts::{ContactBook, ContactRepository, InMemoryContactRepository};
use crate::core::config::AppConfig;
use crate::core::shared::store::UnavailableStore;
use crate::leads::{InMemoryLeadRepository, JsonFileLeadRepository, LeadRepository};
use crate::pipeline::{InMemoryPipelineRepository, PipelineBoard, PipelineRepository};
use crate::qr::QrRenderer;
use log::{error, info, warn};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct AppState {
    pub config: AppConfig,
    pub leads: Arc<dyn LeadRepository>,
    pub pipeline: Arc<dyn PipelineRepository>,
    pub contacts: Arc<dyn ContactRepository>,
    pub renderer: QrRenderer,
    /// Per-user board as last shown, including optimistic moves the backing
    /// store did not accept. Keyed by user id.
    pub boards: Mutex<HashMap<String, PipelineBoard>>,
    pub contact_books: Mutex<HashMap<String, ContactBook>>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        leads: Arc<dyn LeadRepository>,
        pipeline: Arc<dyn PipelineRepository>,
        contacts: Arc<dyn ContactRepository>,
    ) -> Self {
        let renderer = QrRenderer::new(config.render.clone());
        Self {
            config,
            leads,
            pipeline,
            contacts,
            renderer,
            boards: Mutex::new(HashMap::new()),
            contact_books: Mutex::new(HashMap::new()),
        }
    }

    pub fn in_memory(config: AppConfig) -> Self {
        Self::new(
            config,
            Arc::new(InMemoryLeadRepository::new()),
            Arc::new(InMemoryPipelineRepository::new()),
            Arc::new(InMemoryContactRepository::new()),
        )
    }

    /// Picks backends from the store configuration: Postgres when a database
    /// URL is set, otherwise a JSON leads file, otherwise memory.
    pub async fn from_config(config: AppConfig) -> Result<Self, anyhow::Error> {
        if let Some(database_url) = config.store.database_url.clone() {
            return Ok(Self::with_database(config, &database_url));
        }

        let pipeline: Arc<dyn PipelineRepository> = Arc::new(InMemoryPipelineRepository::new());
        let contacts: Arc<dyn ContactRepository> = Arc::new(InMemoryContactRepository::new());

        match config.store.leads_file.clone() {
            Some(path) => {
                let leads = JsonFileLeadRepository::open(&path).await?;
                info!("Captured leads persisted to {}", path.display());
                Ok(Self::new(config, Arc::new(leads), pipeline, contacts))
            }
            None => {
                warn!("No DATABASE_URL or LEADS_FILE configured, all data is kept in memory");
                Ok(Self::new(
                    config,
                    Arc::new(InMemoryLeadRepository::new()),
                    pipeline,
                    contacts,
                ))
            }
        }
    }

    #[cfg(feature = "postgres")]
    fn with_database(config: AppConfig, database_url: &str) -> Self {
        use crate::contacts::PgContactRepository;
        use crate::core::shared::utils::{create_pool, run_migrations};
        use crate::leads::PgLeadRepository;
        use crate::pipeline::PgPipelineRepository;

        let pool = match create_pool(database_url) {
            Ok(pool) => pool,
            Err(e) => {
                error!("Database unavailable, serving placeholder data: {e}");
                return Self::unavailable(config, e.to_string());
            }
        };
        if let Err(e) = run_migrations(&pool) {
            error!("Failed to run migrations: {e}");
        }
        info!("Connected to database");

        Self::new(
            config,
            Arc::new(PgLeadRepository::new(pool.clone())),
            Arc::new(PgPipelineRepository::new(pool.clone())),
            Arc::new(PgContactRepository::new(pool)),
        )
    }

    #[cfg(not(feature = "postgres"))]
    fn with_database(config: AppConfig, _database_url: &str) -> Self {
        error!("DATABASE_URL is set but this build has no postgres support");
        Self::unavailable(config, "postgres support not compiled in".to_string())
    }

    /// Captured leads stay process-local; pipeline and contacts fail over to
    /// placeholders.
    fn unavailable(config: AppConfig, reason: String) -> Self {
        let store = Arc::new(UnavailableStore::new(reason));
        Self::new(
            config,
            Arc::new(InMemoryLeadRepository::new()),
            store.clone(),
            store,
        )
    }
}
