//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::{PersistenceBackend, ServerConfig};
use crate::domain::{BlogPost, ContactSubmission, EmailSubscriber, GalleryImage, Record, seed};
use crate::error::CmsError;
use crate::persistence::{
    JsonFileRepository, MemoryRepository, PostgresRepository, Repository, postgres,
};
use crate::service::{AuthService, ResourceService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Blog posts.
    pub blogs: Arc<ResourceService<BlogPost>>,
    /// Gallery images.
    pub gallery: Arc<ResourceService<GalleryImage>>,
    /// Contact form submissions.
    pub contacts: Arc<ResourceService<ContactSubmission>>,
    /// Newsletter subscribers.
    pub subscribers: Arc<ResourceService<EmailSubscriber>>,
    /// Admin sign-in and sessions.
    pub auth: Arc<AuthService>,
}

impl AppState {
    /// Builds the repositories selected by `config` and seeds empty
    /// collections when demo data is enabled.
    ///
    /// # Errors
    ///
    /// Returns [`CmsError::Persistence`] if the backend cannot be opened.
    pub async fn from_config(config: &ServerConfig) -> Result<Self, CmsError> {
        let state = match config.persistence {
            PersistenceBackend::Memory => Self::with_repositories(
                config,
                Arc::new(MemoryRepository::new()),
                Arc::new(MemoryRepository::new()),
                Arc::new(MemoryRepository::new()),
                Arc::new(MemoryRepository::new()),
            ),
            PersistenceBackend::File => Self::with_repositories(
                config,
                Arc::new(open_file::<BlogPost>(config).await?),
                Arc::new(open_file::<GalleryImage>(config).await?),
                Arc::new(open_file::<ContactSubmission>(config).await?),
                Arc::new(open_file::<EmailSubscriber>(config).await?),
            ),
            PersistenceBackend::Postgres => {
                let pool = postgres::connect(
                    &config.database_url,
                    config.database_max_connections,
                    config.database_connect_timeout,
                )
                .await?;
                Self::with_repositories(
                    config,
                    Arc::new(PostgresRepository::new(pool.clone())),
                    Arc::new(PostgresRepository::new(pool.clone())),
                    Arc::new(PostgresRepository::new(pool.clone())),
                    Arc::new(PostgresRepository::new(pool)),
                )
            }
        };

        if config.seed_demo_data {
            state.seed().await?;
        }
        tracing::info!(backend = ?config.persistence, "application state ready");
        Ok(state)
    }

    /// In-memory state, seeded when `config.seed_demo_data` is set.
    ///
    /// # Errors
    ///
    /// Propagates seeding failures.
    pub async fn in_memory(config: &ServerConfig) -> Result<Self, CmsError> {
        let config = ServerConfig {
            persistence: PersistenceBackend::Memory,
            ..config.clone()
        };
        Self::from_config(&config).await
    }

    /// Wires services over the given repositories.
    #[must_use]
    pub fn with_repositories(
        config: &ServerConfig,
        blogs: Arc<dyn Repository<BlogPost>>,
        gallery: Arc<dyn Repository<GalleryImage>>,
        contacts: Arc<dyn Repository<ContactSubmission>>,
        subscribers: Arc<dyn Repository<EmailSubscriber>>,
    ) -> Self {
        Self {
            blogs: Arc::new(ResourceService::new(blogs)),
            gallery: Arc::new(ResourceService::new(gallery)),
            contacts: Arc::new(ResourceService::new(contacts)),
            subscribers: Arc::new(ResourceService::new(subscribers)),
            auth: Arc::new(AuthService::new(
                config.admin_username.clone(),
                config.admin_password.clone(),
                config.session_ttl,
            )),
        }
    }

    async fn seed(&self) -> Result<(), CmsError> {
        self.blogs.seed_if_empty(seed::blogs()).await?;
        self.gallery.seed_if_empty(seed::gallery()).await?;
        self.contacts.seed_if_empty(seed::contacts()).await?;
        self.subscribers.seed_if_empty(seed::subscribers()).await?;
        Ok(())
    }
}

async fn open_file<R: Record>(config: &ServerConfig) -> Result<JsonFileRepository<R>, CmsError> {
    let path = config
        .data_dir
        .join(format!("{}.json", R::KIND.collection()));
    JsonFileRepository::open(path).await
}
