// src/core/state.rs

//! Defines the central `ServerState` struct, holding all shared services.

use crate::config::Config;
use crate::core::CadenzaError;
use crate::core::catalog::{CatalogService, CatalogStore, FsCatalogStore};
use crate::core::identity::{FsUserStore, UserDirectory, UserStore};
use crate::core::report::ErrorReporter;
use crate::core::session::SessionRegistry;
use crate::core::streaming::{AudioLibrary, FsAudioLibrary, StreamingCoordinator};
use std::sync::Arc;
use tracing::info;

/// The central struct holding all shared, server-wide state. Wrapped in an
/// `Arc` and handed to every connection handler and stream task.
pub struct ServerState {
    pub config: Config,
    pub sessions: Arc<SessionRegistry>,
    pub users: UserDirectory,
    pub catalog: CatalogService,
    pub streaming: Arc<StreamingCoordinator>,
    pub reporter: ErrorReporter,
}

impl ServerState {
    /// Builds the production state with filesystem-backed stores, creating
    /// missing data files and directories first.
    pub async fn initialize(config: Config) -> Result<Arc<Self>, CadenzaError> {
        ensure_data_files(&config).await?;

        let user_store = Arc::new(FsUserStore::new(config.storage.users_file.clone()));
        let catalog_store = Arc::new(FsCatalogStore::new(
            config.storage.songs_file.clone(),
            config.storage.playlists_dir.clone(),
        ));
        let library = Arc::new(FsAudioLibrary::new(config.streaming.music_dir.clone()));

        Self::assemble(config, user_store, catalog_store, library).await
    }

    /// Builds the state from injected stores. Production goes through
    /// [`Self::initialize`]; tests inject in-memory implementations here.
    pub async fn assemble(
        config: Config,
        user_store: Arc<dyn UserStore>,
        catalog_store: Arc<dyn CatalogStore>,
        library: Arc<dyn AudioLibrary>,
    ) -> Result<Arc<Self>, CadenzaError> {
        let sessions = Arc::new(SessionRegistry::new());
        let users = UserDirectory::load(user_store).await?;
        let catalog = CatalogService::load(catalog_store).await?;
        let streaming = Arc::new(StreamingCoordinator::new(
            library,
            sessions.clone(),
            config.streaming.chunk_size,
            config.streaming.chunk_pause,
        ));
        let reporter = ErrorReporter::new(config.storage.errors_file.clone());

        info!("Loaded {} users into the identity directory.", users.len());

        Ok(Arc::new(Self {
            config,
            sessions,
            users,
            catalog,
            streaming,
            reporter,
        }))
    }
}

/// Creates any missing data files and directories so a fresh checkout can
/// start without manual setup.
async fn ensure_data_files(config: &Config) -> Result<(), CadenzaError> {
    use tokio::fs;

    for file in [&config.storage.users_file, &config.storage.songs_file] {
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent).await?;
        }
        if fs::metadata(file).await.is_err() {
            fs::write(file, b"").await?;
        }
    }
    fs::create_dir_all(&config.storage.playlists_dir).await?;
    fs::create_dir_all(&config.streaming.music_dir).await?;
    if let Some(parent) = config.storage.errors_file.parent() {
        fs::create_dir_all(parent).await?;
    }
    Ok(())
}
