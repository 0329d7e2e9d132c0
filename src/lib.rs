pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::cache::KeyValueStore;
use crate::core::config::AppConfig;
use crate::core::connectivity::ConnectivityMonitor;
use crate::core::favorites::FavoritesRegistry;
use crate::core::metals::Metal;
use crate::core::rate_manager::RateCacheManager;
use crate::core::rates::RateProvider;
use crate::providers::OpenErApiProvider;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub enum AppCommand {
    Convert {
        amount: f64,
        from: Option<String>,
        to: Option<String>,
        swap: bool,
    },
    Rates {
        base: Option<String>,
        query: Option<String>,
    },
    Metal {
        metal: Metal,
        query: Option<String>,
        grams: bool,
    },
    Pick {
        query: Option<String>,
    },
    Favorites(FavoritesAction),
    Watch {
        base: Option<String>,
    },
}

pub enum FavoritesAction {
    List,
    Toggle(String),
}

/// Shared services for one invocation.
pub struct AppContext {
    pub config: AppConfig,
    pub store: Arc<dyn KeyValueStore>,
    pub connectivity: Arc<ConnectivityMonitor>,
    pub manager: Arc<RateCacheManager>,
}

impl AppContext {
    /// Wires the store, exchange provider, connectivity monitor and rate
    /// manager from `config`. `offline` forces offline mode on top of the
    /// configured value.
    pub fn new(config: AppConfig, offline: bool) -> Result<Self> {
        let exchange = &config.providers.exchange;
        let provider = OpenErApiProvider::new(
            &exchange.base_url,
            Duration::from_secs(exchange.timeout_secs),
        )?;
        Ok(Self::with_provider(config, Arc::new(provider), offline))
    }

    pub fn with_provider(
        config: AppConfig,
        provider: Arc<dyn RateProvider>,
        offline: bool,
    ) -> Self {
        let store = store::open_store(&config);
        let connectivity = Arc::new(ConnectivityMonitor::new(offline || config.offline));
        let manager = Arc::new(RateCacheManager::new(
            provider,
            Arc::clone(&store),
            connectivity.subscribe(),
        ));
        AppContext {
            config,
            store,
            connectivity,
            manager,
        }
    }

    pub fn favorites(&self) -> Result<FavoritesRegistry> {
        FavoritesRegistry::load(Arc::clone(&self.store), &self.config.favorites)
    }
}

pub async fn run_command(
    command: AppCommand,
    config_path: Option<&str>,
    offline: bool,
) -> Result<()> {
    info!("xcur starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let ctx = AppContext::new(config, offline)?;

    match command {
        AppCommand::Convert {
            amount,
            from,
            to,
            swap,
        } => cli::convert::run(&ctx, amount, from.as_deref(), to.as_deref(), swap).await,
        AppCommand::Rates { base, query } => {
            cli::rates::run(&ctx, base.as_deref(), query.as_deref()).await
        }
        AppCommand::Metal {
            metal,
            query,
            grams,
        } => cli::metals::run(&ctx, metal, query.as_deref(), grams).await,
        AppCommand::Pick { query } => cli::picker::run(&ctx, query.as_deref()).await,
        AppCommand::Favorites(action) => cli::favorites::run(&ctx, action),
        AppCommand::Watch { base } => cli::watch::run(&ctx, base.as_deref()).await,
    }
}
