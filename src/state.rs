use std::sync::Arc;

use anyhow::Context;

use crate::config::{AppConfig, StoreBackend};
use crate::store::{MemoryStore, PgStore, Store};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store = match config.store {
            StoreBackend::Postgres => {
                let url = config
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL is not set")?;
                let pg = PgStore::connect(url).await?;
                pg.migrate().await?;
                Arc::new(pg) as Arc<dyn Store>
            }
            StoreBackend::Memory => {
                tracing::warn!("using in-memory store; data is lost on restart");
                Arc::new(MemoryStore::default()) as Arc<dyn Store>
            }
        };

        Ok(Self { store, config })
    }

    pub fn from_parts(store: Arc<dyn Store>, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        Self::fake_with(crate::config::TrackingConfig::default())
    }

    #[cfg(test)]
    pub fn fake_with(tracking: crate::config::TrackingConfig) -> Self {
        let config = Arc::new(AppConfig {
            store: StoreBackend::Memory,
            database_url: None,
            jwt: crate::config::JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
                refresh_ttl_minutes: 60,
            },
            tracking,
        });
        Self::from_parts(Arc::new(MemoryStore::default()), config)
    }
}
