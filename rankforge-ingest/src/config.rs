use std::num::NonZero;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Deserialize, Serialize)]
pub struct IngestConfig {
    pub database_url: String,
    pub db_pool_size: u32,
    /// Files ingested concurrently, one thread and one pooled connection
    /// each. Defaults to the machine's available parallelism.
    pub ingest_parallelism: Option<NonZero<usize>>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            database_url: "postgres://localhost/rankforge".to_string(),
            db_pool_size: 10,
            ingest_parallelism: None,
        }
    }
}

impl IngestConfig {
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file("RankForge.toml"))
            .merge(Env::prefixed("RANKFORGE_"))
    }

    pub fn load() -> figment::Result<Self> {
        Self::figment().extract()
    }

    pub fn parallelism(&self) -> usize {
        self.ingest_parallelism
            .map(NonZero::get)
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(NonZero::get)
                    .unwrap_or(1)
            })
    }
}
