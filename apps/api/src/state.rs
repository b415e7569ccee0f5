use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::assistant::AssistantsApi;
use crate::chat::threads::ThreadStore;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub s3: S3Client,
    /// OpenAI Assistants client. A trait object so chat can run against a fake.
    pub assistants: Arc<dyn AssistantsApi>,
    /// Remembered thread per (user, vertical). Redis in production.
    pub threads: Arc<dyn ThreadStore>,
    pub config: Config,
}

#[cfg(test)]
impl AppState {
    /// State whose database and object store are never reachable; enough for
    /// routes that do not touch them.
    pub fn for_tests(config: Config, assistants: Arc<dyn AssistantsApi>) -> Self {
        use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
        use sqlx::postgres::PgPoolOptions;

        let db = PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(200))
            .connect_lazy(&config.database_url)
            .expect("lazy pool");
        let s3 = S3Client::from_conf(
            aws_sdk_s3::Config::builder()
                .behavior_version(BehaviorVersion::latest())
                .region(Region::new("us-east-1"))
                .credentials_provider(Credentials::new(
                    &config.aws_access_key_id,
                    &config.aws_secret_access_key,
                    None,
                    None,
                    "vira-test",
                ))
                .endpoint_url(&config.s3_endpoint)
                .force_path_style(true)
                .build(),
        );

        AppState {
            db,
            s3,
            assistants,
            threads: Arc::new(crate::chat::threads::MemoryThreadStore::default()),
            config,
        }
    }
}
