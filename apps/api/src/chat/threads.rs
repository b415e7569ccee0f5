use std::collections::HashMap;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use redis::AsyncCommands;
use tokio::sync::RwLock;

use crate::chat::verticals::Vertical;

/// Remembers which assistant thread a signed-in user is talking on, per vertical.
/// The Assistants API cannot search threads, so the mapping lives on our side.
#[async_trait]
pub trait ThreadStore: Send + Sync {
    async fn remembered(&self, user_id: &str, vertical: Vertical) -> Result<Option<String>>;

    async fn remember(&self, user_id: &str, vertical: Vertical, thread_id: &str) -> Result<()>;

    async fn forget(&self, user_id: &str, vertical: Vertical) -> Result<()>;
}

fn thread_key(user_id: &str, vertical: Vertical) -> String {
    format!("vira:thread:{}:{}", user_id, vertical.slug())
}

/// Redis-backed store; entries expire after `ttl` of inactivity.
pub struct RedisThreadStore {
    client: redis::Client,
    ttl: Duration,
}

impl RedisThreadStore {
    pub fn new(client: redis::Client, ttl: Duration) -> Self {
        Self { client, ttl }
    }
}

#[async_trait]
impl ThreadStore for RedisThreadStore {
    async fn remembered(&self, user_id: &str, vertical: Vertical) -> Result<Option<String>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let thread_id: Option<String> = conn.get(thread_key(user_id, vertical)).await?;
        Ok(thread_id)
    }

    async fn remember(&self, user_id: &str, vertical: Vertical, thread_id: &str) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set_ex::<_, _, ()>(thread_key(user_id, vertical), thread_id, self.ttl.as_secs())
            .await?;
        Ok(())
    }

    async fn forget(&self, user_id: &str, vertical: Vertical) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.del::<_, ()>(thread_key(user_id, vertical)).await?;
        Ok(())
    }
}

/// Process-local store used when no Redis URL is configured.
#[derive(Default)]
pub struct MemoryThreadStore {
    threads: RwLock<HashMap<String, String>>,
}

#[async_trait]
impl ThreadStore for MemoryThreadStore {
    async fn remembered(&self, user_id: &str, vertical: Vertical) -> Result<Option<String>> {
        Ok(self
            .threads
            .read()
            .await
            .get(&thread_key(user_id, vertical))
            .cloned())
    }

    async fn remember(&self, user_id: &str, vertical: Vertical, thread_id: &str) -> Result<()> {
        self.threads
            .write()
            .await
            .insert(thread_key(user_id, vertical), thread_id.to_string());
        Ok(())
    }

    async fn forget(&self, user_id: &str, vertical: Vertical) -> Result<()> {
        self.threads
            .write()
            .await
            .remove(&thread_key(user_id, vertical));
        Ok(())
    }
}
