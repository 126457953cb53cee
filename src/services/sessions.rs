//! Session persistence backed by Redis

use async_trait::async_trait;
use redis::{AsyncCommands, Client};

use crate::{
    error::{AppError, AppResult},
    models::Session,
};

/// Storage for per-visitor session state
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load a session; `None` when unknown or expired
    async fn load(&self, id: &str) -> AppResult<Option<Session>>;
    async fn save(&self, session: &Session) -> AppResult<()>;
}

#[derive(Clone)]
pub struct RedisSessionStore {
    client: Client,
    ttl_seconds: u64,
}

impl RedisSessionStore {
    /// Create a new Redis session store
    pub async fn new(url: &str, ttl_seconds: u64) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;

        // Test connection
        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to connect to Redis: {}", e)))?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Redis connection test failed: {}", e)))?;

        Ok(Self { client, ttl_seconds })
    }

    fn key(id: &str) -> String {
        format!("session:{}", id)
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get Redis connection: {}", e)))
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, id: &str) -> AppResult<Option<Session>> {
        let mut conn = self.connection().await?;

        let stored: Option<String> = conn
            .get(Self::key(id))
            .await
            .map_err(|e| AppError::Internal(format!("Failed to read session from Redis: {}", e)))?;

        match stored {
            Some(payload) => match serde_json::from_str::<Session>(&payload) {
                Ok(session) => Ok(Some(session)),
                Err(e) => {
                    tracing::warn!("Discarding unreadable session {}: {}", id, e);
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    async fn save(&self, session: &Session) -> AppResult<()> {
        let mut conn = self.connection().await?;

        let payload = serde_json::to_string(session)
            .map_err(|e| AppError::Internal(format!("Failed to encode session: {}", e)))?;

        conn.set_ex::<_, _, ()>(Self::key(&session.id), payload, self.ttl_seconds)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to store session in Redis: {}", e)))?;

        Ok(())
    }
}
