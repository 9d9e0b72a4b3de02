//! State storage implementation
//!
//! This module defines the key-value persistence contract behind the state
//! accessors and ships two backends: an in-process map and Redis.
//! Values are JSON documents; a turn reads all of its keys in one call and
//! writes all of its changes in one atomic batch.

use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use redis::AsyncCommands;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, error};
use crate::utils::errors::Result;
use crate::config::RedisConfig;
use super::accessor::StateScope;

/// One pending write produced by a turn
#[derive(Debug, Clone, PartialEq)]
pub struct StateChange {
    pub key: String,
    pub scope: StateScope,
    pub value: Value,
}

/// Persistence contract for turn state
#[async_trait]
pub trait StateStorage: Send + Sync + std::fmt::Debug {
    /// Read the given keys; absent keys are omitted from the result
    async fn read(&self, keys: &[String]) -> Result<HashMap<String, Value>>;

    /// Write all changes atomically
    async fn write(&self, changes: &[StateChange]) -> Result<()>;

    /// Delete the given keys
    async fn delete(&self, keys: &[String]) -> Result<()>;
}

/// In-process storage for tests and single-node runs
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<RwLock<HashMap<String, Value>>>,
}

impl MemoryStorage {
    /// Create an empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a storage pre-populated with entries
    pub fn with_entries(entries: HashMap<String, Value>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(entries)),
        }
    }

    /// Copy of every stored entry
    pub async fn snapshot(&self) -> HashMap<String, Value> {
        self.entries.read().await.clone()
    }

    /// Number of stored keys
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether nothing is stored
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl StateStorage for MemoryStorage {
    async fn read(&self, keys: &[String]) -> Result<HashMap<String, Value>> {
        let entries = self.entries.read().await;
        Ok(keys
            .iter()
            .filter_map(|key| entries.get(key).map(|value| (key.clone(), value.clone())))
            .collect())
    }

    async fn write(&self, changes: &[StateChange]) -> Result<()> {
        let mut entries = self.entries.write().await;
        for change in changes {
            entries.insert(change.key.clone(), change.value.clone());
        }
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<()> {
        let mut entries = self.entries.write().await;
        for key in keys {
            entries.remove(key);
        }
        Ok(())
    }
}

/// Redis-based state storage
#[derive(Clone)]
pub struct RedisStorage {
    /// Redis connection manager
    connection_manager: redis::aio::ConnectionManager,
    /// Redis configuration
    config: RedisConfig,
}

impl RedisStorage {
    /// Create a new Redis storage instance
    pub async fn new(config: RedisConfig) -> Result<Self> {
        let client = redis::Client::open(config.url.as_str())?;
        let connection_manager = redis::aio::ConnectionManager::new(client).await?;

        Ok(Self {
            connection_manager,
            config,
        })
    }

    /// Test Redis connection
    pub async fn test_connection(&self) -> Result<()> {
        let mut conn = self.connection_manager.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    /// Redis key for a storage key
    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.config.prefix, key)
    }

    /// Expiry applied to a change, `None` for keys that never expire
    fn ttl_for(&self, scope: StateScope) -> Option<u64> {
        match scope {
            StateScope::Conversation if self.config.ttl_seconds > 0 => Some(self.config.ttl_seconds),
            _ => None,
        }
    }
}

#[async_trait]
impl StateStorage for RedisStorage {
    async fn read(&self, keys: &[String]) -> Result<HashMap<String, Value>> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let full_keys: Vec<String> = keys.iter().map(|key| self.full_key(key)).collect();
        let mut conn = self.connection_manager.clone();

        let raw: Vec<Option<String>> = match redis::cmd("MGET").arg(&full_keys).query_async(&mut conn).await {
            Ok(data) => data,
            Err(e) => {
                error!(error = %e, keys = ?full_keys, "Failed to read state from Redis");
                return Err(e.into());
            }
        };

        let mut values = HashMap::new();
        for (key, data) in keys.iter().zip(raw) {
            if let Some(data) = data {
                debug!(key = %key, data_length = data.len(), "Deserializing state document");
                let value: Value = serde_json::from_str(&data)?;
                values.insert(key.clone(), value);
            }
        }

        Ok(values)
    }

    async fn write(&self, changes: &[StateChange]) -> Result<()> {
        if changes.is_empty() {
            return Ok(());
        }

        let mut pipe = redis::pipe();
        pipe.atomic();
        for change in changes {
            let key = self.full_key(&change.key);
            let serialized = serde_json::to_string(&change.value)?;
            match self.ttl_for(change.scope) {
                Some(ttl) => pipe.set_ex(key, serialized, ttl).ignore(),
                None => pipe.set(key, serialized).ignore(),
            };
        }

        let mut conn = self.connection_manager.clone();
        match pipe.query_async::<_, ()>(&mut conn).await {
            Ok(()) => {
                debug!(changes = changes.len(), "State batch written to Redis");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to write state batch to Redis");
                Err(e.into())
            }
        }
    }

    async fn delete(&self, keys: &[String]) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }

        let full_keys: Vec<String> = keys.iter().map(|key| self.full_key(key)).collect();
        let mut conn = self.connection_manager.clone();
        let deleted: u32 = conn.del(&full_keys).await?;

        debug!(requested = keys.len(), deleted = deleted, "Deleted state keys");
        Ok(())
    }
}

impl std::fmt::Debug for RedisStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStorage")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
