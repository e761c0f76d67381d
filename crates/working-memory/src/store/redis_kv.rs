//! Redis-backed [`KvStore`].
//!
//! Uses a `ConnectionManager`, which multiplexes one connection and
//! reconnects on failure; it is cheap to clone per command. Timeouts and
//! retries are the connection's business and surface here as `Error::Store`.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use wm_domain::error::{Error, Result};

use super::{IndexEntry, IndexPage, KvStore};

#[derive(Clone)]
pub struct RedisKvStore {
    conn: ConnectionManager,
}

impl RedisKvStore {
    /// Connect to `url` (e.g. `redis://127.0.0.1:6379/0`).
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(store_err)?;
        let conn = ConnectionManager::new(client).await.map_err(store_err)?;
        tracing::info!(url = %redacted(url), "connected to redis");
        Ok(Self { conn })
    }
}

#[async_trait]
impl KvStore for RedisKvStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn.clone();
        let value: Option<Vec<u8>> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(store_err)?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(value.as_slice())
            .query_async(&mut conn)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn set_ex(&self, key: &str, ttl_seconds: u64, value: Vec<u8>) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = redis::cmd("SETEX")
            .arg(key)
            .arg(ttl_seconds)
            .arg(value.as_slice())
            .query_async(&mut conn)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn set_indexed(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl_seconds: Option<u64>,
        index: IndexEntry<'_>,
    ) -> Result<()> {
        let mut conn = self.conn.clone();
        let mut pipe = redis::pipe();
        pipe.atomic();
        match ttl_seconds {
            Some(ttl) => pipe.cmd("SETEX").arg(key).arg(ttl).arg(value.as_slice()),
            None => pipe.cmd("SET").arg(key).arg(value.as_slice()),
        }
        .ignore();
        pipe.cmd("ZADD")
            .arg(index.index_key)
            .arg(index.score)
            .arg(index.member)
            .ignore();

        let _: () = pipe.query_async(&mut conn).await.map_err(store_err)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let _removed: i64 = redis::cmd("DEL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn index_add(&self, index_key: &str, member: &str, score: f64) -> Result<()> {
        let mut conn = self.conn.clone();
        let _added: i64 = redis::cmd("ZADD")
            .arg(index_key)
            .arg(score)
            .arg(member)
            .query_async(&mut conn)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn index_page(&self, index_key: &str, start: usize, stop: usize) -> Result<IndexPage> {
        let mut conn = self.conn.clone();
        // Redis ranks are signed 64-bit.
        let (start, stop) = (rank(start), rank(stop));
        // MULTI/EXEC so both reads see the same index.
        let (total, members): (u64, Vec<String>) = redis::pipe()
            .atomic()
            .cmd("ZCARD")
            .arg(index_key)
            .cmd("ZRANGE")
            .arg(index_key)
            .arg(start)
            .arg(stop)
            .query_async(&mut conn)
            .await
            .map_err(store_err)?;
        Ok(IndexPage { total, members })
    }
}

fn rank(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn store_err(e: redis::RedisError) -> Error {
    Error::Store(e.to_string())
}

/// Hide the password part of a connection URL for logging.
fn redacted(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_owned(),
    }
}
