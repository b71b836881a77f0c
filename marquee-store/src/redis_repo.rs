use redis::RedisResult;
use tracing::info;
use uuid::Uuid;

#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

impl RedisClient {
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }

    fn seat_key(show_id: &Uuid, seat_id: &str) -> String {
        format!("seat:{}:{}", show_id, seat_id)
    }

    /// All-or-nothing distributed mirror of a hold batch. The Lua script
    /// refuses the whole batch if any seat key already exists, matching
    /// the engine's first-committer-wins rule, then stamps every key with
    /// the batch id and TTL in one atomic step.
    pub async fn mirror_hold_batch(
        &self,
        show_id: &Uuid,
        seat_ids: &[String],
        batch_id: &Uuid,
        ttl_seconds: u64,
    ) -> RedisResult<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let script = redis::Script::new(
            r#"
            for i, key in ipairs(KEYS) do
                if redis.call("EXISTS", key) == 1 then
                    return 0
                end
            end
            for i, key in ipairs(KEYS) do
                redis.call("SET", key, ARGV[1], "EX", ARGV[2])
            end
            return 1
            "#,
        );

        let mut invocation = script.prepare_invoke();
        for seat in seat_ids {
            invocation.key(Self::seat_key(show_id, seat));
        }
        invocation.arg(batch_id.to_string()).arg(ttl_seconds);

        let acquired: i32 = invocation.invoke_async(&mut conn).await?;
        if acquired == 1 {
            info!(%show_id, %batch_id, seats = seat_ids.len(), "hold batch mirrored");
        }
        Ok(acquired == 1)
    }

    /// Drop the TTL on confirmed seats so the mirror keeps them until the
    /// booking is cancelled.
    pub async fn persist_seat_keys(&self, show_id: &Uuid, seat_ids: &[String]) -> RedisResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let mut pipe = redis::pipe();
        for seat in seat_ids {
            pipe.cmd("PERSIST").arg(Self::seat_key(show_id, seat)).ignore();
        }
        pipe.query_async::<_, ()>(&mut conn).await
    }

    pub async fn release_seat_keys(&self, show_id: &Uuid, seat_ids: &[String]) -> RedisResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let mut pipe = redis::pipe();
        for seat in seat_ids {
            pipe.cmd("DEL").arg(Self::seat_key(show_id, seat)).ignore();
        }
        pipe.query_async::<_, ()>(&mut conn).await
    }

    /// Fixed-window counter. Returns true while the caller is under the
    /// limit.
    pub async fn check_rate_limit(
        &self,
        key: &str,
        limit: i64,
        window_seconds: i64,
    ) -> RedisResult<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let (count,): (i64,) = redis::pipe()
            .atomic()
            .cmd("INCR")
            .arg(key)
            .cmd("EXPIRE")
            .arg(key)
            .arg(window_seconds)
            .ignore()
            .query_async(&mut conn)
            .await?;

        Ok(count <= limit)
    }
}
