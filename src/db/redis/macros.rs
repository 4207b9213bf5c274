/// Read-through caching over an optional [`Cache`](crate::db::Cache).
///
/// With no cache configured, or on a miss, the future is awaited and, when a
/// cache exists, its value is written back in the background with `$ttl`
/// seconds to live. Read failures count as misses.
///
/// ```rust,ignore
/// let top: Vec<WeeklyTopArticle> = cached!(state.cache.as_ref(), CacheKey::WeeklyTop, 300, async {
///     store.weekly_top(since, 3).await
/// })?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let cache = $cache;
        let key = $key;
        let hit = match cache {
            Some(c) => c.get_or_miss(&key).await,
            None => None,
        };
        match hit {
            Some(value) => Ok(value),
            None => match $block.await {
                Ok(value) => {
                    if let Some(c) = cache {
                        c.set_in_background(&key, &value, $ttl);
                    }
                    Ok(value)
                }
                Err(e) => Err(e),
            },
        }
    }};
}
