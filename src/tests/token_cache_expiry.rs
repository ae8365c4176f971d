#[cfg(test)]
mod test {

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use crate::cache::{FetchedToken, TokenCache};
    use crate::utils::constants::MAX_TOKEN_TTL_SECS;

    async fn fetch_counted(
        cache: &TokenCache,
        calls: &Arc<AtomicUsize>,
        expires_in: Option<u64>,
    ) -> Result<String, String> {
        let calls = calls.clone();
        cache
            .get_or_refresh(|| async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                Ok::<_, String>(FetchedToken::new(format!("tok-{}", n), expires_in))
            })
            .await
    }

    #[tokio::test(start_paused = true)]
    async fn cached_token_is_reused_without_fetching() {
        let cache = TokenCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        assert_eq!(fetch_counted(&cache, &calls, Some(3600)).await.unwrap(), "tok-1");
        assert_eq!(fetch_counted(&cache, &calls, Some(3600)).await.unwrap(), "tok-1");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.current().await.as_deref(), Some("tok-1"));
    }

    #[tokio::test(start_paused = true)]
    async fn token_is_refetched_once_inside_skew_window() {
        let cache = TokenCache::with_skew(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));

        fetch_counted(&cache, &calls, Some(120)).await.unwrap();

        // 59s in: refresh point (120 - 60) not reached yet
        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(fetch_counted(&cache, &calls, Some(120)).await.unwrap(), "tok-1");

        // 61s in: past expires_at - skew
        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(fetch_counted(&cache, &calls, Some(120)).await.unwrap(), "tok-2");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_expires_in_defaults_to_one_day() {
        let cache = TokenCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        fetch_counted(&cache, &calls, None).await.unwrap();

        tokio::time::advance(Duration::from_secs(86_400 - 61)).await;
        assert_eq!(fetch_counted(&cache, &calls, None).await.unwrap(), "tok-1");

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(fetch_counted(&cache, &calls, None).await.unwrap(), "tok-2");
    }

    #[tokio::test(start_paused = true)]
    async fn huge_expires_in_is_capped_instead_of_overflowing() {
        let cache = TokenCache::with_skew(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));

        assert_eq!(fetch_counted(&cache, &calls, Some(u64::MAX)).await.unwrap(), "tok-1");
        assert_eq!(
            FetchedToken::new("t", Some(u64::MAX)).ttl_secs(),
            MAX_TOKEN_TTL_SECS
        );

        tokio::time::advance(Duration::from_secs(MAX_TOKEN_TTL_SECS - 61)).await;
        assert_eq!(fetch_counted(&cache, &calls, Some(u64::MAX)).await.unwrap(), "tok-1");

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(fetch_counted(&cache, &calls, Some(u64::MAX)).await.unwrap(), "tok-2");
    }

    #[tokio::test(start_paused = true)]
    async fn lifetime_shorter_than_skew_is_never_reused() {
        let cache = TokenCache::with_skew(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));

        assert_eq!(fetch_counted(&cache, &calls, Some(30)).await.unwrap(), "tok-1");
        assert_eq!(fetch_counted(&cache, &calls, Some(30)).await.unwrap(), "tok-2");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn clear_forces_next_fetch() {
        let cache = TokenCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        fetch_counted(&cache, &calls, Some(3600)).await.unwrap();
        cache.clear().await;
        assert!(cache.current().await.is_none());
        assert!(cache.expires_at().await.is_none());

        assert_eq!(fetch_counted(&cache, &calls, Some(3600)).await.unwrap(), "tok-2");
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_error_is_returned_and_not_cached() {
        let cache = TokenCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let failed: Result<String, String> = cache
            .get_or_refresh(|| async { Err("token endpoint down".to_owned()) })
            .await;
        assert_eq!(failed.unwrap_err(), "token endpoint down");
        assert!(cache.current().await.is_none());

        assert_eq!(fetch_counted(&cache, &calls, Some(3600)).await.unwrap(), "tok-1");
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_share_one_fetch() {
        let cache = TokenCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_refresh(|| async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok::<_, String>(FetchedToken::new("shared", Some(3600)))
                    })
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), "shared");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
