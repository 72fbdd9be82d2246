use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use mockall::predicate::eq;
use sstv_edge::server::services::auth_services::{AuthService, AuthServiceTrait};
use sstv_edge::server::services::fetch_services::{FetchService, MockFetchServiceTrait};
use sstv_edge::{AppConfig, CacheRepository, MemoryCache, MockCacheRepository};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config() -> AppConfig {
    AppConfig {
        username: "user".to_string(),
        password: "pass".to_string(),
        auth_url: "https://auth.test/hash_api.php".to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_cached_hash_skips_upstream() {
    let mut cache = MockCacheRepository::new();
    cache
        .expect_get()
        .with(eq("authHash"))
        .times(1)
        .returning(|_| Some("abc123".to_string()));
    cache.expect_set().times(0);

    let mut fetcher = MockFetchServiceTrait::new();
    fetcher.expect_post_form().times(0);
    fetcher.expect_fetch().times(0);

    let service = AuthService::new(Arc::new(cache), Arc::new(fetcher), &config());

    assert_eq!(service.resolve_auth_token().await.as_deref(), Some("abc123"));
}

#[tokio::test]
async fn test_empty_cached_hash_is_a_miss() {
    let mut cache = MockCacheRepository::new();
    cache.expect_get().returning(|_| Some(String::new()));
    cache.expect_set().returning(|_, _, _| Ok(()));

    let mut fetcher = MockFetchServiceTrait::new();
    fetcher
        .expect_post_form()
        .times(1)
        .returning(|_, _| Some(r#"{"Hash":"fresh","Valid":10,"Code":"1"}"#.to_string()));

    let service = AuthService::new(Arc::new(cache), Arc::new(fetcher), &config());

    assert_eq!(service.resolve_auth_token().await.as_deref(), Some("fresh"));
}

#[tokio::test]
async fn test_successful_login_is_cached_for_valid_minutes() {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    let mut cache = MockCacheRepository::new();
    cache.expect_get().returning(|_| None);
    cache.expect_set().times(1).returning(move |key, value, ttl| {
        let _ = tx.send((key.to_string(), value.to_string(), ttl));
        Ok(())
    });

    let mut fetcher = MockFetchServiceTrait::new();
    fetcher
        .expect_post_form()
        .withf(|url, form| {
            url == "https://auth.test/hash_api.php"
                && form.contains(&("username".to_string(), "user".to_string()))
                && form.contains(&("password".to_string(), "pass".to_string()))
                && form.contains(&("site".to_string(), "viewss".to_string()))
        })
        .times(1)
        .returning(|_, _| {
            Some(r#"{"Hash":"signed","Valid":240,"Code":"1","Error":""}"#.to_string())
        });

    let service = AuthService::new(Arc::new(cache), Arc::new(fetcher), &config());

    assert_eq!(service.resolve_auth_token().await.as_deref(), Some("signed"));

    let (key, value, ttl) = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("cache write never happened")
        .expect("cache write channel closed");

    assert_eq!(key, "authHash");
    assert_eq!(value, "signed");
    assert_eq!(ttl, Duration::from_secs(240 * 60));
}

#[tokio::test]
async fn test_huge_validity_saturates_instead_of_overflowing() {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    let mut cache = MockCacheRepository::new();
    cache.expect_get().returning(|_| None);
    cache.expect_set().times(1).returning(move |_, _, ttl| {
        let _ = tx.send(ttl);
        Ok(())
    });

    let mut fetcher = MockFetchServiceTrait::new();
    fetcher.expect_post_form().times(1).returning(|_, _| {
        Some(format!(
            r#"{{"Hash":"forever","Valid":{},"Code":"1"}}"#,
            i64::MAX
        ))
    });

    let service = AuthService::new(Arc::new(cache), Arc::new(fetcher), &config());

    assert_eq!(service.resolve_auth_token().await.as_deref(), Some("forever"));

    let ttl = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("cache write never happened")
        .expect("cache write channel closed");
    assert_eq!(ttl, Duration::from_secs(u64::MAX));
}

#[tokio::test]
async fn test_rejected_login_returns_nothing_and_caches_nothing() {
    let writes = Arc::new(AtomicUsize::new(0));
    let counted = writes.clone();

    let mut cache = MockCacheRepository::new();
    cache.expect_get().returning(|_| None);
    cache.expect_set().returning(move |_, _, _| {
        counted.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    let mut fetcher = MockFetchServiceTrait::new();
    fetcher
        .expect_post_form()
        .times(1)
        .returning(|_, _| Some(r#"{"Code":"0","Error":"bad creds"}"#.to_string()));

    let service = AuthService::new(Arc::new(cache), Arc::new(fetcher), &config());

    assert_eq!(service.resolve_auth_token().await, None);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(writes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_transport_failure_and_garbage_return_nothing() {
    let mut cache = MockCacheRepository::new();
    cache.expect_get().returning(|_| None);

    let mut fetcher = MockFetchServiceTrait::new();
    let mut calls = 0;
    fetcher.expect_post_form().times(2).returning(move |_, _| {
        calls += 1;
        if calls == 1 {
            None
        } else {
            Some("<html>maintenance</html>".to_string())
        }
    });

    let service = AuthService::new(Arc::new(cache), Arc::new(fetcher), &config());

    assert_eq!(service.resolve_auth_token().await, None);
    assert_eq!(service.resolve_auth_token().await, None);
}

#[tokio::test]
async fn test_second_call_is_served_from_cache() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/hash_api.php"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"Hash":"from-upstream","Valid":5,"Code":"1","Error":""}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let cache = Arc::new(MemoryCache::new());
    let config = AppConfig {
        auth_url: format!("{}/hash_api.php", server.uri()),
        ..config()
    };
    let service = AuthService::new(cache.clone(), Arc::new(FetchService::new()), &config);

    assert_eq!(
        service.resolve_auth_token().await.as_deref(),
        Some("from-upstream")
    );

    // the write is spawned, give it a moment to land
    for _ in 0..50 {
        if cache.get("authHash").await.is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(
        service.resolve_auth_token().await.as_deref(),
        Some("from-upstream")
    );
}
