use std::sync::Arc;
use std::time::Duration;

use mockall::predicate::eq;
use serde_json::json;
use sstv_edge::MockCacheRepository;
use sstv_edge::server::services::fetch_services::MockFetchServiceTrait;
use sstv_edge::server::services::schedule_services::{ScheduleService, ScheduleServiceTrait};
use url::Url;

const FEED_URL: &str = "https://guide.test/feed-new.json";

fn feed() -> String {
    json!({
        "data": {
            "a": {
                "number": "10",
                "name": "Ten",
                "img": "logo10",
                "events": {
                    "1": {
                        "name": "Kickoff",
                        "description": "",
                        "time": "1579267611",
                        "runtime": "120",
                        "category": "Sports"
                    }
                }
            },
            "b": {
                "number": "2",
                "name": "Two",
                "img": "logo2",
                "events": {
                    "1": { "name": "Morning", "description": "News", "time": "1579267611", "runtime": "30" },
                    "2": { "name": "Broken", "time": "soon", "runtime": "?" }
                }
            },
            "c": { "number": "news", "name": "Newsroom", "img": "", "events": {} }
        }
    })
    .to_string()
}

fn service(cache: MockCacheRepository, fetcher: MockFetchServiceTrait) -> ScheduleService {
    ScheduleService::new(
        Arc::new(cache),
        Arc::new(fetcher),
        Url::parse(FEED_URL).unwrap(),
    )
}

#[tokio::test]
async fn test_cached_feed_is_decoded_without_fetching() {
    let mut cache = MockCacheRepository::new();
    cache
        .expect_get()
        .with(eq("ssJsonEpgFeed"))
        .returning(|_| Some(feed()));
    cache.expect_set().times(0);

    let mut fetcher = MockFetchServiceTrait::new();
    fetcher.expect_fetch().times(0);

    let schedule = service(cache, fetcher).resolve_schedule().await;

    let numbers: Vec<&str> = schedule.channels.iter().map(|c| c.number.as_str()).collect();
    assert_eq!(numbers, vec!["2", "10", "news"]);
    assert_eq!(schedule.event_count(), 3);

    // the broken event is kept with zeroed times
    let two = &schedule.channels[0];
    assert_eq!(two.events.len(), 2);
    assert_eq!(two.events[0].name, "Broken");
    assert_eq!(two.events[0].start.timestamp(), 0);
    assert_eq!(two.events[1].description.as_deref(), Some("News"));

    let ten = &schedule.channels[1];
    assert_eq!(ten.events[0].description, None);
    assert_eq!(
        ten.events[0].stop - ten.events[0].start,
        chrono::Duration::minutes(120)
    );
}

#[tokio::test]
async fn test_cache_miss_fetches_and_caches_for_a_minute() {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    let mut cache = MockCacheRepository::new();
    cache.expect_get().returning(|_| None);
    cache.expect_set().times(1).returning(move |key, value, ttl| {
        let _ = tx.send((key.to_string(), value.len(), ttl));
        Ok(())
    });

    let mut fetcher = MockFetchServiceTrait::new();
    fetcher
        .expect_fetch()
        .with(eq(FEED_URL))
        .times(1)
        .returning(|_| Some(feed()));

    let schedule = service(cache, fetcher).resolve_schedule().await;
    assert_eq!(schedule.channels.len(), 3);

    let (key, len, ttl) = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(key, "ssJsonEpgFeed");
    assert_eq!(len, feed().len());
    assert_eq!(ttl, Duration::from_secs(60));
}

#[tokio::test]
async fn test_failed_fetch_gives_empty_schedule() {
    let mut cache = MockCacheRepository::new();
    cache.expect_get().returning(|_| None);
    cache.expect_set().times(0);

    let mut fetcher = MockFetchServiceTrait::new();
    fetcher.expect_fetch().times(1).returning(|_| None);

    let schedule = service(cache, fetcher).resolve_schedule().await;

    assert!(schedule.is_empty());
}

#[tokio::test]
async fn test_malformed_payload_gives_empty_schedule() {
    let mut cache = MockCacheRepository::new();
    cache
        .expect_get()
        .returning(|_| Some(r#"{"data": "nope"}"#.to_string()));

    let fetcher = MockFetchServiceTrait::new();

    let schedule = service(cache, fetcher).resolve_schedule().await;

    assert!(schedule.is_empty());
}
