use std::cmp::Ordering;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::server::utils::time_utils::{epoch_to_time, zero_time};

/// the feed is loosely typed, so these are the shapes it *should* have. everything gets decoded
/// by hand from a `serde_json::Value` and any field that doesn't fit just falls back to empty
///
/// {
///   "data": {
///     "<anything>": {
///       "number": "1", "name": "...", "img": "...",
///       "events": { "<anything>": { "name", "description", "time", "runtime", "category" } }
///     }
///   }
/// }
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawEvent {
    pub name: String,
    pub description: String,
    /// epoch seconds
    pub time: String,
    /// minutes
    pub runtime: String,
    pub category: String,
}

impl RawEvent {
    pub fn from_value(value: &Value) -> Self {
        Self {
            name: field_text(value, "name"),
            description: field_text(value, "description"),
            time: field_text(value, "time"),
            runtime: field_text(value, "runtime"),
            category: field_text(value, "category"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub start: DateTime<Utc>,
    pub stop: DateTime<Utc>,
}

impl Event {
    /// never fails, a bad start becomes the zero time and a bad runtime becomes zero minutes
    pub fn from_raw(raw: RawEvent) -> Self {
        let start = epoch_to_time(&raw.time).unwrap_or_else(|e| {
            debug!("Event '{}' has no usable start time: {}", raw.name, e);
            zero_time()
        });
        let stop = start
            .checked_add_signed(runtime_to_duration(&raw.runtime))
            .unwrap_or(start);

        Self {
            name: raw.name,
            description: non_empty(raw.description),
            category: non_empty(raw.category),
            start,
            stop,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub number: String,
    pub name: String,
    pub logo_url: String,
    pub events: Vec<Event>,
}

impl Channel {
    /// id used for both the playlist tvg-id and the guide channel id
    pub fn guide_id(&self) -> String {
        format!("SSTV-{}", self.number)
    }

    fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }

        let mut events: Vec<Event> = match value.get("events") {
            Some(Value::Object(events)) => events
                .values()
                .map(|event| Event::from_raw(RawEvent::from_value(event)))
                .collect(),
            // some channels come through with an empty list instead of a map
            _ => Vec::new(),
        };
        events.sort_by_key(|event| event.start);

        Some(Self {
            number: field_text(value, "number"),
            name: field_text(value, "name"),
            logo_url: field_text(value, "img"),
            events,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub channels: Vec<Channel>,
}

impl Schedule {
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn event_count(&self) -> usize {
        self.channels.iter().map(|channel| channel.events.len()).sum()
    }

    /// decodes the raw feed, anything that isn't shaped right gives back an empty schedule
    pub fn from_feed(raw: &str) -> Self {
        let tree: Value = match serde_json::from_str(raw) {
            Ok(tree) => tree,
            Err(e) => {
                warn!("Could not decode schedule feed: {} ({} bytes)", e, raw.len());
                return Self::default();
            }
        };

        let Some(data) = tree.get("data").and_then(Value::as_object) else {
            warn!("Schedule feed has no data map, using an empty schedule");
            return Self::default();
        };

        let mut channels: Vec<Channel> = data
            .iter()
            .filter_map(|(key, value)| {
                let channel = Channel::from_value(value);
                if channel.is_none() {
                    warn!("Skipping malformed channel record '{}'", key);
                }
                channel
            })
            .collect();

        sort_channels(&mut channels);

        Self { channels }
    }
}

/// numeric ascending, channels with non numeric numbers go last in the order they came in
pub fn sort_channels(channels: &mut [Channel]) {
    channels.sort_by(|a, b| compare_numbers(&a.number, &b.number));
}

fn compare_numbers(a: &str, b: &str) -> Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => Ordering::Equal,
    }
}

/// runtime is minutes as text, fractions are allowed because the feed has sent them before
fn runtime_to_duration(runtime: &str) -> Duration {
    match runtime.trim().parse::<f64>() {
        Ok(minutes) if minutes.is_finite() => {
            Duration::try_milliseconds((minutes * 60_000.0) as i64).unwrap_or_else(Duration::zero)
        }
        _ => Duration::zero(),
    }
}

fn field_text(value: &Value, field: &str) -> String {
    match value.get(field) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn channel(number: &str) -> Channel {
        Channel {
            number: number.to_string(),
            name: format!("Channel {}", number),
            logo_url: String::new(),
            events: Vec::new(),
        }
    }

    #[test]
    fn raw_event_tolerates_wrong_field_types() {
        let raw = RawEvent::from_value(&json!({
            "name": "News",
            "description": null,
            "time": 1579267611,
            "runtime": ["60"],
        }));

        assert_eq!(
            raw,
            RawEvent {
                name: "News".to_string(),
                description: String::new(),
                time: "1579267611".to_string(),
                runtime: String::new(),
                category: String::new(),
            }
        );
    }

    #[test]
    fn event_stop_is_start_plus_runtime() {
        let event = Event::from_raw(RawEvent {
            name: "Match".to_string(),
            description: "Live".to_string(),
            time: "1579267611".to_string(),
            runtime: "90".to_string(),
            category: "Sports".to_string(),
        });

        assert_eq!(
            event.start,
            Utc.with_ymd_and_hms(2020, 1, 17, 13, 26, 51).unwrap()
        );
        assert_eq!(event.stop - event.start, Duration::minutes(90));
        assert_eq!(event.description.as_deref(), Some("Live"));
        assert_eq!(event.category.as_deref(), Some("Sports"));
    }

    #[test]
    fn event_with_garbage_fields_is_kept() {
        let event = Event::from_raw(RawEvent {
            name: "Broken".to_string(),
            time: "yesterday".to_string(),
            runtime: "a while".to_string(),
            ..Default::default()
        });

        assert_eq!(event.start, zero_time());
        assert_eq!(event.stop, zero_time());
        assert_eq!(event.description, None);
    }

    #[test]
    fn fractional_runtime_is_honoured() {
        let event = Event::from_raw(RawEvent {
            time: "0".to_string(),
            runtime: "1.5".to_string(),
            ..Default::default()
        });

        assert_eq!(event.stop - event.start, Duration::seconds(90));
    }

    #[test]
    fn non_numeric_channels_sort_last_in_feed_order() {
        let mut channels = vec![
            channel("b"),
            channel("10"),
            channel("a"),
            channel("2"),
            channel("1"),
        ];
        sort_channels(&mut channels);

        let order: Vec<&str> = channels.iter().map(|c| c.number.as_str()).collect();
        assert_eq!(order, vec!["1", "2", "10", "b", "a"]);
    }

    #[test]
    fn from_feed_builds_sorted_channels() {
        let feed = json!({
            "data": {
                "x": {
                    "number": "12",
                    "name": "Twelve",
                    "img": "logo12",
                    "events": {
                        "late": { "name": "Late", "time": "2000", "runtime": "10" },
                        "early": { "name": "Early", "time": "1000", "runtime": "10" }
                    }
                },
                "y": { "number": "3", "name": "Three", "img": "logo3", "events": [] },
                "z": "not a channel"
            }
        })
        .to_string();

        let schedule = Schedule::from_feed(&feed);

        assert_eq!(schedule.channels.len(), 2);
        assert_eq!(schedule.channels[0].number, "3");
        assert_eq!(schedule.channels[1].number, "12");
        assert_eq!(schedule.channels[1].logo_url, "logo12");
        assert_eq!(schedule.event_count(), 2);

        let names: Vec<&str> = schedule.channels[1]
            .events
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["Early", "Late"]);
    }

    #[test]
    fn from_feed_degrades_to_empty() {
        assert!(Schedule::from_feed("").is_empty());
        assert!(Schedule::from_feed("{not json").is_empty());
        assert!(Schedule::from_feed(r#"{"data": []}"#).is_empty());
        assert!(Schedule::from_feed(r#"{"nodata": {}}"#).is_empty());
    }

    #[test]
    fn numeric_channel_numbers_are_accepted() {
        let schedule = Schedule::from_feed(r#"{"data": {"1": {"number": 7, "name": "Seven"}}}"#);

        assert_eq!(schedule.channels[0].number, "7");
        assert_eq!(schedule.channels[0].guide_id(), "SSTV-7");
        assert!(schedule.channels[0].events.is_empty());
    }
}
