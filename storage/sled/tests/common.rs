#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use edb_core::Event;
use std::str::FromStr;
use tracing::Level;

// Initialize tracing for tests
#[ctor::ctor]
fn init_tracing() {
    // if LOG_LEVEL env var is set, use it
    if let Ok(level) = std::env::var("LOG_LEVEL") {
        tracing_subscriber::fmt().with_max_level(Level::from_str(&level).unwrap()).with_test_writer().init();
    } else {
        tracing_subscriber::fmt().with_max_level(Level::INFO).with_test_writer().init();
    }
}

pub fn ts(s: &str) -> DateTime<Utc> { DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc) }

pub fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> { Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap() }

/// The three events used throughout: two by bob, one by susy in between
pub fn fixture() -> Vec<Event> {
    vec![
        Event::new("1", "PushEvent", ts("2000-01-01T00:00:00Z"), "bob"),
        Event::new("2", "IssueEvent", ts("2000-02-01T00:00:00Z"), "bob"),
        Event::new("3", "PullEvent", ts("2000-01-06T00:00:00Z"), "susy"),
    ]
}

pub fn ids(events: &[Event]) -> Vec<&str> { events.iter().map(|e| e.id.as_str()).collect() }
