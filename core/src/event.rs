use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single observed activity, stored in the partition of its `actor`.
///
/// Within a partition `id` is the key, so saving an event with an existing
/// `(actor, id)` replaces the stored value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub timestamp: DateTime<Utc>,
    /// The tracked user whose feed produced this event
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub actor: String,
    #[serde(default)]
    pub repository: String,
}

impl Event {
    pub fn new(id: impl Into<String>, kind: impl Into<String>, timestamp: DateTime<Utc>, actor: impl Into<String>) -> Self {
        Self { id: id.into(), kind: kind.into(), timestamp, username: String::new(), actor: actor.into(), repository: String::new() }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn with_repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = repository.into();
        self
    }

    /// Convert a record from the remote feed, fetched on behalf of `username`.
    pub fn from_remote(remote: RemoteEvent, username: &str) -> Self {
        Self {
            id: remote.id,
            kind: remote.kind,
            timestamp: remote.created_at,
            username: username.to_owned(),
            actor: remote.actor.map(|a| a.login).unwrap_or_default(),
            repository: remote.repo.map(|r| r.name).unwrap_or_default(),
        }
    }
}

/// An event as decoded from the remote feed. Fields the store does not use are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub actor: Option<RemoteActor>,
    #[serde(default)]
    pub repo: Option<RemoteRepo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteActor {
    pub login: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRepo {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_event_json_shape() {
        let event = Event::new("1", "PushEvent", Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap(), "bob")
            .with_username("benbjohnson")
            .with_repository("boltdb/bolt");

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": "1",
                "type": "PushEvent",
                "timestamp": "2000-01-01T00:00:00Z",
                "username": "benbjohnson",
                "actor": "bob",
                "repository": "boltdb/bolt",
            })
        );
        assert_eq!(serde_json::from_value::<Event>(value).unwrap(), event);
    }

    #[test]
    fn test_from_remote_copies_nested_fields() {
        let remote: RemoteEvent = serde_json::from_str(
            r#"{
                "id": "2489651045",
                "type": "CreateEvent",
                "actor": {"id": 665991, "login": "petroav", "url": "https://api.github.com/users/petroav"},
                "repo": {"id": 28688495, "name": "petroav/6.828"},
                "payload": {"ref": "master"},
                "public": true,
                "created_at": "2015-01-01T15:00:00Z"
            }"#,
        )
        .unwrap();

        let event = Event::from_remote(remote, "benbjohnson");
        assert_eq!(event.id, "2489651045");
        assert_eq!(event.kind, "CreateEvent");
        assert_eq!(event.timestamp, Utc.with_ymd_and_hms(2015, 1, 1, 15, 0, 0).unwrap());
        assert_eq!(event.username, "benbjohnson");
        assert_eq!(event.actor, "petroav");
        assert_eq!(event.repository, "petroav/6.828");
    }

    #[test]
    fn test_from_remote_without_actor_or_repo() {
        let remote: RemoteEvent = serde_json::from_str(r#"{"id": "7", "type": "WatchEvent", "created_at": "2015-01-01T15:00:00Z"}"#).unwrap();

        let event = Event::from_remote(remote, "susy");
        assert_eq!(event.username, "susy");
        assert_eq!(event.actor, "");
        assert_eq!(event.repository, "");
    }
}
