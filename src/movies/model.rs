use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use qdrant_client::{Payload, qdrant::Value};
use serde::{Deserialize, Serialize};

/// A movie record as stored in the vector database. The plot embedding
/// itself lives in the point vector, not in the payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: u64,
    pub title: String,
    pub plot: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<String>,
}

impl Movie {
    pub fn into_payload(self) -> Payload {
        Payload::from(self.into_fields())
    }

    fn into_fields(self) -> HashMap<String, Value> {
        let mut fields = HashMap::from([
            ("title".to_string(), Value::from(self.title)),
            ("plot".to_string(), Value::from(self.plot)),
        ]);

        if let Some(date) = self.release_date {
            fields.insert(
                "release_date".to_string(),
                Value::from(date.timestamp_millis()),
            );
        }
        for (key, value) in [
            ("tagline", self.tagline),
            ("genre", self.genre),
            ("poster_url", self.poster_url),
            ("imdb_id", self.imdb_id),
        ] {
            if let Some(value) = value {
                fields.insert(key.to_string(), Value::from(value));
            }
        }

        fields
    }

    /// Rebuilds a movie from a point id and its payload. Returns `None` when
    /// the required fields are missing or of the wrong kind.
    pub fn try_from_payload(id: u64, payload: HashMap<String, Value>) -> Option<Self> {
        let text = |key: &str| -> Option<String> {
            payload.get(key)?.as_str().map(|s| s.to_string())
        };

        Some(Self {
            id,
            title: text("title")?,
            plot: text("plot")?,
            release_date: payload
                .get("release_date")
                .and_then(|v| v.as_integer())
                .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
            tagline: text("tagline"),
            genre: text("genre"),
            poster_url: text("poster_url"),
            imdb_id: text("imdb_id"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Movie {
        Movie {
            id: 42,
            title: "Night Train".to_string(),
            plot: "A courier races a storm across the desert.".to_string(),
            release_date: Some(Utc.timestamp_millis_opt(915_148_800_000).single().unwrap()),
            tagline: Some("Outrun the dawn".to_string()),
            genre: Some("Thriller".to_string()),
            poster_url: Some("https://posters.example/42.jpg".to_string()),
            imdb_id: Some("tt0000042".to_string()),
        }
    }

    #[test]
    fn payload_conversion_round_trips() {
        let movie = sample();
        let payload = movie.clone().into_fields();

        let rebuilt = Movie::try_from_payload(42, payload).unwrap();
        assert_eq!(rebuilt, movie);
    }

    #[test]
    fn optional_fields_may_be_absent() {
        let movie = Movie {
            release_date: None,
            tagline: None,
            genre: None,
            poster_url: None,
            imdb_id: None,
            ..sample()
        };
        let payload = movie.clone().into_fields();

        assert!(!payload.contains_key("tagline"));
        let rebuilt = Movie::try_from_payload(42, payload).unwrap();
        assert_eq!(rebuilt, movie);
    }

    #[test]
    fn missing_title_is_rejected() {
        let mut payload = sample().into_fields();
        payload.remove("title");

        assert!(Movie::try_from_payload(42, payload).is_none());
    }

    #[test]
    fn wrong_kind_for_plot_is_rejected() {
        let mut payload = sample().into_fields();
        payload.insert("plot".to_string(), Value::from(7_i64));

        assert!(Movie::try_from_payload(42, payload).is_none());
    }
}
