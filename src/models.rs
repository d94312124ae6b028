//! Data models
//!
//! The payload written by `upload` and the response record returned by every
//! storage call.

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// JSON document stored by the upload command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlobData {
    #[serde(with = "rfc3339_nanos")]
    pub timestamp: DateTime<Utc>,
}

impl BlobData {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self { timestamp }
    }

    pub fn now() -> Self {
        Self::new(Utc::now())
    }
}

mod rfc3339_nanos {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

/// Status, headers and fully read body of a single storage call.
#[derive(Debug, Clone)]
pub struct BlobResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl BlobResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Header lines in `<name>.<index>: <value>` form, one per value.
    pub fn header_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.headers.len());
        for name in self.headers.keys() {
            for (i, value) in self.headers.get_all(name).iter().enumerate() {
                lines.push(format!(
                    "{}.{}: {}",
                    name,
                    i,
                    String::from_utf8_lossy(value.as_bytes())
                ));
            }
        }
        lines
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
