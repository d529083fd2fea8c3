use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Wire format for timestamps in serialized documents.
pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Identity shared by every entity kind.
///
/// `id` never changes after construction. Timestamps carry microsecond
/// precision so that the ISO rendering round-trips exactly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BaseModel {
    pub id: String,
    #[serde(with = "iso_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "iso_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl BaseModel {
    /// Fresh identity: new UUID, `created_at == updated_at == now`.
    pub fn new() -> Self {
        let now = now();
        Self { id: Uuid::new_v4().to_string(), created_at: now, updated_at: now }
    }

    /// Restore an identity read back from storage.
    pub fn restore(id: String, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        Self { id, created_at, updated_at }
    }

    /// Mark a mutation. Never moves `updated_at` backwards or before `created_at`.
    pub fn touch(&mut self) {
        let now = now();
        if now > self.updated_at {
            self.updated_at = now;
        }
        if self.updated_at < self.created_at {
            self.updated_at = self.created_at;
        }
    }
}

impl Default for BaseModel {
    fn default() -> Self { Self::new() }
}

/// Current time truncated to microseconds.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

pub fn format_time(t: &DateTime<Utc>) -> String {
    t.format(TIME_FORMAT).to_string()
}

/// Accepts the naive ISO form written by `format_time` and full RFC 3339.
pub fn parse_time(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(s).ok().map(|t| t.with_timezone(&Utc))
}

pub mod iso_datetime {
    use chrono::{DateTime, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_time(t))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_time(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp: {raw}")))
    }
}
