use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub telegram_id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(with = "timestamp")]
    pub joined_at: DateTime<Utc>,
    #[serde(default, with = "timestamp::option")]
    pub last_login: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(
        default,
        with = "timestamp::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserRecord {
    pub fn new(telegram_id: &str, username: &str, first_name: &str, now: DateTime<Utc>) -> Self {
        Self {
            telegram_id: telegram_id.to_string(),
            username: username.to_string(),
            first_name: first_name.to_string(),
            joined_at: now,
            last_login: None,
            is_active: true,
            updated_at: None,
        }
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            telegram_id: self.telegram_id.clone(),
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            joined_at: self.joined_at,
        }
    }
}

// The subset of a record returned to a verified caller
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub telegram_id: String,
    pub username: String,
    pub first_name: String,
    #[serde(with = "timestamp")]
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WhitelistDocument {
    #[serde(default)]
    pub users: Vec<UserRecord>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl WhitelistDocument {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            users: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WhitelistStats {
    pub total_users: usize,
    pub active_users: usize,
    #[serde(with = "timestamp")]
    pub last_updated: DateTime<Utc>,
}

/// ISO-8601 timestamps in the `2024-01-01T10:00:00.000Z` shape. Reading accepts
/// any RFC 3339 value so files written by other tools still load.
pub mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match value {
                Some(value) => serializer.serialize_str(&super::format(value)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let raw = Option::<String>::deserialize(deserializer)?;
            raw.map(|raw| {
                DateTime::parse_from_rfc3339(&raw)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(serde::de::Error::custom)
            })
            .transpose()
        }
    }
}
