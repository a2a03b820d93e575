use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// A scan target as returned by the Checkmarx projects endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_scan_date: Option<String>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub tags: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub groups: Vec<String>,
}

/// One page of `GET /api/projects`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPage {
    #[serde(default)]
    pub total_count: Option<u64>,
    #[serde(default)]
    pub filtered_total_count: Option<u64>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub projects: Vec<Project>,
}

impl ProjectPage {
    /// 預期總筆數，優先使用過濾後的數量
    pub fn expected_total(&self) -> Option<u64> {
        self.filtered_total_count.or(self.total_count)
    }
}

/// A catalog record sent to Port.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity {
    pub identifier: String,
    pub title: String,
    pub properties: serde_json::Map<String, serde_json::Value>,
    pub relations: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Blueprint {
    pub identifier: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub schema: BlueprintSchema,
    pub relations: BTreeMap<String, RelationSchema>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlueprintSchema {
    pub properties: BTreeMap<String, PropertySchema>,
    pub required: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertySchema {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationSchema {
    pub title: String,
    pub target: String,
    pub required: bool,
    pub many: bool,
}

/// Bearer token obtained from a token exchange. Never refreshed.
#[derive(Clone, PartialEq)]
pub struct AccessToken {
    pub value: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    pub fn new(value: String, expires_in_secs: Option<i64>) -> Self {
        let expires_at = expires_in_secs
            .and_then(chrono::TimeDelta::try_seconds)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl));
        Self { value, expires_at }
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

// Checkmarx 的 id 可能是字串也可能是數字
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}

// 無法解析的時間戳記視為缺值，不讓整頁失敗
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|raw| {
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    }))
}

fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
