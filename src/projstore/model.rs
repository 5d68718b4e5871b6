use crate::error::{Result, StoreError};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A persisted project record.
///
/// Only `id` is interpreted. Every other field is carried through untouched,
/// so the store never needs to know the project schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default, deserialize_with = "id_from_string_or_number")]
    pub id: String,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Project {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Parse a serialized payload.
    pub fn from_payload(payload: &str) -> Result<Self> {
        serde_json::from_str(payload).map_err(StoreError::Serialization)
    }

    /// Serialize in the on-disk format.
    pub fn to_payload(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(StoreError::Serialization)
    }

    /// The numeric value of the id, as used by the identifier generator.
    pub fn numeric_id(&self) -> Result<u64> {
        parse_id(&self.id)
    }
}

/// Parse a project id. Ids are plain decimal numbers.
pub fn parse_id(id: &str) -> Result<u64> {
    if id.is_empty() {
        return Err(StoreError::MissingId);
    }
    if !id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(StoreError::InvalidId(id.to_string()));
    }
    id.parse::<u64>()
        .map_err(|_| StoreError::InvalidId(id.to_string()))
}

/// Order ids numerically when both are numeric, falling back to text order.
/// Equal values (`"7"`, `"007"`) are tie-broken by text so the order is total.
pub fn id_order(a: &str, b: &str) -> std::cmp::Ordering {
    match (parse_id(a), parse_id(b)) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => std::cmp::Ordering::Less,
        (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

fn id_from_string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(u64),
    }

    Ok(match Option::<RawId>::deserialize(deserializer)? {
        Some(RawId::Text(s)) => s,
        Some(RawId::Number(n)) => n.to_string(),
        None => String::new(),
    })
}
