use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Document represents a stored JSON object.
///
/// Contents are opaque to the client; the only field it reads is the
/// server-assigned identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Server-assigned identifier (`id`, falling back to `_id`)
    ///
    /// Numeric identifiers are rendered as strings so they can be used in
    /// request paths.
    pub fn id(&self) -> Option<String> {
        ["id", "_id"]
            .iter()
            .filter_map(|key| self.0.get(*key))
            .find_map(|value| match value {
                Value::String(id) => Some(id.clone()),
                Value::Number(id) => Some(id.to_string()),
                _ => None,
            })
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> serde_json::map::Iter<'_> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Document {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        Value::Object(doc.0)
    }
}

impl TryFrom<Value> for Document {
    type Error = Value;

    /// Fails with the original value when it is not a JSON object
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(other),
        }
    }
}

impl FromIterator<(String, Value)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// NameRequest is the body for creating a database or collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameRequest {
    pub name: String,
}

/// ErrorResponse represents an API error body
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorResponse {
    /// Most specific human-readable text in the body, if any
    pub fn into_message(self) -> Option<String> {
        self.error
            .or(self.message)
            .filter(|text| !text.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_serializes_as_plain_object() {
        let mut doc = Document::new();
        doc.insert("name", "John Doe");
        doc.insert("age", 30);

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value, json!({"name": "John Doe", "age": 30}));

        let back: Document = serde_json::from_value(value).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_document_id_lookup() {
        let doc = Document::try_from(json!({"id": "abc", "a": 1})).unwrap();
        assert_eq!(doc.id().as_deref(), Some("abc"));

        let doc = Document::try_from(json!({"_id": "mongo-style"})).unwrap();
        assert_eq!(doc.id().as_deref(), Some("mongo-style"));

        let doc = Document::try_from(json!({"id": 7})).unwrap();
        assert_eq!(doc.id().as_deref(), Some("7"));

        // An unusable `id` falls back to `_id`
        let doc = Document::try_from(json!({"id": null, "_id": 42})).unwrap();
        assert_eq!(doc.id().as_deref(), Some("42"));

        let doc = Document::try_from(json!({"id": {"oid": "x"}})).unwrap();
        assert_eq!(doc.id(), None);
    }

    #[test]
    fn test_document_rejects_non_objects() {
        let err = Document::try_from(json!([1, 2])).unwrap_err();
        assert_eq!(err, json!([1, 2]));
    }

    #[test]
    fn test_error_response_prefers_error_field() {
        let body: ErrorResponse =
            serde_json::from_value(json!({"error": "Database not found", "message": "x"}))
                .unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Database not found"));

        let body: ErrorResponse = serde_json::from_value(json!({"message": "bad"})).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("bad"));

        let body: ErrorResponse = serde_json::from_value(json!({"error": "  "})).unwrap();
        assert_eq!(body.into_message(), None);
    }
}
