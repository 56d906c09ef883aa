//! Schema-free documents and lookup criteria.
//!
//! A [`Document`] is a flat JSON object with a required string `id`; every
//! other field is opaque to the storage layer. Only domain repositories know
//! concrete entity shapes.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StoreError;

/// Field every document is keyed by.
pub const ID_FIELD: &str = "id";

/// A record stored under a collection, keyed by its `id` field.
///
/// `id` uniqueness is not enforced by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    id: String,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    /// Builder-style field setter. Setting `id` here is ignored; the key is
    /// fixed at construction.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        if name != ID_FIELD {
            self.fields.insert(name, value.into());
        }
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Serialize a domain entity into a document.
    ///
    /// The entity must serialize to a JSON object with a string `id`.
    pub fn from_entity<T: Serialize>(entity: &T) -> Result<Self, StoreError> {
        let value = serde_json::to_value(entity)
            .map_err(|e| StoreError::decode(format!("entity serialization failed: {e}")))?;
        serde_json::from_value(value)
            .map_err(|e| StoreError::decode(format!("entity is not a document: {e}")))
    }

    /// Materialize the document as a domain entity.
    pub fn into_entity<T: DeserializeOwned>(self) -> Result<T, StoreError> {
        let value = self.into_value();
        serde_json::from_value(value).map_err(|e| StoreError::decode(e.to_string()))
    }

    /// The document as a single JSON object, `id` included.
    pub fn into_value(self) -> Value {
        let mut object = self.fields;
        object.insert(ID_FIELD.to_string(), Value::String(self.id));
        Value::Object(object)
    }
}

/// Field → expected string mapping; a document matches when every listed
/// field is present and equal to that exact string. Empty criteria match every
/// document.
///
/// Values are strings only: Postgres evaluates criteria with JSONB `@>`,
/// which for arrays and numbers is containment rather than equality. For a
/// string value both backends agree on exact equality.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Criteria(Map<String, Value>);

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// `{"id": id}`
    pub fn by_id(id: impl Into<String>) -> Self {
        Self::new().with(ID_FIELD, id)
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(field.into(), Value::String(value.into()));
        self
    }

    pub fn matches(&self, document: &Value) -> bool {
        self.0
            .iter()
            .all(|(field, expected)| document.get(field) == Some(expected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Ticket {
        id: String,
        seat: u32,
    }

    #[test]
    fn serializes_flat_with_id() {
        let doc = Document::new("t1").with_field("seat", 12);
        assert_eq!(serde_json::to_value(&doc).unwrap(), json!({ "id": "t1", "seat": 12 }));
    }

    #[test]
    fn id_cannot_be_overwritten_by_field() {
        let doc = Document::new("t1").with_field("id", "other");
        assert_eq!(doc.id(), "t1");
        assert!(doc.get("id").is_none());
    }

    #[test]
    fn entity_conversion_both_ways() {
        let ticket = Ticket { id: "t1".into(), seat: 4 };
        let doc = Document::from_entity(&ticket).unwrap();
        assert_eq!(doc.id(), "t1");
        assert_eq!(doc.get("seat"), Some(&json!(4)));

        let back: Ticket = doc.into_entity().unwrap();
        assert_eq!(back, ticket);
    }

    #[test]
    fn entity_without_string_id_is_rejected() {
        #[derive(Serialize)]
        struct NoId {
            seat: u32,
        }
        assert!(matches!(
            Document::from_entity(&NoId { seat: 1 }),
            Err(StoreError::Decode(_))
        ));
        assert!(matches!(Document::from_entity(&"scalar"), Err(StoreError::Decode(_))));
    }

    #[test]
    fn shape_mismatch_is_decode_error() {
        let doc = Document::new("t1").with_field("seat", "front row");
        assert!(matches!(doc.into_entity::<Ticket>(), Err(StoreError::Decode(_))));
    }

    #[test]
    fn default_is_zero_value() {
        let doc = Document::default();
        assert_eq!(doc.id(), "");
        assert!(doc.fields().is_empty());
    }

    #[test]
    fn criteria_matching() {
        let doc = json!({ "id": "o1", "location_id": "loc-1" });
        assert!(Criteria::by_id("o1").matches(&doc));
        assert!(!Criteria::by_id("o2").matches(&doc));
        assert!(Criteria::by_id("o1").with("location_id", "loc-1").matches(&doc));
        assert!(!Criteria::new().with("missing", "x").matches(&doc));
        assert!(Criteria::new().matches(&doc));
    }

    #[test]
    fn criteria_never_match_non_string_fields() {
        let doc = json!({ "id": "o1", "tags": ["a", "b"], "seat": 1 });
        assert!(!Criteria::new().with("tags", "a").matches(&doc));
        assert!(!Criteria::new().with("seat", "1").matches(&doc));
        assert_eq!(
            serde_json::to_value(Criteria::by_id("o1").with("seat", "1")).unwrap(),
            json!({ "id": "o1", "seat": "1" })
        );
    }
}
