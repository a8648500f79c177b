use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single catalog template item
///
/// Identity is `id` alone. Two designs with the same id are the same entity
/// even when their other fields differ between fetches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Design {
    #[serde(rename = "uuid")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_premium: bool,
    #[serde(default, deserialize_with = "lenient_features")]
    pub features: Map<String, Value>,
    /// Display fields the engine never interprets (title, thumbnails, ...)
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl Design {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_premium: false,
            features: Map::new(),
            metadata: Map::new(),
        }
    }

    pub fn premium(mut self, is_premium: bool) -> Self {
        self.is_premium = is_premium;
        self
    }

    pub fn with_feature(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.features.insert(name.into(), value.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Whether the catalog flags `name` as supported on this design.
    ///
    /// The catalog is loose about flag encoding: `"yes"`, `true`, `1` all
    /// show up. Anything missing or unrecognised counts as absent.
    pub fn has_feature(&self, name: &str) -> bool {
        self.features.get(name).is_some_and(is_truthy)
    }

    /// Display title, when the catalog sent one
    pub fn title(&self) -> Option<&str> {
        self.metadata.get("title").and_then(Value::as_str)
    }
}

impl PartialEq for Design {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Design {}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "yes" | "true" | "1" | "on"
        ),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => false,
    }
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().is_some_and(is_truthy))
}

// Some catalog rows send `features: []` or `null` instead of an object.
fn lenient_features<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Object(map)) => Ok(map),
        _ => Ok(Map::new()),
    }
}

/// A named, priority-ordered group of designs for one match type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBucket {
    #[serde(rename = "match", default)]
    pub category: String,
    #[serde(default, deserialize_with = "lenient_designs")]
    pub designs: Vec<Design>,
}

impl CategoryBucket {
    pub fn new(category: impl Into<String>, designs: Vec<Design>) -> Self {
        Self {
            category: category.into(),
            designs,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.designs.iter().any(|d| d.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.designs.is_empty()
    }
}

fn lenient_designs<'de, D>(deserializer: D) -> Result<Vec<Design>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<Design>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Buckets produced by one catalog query, highest priority first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchResultSet {
    pub buckets: Vec<CategoryBucket>,
}

impl SearchResultSet {
    pub fn new(buckets: Vec<CategoryBucket>) -> Self {
        Self { buckets }
    }

    pub fn bucket(&self, category: &str) -> Option<&CategoryBucket> {
        self.buckets.iter().find(|b| b.category == category)
    }

    /// Total number of designs across buckets, duplicates included
    pub fn design_count(&self) -> usize {
        self.buckets.iter().map(|b| b.designs.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(CategoryBucket::is_empty)
    }
}

impl From<Vec<CategoryBucket>> for SearchResultSet {
    fn from(buckets: Vec<CategoryBucket>) -> Self {
        Self::new(buckets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_design_from_catalog_json() {
        let json = r#"{
            "uuid": "abc-1",
            "is_premium": true,
            "features": {"ecommerce": "yes", "blog": "no"},
            "title": "Bakery One",
            "image": "https://example.com/a.png"
        }"#;

        let design: Design = serde_json::from_str(json).unwrap();
        assert_eq!(design.id, "abc-1");
        assert!(design.is_premium);
        assert!(design.has_feature("ecommerce"));
        assert!(!design.has_feature("blog"));
        assert!(!design.has_feature("missing"));
        assert_eq!(design.title(), Some("Bakery One"));
        assert!(design.metadata.contains_key("image"));
        assert!(!design.metadata.contains_key("uuid"));
    }

    #[test]
    fn test_design_tolerates_loose_fields() {
        let json = r#"{"uuid": "x", "is_premium": "1", "features": []}"#;
        let design: Design = serde_json::from_str(json).unwrap();
        assert!(design.is_premium);
        assert!(design.features.is_empty());

        let json = r#"{"uuid": "y"}"#;
        let design: Design = serde_json::from_str(json).unwrap();
        assert!(!design.is_premium);
        assert!(!design.has_feature("ecommerce"));
    }

    #[test]
    fn test_identity_is_id_only() {
        let a = Design::new("same").premium(true);
        let b = Design::new("same").with_metadata("title", "Other");
        assert_eq!(a, b);
        assert_ne!(a, Design::new("different"));
    }

    #[test]
    fn test_feature_truthiness() {
        let design = Design::new("d")
            .with_feature("a", true)
            .with_feature("b", "YES")
            .with_feature("c", 1)
            .with_feature("d", 0)
            .with_feature("e", "no")
            .with_feature("f", Value::Null);

        assert!(design.has_feature("a"));
        assert!(design.has_feature("b"));
        assert!(design.has_feature("c"));
        assert!(!design.has_feature("d"));
        assert!(!design.has_feature("e"));
        assert!(!design.has_feature("f"));
    }

    #[test]
    fn test_result_set_wire_shape() {
        let json = r#"[
            {"match": "recommended", "designs": [{"uuid": "1"}, {"uuid": "2"}]},
            {"match": "partial", "designs": null},
            {"match": "generic"}
        ]"#;

        let set: SearchResultSet = serde_json::from_str(json).unwrap();
        assert_eq!(set.buckets.len(), 3);
        assert_eq!(set.design_count(), 2);
        assert!(set.bucket("partial").unwrap().is_empty());
        assert!(set.bucket("recommended").unwrap().contains("2"));
        assert!(set.bucket("unknown").is_none());
    }
}
