use serde::de::{MapAccess, Visitor as SerdeVisitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Fold a hyphenated CSS property name to its camelCase form.
///
/// `font-size` → `fontSize`, `-webkit-transition` → `WebkitTransition`.
/// Custom properties (`--brand-color`) are case-sensitive and left alone.
pub fn normalize_property_name(name: &str) -> String {
    if name.starts_with("--") {
        return name.to_string();
    }

    let mut normalized = String::with_capacity(name.len());
    let mut chars = name.chars().peekable();
    while let Some(c) = chars.next() {
        match chars.peek() {
            Some(next) if c == '-' && next.is_ascii_lowercase() => {
                normalized.push(next.to_ascii_uppercase());
                chars.next();
            }
            _ => normalized.push(c),
        }
    }
    normalized
}

/// Ordered style-property map keyed by normalized (camelCase) names
///
/// Insertion order is kept and serialized as-is; inserting an existing key
/// overwrites its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleMap {
    entries: Vec<(String, String)>,
}

impl StyleMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a property by any spelling of its name
    pub fn get(&self, name: &str) -> Option<&str> {
        let key = normalize_property_name(name);
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Upsert; returns the previous value when the key already existed
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) -> Option<String> {
        let key = normalize_property_name(name.as_ref());
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for StyleMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = StyleMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl IntoIterator for StyleMap {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for StyleMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct StyleMapVisitor;

impl<'de> SerdeVisitor<'de> for StyleMapVisitor {
    type Value = StyleMap;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of style property names to string values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = StyleMap::new();
        while let Some((key, value)) = access.next_entry::<String, String>()? {
            map.insert(key, value);
        }
        Ok(map)
    }
}

impl<'de> Deserialize<'de> for StyleMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(StyleMapVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_property_name() {
        assert_eq!(normalize_property_name("font-size"), "fontSize");
        assert_eq!(normalize_property_name("fontSize"), "fontSize");
        assert_eq!(normalize_property_name("border-top-left-radius"), "borderTopLeftRadius");
        assert_eq!(normalize_property_name("-webkit-transition"), "WebkitTransition");
        assert_eq!(normalize_property_name("--brand-color"), "--brand-color");
        assert_eq!(normalize_property_name("color"), "color");
    }

    #[test]
    fn test_insert_upserts_in_place() {
        let mut styles = StyleMap::new();
        styles.insert("color", "red");
        styles.insert("font-size", "20px");
        let previous = styles.insert("fontSize", "24px");

        assert_eq!(previous, Some("20px".to_string()));
        assert_eq!(styles.len(), 2);
        assert_eq!(styles.keys().collect::<Vec<_>>(), vec!["color", "fontSize"]);
        assert_eq!(styles.get("font-size"), Some("24px"));
    }

    #[test]
    fn test_serde_keeps_order_and_normalizes() {
        let styles: StyleMap =
            serde_json::from_str(r#"{"z-index":"2","color":"red","align-items":"center"}"#).unwrap();
        assert_eq!(
            styles.keys().collect::<Vec<_>>(),
            vec!["zIndex", "color", "alignItems"]
        );

        let json = serde_json::to_string(&styles).unwrap();
        assert_eq!(json, r#"{"zIndex":"2","color":"red","alignItems":"center"}"#);
    }

    #[test]
    fn test_from_iterator() {
        let styles: StyleMap = vec![("margin-top", "4px"), ("marginTop", "8px")].into_iter().collect();
        assert_eq!(styles.len(), 1);
        assert_eq!(styles.get("marginTop"), Some("8px"));
    }
}
