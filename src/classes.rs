// src/classes.rs
//
// Default presentation classes per tag, and overrides loaded from JSON.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Tailwind-style defaults, one entry per tag the annotator knows about.
const DEFAULT_CLASSES: &[(&str, &str)] = &[
    ("p", "mb-4 leading-relaxed text-gray-700"),
    ("h1", "text-4xl font-bold tracking-tight text-gray-900 mt-8 mb-4"),
    ("h2", "text-3xl font-bold tracking-tight text-gray-900 mt-8 mb-4"),
    ("h3", "text-2xl font-semibold text-gray-900 mt-6 mb-3"),
    ("h4", "text-xl font-semibold text-gray-900 mt-6 mb-2"),
    ("h5", "text-lg font-semibold text-gray-900 mt-4 mb-2"),
    ("h6", "text-base font-semibold text-gray-900 mt-4 mb-2"),
    ("ul", "list-disc pl-6 mb-4 space-y-1"),
    ("ol", "list-decimal pl-6 mb-4 space-y-1"),
    ("li", "leading-relaxed text-gray-700"),
    ("blockquote", "border-l-4 border-amber-400 pl-4 italic text-gray-600 my-6"),
    ("pre", "bg-gray-900 text-gray-100 rounded-lg p-4 overflow-x-auto mb-4"),
    ("code", "font-mono text-sm bg-gray-100 rounded px-1"),
    ("table", "w-full border-collapse mb-6 text-left"),
    ("thead", "bg-gray-50"),
    ("tbody", "divide-y divide-gray-200"),
    ("tr", "border-b border-gray-200"),
    ("th", "px-4 py-2 font-semibold text-gray-900"),
    ("td", "px-4 py-2 text-gray-700"),
    ("img", "rounded-lg my-6 max-w-full h-auto"),
    ("a", "text-amber-600 underline hover:text-amber-700"),
    ("hr", "my-8 border-gray-200"),
    ("br", ""),
];

/// Immutable tag → class-string table.
///
/// Keys are lower-case tag names. A tag mapped to an empty string is known but gets no
/// classes; [`ClassMap::classes_for`] reports it as unmapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMap {
    entries: BTreeMap<String, String>,
}

impl Default for ClassMap {
    fn default() -> Self {
        Self::from_pairs(DEFAULT_CLASSES.iter().copied())
    }
}

impl ClassMap {
    /// A map holding exactly `pairs`, no defaults.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(tag, classes)| (tag.as_ref().to_ascii_lowercase(), classes.into()))
            .collect();
        Self { entries }
    }

    /// Defaults overlaid with a JSON object of `"tag": "classes"` pairs.
    ///
    /// An override with an empty string drops the tag from the map.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let overrides: BTreeMap<String, String> =
            serde_json::from_str(json).map_err(Error::ClassMap)?;
        Ok(Self::default().with_overrides(overrides))
    }

    /// Read [`ClassMap::from_json_str`] input from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let map = Self::from_json_str(&json)?;
        log::debug!("loaded class map from {} ({} tags)", path.display(), map.len());
        Ok(map)
    }

    pub fn with_overrides<K, V>(mut self, overrides: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        for (tag, classes) in overrides {
            let tag = tag.as_ref().to_ascii_lowercase();
            let classes = classes.into();
            if classes.trim().is_empty() {
                self.entries.remove(&tag);
            } else {
                self.entries.insert(tag, classes);
            }
        }
        self
    }

    /// Class tokens for `tag` (case-insensitive), or `None` when the tag is unmapped.
    pub fn classes_for(&self, tag: &str) -> Option<impl Iterator<Item = &str>> {
        let classes = match self.entries.get(tag) {
            Some(c) => c,
            None => self.entries.get(&tag.to_ascii_lowercase())?,
        };
        if classes.trim().is_empty() {
            return None;
        }
        Some(classes.split_whitespace())
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.entries.contains_key(&tag.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_the_known_tags() {
        let map = ClassMap::default();
        for tag in [
            "p", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li", "blockquote", "pre", "code",
            "table", "thead", "tbody", "tr", "th", "td", "img", "a", "hr", "br",
        ] {
            assert!(map.contains(tag), "missing {tag}");
        }
        assert!(!map.contains("div"));
        assert!(!map.contains("script"));
    }

    #[test]
    fn lookup_ignores_case() {
        let map = ClassMap::default();
        let upper: Vec<_> = map.classes_for("P").unwrap().collect();
        let lower: Vec<_> = map.classes_for("p").unwrap().collect();
        assert_eq!(upper, lower);
        assert!(upper.contains(&"leading-relaxed"));
    }

    #[test]
    fn empty_class_string_reads_as_unmapped() {
        let map = ClassMap::default();
        assert!(map.contains("br"));
        assert!(map.classes_for("br").is_none());
    }

    #[test]
    fn json_overrides_replace_add_and_remove() {
        let map = ClassMap::from_json_str(r#"{"P": "prose", "figure": "my-4", "a": ""}"#).unwrap();
        assert_eq!(map.classes_for("p").unwrap().collect::<Vec<_>>(), ["prose"]);
        assert_eq!(map.classes_for("figure").unwrap().collect::<Vec<_>>(), ["my-4"]);
        assert!(!map.contains("a"));
        assert!(map.contains("h3"));
    }

    #[test]
    fn json_must_be_an_object_of_strings() {
        assert!(matches!(
            ClassMap::from_json_str(r#"["p"]"#),
            Err(Error::ClassMap(_))
        ));
        assert!(matches!(
            ClassMap::from_json_str(r#"{"p": 3}"#),
            Err(Error::ClassMap(_))
        ));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classes.json");
        fs::write(&path, r#"{"h3": "title"}"#).unwrap();
        let map = ClassMap::load(&path).unwrap();
        assert_eq!(map.classes_for("h3").unwrap().collect::<Vec<_>>(), ["title"]);
        assert!(matches!(
            ClassMap::load(&dir.path().join("missing.json")),
            Err(Error::Io(_))
        ));
    }
}
