// src/draft.rs
//
// Draft blog posts as returned by the content-generation model.
//
// The model is asked for a JSON object but answers loosely: the object may sit inside
// prose or a code fence, fields may be missing or mistyped, limits may be ignored.
// DraftRecord::from_model_output turns that into a record that respects the limits,
// and DraftResponse is the envelope handed back to callers.

use std::fmt;

use memchr::{memchr, memrchr};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::annotate::Annotator;
use crate::error::{Error, Result};

pub const MAX_TITLE_CHARS: usize = 80;
pub const MAX_TAGS: usize = 6;
pub const MIN_READING_MINUTES: u8 = 3;
pub const MAX_READING_MINUTES: u8 = 8;
const WORDS_PER_MINUTE: usize = 200;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Student Stories")]
    StudentStories,
    #[default]
    #[serde(rename = "Program Updates")]
    ProgramUpdates,
    #[serde(rename = "Community")]
    Community,
    #[serde(rename = "Success Stories")]
    SuccessStories,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::StudentStories,
        Category::ProgramUpdates,
        Category::Community,
        Category::SuccessStories,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::StudentStories => "Student Stories",
            Category::ProgramUpdates => "Program Updates",
            Category::Community => "Community",
            Category::SuccessStories => "Success Stories",
        }
    }

    /// Case-insensitive label match; anything unrecognized is a program update.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(label))
            .unwrap_or_default()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What the caller sends to the model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftRequest {
    pub prompt_text: String,
    #[serde(default)]
    pub image_references: Vec<String>,
}

impl DraftRequest {
    pub const MAX_IMAGES: usize = 4;

    /// The image references actually forwarded: the first [`Self::MAX_IMAGES`].
    pub fn images(&self) -> &[String] {
        let n = self.image_references.len().min(Self::MAX_IMAGES);
        &self.image_references[..n]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftRecord {
    pub title: String,
    pub summary: String,
    pub body_text: String,
    pub category: Category,
    pub tags: Vec<String>,
    pub reading_minutes: u8,
    /// `body_text` rendered to annotated HTML, once [`DraftRecord::render_body`] ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_html: Option<String>,
}

impl DraftRecord {
    /// Parse and clamp the JSON object found in raw model output.
    pub fn from_model_output(text: &str) -> Result<Self> {
        let obj: Map<String, Value> = serde_json::from_str(extract_json(text)?)?;

        let body_text = first_string(&obj, &["bodyText", "body"]);
        let record = Self {
            title: truncate_chars(&first_string(&obj, &["title"]), MAX_TITLE_CHARS),
            summary: first_string(&obj, &["summary"]),
            category: Category::from_label(&first_string(&obj, &["category"])),
            tags: normalize_tags(obj.get("tags")),
            reading_minutes: reading_minutes(obj.get("readingMinutes"), &body_text),
            body_text,
            body_html: None,
        };
        log::debug!(
            "draft: {:?} ({}, {} tags, {} min)",
            record.title,
            record.category,
            record.tags.len(),
            record.reading_minutes
        );
        Ok(record)
    }

    /// `body_text` through the coercer and `annotator`.
    pub fn body_html(&self, annotator: &Annotator) -> String {
        annotator.render(&self.body_text)
    }

    /// Store [`DraftRecord::body_html`] on the record.
    pub fn render_body(mut self, annotator: &Annotator) -> Self {
        self.body_html = Some(self.body_html(annotator));
        self
    }
}

/// Envelope returned for a draft request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftResponse {
    pub succeeded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<DraftRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl DraftResponse {
    pub fn ok(record: DraftRecord) -> Self {
        Self {
            succeeded: true,
            record: Some(record),
            error_message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            record: None,
            error_message: Some(message.into()),
        }
    }

    /// Never fails: a bad model answer becomes `succeeded: false`.
    pub fn from_model_output(text: &str, annotator: &Annotator) -> Self {
        match DraftRecord::from_model_output(text) {
            Ok(record) => Self::ok(record.render_body(annotator)),
            Err(err) => {
                log::warn!("draft: rejecting model output: {err}");
                Self::failed(err.to_string())
            }
        }
    }
}

/// The span from the first `{` to the last `}`.
pub fn extract_json(text: &str) -> Result<&str> {
    let bytes = text.as_bytes();
    match (memchr(b'{', bytes), memrchr(b'}', bytes)) {
        (Some(start), Some(end)) if start < end => Ok(&text[start..=end]),
        _ => Err(Error::NoJsonObject),
    }
}

fn first_string(obj: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|k| obj.get(*k).and_then(Value::as_str))
        .unwrap_or_default()
        .trim()
        .to_string()
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((cut, _)) => s[..cut].trim_end().to_string(),
        None => s.to_string(),
    }
}

/// Array of strings or a comma-separated string; trimmed, de-duplicated, capped.
fn normalize_tags(value: Option<&Value>) -> Vec<String> {
    let raw: Vec<&str> = match value {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        Some(Value::String(s)) => s.split(',').collect(),
        _ => Vec::new(),
    };

    let mut tags: Vec<String> = Vec::new();
    for tag in raw {
        let tag = tag.trim().trim_start_matches('#').trim();
        if tag.is_empty() || tags.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            continue;
        }
        tags.push(tag.to_string());
        if tags.len() == MAX_TAGS {
            break;
        }
    }
    tags
}

fn reading_minutes(value: Option<&Value>, body: &str) -> u8 {
    let given = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    let minutes = given
        .filter(|m| m.is_finite())
        .map(f64::round)
        .unwrap_or_else(|| body.split_whitespace().count().div_ceil(WORDS_PER_MINUTE) as f64);
    minutes.clamp(MIN_READING_MINUTES as f64, MAX_READING_MINUTES as f64) as u8
}
