//! Photo records and the normalization that turns loose JSON into them.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Title used when a record carries none.
pub const PLACEHOLDER_TITLE: &str = "Untitled";

/// A validated gallery entry. Only ever produced by [`normalize`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoRecord {
    #[serde(rename = "src")]
    pub image_source: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl PhotoRecord {
    /// Lowercased haystack used by the free-text filter.
    pub fn search_text(&self) -> String {
        let mut s = String::with_capacity(self.title.len() + 32);
        s.push_str(&self.title);
        if let Some(d) = &self.description {
            s.push(' ');
            s.push_str(d);
        }
        for t in &self.tags {
            s.push(' ');
            s.push_str(t);
        }
        s.to_lowercase()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Loose record shape as found in the manifest and in local storage.
///
/// String fields holding anything other than a string are read as absent,
/// and non-string tag entries are dropped, so deserializing a JSON object
/// into this type never fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPhoto {
    #[serde(default, deserialize_with = "lenient_str", skip_serializing_if = "Option::is_none")]
    pub data_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_str", skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, deserialize_with = "lenient_str", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_str", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_str", skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient_tags")]
    pub tags: Vec<String>,
}

impl RawPhoto {
    /// `dataUrl` when present, otherwise `src`. A present-but-empty
    /// `dataUrl` still wins and makes the record invalid.
    pub fn resolved_source(&self) -> Option<&str> {
        self.data_url
            .as_deref()
            .or(self.src.as_deref())
            .filter(|s| !s.is_empty())
    }
}

impl From<PhotoRecord> for RawPhoto {
    fn from(p: PhotoRecord) -> Self {
        RawPhoto {
            data_url: None,
            src: Some(p.image_source),
            title: Some(p.title),
            description: p.description,
            date: p.date,
            tags: p.tags,
        }
    }
}

fn lenient_str<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn lenient_tags<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// Validate and coerce raw records. Records without an image source are
/// dropped; a missing or empty title becomes [`PLACEHOLDER_TITLE`].
pub fn normalize<I>(raw: I) -> Vec<PhotoRecord>
where
    I: IntoIterator<Item = RawPhoto>,
{
    raw.into_iter()
        .filter_map(|r| {
            let image_source = r.resolved_source()?.to_string();
            let title = r
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| PLACEHOLDER_TITLE.to_string());
            Some(PhotoRecord {
                image_source,
                title,
                description: r.description,
                date: r.date,
                tags: r.tags,
            })
        })
        .collect()
}

/// Decode a JSON array of loose records, skipping items that are not
/// objects. Anything that is not a JSON array yields an empty list.
pub fn parse_raw(json: &str) -> Vec<RawPhoto> {
    match serde_json::from_str::<Value>(json) {
        Ok(Value::Array(items)) => items
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect(),
        Ok(_) => {
            tracing::debug!("photo list is not a JSON array; treating as empty");
            Vec::new()
        }
        Err(e) => {
            tracing::debug!(error = %e, "photo list is not valid JSON; treating as empty");
            Vec::new()
        }
    }
}

/// [`parse_raw`] followed by [`normalize`].
pub fn parse_records(json: &str) -> Vec<PhotoRecord> {
    normalize(parse_raw(json))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(json: &str) -> Vec<RawPhoto> {
        parse_raw(json)
    }

    #[test]
    fn data_url_takes_precedence_over_src() {
        let list = normalize(raw(r#"[{"dataUrl":"data:image/jpeg;base64,AA","src":"a.jpg"}]"#));
        assert_eq!(list[0].image_source, "data:image/jpeg;base64,AA");
    }

    #[test]
    fn empty_data_url_invalidates_even_with_src() {
        let list = normalize(raw(r#"[{"dataUrl":"","src":"a.jpg"}]"#));
        assert!(list.is_empty());
    }

    #[test]
    fn missing_source_dropped_and_title_defaulted() {
        let list = normalize(raw(r#"[{"title":"no image"},{"src":"b.jpg"},{"src":"c.jpg","title":""}]"#));
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].title, PLACEHOLDER_TITLE);
        assert_eq!(list[1].title, PLACEHOLDER_TITLE);
    }

    #[test]
    fn malformed_input_degrades() {
        assert!(parse_records("not json").is_empty());
        assert!(parse_records(r#"{"src":"a.jpg"}"#).is_empty());
        let list = parse_records(r#"[1, "x", null, {"src": 5}, {"src":"ok.jpg","tags":["a",3,"b"],"title":7}]"#);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].tags, vec!["a", "b"]);
        assert_eq!(list[0].title, PLACEHOLDER_TITLE);
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = parse_records(
            r#"[{"src":"a.jpg","title":"A","tags":["x","x"]},{"dataUrl":"data:,1"},{"title":"gone"},
                {"src":"d.jpg","description":"desc","date":"2024-01-02"}]"#,
        );
        let twice = normalize(once.clone().into_iter().map(RawPhoto::from));
        assert_eq!(once, twice);
        assert_eq!(once.len(), 3);
    }

    #[test]
    fn search_text_covers_title_description_and_tags() {
        let p = PhotoRecord {
            image_source: "a.jpg".into(),
            title: "Nap".into(),
            description: Some("On The Sofa".into()),
            date: None,
            tags: vec!["Sleepy".into()],
        };
        assert_eq!(p.search_text(), "nap on the sofa sleepy");
    }
}
