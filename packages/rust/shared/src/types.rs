//! Core domain types for the extracted blog index.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// TocEntry
// ---------------------------------------------------------------------------

/// One row of the blog's table of contents.
///
/// Every field is kept as the text found in the page; nothing is parsed or
/// validated. Missing values are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TocEntry {
    /// Post number from the first cell (e.g. `"1742"`).
    pub number: String,
    /// Publication date from the second cell, in whatever format the page uses.
    pub date: String,
    /// Text of the external anchor in the content cell.
    pub title: String,
    /// Permanent URL of the post on the blog's own domain.
    pub url_external: String,
    /// Link to the locally mirrored copy of the post.
    pub url_internal: String,
    /// Category text from the fourth cell.
    pub categories: String,
    /// Topic names for `url_external`, joined with `", "`.
    pub topic: String,
}

impl TocEntry {
    /// Whether at least one topic section links to this entry.
    pub fn has_topic(&self) -> bool {
        !self.topic.is_empty()
    }
}

// ---------------------------------------------------------------------------
// PageRecord
// ---------------------------------------------------------------------------

/// A stored entry: the extracted row plus the content of its local page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    /// The extracted TOC row.
    #[serde(flatten)]
    pub entry: TocEntry,
    /// Cleaned text of the local page file (empty if none was found).
    pub content: String,
    /// RFC 3339 timestamp of the import that wrote this row.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imported_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry() -> TocEntry {
        TocEntry {
            number: "1".into(),
            date: "2024-01-15".into(),
            title: "Sample".into(),
            url_external: "http://thebuildingcoder.typepad.com/p1".into(),
            url_internal: "p1.htm".into(),
            categories: "dev,revit".into(),
            topic: String::new(),
        }
    }

    #[test]
    fn toc_entry_uses_camel_case_field_names() {
        let json = serde_json::to_value(sample_entry()).expect("serialize");
        let obj = json.as_object().expect("object");
        let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            [
                "categories",
                "date",
                "number",
                "title",
                "topic",
                "urlExternal",
                "urlInternal"
            ]
        );
        assert_eq!(obj["urlInternal"], "p1.htm");
    }

    #[test]
    fn has_topic_reflects_joined_string() {
        let mut entry = sample_entry();
        assert!(!entry.has_topic());
        entry.topic = "Geometry, Ribbon".into();
        assert!(entry.has_topic());
    }

    #[test]
    fn page_record_flattens_entry() {
        let record = PageRecord {
            entry: sample_entry(),
            content: "<p>body</p>".into(),
            imported_at: None,
        };
        let json = serde_json::to_string(&record).expect("serialize");
        assert!(json.contains("\"urlExternal\""));
        assert!(json.contains("\"content\""));
        assert!(!json.contains("imported_at"));

        let parsed: PageRecord = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, record);
    }
}
