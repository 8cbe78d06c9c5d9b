//! Wire shapes returned by the content API

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ContentError;

/// A document as returned by the API, before mapping
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub uid: Option<String>,

    #[serde(default, rename = "type")]
    pub doc_type: Option<String>,

    #[serde(default)]
    pub first_publication_date: Option<String>,

    #[serde(default)]
    pub last_publication_date: Option<String>,

    /// Custom-type fields; left untyped and projected by the mapper
    #[serde(default)]
    pub data: Map<String, Value>,
}

/// One page of query results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiPage {
    #[serde(default)]
    pub page: usize,

    #[serde(default)]
    pub results_per_page: usize,

    #[serde(default)]
    pub total_results_size: usize,

    #[serde(default)]
    pub total_pages: usize,

    /// Cursor for the following page; `None` once the listing is exhausted
    pub next_page: Option<String>,

    #[serde(default)]
    pub prev_page: Option<String>,

    pub results: Vec<RawDocument>,
}

impl ApiPage {
    /// A page holding `results` with the given cursor
    pub fn new(results: Vec<RawDocument>, next_page: Option<String>) -> Self {
        Self {
            results_per_page: results.len(),
            total_results_size: results.len(),
            page: 1,
            total_pages: 1,
            next_page,
            prev_page: None,
            results,
        }
    }
}

impl RawDocument {
    /// Label used in error messages
    pub(crate) fn label(&self) -> String {
        self.uid
            .clone()
            .or_else(|| self.id.clone())
            .unwrap_or_else(|| "<unknown>".to_string())
    }

    pub(crate) fn missing(&self, field: &str) -> ContentError {
        ContentError::MissingField {
            document: self.label(),
            field: field.to_string(),
        }
    }

    pub(crate) fn invalid(&self, field: &str, reason: impl Into<String>) -> ContentError {
        ContentError::InvalidField {
            document: self.label(),
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn require_uid(&self) -> Result<String, ContentError> {
        self.uid.clone().ok_or_else(|| self.missing("uid"))
    }

    /// Follow `path` below `data`; a `null` leaf counts as absent
    pub(crate) fn data_value(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        let mut current = self.data.get(*first)?;
        for key in rest {
            current = current.as_object()?.get(*key)?;
        }
        (!current.is_null()).then_some(current)
    }

    /// Required string at `data.<path>`
    pub(crate) fn require_str(&self, path: &[&str]) -> Result<String, ContentError> {
        let field = field_name(path);
        match self.data_value(path) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Err(self.invalid(&field, format!("expected a string, got {}", other))),
            None => Err(self.missing(&field)),
        }
    }

    pub(crate) fn first_published(&self) -> Result<Option<DateTime<Utc>>, ContentError> {
        parse_optional_date(self, "first_publication_date", &self.first_publication_date)
    }

    pub(crate) fn last_published(&self) -> Result<Option<DateTime<Utc>>, ContentError> {
        parse_optional_date(self, "last_publication_date", &self.last_publication_date)
    }
}

fn field_name(path: &[&str]) -> String {
    format!("data.{}", path.join("."))
}

fn parse_optional_date(
    doc: &RawDocument,
    field: &str,
    value: &Option<String>,
) -> Result<Option<DateTime<Utc>>, ContentError> {
    match value {
        None => Ok(None),
        Some(raw) => parse_api_date(raw)
            .map(Some)
            .ok_or_else(|| doc.invalid(field, format!("unparsable timestamp {:?}", raw))),
    }
}

/// Parse an API timestamp
///
/// The API emits `2021-03-25T19:25:28+0000`; RFC 3339 is accepted as well.
pub fn parse_api_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::<FixedOffset>::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z"))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_api_date_formats() {
        let expected = Utc.with_ymd_and_hms(2021, 3, 25, 19, 25, 28).unwrap();
        assert_eq!(parse_api_date("2021-03-25T19:25:28+0000"), Some(expected));
        assert_eq!(parse_api_date("2021-03-25T19:25:28Z"), Some(expected));
        assert_eq!(parse_api_date("2021-03-25T16:25:28-03:00"), Some(expected));
        assert_eq!(parse_api_date("yesterday"), None);
    }

    #[test]
    fn test_deserialize_page() {
        let json = r#"{
            "page": 1,
            "results_per_page": 1,
            "total_results_size": 2,
            "total_pages": 2,
            "next_page": "https://repo.cdn.prismic.io/api/v2/documents/search?page=2",
            "prev_page": null,
            "results": [{
                "id": "YF0x",
                "uid": "como-utilizar-hooks",
                "type": "post",
                "first_publication_date": "2021-03-15T19:25:28+0000",
                "last_publication_date": null,
                "data": {"title": "Como utilizar Hooks", "author": "Joseph Oliveira"}
            }]
        }"#;
        let page: ApiPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.results.len(), 1);
        assert!(page.next_page.is_some());
        let doc = &page.results[0];
        assert_eq!(doc.doc_type.as_deref(), Some("post"));
        assert_eq!(doc.require_str(&["title"]).unwrap(), "Como utilizar Hooks");
    }

    #[test]
    fn test_data_value_treats_null_as_absent() {
        let doc: RawDocument = serde_json::from_str(
            r#"{"uid": "a", "data": {"title": null, "banner": {"url": "x"}}}"#,
        )
        .unwrap();
        assert!(doc.data_value(&["title"]).is_none());
        assert_eq!(doc.require_str(&["banner", "url"]).unwrap(), "x");
        assert_eq!(
            doc.require_str(&["title"]).unwrap_err(),
            ContentError::MissingField {
                document: "a".to_string(),
                field: "data.title".to_string()
            }
        );
    }

    #[test]
    fn test_wrong_type_is_invalid() {
        let doc: RawDocument =
            serde_json::from_str(r#"{"uid": "a", "data": {"title": 42}}"#).unwrap();
        let err = doc.require_str(&["title"]).unwrap_err();
        assert!(matches!(err, ContentError::InvalidField { .. }));
        assert_eq!(err.field(), "data.title");
    }
}
