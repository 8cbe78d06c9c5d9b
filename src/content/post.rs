//! Post view models and the projections that build them from raw documents

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ContentError, RawDocument, RichTextNode};

/// A post as shown in the listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostSummary {
    pub uid: String,
    pub first_publication_date: Option<DateTime<Utc>>,
    pub title: String,
    pub subtitle: String,
    pub author: String,
}

/// One titled section of a post body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentSection {
    pub heading: String,
    pub body: Vec<RichTextNode>,
}

/// A post as shown on its own page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostDetail {
    pub uid: String,
    pub first_publication_date: Option<DateTime<Utc>>,
    pub last_publication_date: Option<DateTime<Utc>>,
    pub title: String,
    pub banner_url: String,
    pub author: String,
    pub content: Vec<ContentSection>,
}

/// Link to a chronologically neighbouring post
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjacentPostRef {
    pub uid: String,
    pub title: String,
}

impl PostSummary {
    /// Project a listing document; every field except the date is required
    pub fn from_document(doc: &RawDocument) -> Result<Self, ContentError> {
        Ok(Self {
            uid: doc.require_uid()?,
            first_publication_date: doc.first_published()?,
            title: doc.require_str(&["title"])?,
            subtitle: doc.require_str(&["subtitle"])?,
            author: doc.require_str(&["author"])?,
        })
    }
}

impl PostDetail {
    /// Project a single-post document
    pub fn from_document(doc: &RawDocument) -> Result<Self, ContentError> {
        let sections = doc
            .data_value(&["content"])
            .ok_or_else(|| doc.missing("data.content"))?
            .as_array()
            .ok_or_else(|| doc.invalid("data.content", "expected an array"))?;

        let content = sections
            .iter()
            .enumerate()
            .map(|(i, section)| section_from_value(doc, i, section))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            uid: doc.require_uid()?,
            first_publication_date: doc.first_published()?,
            last_publication_date: doc.last_published()?,
            title: doc.require_str(&["title"])?,
            banner_url: doc.require_str(&["banner", "url"])?,
            author: doc.require_str(&["author"])?,
            content,
        })
    }

    /// Whether the post was edited after it was first published
    pub fn was_edited(&self) -> bool {
        match (self.first_publication_date, self.last_publication_date) {
            (Some(first), Some(last)) => last > first,
            (None, Some(_)) => true,
            _ => false,
        }
    }
}

impl AdjacentPostRef {
    pub fn from_document(doc: &RawDocument) -> Result<Self, ContentError> {
        Ok(Self {
            uid: doc.require_uid()?,
            title: doc.require_str(&["title"])?,
        })
    }
}

fn section_from_value(
    doc: &RawDocument,
    index: usize,
    value: &serde_json::Value,
) -> Result<ContentSection, ContentError> {
    let field = |name: &str| format!("data.content[{}].{}", index, name);

    let object = value
        .as_object()
        .ok_or_else(|| doc.invalid(&format!("data.content[{}]", index), "expected an object"))?;

    let heading = match object.get("heading") {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Null) | None => return Err(doc.missing(&field("heading"))),
        Some(other) => {
            return Err(doc.invalid(&field("heading"), format!("expected a string, got {}", other)))
        }
    };

    let body = match object.get("body") {
        Some(serde_json::Value::Null) | None => return Err(doc.missing(&field("body"))),
        Some(raw) => serde_json::from_value::<Vec<RichTextNode>>(raw.clone())
            .map_err(|e| doc.invalid(&field("body"), e.to_string()))?,
    };

    Ok(ContentSection { heading, body })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> RawDocument {
        serde_json::from_value(value).unwrap()
    }

    fn full_post() -> RawDocument {
        doc(json!({
            "uid": "criando-um-app-cra-do-zero",
            "first_publication_date": "2021-03-25T19:27:35+0000",
            "last_publication_date": "2021-03-26T10:00:00+0000",
            "data": {
                "title": "Criando um app CRA do zero",
                "subtitle": "Tudo sobre como criar a sua primeira aplicação",
                "author": "Danilo Vieira",
                "banner": {"url": "https://images.prismic.io/banner.png"},
                "content": [
                    {
                        "heading": "Proin et varius",
                        "body": [{"type": "paragraph", "text": "Lorem ipsum", "spans": []}]
                    },
                    {
                        "heading": "Cras laoreet",
                        "body": []
                    }
                ]
            }
        }))
    }

    #[test]
    fn test_summary_projects_fields_unchanged() {
        let summary = PostSummary::from_document(&full_post()).unwrap();
        assert_eq!(summary.uid, "criando-um-app-cra-do-zero");
        assert_eq!(summary.title, "Criando um app CRA do zero");
        assert_eq!(summary.subtitle, "Tudo sobre como criar a sua primeira aplicação");
        assert_eq!(summary.author, "Danilo Vieira");
        assert_eq!(
            summary.first_publication_date,
            Some(Utc.with_ymd_and_hms(2021, 3, 25, 19, 27, 35).unwrap())
        );
    }

    #[test]
    fn test_summary_passes_null_date_through() {
        let raw = doc(json!({
            "uid": "draft",
            "first_publication_date": null,
            "data": {"title": "T", "subtitle": "S", "author": "A"}
        }));
        let summary = PostSummary::from_document(&raw).unwrap();
        assert_eq!(summary.first_publication_date, None);
    }

    #[test]
    fn test_summary_requires_subtitle() {
        let raw = doc(json!({"uid": "x", "data": {"title": "T", "author": "A"}}));
        let err = PostSummary::from_document(&raw).unwrap_err();
        assert_eq!(err.field(), "data.subtitle");
    }

    #[test]
    fn test_summary_requires_uid() {
        let raw = doc(json!({"id": "YF0x", "data": {"title": "T", "subtitle": "S", "author": "A"}}));
        let err = PostSummary::from_document(&raw).unwrap_err();
        assert_eq!(
            err,
            ContentError::MissingField {
                document: "YF0x".to_string(),
                field: "uid".to_string()
            }
        );
    }

    #[test]
    fn test_detail_projects_sections_in_order() {
        let detail = PostDetail::from_document(&full_post()).unwrap();
        assert_eq!(detail.banner_url, "https://images.prismic.io/banner.png");
        assert_eq!(detail.content.len(), 2);
        assert_eq!(detail.content[0].heading, "Proin et varius");
        assert_eq!(detail.content[0].body[0].text.as_deref(), Some("Lorem ipsum"));
        assert_eq!(detail.content[1].heading, "Cras laoreet");
        assert!(detail.content[1].body.is_empty());
        assert!(detail.was_edited());
    }

    #[test]
    fn test_was_edited_only_after_a_later_revision() {
        let mut raw = full_post();
        raw.last_publication_date = raw.first_publication_date.clone();
        assert!(!PostDetail::from_document(&raw).unwrap().was_edited());

        raw.last_publication_date = None;
        assert!(!PostDetail::from_document(&raw).unwrap().was_edited());

        raw.first_publication_date = None;
        raw.last_publication_date = Some("2021-03-26T10:00:00+0000".to_string());
        assert!(PostDetail::from_document(&raw).unwrap().was_edited());
    }

    #[test]
    fn test_detail_requires_banner_url() {
        let mut raw = full_post();
        raw.data.insert("banner".to_string(), json!({}));
        let err = PostDetail::from_document(&raw).unwrap_err();
        assert_eq!(err.field(), "data.banner.url");
    }

    #[test]
    fn test_detail_reports_section_index() {
        let mut raw = full_post();
        raw.data
            .insert("content".to_string(), json!([{"heading": "ok", "body": []}, {"body": []}]));
        let err = PostDetail::from_document(&raw).unwrap_err();
        assert_eq!(err.field(), "data.content[1].heading");
    }

    #[test]
    fn test_detail_rejects_bad_date() {
        let mut raw = full_post();
        raw.last_publication_date = Some("not a date".to_string());
        let err = PostDetail::from_document(&raw).unwrap_err();
        assert!(matches!(err, ContentError::InvalidField { .. }));
        assert_eq!(err.field(), "last_publication_date");
    }

    #[test]
    fn test_adjacent_ref() {
        let adjacent = AdjacentPostRef::from_document(&full_post()).unwrap();
        assert_eq!(adjacent.uid, "criando-um-app-cra-do-zero");
        assert_eq!(adjacent.title, "Criando um app CRA do zero");
    }
}
