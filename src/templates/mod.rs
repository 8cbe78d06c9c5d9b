//! Built-in site templates using the Tera template engine
//!
//! The listing and post templates are embedded in the binary.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

/// Stylesheet referenced by the layout
pub const STYLESHEET: &str = include_str!("site/styles.css");

/// Template renderer with the embedded site templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("index.html", include_str!("site/index.html")),
            ("post.html", include_str!("site/post.html")),
            // Partials
            (
                "partials/head.html",
                include_str!("site/partials/head.html"),
            ),
            (
                "partials/header.html",
                include_str!("site/partials/header.html"),
            ),
            (
                "partials/post_info.html",
                include_str!("site/partials/post_info.html"),
            ),
            (
                "partials/comments.html",
                include_str!("site/partials/comments.html"),
            ),
            (
                "partials/preview.html",
                include_str!("site/partials/preview.html"),
            ),
        ])?;

        tera.register_filter("truncate_chars", truncate_chars_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "...".to_string(),
    };

    if s.chars().count() <= length {
        Ok(tera::Value::String(s))
    } else {
        let truncated: String = s.chars().take(length).collect();
        Ok(tera::Value::String(format!(
            "{}{}",
            truncated.trim_end(),
            omission
        )))
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    /// BCP 47 tag for `<html lang>`
    pub lang: String,
    pub root: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostCardData {
    pub uid: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub date: Option<String>,
    pub iso_date: Option<String>,
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionData {
    pub heading: String,
    pub html: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostPageData {
    pub uid: String,
    pub title: String,
    pub banner_url: String,
    pub author: String,
    pub date: Option<String>,
    pub iso_date: Option<String>,
    /// Last edit, only set when the post changed after publication
    pub edited: Option<String>,
    pub reading_time: usize,
    pub sections: Vec<SectionData>,
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavPost {
    pub title: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentData {
    pub repo: String,
    pub issue_term: String,
    pub theme: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteData {
        SiteData {
            title: "spacetraveling".to_string(),
            description: String::new(),
            lang: "pt-BR".to_string(),
            root: "/".to_string(),
            url: "http://localhost:3000".to_string(),
        }
    }

    fn base_context() -> Context {
        let mut context = Context::new();
        context.insert("site", &site());
        context.insert("page_title", &None::<String>);
        context.insert("page_description", &None::<String>);
        context.insert("canonical", &None::<String>);
        context
    }

    #[test]
    fn test_render_listing_with_more_link() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut context = base_context();
        context.insert(
            "posts",
            &vec![PostCardData {
                uid: "hooks".to_string(),
                title: "Como utilizar <Hooks>".to_string(),
                subtitle: "Pensando em sincronização".to_string(),
                author: "Joseph Oliveira".to_string(),
                date: Some("15 mar 2021".to_string()),
                iso_date: Some("2021-03-15T19:25:28.000Z".to_string()),
                path: "/post/hooks/".to_string(),
            }],
        );
        context.insert("next_link", &Some("/page/2/"));

        let html = renderer.render("index.html", &context).unwrap();
        assert!(html.contains(r#"<a href="/post/hooks/">"#));
        assert!(html.contains("Como utilizar &lt;Hooks&gt;"));
        assert!(html.contains("15 mar 2021"));
        assert!(html.contains(r#"href="/page/2/">Carregar mais posts"#));
        assert!(html.contains("<title>Home | spacetraveling</title>"));
    }

    #[test]
    fn test_render_listing_without_more_link() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut context = base_context();
        context.insert("posts", &Vec::<PostCardData>::new());
        context.insert("next_link", &None::<String>);

        let html = renderer.render("index.html", &context).unwrap();
        assert!(!html.contains("Carregar mais posts"));
    }

    #[test]
    fn test_truncate_chars_filter() {
        let mut args = HashMap::new();
        args.insert("length".to_string(), tera::Value::from(5));
        let value = truncate_chars_filter(&tera::Value::from("abcdefgh"), &args).unwrap();
        assert_eq!(value, tera::Value::from("abcde..."));

        let value = truncate_chars_filter(&tera::Value::from("abc"), &args).unwrap();
        assert_eq!(value, tera::Value::from("abc"));
    }
}
