//! Generator module - renders the listing and post pages to static HTML

use anyhow::Result;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use tera::Context;

use crate::client::ContentClient;
use crate::content::{richtext, ContentLoader, PostSummary, PostView};
use crate::helpers::{
    date_xml, full_url_for, listing_dir, listing_url, post_dir, post_url, url_for, DateFormatter,
};
use crate::pagination::PaginationState;
use crate::preview::PreviewContext;
use crate::templates::{
    CommentData, NavPost, PostCardData, PostPageData, SectionData, SiteData, TemplateRenderer,
    STYLESHEET,
};
use crate::Blog;

/// What a generation run produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateSummary {
    pub listing_pages: usize,
    pub posts: usize,
    /// Posts that could not be mapped, by uid
    pub skipped: Vec<String>,
}

/// Static site generator over a content client
pub struct Generator {
    blog: Blog,
    client: Arc<dyn ContentClient>,
    renderer: TemplateRenderer,
    dates: DateFormatter,
}

impl Generator {
    /// Create a new generator
    pub fn new(blog: &Blog, client: Arc<dyn ContentClient>) -> Result<Self> {
        let renderer = TemplateRenderer::new()?;
        let dates = DateFormatter::from_config(&blog.config);

        Ok(Self {
            blog: blog.clone(),
            client,
            renderer,
            dates,
        })
    }

    pub fn blog(&self) -> &Blog {
        &self.blog
    }

    pub fn loader(&self) -> ContentLoader<'_> {
        ContentLoader::new(self.client.as_ref(), self.blog.config.api.page_size)
    }

    /// Generate the entire site
    pub async fn generate(&self, preview: &PreviewContext) -> Result<GenerateSummary> {
        let public_dir = &self.blog.public_dir;
        fs::create_dir_all(public_dir)?;
        fs::write(public_dir.join("styles.css"), STYLESHEET)?;

        let loader = self.loader();
        let mut summary = GenerateSummary::default();

        // Each listing page shows everything loaded so far, the way the
        // "load more" button grows the list
        let mut state = loader.first_page().await?;
        let mut page_num = 1;
        loop {
            let html = self.render_listing(&state, page_num)?;
            write_page(public_dir, &listing_dir(page_num), &html)?;
            summary.listing_pages += 1;

            if !state.has_more() {
                break;
            }
            state.load_more(self.client.as_ref()).await?;
            page_num += 1;
        }

        tracing::info!(
            "Generated {} listing pages with {} posts",
            summary.listing_pages,
            state.len()
        );

        for post in state.items() {
            match self.generate_post(post, preview).await {
                Ok(()) => summary.posts += 1,
                // Only malformed posts are skipped; transport failures abort
                Err(e) if is_malformed(&e) => {
                    tracing::warn!("Skipping post {}: {:#}", post.uid, e);
                    summary.skipped.push(post.uid.clone());
                }
                Err(e) => return Err(e.context(format!("Failed to load post {}", post.uid))),
            }
        }

        Ok(summary)
    }

    async fn generate_post(&self, post: &PostSummary, preview: &PreviewContext) -> Result<()> {
        let view = self.loader().load_post(&post.uid, preview).await?;
        let html = self.render_post(&view)?;
        write_page(&self.blog.public_dir, &post_dir(&view.post.uid), &html)?;
        tracing::debug!("Generated post: {}", view.post.uid);
        Ok(())
    }

    /// Create a base context with common variables
    fn create_base_context(&self) -> Context {
        let config = &self.blog.config;
        let mut context = Context::new();
        context.insert(
            "site",
            &SiteData {
                title: config.title.clone(),
                description: config.description.clone(),
                lang: config.language.replace('_', "-"),
                root: url_for(config, ""),
                url: config.url.clone(),
            },
        );
        context.insert("page_title", &None::<String>);
        context.insert("page_description", &None::<String>);
        context.insert("canonical", &None::<String>);
        context
    }

    /// Render listing page `page_num` from the accumulated state
    pub fn render_listing(&self, state: &PaginationState, page_num: usize) -> Result<String> {
        let config = &self.blog.config;
        let posts: Vec<PostCardData> = state
            .items()
            .iter()
            .map(|p| PostCardData {
                uid: p.uid.clone(),
                title: p.title.clone(),
                subtitle: p.subtitle.clone(),
                author: p.author.clone(),
                date: p.first_publication_date.map(|d| self.dates.date(&d)),
                iso_date: p.first_publication_date.map(|d| date_xml(&d)),
                path: post_url(config, &p.uid),
            })
            .collect();

        let next_link = state
            .has_more()
            .then(|| listing_url(config, page_num + 1));

        let mut context = self.create_base_context();
        context.insert("posts", &posts);
        context.insert("next_link", &next_link);

        self.renderer.render("index.html", &context)
    }

    /// Render a post page
    pub fn render_post(&self, view: &PostView) -> Result<String> {
        let config = &self.blog.config;
        let post = &view.post;

        let page = PostPageData {
            uid: post.uid.clone(),
            title: post.title.clone(),
            banner_url: post.banner_url.clone(),
            author: post.author.clone(),
            date: post.first_publication_date.map(|d| self.dates.date(&d)),
            iso_date: post.first_publication_date.map(|d| date_xml(&d)),
            edited: post
                .last_publication_date
                .filter(|_| post.was_edited())
                .map(|d| self.dates.datetime(&d)),
            reading_time: view.reading_time,
            sections: post
                .content
                .iter()
                .map(|s| SectionData {
                    heading: s.heading.clone(),
                    html: richtext::as_html(&s.body),
                })
                .collect(),
            path: post_url(config, &post.uid),
        };

        let nav = |p: &crate::content::AdjacentPostRef| NavPost {
            title: p.title.clone(),
            path: post_url(config, &p.uid),
        };

        let comments = config.comments.enabled().then(|| CommentData {
            repo: config.comments.repo.clone(),
            issue_term: config.comments.issue_term.clone(),
            theme: config.comments.theme.clone(),
        });

        let description = post
            .content
            .first()
            .map(|s| richtext::as_text(&s.body))
            .filter(|d| !d.trim().is_empty());

        let mut context = self.create_base_context();
        context.insert("page_title", &post.title);
        context.insert("page_description", &description);
        context.insert("canonical", &full_url_for(config, &post_dir(&post.uid)));
        context.insert("post", &page);
        context.insert("prev_post", &view.adjacency.previous.as_ref().map(nav));
        context.insert("next_post", &view.adjacency.next.as_ref().map(nav));
        context.insert("comments", &comments);
        context.insert("preview", &view.preview);

        self.renderer.render("post.html", &context)
    }
}

fn is_malformed(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<crate::Error>(),
        Some(crate::Error::Content(_))
    )
}

/// Write `html` to `<public_dir>/<dir>index.html`
fn write_page(public_dir: &Path, dir: &str, html: &str) -> Result<()> {
    let output_path = public_dir.join(dir).join("index.html");
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| anyhow::anyhow!("Failed to create dir {:?}: {}", parent, e))?;
    }
    fs::write(&output_path, html)
        .map_err(|e| anyhow::anyhow!("Failed to write {:?}: {}", output_path, e))?;
    tracing::debug!("Generated: {:?}", output_path);
    Ok(())
}
