//! Generate static files

use anyhow::Result;

use crate::generator::Generator;
use crate::preview::PreviewContext;
use crate::Blog;

/// Pull every post from the content API and render the site
///
/// With `preview_ref`, post pages are rendered from that revision instead
/// of the published one.
pub async fn run(blog: &Blog, preview_ref: Option<String>) -> Result<()> {
    let start = std::time::Instant::now();
    let preview = PreviewContext::from_ref(preview_ref);
    if preview.active {
        tracing::info!("Rendering posts from preview ref");
    }

    let generator = Generator::new(blog, blog.client()?)?;
    let summary = generator.generate(&preview).await?;

    if !summary.skipped.is_empty() {
        tracing::warn!(
            "{} posts skipped: {}",
            summary.skipped.len(),
            summary.skipped.join(", ")
        );
    }

    tracing::info!(
        "Generated {} listing pages and {} posts in {:.2}s",
        summary.listing_pages,
        summary.posts,
        start.elapsed().as_secs_f64()
    );

    Ok(())
}
