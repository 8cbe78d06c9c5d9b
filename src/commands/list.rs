//! List the posts available in the content repository

use anyhow::Result;

use crate::content::{ContentLoader, PostSummary};
use crate::helpers::DateFormatter;
use crate::Blog;

/// Print every published post, following pagination to the end
pub async fn run(blog: &Blog) -> Result<()> {
    let client = blog.client()?;
    let loader = ContentLoader::new(client.as_ref(), blog.config.api.page_size);
    let posts = loader.load_all().await?.into_items();

    let dates = DateFormatter::from_config(&blog.config);
    println!("Posts ({}):", posts.len());
    for post in &posts {
        println!("  {}", format_line(post, &dates));
    }

    Ok(())
}

fn format_line(post: &PostSummary, dates: &DateFormatter) -> String {
    let date = post
        .first_publication_date
        .map(|d| dates.date(&d))
        .unwrap_or_else(|| "-".to_string());
    format!("{} - {} by {} [{}]", date, post.title, post.author, post.uid)
}
