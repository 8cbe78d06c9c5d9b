//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::config::SiteConfig;

/// Characters escaped inside a single path segment
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'\'');

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/post/hello/") // -> "/blog/post/hello/"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Generate a full URL including the domain
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    format!("{}{}", config.url.trim_end_matches('/'), url_for(config, path))
}

/// Escape a value for use as one path segment
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

/// Output path of a post, relative to the public directory
pub fn post_dir(uid: &str) -> String {
    format!("post/{}/", encode_segment(uid))
}

/// Link to a post page
pub fn post_url(config: &SiteConfig, uid: &str) -> String {
    url_for(config, &post_dir(uid))
}

/// Output path of listing page `page` (1-based), relative to the public directory
pub fn listing_dir(page: usize) -> String {
    if page <= 1 {
        String::new()
    } else {
        format!("page/{}/", page)
    }
}

/// Link to listing page `page`
pub fn listing_url(config: &SiteConfig, page: usize) -> String {
    url_for(config, &listing_dir(page))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(root: &str) -> SiteConfig {
        SiteConfig {
            root: root.to_string(),
            url: "https://blog.example.com/".to_string(),
            ..SiteConfig::default()
        }
    }

    #[test]
    fn test_url_for() {
        assert_eq!(url_for(&config("/"), "/post/a/"), "/post/a/");
        assert_eq!(url_for(&config("/blog/"), "post/a/"), "/blog/post/a/");
        assert_eq!(url_for(&config("/blog"), ""), "/blog/");
    }

    #[test]
    fn test_full_url_for() {
        assert_eq!(
            full_url_for(&config("/"), "post/a/"),
            "https://blog.example.com/post/a/"
        );
    }

    #[test]
    fn test_post_url_encodes_uid() {
        assert_eq!(post_url(&config("/"), "como-utilizar-hooks"), "/post/como-utilizar-hooks/");
        assert_eq!(post_url(&config("/"), "a b/c"), "/post/a%20b%2Fc/");
        assert_eq!(post_url(&config("/"), "ação"), "/post/a%C3%A7%C3%A3o/");
    }

    #[test]
    fn test_listing_url() {
        assert_eq!(listing_url(&config("/"), 1), "/");
        assert_eq!(listing_url(&config("/"), 3), "/page/3/");
        assert_eq!(listing_dir(2), "page/2/");
    }
}
