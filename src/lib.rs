//! spacetraveling-rs: a blog front end for a headless content API
//!
//! Posts are pulled from a Prismic-style repository, rendered with embedded
//! Tera templates, and served as static pages with a live preview route.

pub mod client;
pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod pagination;
pub mod preview;
pub mod server;
pub mod templates;

pub use error::Error;

use std::path::Path;
use std::sync::Arc;

use client::{ContentClient, PrismicClient};

/// The main blog application
#[derive(Debug, Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: std::path::PathBuf,
    /// Public (output) directory
    pub public_dir: std::path::PathBuf,
}

impl Blog {
    /// Create a new blog from a directory, reading `_config.yml` when present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> anyhow::Result<Self> {
        let config_path = base_dir.as_ref().join("_config.yml");

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };
        config.apply_env();

        Ok(Self::with_config(base_dir, config))
    }

    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let public_dir = base_dir.join(&config.public_dir);

        Self {
            config,
            base_dir,
            public_dir,
        }
    }

    /// HTTP client for the configured repository
    pub fn client(&self) -> anyhow::Result<Arc<dyn ContentClient>> {
        Ok(Arc::new(PrismicClient::new(&self.config.api)?))
    }

    /// Generate the static site
    pub async fn generate(&self, preview_ref: Option<String>) -> anyhow::Result<()> {
        commands::generate::run(self, preview_ref).await
    }

    /// Clean the public directory
    pub fn clean(&self) -> anyhow::Result<()> {
        commands::clean::run(self)
    }
}
