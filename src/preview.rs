//! Preview mode: render a caller-supplied draft revision instead of the published one

use serde::Serialize;

/// Cookie carrying the preview ref between the preview endpoints and post pages
pub const PREVIEW_COOKIE: &str = "io.prismic.preview";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PreviewContext {
    pub active: bool,
    pub ref_token: Option<String>,
}

impl PreviewContext {
    /// Published content
    pub fn published() -> Self {
        Self::default()
    }

    /// Preview of `ref_token`; blank tokens mean no preview
    pub fn from_ref(ref_token: Option<String>) -> Self {
        match ref_token.filter(|t| !t.trim().is_empty()) {
            Some(token) => Self {
                active: true,
                ref_token: Some(token),
            },
            None => Self::published(),
        }
    }

    /// Ref to forward to the content client
    pub fn ref_token(&self) -> Option<&str> {
        self.ref_token.as_deref()
    }
}
