//! HTML sanitization
//!
//! All user-supplied text passes through here before it is stored.
//! Content bodies keep a small set of formatting tags; short fields like
//! comments, titles and bios are reduced to plain text.

use ammonia::Builder;
use once_cell::sync::Lazy;
use std::collections::HashSet;

static RICH_CLEANER: Lazy<Builder<'static>> = Lazy::new(|| {
    let mut builder = Builder::default();
    builder.tags(HashSet::from([
        "a", "b", "blockquote", "br", "code", "em", "h1", "h2", "h3", "h4", "i", "li", "ol", "p",
        "pre", "strong", "ul",
    ]));
    builder.link_rel(Some("noopener noreferrer"));
    builder
});

static STRICT_CLEANER: Lazy<Builder<'static>> = Lazy::new(|| {
    let mut builder = Builder::default();
    builder.tags(HashSet::new());
    builder
});

/// Sanitize a content body, keeping basic formatting tags
pub fn sanitize_body(input: &str) -> String {
    RICH_CLEANER.clean(input).to_string()
}

/// Reduce a short text field to plain text, stripping every tag
pub fn sanitize_text(input: &str) -> String {
    STRICT_CLEANER.clean(input).to_string()
}
