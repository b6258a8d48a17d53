//! Mapping generated file paths to public URLs.

use crate::error::{PipelineError, PipelineResult};

/// Where a generated path came from, handed to URL strategies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlContext {
    pub input_dir: String,
    pub output_dir: String,
    /// Source reference as written by the caller
    pub src: String,
}

/// Turns a path relative to the output directory into a URL.
///
/// Any `Fn(&str, &UrlContext) -> String` is a strategy.
pub trait UrlStrategy: Send + Sync {
    fn url(&self, path: &str, context: &UrlContext) -> String;
}

impl<F> UrlStrategy for F
where
    F: Fn(&str, &UrlContext) -> String + Send + Sync,
{
    fn url(&self, path: &str, context: &UrlContext) -> String {
        self(path, context)
    }
}

/// Serves the output directory under a fixed base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicPathStrategy {
    public_path: String,
}

impl PublicPathStrategy {
    pub fn new(public_path: impl Into<String>) -> Self {
        Self {
            public_path: public_path.into(),
        }
    }
}

impl UrlStrategy for PublicPathStrategy {
    fn url(&self, path: &str, _context: &UrlContext) -> String {
        if self.public_path.ends_with('/') {
            format!("{}{}", self.public_path, path)
        } else {
            format!("{}/{}", self.public_path, path)
        }
    }
}

/// Rewrite `\` separators to `/`.
pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

/// Remove `prefix` and the separator after it.
///
/// Only whole path segments match: `out` strips `out/a.jpg` but leaves
/// `outdir/a.jpg` alone. A non-matching or empty prefix is a no-op.
pub fn strip_prefix<'a>(path: &'a str, prefix: &str) -> &'a str {
    let prefix = normalize_separators(prefix);
    if prefix.is_empty() {
        return path;
    }
    if prefix.ends_with('/') {
        return path.strip_prefix(prefix.as_str()).unwrap_or(path);
    }
    match path.strip_prefix(prefix.as_str()) {
        Some("") => "",
        Some(rest) => rest.strip_prefix('/').unwrap_or(path),
        None => path,
    }
}

/// Whether `src` is root-relative (`/x`, but not protocol-relative `//x`).
fn is_root_relative(src: &str) -> bool {
    let mut chars = src.chars();
    chars.next() == Some('/') && chars.next().is_some_and(|c| c != '/')
}

/// Map an on-disk `path` to the URL used in markup.
///
/// With a strategy, the output directory is stripped and the strategy decides;
/// an empty answer is an error. Without one, the input directory is stripped
/// and a leading `/` is added when `src` itself is root-relative.
pub fn resolve_path(
    path: &str,
    context: &UrlContext,
    strategy: Option<&dyn UrlStrategy>,
) -> PipelineResult<String> {
    let path = normalize_separators(path);

    if let Some(strategy) = strategy {
        let stripped = strip_prefix(&path, &context.output_dir);
        let url = strategy.url(stripped, context);
        if url.is_empty() {
            return Err(PipelineError::EmptyUrl(stripped.to_string()));
        }
        return Ok(url);
    }

    let stripped = strip_prefix(&path, &context.input_dir);
    if is_root_relative(&context.src) && !stripped.starts_with('/') {
        return Ok(format!("/{stripped}"));
    }
    Ok(stripped.to_string())
}
