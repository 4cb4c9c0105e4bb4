use std::path::{Component, Path, PathBuf};
use tokio::fs;

#[derive(Clone, Debug)]
pub struct DocumentRoot {
    root: PathBuf,
    index_file: String,
}

impl DocumentRoot {
    /// `root` holds the web interface; `index_file` is served for `/`.
    pub fn new(root: PathBuf, index_file: String) -> Self {
        Self { root, index_file }
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join(&self.index_file)
    }

    pub async fn read_index(&self) -> std::io::Result<String> {
        fs::read_to_string(self.index_path()).await
    }

    /// Read a file below the root. Paths that could escape it (`..`, absolute
    /// paths, drive prefixes) are refused as not found.
    pub async fn read_file<P: AsRef<Path>>(&self, rel: P) -> std::io::Result<Vec<u8>> {
        let rel = rel.as_ref();
        if !is_contained(rel) {
            return Err(std::io::Error::from(std::io::ErrorKind::NotFound));
        }
        fs::read(self.root.join(rel)).await
    }
}

pub fn is_contained(rel: &Path) -> bool {
    rel.components().next().is_some()
        && rel
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Content type by file extension.
pub fn content_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("js") => "text/javascript; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}
