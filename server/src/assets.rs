use std::borrow::Cow;
use std::path::{Path, PathBuf};

use tracing::warn;

/// Assets compiled into the binary, by file name
const EMBEDDED: &[(&str, &str)] = &[("index.html", include_str!("../assets/index.html")), ("index.js", include_str!("../assets/index.js"))];

/// Where the front end files come from.
#[derive(Debug, Clone)]
pub enum Assets {
    Embedded,
    /// Read from a directory on every request, for front end development
    Local(PathBuf),
}

impl Assets {
    /// Local mode serves `./assets` relative to the working directory.
    pub fn new(local: bool) -> Self {
        if local {
            Assets::Local(PathBuf::from("assets"))
        } else {
            Assets::Embedded
        }
    }

    /// The contents of `filename`, or `None` if there is no such asset.
    pub async fn load(&self, filename: &str) -> Option<Cow<'static, [u8]>> {
        // a single plain file name; anything that could leave the asset directory is unknown
        if filename.is_empty() || filename.starts_with('.') || filename.contains(&['/', '\\'][..]) {
            return None;
        }

        match self {
            Assets::Embedded => EMBEDDED.iter().find(|(name, _)| *name == filename).map(|(_, body)| Cow::Borrowed(body.as_bytes())),
            Assets::Local(dir) => match tokio::fs::read(dir.join(filename)).await {
                Ok(body) => Some(Cow::Owned(body)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
                Err(e) => {
                    warn!("serve asset {}: {}", filename, e);
                    None
                }
            },
        }
    }
}

pub fn content_type(filename: &str) -> &'static str {
    match Path::new(filename).extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("js") => "text/javascript; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("json") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}
