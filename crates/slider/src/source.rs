use std::fmt;
use std::path::PathBuf;

use reqwest::Url;

/// One entry of the slideshow: a URL or a filesystem path, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageSource(String);

/// Where an [`ImageSource`] points once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    Remote(Url),
    Local(PathBuf),
    Unsupported { scheme: String },
}

impl ImageSource {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Classifies the source. Anything that does not parse as an absolute URL
    /// (or parses with a one-letter scheme, i.e. a Windows drive) is a path.
    pub fn location(&self) -> SourceLocation {
        let raw = self.0.trim();
        match Url::parse(raw) {
            Ok(url) => match url.scheme() {
                "http" | "https" => SourceLocation::Remote(url),
                "file" => match url.to_file_path() {
                    Ok(path) => SourceLocation::Local(path),
                    Err(()) => SourceLocation::Unsupported {
                        scheme: "file".into(),
                    },
                },
                scheme if scheme.len() == 1 => SourceLocation::Local(PathBuf::from(raw)),
                scheme => SourceLocation::Unsupported {
                    scheme: scheme.to_string(),
                },
            },
            Err(_) => SourceLocation::Local(PathBuf::from(raw)),
        }
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImageSource {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ImageSource {
    fn from(value: String) -> Self {
        Self(value)
    }
}
