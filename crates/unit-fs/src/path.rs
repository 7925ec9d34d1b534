//! Normalized path handling

use std::path::{Path, PathBuf};

/// A path normalized to forward slashes with `.` segments and repeated
/// separators removed.
///
/// Store directories, dataset files and rendered documents are all addressed
/// through this type so that log lines and error messages print the same
/// path regardless of platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath {
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let raw = path.as_ref().to_string_lossy().replace('\\', "/");
        Self {
            inner: clean(&raw),
        }
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Join this path with a segment.
    pub fn join(&self, segment: &str) -> Self {
        if self.inner.is_empty() {
            return Self::new(segment);
        }
        Self::new(format!("{}/{}", self.inner, segment))
    }

    /// Get the parent directory.
    pub fn parent(&self) -> Option<Self> {
        match self.inner.rfind('/') {
            Some(0) => Some(Self {
                inner: "/".to_string(),
            }),
            Some(idx) => Some(Self {
                inner: self.inner[..idx].to_string(),
            }),
            None => None,
        }
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        self.inner.rsplit('/').next().filter(|name| !name.is_empty())
    }

    /// Get the extension if present.
    pub fn extension(&self) -> Option<&str> {
        self.file_name().and_then(|name| match name.rfind('.') {
            Some(0) | None => None,
            Some(idx) => Some(&name[idx + 1..]),
        })
    }

    /// Replace (or add) the extension of the final component.
    pub fn with_extension(&self, extension: &str) -> Self {
        Self::new(self.to_native().with_extension(extension))
    }

    /// Check if this path exists on the filesystem.
    pub fn exists(&self) -> bool {
        self.to_native().exists()
    }

    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        self.to_native().is_file()
    }
}

fn clean(raw: &str) -> String {
    let absolute = raw.starts_with('/');
    let segments: Vec<&str> = raw
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect();
    let joined = segments.join("/");
    if absolute {
        format!("/{}", joined)
    } else {
        joined
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backslashes_become_forward_slashes() {
        let path = NormalizedPath::new("store\\tables\\country.json");
        assert_eq!(path.as_str(), "store/tables/country.json");
    }

    #[test]
    fn dot_segments_and_double_separators_are_removed() {
        let path = NormalizedPath::new("/var//lib/./units/");
        assert_eq!(path.as_str(), "/var/lib/units");
    }

    #[test]
    fn join_and_parent() {
        let dir = NormalizedPath::new("/data/store");
        let file = dir.join("country.json");
        assert_eq!(file.as_str(), "/data/store/country.json");
        assert_eq!(file.parent(), Some(dir));
        assert_eq!(NormalizedPath::new("/top").parent().unwrap().as_str(), "/");
        assert_eq!(NormalizedPath::new("relative").parent(), None);
    }

    #[test]
    fn extension_handling() {
        assert_eq!(NormalizedPath::new("units.toml").extension(), Some("toml"));
        assert_eq!(NormalizedPath::new(".hidden").extension(), None);
        assert_eq!(NormalizedPath::new("plain").extension(), None);
        assert_eq!(
            NormalizedPath::new("/s/country.json")
                .with_extension("lock")
                .as_str(),
            "/s/country.lock"
        );
    }
}
