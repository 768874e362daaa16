//! Raw request URL → logical path.
//!
//! # Responsibilities
//! - Strip the mount prefix (absolute `root_url/mount/` or path-only `/mount/`)
//! - Drop the query string
//! - Drop trailing slashes and format extensions such as `.json`
//!
//! # Design Decisions
//! - Output never starts or ends with `/` and never contains `?`
//! - Resolution runs to a fixed point, so resolving a logical path again
//!   returns it unchanged

use crate::config::ApiConfig;

/// Normalizes incoming URLs into route table keys.
#[derive(Debug, Clone)]
pub struct PathResolver {
    /// `root_url/mount/`
    absolute_prefix: String,
    /// `/mount/`
    path_prefix: String,
    extensions: Vec<String>,
}

impl PathResolver {
    pub fn new(root_url: &str, mount: &str, extensions: &[String]) -> Self {
        let root = root_url.trim_end_matches('/');
        let mount = mount.trim_matches('/');
        let (absolute_prefix, path_prefix) = if mount.is_empty() {
            (format!("{root}/"), "/".to_string())
        } else {
            (format!("{root}/{mount}/"), format!("/{mount}/"))
        };

        Self {
            absolute_prefix,
            path_prefix,
            extensions: extensions
                .iter()
                .filter(|ext| !ext.is_empty())
                .cloned()
                .collect(),
        }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(&config.root_url, &config.mount, &config.format_extensions)
    }

    /// Resolve `raw` into a logical path.
    ///
    /// Input outside the mount is resolved as if it were already relative to
    /// it; use [`PathResolver::is_mounted`] to reject such input.
    pub fn resolve(&self, raw: &str) -> String {
        let mut path = self.resolve_once(raw);
        loop {
            let next = self.resolve_once(&path);
            if next == path {
                return path;
            }
            path = next;
        }
    }

    /// True when `raw` starts at the mount point.
    pub fn is_mounted(&self, raw: &str) -> bool {
        self.strip_mount(raw).is_some()
    }

    fn resolve_once(&self, raw: &str) -> String {
        let path = self.strip_mount(raw).unwrap_or(raw);
        let mut path = match path.find('?') {
            Some(idx) => &path[..idx],
            None => path,
        };

        loop {
            let before = path.len();
            path = path.trim_end_matches('/');
            for ext in &self.extensions {
                if let Some(stripped) = path.strip_suffix(ext.as_str()) {
                    path = stripped;
                }
            }
            if path.len() == before {
                break;
            }
        }

        path.trim_start_matches('/').to_string()
    }

    fn strip_mount<'a>(&self, raw: &'a str) -> Option<&'a str> {
        for prefix in [&self.absolute_prefix, &self.path_prefix] {
            if let Some(rest) = raw.strip_prefix(prefix.as_str()) {
                return Some(rest);
            }
            // The mount point itself, with or without a query.
            let bare = prefix.trim_end_matches('/');
            if let Some(rest) = raw.strip_prefix(bare) {
                if rest.is_empty() || rest.starts_with('?') {
                    return Some(rest);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> PathResolver {
        PathResolver::new("http://example.org", "api", &[".json".to_string()])
    }

    #[test]
    fn test_strip_absolute_prefix() {
        let r = resolver();
        assert_eq!(r.resolve("http://example.org/api/items/widget"), "items/widget");
        assert_eq!(r.resolve("http://example.org/api/items/widget/?action=x"), "items/widget");
        assert_eq!(r.resolve("http://example.org/api/items.json?x=1"), "items");
        assert_eq!(r.resolve("http://example.org/api"), "");
        assert_eq!(r.resolve("http://example.org/api?action=index"), "");
    }

    #[test]
    fn test_strip_path_prefix() {
        let r = resolver();
        assert_eq!(r.resolve("/api/items/widget.json"), "items/widget");
        assert_eq!(r.resolve("/api/"), "");
        assert_eq!(r.resolve("/apiary/x"), "apiary/x");
    }

    #[test]
    fn test_repeated_suffixes() {
        let r = resolver();
        assert_eq!(r.resolve("/api/items//"), "items");
        assert_eq!(r.resolve("/api/items.json.json"), "items");
        assert_eq!(r.resolve("/api/items/.json/"), "items");
    }

    #[test]
    fn test_idempotent() {
        let r = resolver();
        let inputs = [
            "http://example.org/api/a/b/?q=1",
            "/api/a.json/",
            "a//b//",
            "/.json",
            "",
            "???",
            "x.json?y.json",
            "/api/http://example.org/api/items",
            "/api/http://example.org/api.json",
            "/api//api/items/",
        ];
        for raw in inputs {
            let once = r.resolve(raw);
            assert_eq!(r.resolve(&once), once, "input {raw:?}");
            assert!(!once.contains('?'));
        }
    }

    #[test]
    fn test_nested_mount_prefix() {
        let r = resolver();
        assert_eq!(r.resolve("/api/http://example.org/api/items"), "items");
        assert_eq!(r.resolve("/api/http://example.org/api.json"), "");
    }

    #[test]
    fn test_is_mounted() {
        let r = resolver();
        assert!(r.is_mounted("/api/items"));
        assert!(r.is_mounted("/api"));
        assert!(r.is_mounted("/api?action=index"));
        assert!(r.is_mounted("http://example.org/api/items"));
        assert!(!r.is_mounted("/items"));
        assert!(!r.is_mounted("/apiary/x"));

        let everything = PathResolver::new("http://example.org", "", &[]);
        assert!(everything.is_mounted("/items"));
    }

    #[test]
    fn test_trailing_slash_root_and_empty_mount() {
        let r = PathResolver::new("http://example.org/", "", &[]);
        assert_eq!(r.resolve("http://example.org/items/"), "items");
        assert_eq!(r.resolve("/items.json"), "items.json");
    }
}
