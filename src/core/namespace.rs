use std::path::{Component, Path};

/// Key prefix shared by every template namespace.
pub const DEFAULT_KEY_PREFIX: &str = "MSG_";

/// Per-template key prefix (newtype for type safety).
///
/// Keys in a namespace are `NAMESPACE_ORDINAL`, e.g. `MSG_CHROME_NAV_0` for
/// the first placeholder of `chrome/nav.html`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Namespace(String);

impl Namespace {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Derive the namespace of a template from its path.
    ///
    /// The path is made relative to `root` (kept as-is when it lies outside),
    /// the file extension is dropped, every path separator becomes `_` and the
    /// result is uppercased and prefixed with `prefix`. Characters that cannot
    /// appear in an identifier are replaced with `_`.
    pub fn for_template(root: &Path, path: &Path, prefix: &str) -> Self {
        let relative = path.strip_prefix(root).unwrap_or(path);
        let stem = relative.with_extension("");

        let parts: Vec<String> = stem
            .components()
            .filter_map(|component| match component {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        let body: String = parts
            .join("_")
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();

        Self(format!("{}{}", prefix, body))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key for an ordinal in this namespace.
    pub fn key(&self, ordinal: u64) -> String {
        format!("{}_{}", self.0, ordinal)
    }

    /// Split a key into its namespace and ordinal.
    ///
    /// Returns `None` when the key has no `_` or the part after the last `_`
    /// is not a plain decimal number.
    pub fn parse_key(key: &str) -> Option<(Namespace, u64)> {
        let index = key.rfind('_')?;
        let suffix = &key[index + 1..];
        if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let ordinal = suffix.parse().ok()?;
        Some((Namespace::new(&key[..index]), ordinal))
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
