use std::fmt;

use serde::Serialize;

/// Where a redirect sends the visitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Internal(String),
    External(String),
}

pub(crate) fn is_internal(url: &str) -> bool {
    url.starts_with('/')
}

impl Target {
    pub fn classify(url: impl Into<String>) -> Self {
        let url = url.into();
        if is_internal(&url) {
            Self::Internal(url)
        } else {
            Self::External(url)
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Internal(path) => path,
            Self::External(url) => url,
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }

    /// `/b/` under `/docs/` is `/docs/b/`.
    pub fn href(&self, base: &str) -> String {
        match self {
            Self::Internal(path) => {
                let path = path.strip_prefix('/').unwrap_or(path);
                format!("{base}{path}")
            }
            Self::External(url) => url.clone(),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Target {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_leading_slash() {
        assert_eq!(Target::classify("/new/"), Target::Internal("/new/".into()));
        assert_eq!(
            Target::classify("https://example.com"),
            Target::External("https://example.com".into())
        );
        assert_eq!(Target::classify("new/"), Target::External("new/".into()));
    }

    #[test]
    fn internal_href_is_prefixed_with_base() {
        let target = Target::classify("/b/");
        assert_eq!(target.href("/docs/"), "/docs/b/");
        assert_eq!(target.href("/"), "/b/");
    }

    #[test]
    fn only_one_leading_slash_is_stripped() {
        assert_eq!(Target::classify("//b/").href("/docs/"), "/docs//b/");
    }

    #[test]
    fn external_href_ignores_base() {
        let target = Target::classify("https://example.com/external");
        assert_eq!(target.href("/docs/"), "https://example.com/external");
    }
}
