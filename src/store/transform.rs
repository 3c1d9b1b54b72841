//! Transform strategies
//!
//! A store never holds raw API objects. Every object passes through a
//! [`Transform`] that keeps only the fields an index needs.

/// Maps a raw resource into the compact form kept by an [`ObjectStore`].
///
/// [`ObjectStore`]: super::ObjectStore
pub trait Transform: Send + Sync + 'static {
    /// Raw object as delivered by the event source
    type Raw;

    /// Transformed object held by the store
    type Output: Clone + PartialEq + Send + Sync + 'static;

    /// Unique key of the object (its UID)
    fn key(&self, raw: &Self::Raw) -> String;

    /// Ordering version of the object, if it has a comparable one
    fn version(&self, _raw: &Self::Raw) -> Option<u64> {
        None
    }

    /// Produce the stored representation
    fn transform(&self, raw: &Self::Raw) -> Self::Output;
}

/// Parse an API resource version into a comparable number
///
/// Empty or non-numeric versions have no ordering and yield `None`.
pub fn parse_version(version: &str) -> Option<u64> {
    version.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("1550348"), Some(1550348));
        assert_eq!(parse_version(" 42 "), Some(42));
        assert_eq!(parse_version(""), None);
        assert_eq!(parse_version("abc"), None);
        assert_eq!(parse_version("-1"), None);
    }
}
