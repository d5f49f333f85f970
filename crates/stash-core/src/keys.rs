//! Object key and public URL construction.
//!
//! Key format: `{location}/{filename}`. Nothing is normalized; two callers
//! passing the same pair address the same object.

/// Filenames that `delete` refuses outright.
///
/// This only guards the wildcard and bare traversal names. A filename such as
/// `a/../b` is passed through unchanged.
pub const FORBIDDEN_DELETE_FILENAMES: [&str; 5] = ["", "*", "/", ".", ".."];

/// Build the object key for a location and filename.
pub fn object_key(location: &str, filename: &str) -> String {
    format!("{}/{}", location, filename)
}

/// Build the externally resolvable URL for an object key.
pub fn public_url(public_base_url: &str, key: &str) -> String {
    format!("{}/{}", public_base_url, key)
}

/// Returns `true` when `filename` must not be used as a delete target.
pub fn is_forbidden_delete_filename(filename: &str) -> bool {
    FORBIDDEN_DELETE_FILENAMES.contains(&filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_key_joins_with_slash() {
        assert_eq!(object_key("images", "logo.png"), "images/logo.png");
        assert_eq!(object_key("a/b", "c.txt"), "a/b/c.txt");
    }

    #[test]
    fn object_key_does_not_normalize() {
        assert_eq!(object_key("images/", "logo.png"), "images//logo.png");
        assert_eq!(object_key("docs", "../secret"), "docs/../secret");
    }

    #[test]
    fn public_url_appends_key() {
        assert_eq!(
            public_url("https://cdn.example.com", "images/logo.png"),
            "https://cdn.example.com/images/logo.png"
        );
    }

    #[test]
    fn forbidden_delete_filenames() {
        for name in ["", "*", "/", ".", ".."] {
            assert!(is_forbidden_delete_filename(name), "{name:?} should be rejected");
        }
        for name in ["report.pdf", "..hidden", "a/../b", "**", " ", "./x"] {
            assert!(!is_forbidden_delete_filename(name), "{name:?} should be allowed");
        }
    }
}
