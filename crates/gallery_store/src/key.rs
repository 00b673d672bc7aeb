//! Object-key helpers shared by the normalizer and the upload path.

/// Display name of a key: the last non-empty `/`-delimited segment.
///
/// Works for both folder keys (`"photos/2024/"` -> `"2024"`) and file
/// keys (`"photos/cat.jpg"` -> `"cat.jpg"`).
pub fn file_name_of(key: &str) -> &str {
    key.split('/').filter(|s| !s.is_empty()).last().unwrap_or(key)
}

/// Lowercased extension of a key: the substring after the last `.` of the
/// final segment. Empty for folder keys, extension-less names, and bare
/// dotfiles.
pub fn extension_of(key: &str) -> String {
    if key.ends_with('/') {
        return String::new();
    }
    match file_name_of(key).rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_ascii_lowercase(),
        _ => String::new(),
    }
}

/// Join a destination prefix and a file name into a full key.
/// The root is the empty prefix.
pub fn join_prefix(prefix: &str, name: &str) -> String {
    if prefix.is_empty() || prefix.ends_with('/') {
        format!("{prefix}{name}")
    } else {
        format!("{prefix}/{name}")
    }
}

/// Sanitize a client-supplied file name for use inside an object key.
///
/// Path separators and control characters become underscores so a name
/// can never escape its destination prefix. Never returns an empty string.
pub fn sanitize_file_name(name: &str) -> String {
    let mut result = String::with_capacity(name.len());

    for c in name.chars() {
        match c {
            '/' | '\\' => result.push('_'),
            c if c.is_control() => result.push('_'),
            c => result.push(c),
        }
    }

    let result = result.trim().to_string();
    if result.is_empty() {
        "_unnamed".to_string()
    } else {
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_of() {
        assert_eq!(file_name_of("photos/cat.jpg"), "cat.jpg");
        assert_eq!(file_name_of("photos/2024/"), "2024");
        assert_eq!(file_name_of("readme.txt"), "readme.txt");
        assert_eq!(file_name_of(""), "");
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("photos/Cat.JPG"), "jpg");
        assert_eq!(extension_of("archive.tar.gz"), "gz");
        assert_eq!(extension_of("README"), "");
        assert_eq!(extension_of("photos/"), "");
        assert_eq!(extension_of(".env"), "");
    }

    #[test]
    fn test_join_prefix() {
        assert_eq!(join_prefix("", "cat.jpg"), "cat.jpg");
        assert_eq!(join_prefix("photos/", "cat.jpg"), "photos/cat.jpg");
        assert_eq!(join_prefix("photos", "cat.jpg"), "photos/cat.jpg");
    }

    #[test]
    fn test_sanitize_separators() {
        assert_eq!(sanitize_file_name("a/b.jpg"), "a_b.jpg");
        assert_eq!(sanitize_file_name("a\\b.jpg"), "a_b.jpg");
    }

    #[test]
    fn test_sanitize_control_chars() {
        assert_eq!(sanitize_file_name("a\x00b\n.txt"), "a_b_.txt");
    }

    #[test]
    fn test_sanitize_empty() {
        assert_eq!(sanitize_file_name(""), "_unnamed");
        assert_eq!(sanitize_file_name("   "), "_unnamed");
    }
}
