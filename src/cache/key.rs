//! Cache file naming
//!
//! Maps a URL to a deterministic file name inside the cache folder.

use sha2::{Digest, Sha256};
use url::Url;

/// Suffix of the intermediate file written before the atomic rename.
///
/// `~` never appears in a name from `cache_file_name`, so a temporary file
/// can not share its name with any cached file.
pub const TEMP_SUFFIX: &str = ".tmp~";

/// Name used when the URL has no path segments
const EMPTY_PATH_NAME: &str = "index";

/// Longest file name kept as-is; longer names are replaced by a hash
const MAX_NAME_LEN: usize = 200;

/// Longest extension kept on a hashed name
const MAX_EXTENSION_LEN: usize = 16;

/// Number of hex characters of the query hash appended to the name
const QUERY_HASH_LEN: usize = 12;

/// Derives the cache file name for a URL.
///
/// Path segments are sanitized and joined with `_`, so
/// `https://host/a/b/photo.jpg` becomes `a_b_photo.jpg`. A query string adds
/// a short hash before the extension to keep variants apart.
pub fn cache_file_name(url: &Url) -> String {
    let segments: Vec<String> = url
        .path_segments()
        .map(|segments| {
            segments
                .filter(|s| !s.is_empty())
                .map(sanitize_segment)
                .collect()
        })
        .unwrap_or_default();

    let joined = if segments.is_empty() {
        EMPTY_PATH_NAME.to_string()
    } else {
        segments.join("_")
    };

    let (stem, extension) = split_extension(&joined);

    let mut name = stem.to_string();
    if let Some(query) = url.query() {
        name.push('_');
        name.push_str(&hash_hex(query)[..QUERY_HASH_LEN]);
    }
    if let Some(ext) = extension {
        name.push('.');
        name.push_str(ext);
    }

    if name.len() > MAX_NAME_LEN {
        let full = match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        };
        name = hash_hex(&full);
        if let Some(ext) = extension.filter(|ext| ext.len() <= MAX_EXTENSION_LEN) {
            name.push('.');
            name.push_str(ext);
        }
    }

    name
}

/// Returns the temporary file name used while writing `name`
pub fn temp_file_name(name: &str) -> String {
    format!("{}{}", name, TEMP_SUFFIX)
}

/// Whether a file in the cache folder is an in-progress temporary file
pub fn is_temp_file(name: &str) -> bool {
    name.ends_with(TEMP_SUFFIX)
}

fn sanitize_segment(segment: &str) -> String {
    segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Splits `a_b_photo.jpg` into (`a_b_photo`, `Some("jpg")`).
///
/// A leading dot (`.hidden`) or trailing dot is not an extension.
fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < name.len() => (&name[..idx], Some(&name[idx + 1..])),
        _ => (name, None),
    }
}

fn hash_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name_for(url: &str) -> String {
        cache_file_name(&Url::parse(url).unwrap())
    }

    #[test]
    fn test_segments_joined_with_underscores() {
        assert_eq!(
            name_for("https://img.example.com/a/b/photo.jpg"),
            "a_b_photo.jpg"
        );
    }

    #[test]
    fn test_single_segment_keeps_name() {
        assert_eq!(name_for("https://img.example.com/logo.png"), "logo.png");
    }

    #[test]
    fn test_empty_path_uses_index() {
        assert_eq!(name_for("https://img.example.com"), "index");
        assert_eq!(name_for("https://img.example.com/"), "index");
    }

    #[test]
    fn test_empty_segments_are_dropped() {
        assert_eq!(name_for("https://img.example.com/a//b/"), "a_b");
    }

    #[test]
    fn test_unsafe_characters_are_replaced() {
        assert_eq!(
            name_for("https://img.example.com/my%20pics/cat%3A1.webp"),
            "my_20pics_cat_3A1.webp"
        );
    }

    #[test]
    fn test_query_adds_hash_before_extension() {
        let small = name_for("https://img.example.com/a/photo.jpg?w=100");
        let large = name_for("https://img.example.com/a/photo.jpg?w=800");

        assert!(small.starts_with("a_photo_"));
        assert!(small.ends_with(".jpg"));
        assert_eq!(small.len(), "a_photo_".len() + QUERY_HASH_LEN + ".jpg".len());
        assert_ne!(small, large);
    }

    #[test]
    fn test_same_url_same_name() {
        let url = "https://img.example.com/x/y.gif?v=3";
        assert_eq!(name_for(url), name_for(url));
    }

    #[test]
    fn test_long_names_are_hashed() {
        let long_segment = "s".repeat(300);
        let name = name_for(&format!("https://img.example.com/{}/pic.png", long_segment));

        assert!(name.len() <= MAX_NAME_LEN);
        assert!(name.ends_with(".png"));
        assert_eq!(name.len(), 64 + ".png".len());
    }

    #[test]
    fn test_split_extension_edge_cases() {
        assert_eq!(split_extension("photo.jpg"), ("photo", Some("jpg")));
        assert_eq!(split_extension(".hidden"), (".hidden", None));
        assert_eq!(split_extension("trailing."), ("trailing.", None));
        assert_eq!(split_extension("plain"), ("plain", None));
    }

    #[test]
    fn test_temp_file_name() {
        assert_eq!(temp_file_name("a_b.png"), "a_b.png.tmp~");
        assert!(is_temp_file("a_b.png.tmp~"));
        assert!(!is_temp_file("a_b.png"));
    }

    #[test]
    fn test_tmp_extension_never_matches_a_temp_name() {
        let cached = name_for("https://img.example.com/a.png.tmp");
        let other = name_for("https://img.example.com/a.png");

        assert_eq!(cached, "a.png.tmp");
        assert!(!is_temp_file(&cached));
        assert_ne!(cached, temp_file_name(&other));
    }

    #[test]
    fn test_names_never_contain_tilde() {
        assert_eq!(
            name_for("https://img.example.com/~user/pic.png~"),
            "_user_pic.png_"
        );
    }

    #[test]
    fn test_long_extension_is_dropped_when_hashed() {
        let name = name_for(&format!("https://img.example.com/x.{}", "e".repeat(300)));

        assert_eq!(name.len(), 64);
        assert!(name.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
