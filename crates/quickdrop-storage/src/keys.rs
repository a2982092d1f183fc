//! Stored name generation.
//!
//! Names are synthesized from the MIME type, a millisecond timestamp and a random
//! suffix. Only a sanitized extension is taken from the client supplied filename.
//! Timestamp plus random suffix is a collision-avoidance heuristic, not a guarantee;
//! the local backend refuses to overwrite an existing name so callers can retry.

use rand::Rng;

/// Longest extension (without the dot) kept from a client filename
pub const MAX_EXTENSION_LEN: usize = 10;

/// Upper bound (exclusive) of the random name suffix
pub const RANDOM_SUFFIX_BOUND: u32 = 1_000_000_000;

const MAX_STORED_NAME_LEN: usize = 255;

/// Extension of the client filename including the leading dot, lower-cased.
///
/// Only the final path component is considered. Returns an empty string when the
/// name has no extension or the extension is not 1..=10 ASCII alphanumerics.
pub fn sanitize_extension(original_filename: &str) -> String {
    let file_name = original_filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_filename);

    let Some((stem, ext)) = file_name.rsplit_once('.') else {
        return String::new();
    };

    // ".bashrc" style names have no extension
    if stem.is_empty() {
        return String::new();
    }

    if ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return String::new();
    }

    format!(".{}", ext.to_ascii_lowercase())
}

/// Compose `{type_tag}_{timestamp_millis}_{random}{extension}`.
pub fn generate_stored_name(
    mime_type: &str,
    original_filename: &str,
    timestamp_millis: i64,
    random: u32,
) -> String {
    let type_tag: String = quickdrop_core::validation::type_tag(mime_type)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    let type_tag = if type_tag.is_empty() {
        "file".to_string()
    } else {
        type_tag
    };

    format!(
        "{}_{}_{}{}",
        type_tag,
        timestamp_millis,
        random,
        sanitize_extension(original_filename)
    )
}

/// Random non-negative suffix for a stored name
pub fn random_suffix() -> u32 {
    rand::rng().random_range(0..RANDOM_SUFFIX_BOUND)
}

/// Whether `name` is something this service could have stored.
///
/// Used to refuse lookups before touching the filesystem. Hidden names (including
/// in-flight temporary files) are never valid.
pub fn is_valid_stored_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_STORED_NAME_LEN
        && !name.starts_with('.')
        && !name.contains("..")
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-')
}

/// Extension of a stored name without the dot, if any
pub fn stored_extension(name: &str) -> Option<&str> {
    name.rsplit_once('.').map(|(_, ext)| ext)
}

/// Hidden name an upload is written under before it becomes visible
pub fn partial_upload_name(name: &str) -> String {
    format!(".{}.part", name)
}

/// Whether a root entry is an in-flight (or abandoned) upload
pub fn is_partial_upload(name: &str) -> bool {
    name.len() > ".part".len() + 1 && name.starts_with('.') && name.ends_with(".part")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_upload_names_are_recognized() {
        let partial = partial_upload_name("image_1_2.png");
        assert_eq!(partial, ".image_1_2.png.part");
        assert!(is_partial_upload(&partial));
        assert!(!is_valid_stored_name(&partial));
        assert!(!is_partial_upload("image_1_2.png"));
        assert!(!is_partial_upload(".part"));
    }

    #[test]
    fn extension_is_taken_from_last_dot() {
        assert_eq!(sanitize_extension("photo.png"), ".png");
        assert_eq!(sanitize_extension("archive.tar.GZ"), ".gz");
        assert_eq!(sanitize_extension("noext"), "");
        assert_eq!(sanitize_extension("trailing."), "");
        assert_eq!(sanitize_extension(".hidden"), "");
    }

    #[test]
    fn extension_ignores_directories_and_unsafe_suffixes() {
        assert_eq!(sanitize_extension("../../etc/passwd"), "");
        assert_eq!(sanitize_extension("..\\..\\evil.mp4"), ".mp4");
        assert_eq!(sanitize_extension("dir.v2/clip"), "");
        assert_eq!(sanitize_extension("x.p/ng"), "");
        assert_eq!(sanitize_extension("x.png%00.php"), ".php");
        assert_eq!(sanitize_extension("x.a b"), "");
        assert_eq!(sanitize_extension("x.abcdefghijk"), "");
    }

    #[test]
    fn stored_name_layout() {
        let name = generate_stored_name("image/png", "photo.png", 1_718_000_000_000, 42);
        assert_eq!(name, "image_1718000000000_42.png");

        let name = generate_stored_name("video/quicktime", "clip", 7, 0);
        assert_eq!(name, "video_7_0");
        assert!(is_valid_stored_name(&name));
    }

    #[test]
    fn traversal_filenames_never_leak_into_stored_name() {
        let name = generate_stored_name("image/jpeg", "../../../../tmp/x/../a.jpg", 1, 2);
        assert_eq!(name, "image_1_2.jpg");
        assert!(!name.contains('/'));
        assert!(is_valid_stored_name(&name));
    }

    #[test]
    fn random_suffix_in_range() {
        for _ in 0..1000 {
            assert!(random_suffix() < RANDOM_SUFFIX_BOUND);
        }
    }

    #[test]
    fn stored_name_validation() {
        assert!(is_valid_stored_name("image_1_2.png"));
        assert!(!is_valid_stored_name(""));
        assert!(!is_valid_stored_name(".image_1_2.png.part"));
        assert!(!is_valid_stored_name("../secret"));
        assert!(!is_valid_stored_name("a/b.png"));
        assert!(!is_valid_stored_name("a b.png"));
        assert_eq!(stored_extension("image_1_2.png"), Some("png"));
        assert_eq!(stored_extension("video_1_2"), None);
    }
}
