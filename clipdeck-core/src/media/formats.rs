//! Extension tables used at the import boundary.
//!
//! One list serves both the file-picker filter and the import gate, so a file
//! the picker offers is never rejected afterwards.

use std::path::Path;

/// Extension to MIME type, in picker order.
const MIME_TABLE: [(&str, &str); 9] = [
    ("mp4", "video/mp4"),
    ("mov", "video/quicktime"),
    ("webm", "video/webm"),
    ("avi", "video/x-msvideo"),
    ("mkv", "video/x-matroska"),
    ("m4v", "video/x-m4v"),
    ("3gp", "video/3gpp"),
    ("flv", "video/x-flv"),
    ("wmv", "video/x-ms-wmv"),
];

/// MIME type assumed for unknown extensions.
pub const DEFAULT_MIME_TYPE: &str = "video/mp4";

/// Extensions (without the dot) accepted for import.
pub const SUPPORTED_EXTENSIONS: [&str; 9] = [
    "mp4", "mov", "webm", "avi", "mkv", "m4v", "3gp", "flv", "wmv",
];

/// Lower-cased extension of `path`, if any.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

/// Guesses a MIME type purely from the extension.
pub fn mime_type_for(path: &Path) -> &'static str {
    extension_of(path)
        .and_then(|ext| {
            MIME_TABLE
                .iter()
                .find(|(known, _)| *known == ext)
                .map(|(_, mime)| *mime)
        })
        .unwrap_or(DEFAULT_MIME_TYPE)
}

/// Whether the extension is on the import allow-list (case-insensitive).
#[must_use]
pub fn is_supported_format(path: &Path) -> bool {
    extension_of(path).is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_type_for() {
        assert_eq!(mime_type_for(Path::new("a.mp4")), "video/mp4");
        assert_eq!(mime_type_for(Path::new("a.MOV")), "video/quicktime");
        assert_eq!(mime_type_for(Path::new("/x/y.webm")), "video/webm");
        assert_eq!(mime_type_for(Path::new("a.avi")), "video/x-msvideo");
        assert_eq!(mime_type_for(Path::new("a.mkv")), "video/x-matroska");
        assert_eq!(mime_type_for(Path::new("a.m4v")), "video/x-m4v");
        assert_eq!(mime_type_for(Path::new("a.3gp")), "video/3gpp");
        assert_eq!(mime_type_for(Path::new("a.flv")), "video/x-flv");
        assert_eq!(mime_type_for(Path::new("a.wmv")), "video/x-ms-wmv");
        assert_eq!(mime_type_for(Path::new("a.txt")), DEFAULT_MIME_TYPE);
        assert_eq!(mime_type_for(Path::new("noext")), DEFAULT_MIME_TYPE);
    }

    #[test]
    fn test_supported_formats_match_mime_table() {
        for (ext, _) in MIME_TABLE {
            assert!(is_supported_format(Path::new(&format!("clip.{ext}"))));
        }
        assert!(is_supported_format(Path::new("CLIP.MKV")));
        assert!(!is_supported_format(Path::new("clip.txt")));
        assert!(!is_supported_format(Path::new("clip")));
        assert!(!is_supported_format(Path::new("mp4")));
    }
}
