/// Extensions accepted for upload and served from the public path,
/// paired with the content type the public path answers with.
const ALLOWED: &[(&str, &str)] = &[
    (".jpg", "image/jpeg"),
    (".jpeg", "image/jpeg"),
    (".png", "image/png"),
    (".gif", "image/gif"),
    (".webp", "image/webp"),
    (".svg", "image/svg+xml"),
    (".pdf", "application/pdf"),
    (".doc", "application/msword"),
    (
        ".docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    (".xls", "application/vnd.ms-excel"),
    (
        ".xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
    (".ppt", "application/vnd.ms-powerpoint"),
    (
        ".pptx",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    ),
    (".txt", "text/plain"),
    (".csv", "text/csv"),
    (".json", "application/json"),
    (".xml", "application/xml"),
    (".html", "text/html"),
    (".css", "text/css"),
    (".js", "application/javascript"),
    (".zip", "application/zip"),
    (".rar", "application/x-rar-compressed"),
    (".7z", "application/x-7z-compressed"),
    (".tar", "application/x-tar"),
    (".gz", "application/gzip"),
    (".mp4", "video/mp4"),
    (".mp3", "audio/mpeg"),
    (".wav", "audio/wav"),
    (".avi", "video/x-msvideo"),
    (".mov", "video/quicktime"),
    (".md", "text/markdown"),
    (".rtf", "application/rtf"),
];

/// Fallback when an extension has no table entry.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A file extension from the allow-list, including its leading dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileExtension(&'static str);

impl FileExtension {
    /// Look up an exact, lowercase extension such as `.png`.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        ALLOWED
            .iter()
            .find(|(ext, _)| *ext == suffix)
            .map(|(ext, _)| FileExtension(ext))
    }

    /// Derive the extension of a client-supplied filename: everything from the
    /// last dot, lowercased. Names without a dot have no extension.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let lower = filename.to_lowercase();
        let dot = lower.rfind('.')?;
        Self::from_suffix(&lower[dot..])
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }

    pub fn content_type(&self) -> &'static str {
        ALLOWED
            .iter()
            .find(|(ext, _)| *ext == self.0)
            .map(|(_, mime)| *mime)
            .unwrap_or(DEFAULT_CONTENT_TYPE)
    }
}

impl std::fmt::Display for FileExtension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_filename_uses_last_dot_and_lowercases() {
        let ext = FileExtension::from_filename("Holiday.Photo.PNG").unwrap();
        assert_eq!(ext.as_str(), ".png");
        assert_eq!(ext.content_type(), "image/png");
    }

    #[test]
    fn test_from_filename_rejects_unknown_or_missing() {
        assert!(FileExtension::from_filename("setup.exe").is_none());
        assert!(FileExtension::from_filename("README").is_none());
        assert!(FileExtension::from_filename("archive.").is_none());
    }

    #[test]
    fn test_from_suffix_is_exact() {
        assert!(FileExtension::from_suffix(".PNG").is_none());
        assert!(FileExtension::from_suffix("png").is_none());
        assert_eq!(
            FileExtension::from_suffix(".docx").unwrap().content_type(),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        );
    }
}
