//! Attachment naming and media classification.

/// Local filename for an attachment.
///
/// The platform-provided name wins. Without one the name is derived from the
/// URL by replacing the first `/` and then the first `:` with `_`. Later
/// separators are kept on purpose: exports made before this crate existed
/// used exactly this rule, and the viewer resolves those paths verbatim.
pub fn resolve_attachment_name(provided: Option<&str>, url: &str) -> String {
    match provided {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => url.replacen('/', "_", 1).replacen(':', "_", 1),
    }
}

/// Whether a stored attachment entry is a remote URL rather than a local name.
pub fn is_remote(entry: &str) -> bool {
    entry.starts_with("http://") || entry.starts_with("https://")
}

/// Media category the viewer knows how to embed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Audio,
    Video,
}

const IMAGE_SUFFIXES: [&str; 4] = ["png", "jpg", "jpeg", "webp"];
const AUDIO_SUFFIXES: [&str; 3] = ["mp3", "ogg", "wav"];
const VIDEO_SUFFIXES: [&str; 2] = ["mp4", "webm"];

impl MediaKind {
    /// Classify by raw suffix. Matching is case-sensitive and does not
    /// require a dot; anything unrecognised yields `None`.
    pub fn classify(entry: &str) -> Option<Self> {
        let ends_with_any = |suffixes: &[&str]| suffixes.iter().any(|s| entry.ends_with(s));
        if ends_with_any(&IMAGE_SUFFIXES) {
            Some(Self::Image)
        } else if ends_with_any(&AUDIO_SUFFIXES) {
            Some(Self::Audio)
        } else if ends_with_any(&VIDEO_SUFFIXES) {
            Some(Self::Video)
        } else {
            None
        }
    }

    /// HTML element used to embed this kind.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Image => "img",
            Self::Audio => "audio",
            Self::Video => "video",
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Self::Image => "attachment-image",
            Self::Audio => "attachment-audio",
            Self::Video => "attachment-video",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provided_name_wins() {
        assert_eq!(
            resolve_attachment_name(Some("cat.png"), "https://cdn.example/a/b/cat.png"),
            "cat.png"
        );
    }

    #[test]
    fn test_url_fallback_replaces_only_first_occurrences() {
        let name = resolve_attachment_name(None, "https://cdn.example/a/b.png");
        // "https://" loses its first '/' and its ':', the rest survives.
        assert_eq!(name, "https__/cdn.example/a/b.png");
    }

    #[test]
    fn test_url_fallback_is_deterministic() {
        let url = "https://cdn.example/attachments/1/2/voice:note.ogg";
        assert_eq!(resolve_attachment_name(None, url), resolve_attachment_name(None, url));
        assert_eq!(resolve_attachment_name(Some(""), url), resolve_attachment_name(None, url));
    }

    #[test]
    fn test_classify() {
        assert_eq!(MediaKind::classify("photo.jpeg"), Some(MediaKind::Image));
        assert_eq!(MediaKind::classify("clip.webm"), Some(MediaKind::Video));
        assert_eq!(MediaKind::classify("song.wav"), Some(MediaKind::Audio));
        assert_eq!(MediaKind::classify("notes.txt"), None);
        assert_eq!(MediaKind::classify("SHOUT.PNG"), None);
        assert_eq!(MediaKind::classify("nodotpng"), Some(MediaKind::Image));
    }

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://cdn.example/x.png"));
        assert!(is_remote("http://cdn.example/x.png"));
        assert!(!is_remote("x.png"));
    }
}
