//! Media type negotiation.
//!
//! The winner is the lowest `(rank, media type)` pair, so the choice never
//! depends on declaration order: exact `application/json` first, any other
//! JSON media type next, everything else last.

use crate::ir::MediaKind;

/// Assumed when a Swagger document declares no `consumes`/`produces`
pub const DEFAULT_MEDIA_TYPE: &str = "application/json";

pub const FORM_DATA: &str = "multipart/form-data";
pub const URL_ENCODED: &str = "application/x-www-form-urlencoded";

/// Pick one media type out of `candidates`.
pub fn negotiate<'a, I>(candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    candidates.into_iter().min_by(|a, b| (rank(a), *a).cmp(&(rank(b), *b)))
}

fn essence(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or(media_type)
        .trim()
        .to_ascii_lowercase()
}

fn rank(media_type: &str) -> u8 {
    let essence = essence(media_type);
    if essence == DEFAULT_MEDIA_TYPE {
        0
    } else if is_json(&essence) {
        1
    } else {
        2
    }
}

fn is_json(essence: &str) -> bool {
    essence.ends_with("/json") || essence.ends_with("+json")
}

/// Payload family of `media_type`, if it is one the IR classifies.
#[must_use]
pub fn media_kind(media_type: &str) -> Option<MediaKind> {
    let essence = essence(media_type);
    match essence.as_str() {
        FORM_DATA => Some(MediaKind::FormData),
        URL_ENCODED => Some(MediaKind::UrlSearchParams),
        "application/octet-stream" => Some(MediaKind::OctetStream),
        e if is_json(e) => Some(MediaKind::Json),
        e if e.starts_with("text/") => Some(MediaKind::Text),
        e if e.starts_with("image/") || e.starts_with("audio/") || e.starts_with("video/") => {
            Some(MediaKind::OctetStream)
        }
        _ => None,
    }
}

/// Whether a payload of `media_type` is raw bytes.
#[must_use]
pub fn is_binary(media_type: &str) -> bool {
    media_kind(media_type) == Some(MediaKind::OctetStream)
}
