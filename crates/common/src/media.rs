//! Helpers for media links attached to launches and missions.

const YOUTUBE_MARKERS: [&str; 2] = ["youtube.com/watch?v=", "youtu.be/"];

/// Extract the video id from a `youtube.com/watch?v=` or `youtu.be/` URL.
///
/// The id runs until the next `&` or whitespace. Returns `None` for any
/// other URL shape.
pub fn youtube_id(url: &str) -> Option<&str> {
    let (start, marker) = YOUTUBE_MARKERS
        .iter()
        .filter_map(|marker| url.find(marker).map(|pos| (pos, *marker)))
        .min_by_key(|(pos, _)| *pos)?;

    let rest = &url[start + marker.len()..];
    let end = rest
        .find(|c: char| c == '&' || c.is_whitespace())
        .unwrap_or(rest.len());
    let id = &rest[..end];
    (!id.is_empty()).then_some(id)
}
