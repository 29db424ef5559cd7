// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/content.rs
//
// Lesson content links: rewriting share links into embeddable form.

const DRIVE_HOST: &str = "drive.google.com";
const DRIVE_FILE_SEGMENT: &str = "/file/d/";

/// Rewrite a lesson content link so it can be embedded in a frame.
///
/// YouTube watch and short links become `/embed/` links; Google Drive
/// `view`/`edit` links become `/preview` links. Anything else is returned
/// trimmed but otherwise unchanged.
pub fn embed_url(url: &str) -> String {
    let mut url = url.trim().to_string();
    if url.is_empty() {
        return url;
    }

    if url.contains("youtube.com/watch?v=") {
        url = youtube_watch_to_embed(&url);
    } else if url.contains("youtu.be/") {
        url = url.replacen("youtu.be/", "youtube.com/embed/", 1);
    }

    if url.contains(DRIVE_HOST) {
        if url.contains("/view") || url.contains("/edit") {
            let base = url.split('?').next().unwrap_or_default();
            let base = base
                .strip_suffix("/view")
                .or_else(|| base.strip_suffix("/edit"))
                .map(|stem| format!("{stem}/preview"))
                .unwrap_or_else(|| base.to_string());
            url = base;
        } else if !url.ends_with("/preview") {
            if let Some(id) = drive_file_id(&url) {
                url = format!("https://{DRIVE_HOST}/file/d/{id}/preview");
            }
        }
    }

    url
}

fn youtube_watch_to_embed(url: &str) -> String {
    let embedded = url.replacen("watch?v=", "embed/", 1);
    // Extra watch parameters (`&t=`, `&list=`) are not valid on an embed path.
    match embedded.split_once('&') {
        Some((head, _)) => head.to_string(),
        None => embedded,
    }
}

/// File id from a `.../file/d/<id>/...` Drive link.
pub fn drive_file_id(url: &str) -> Option<&str> {
    let start = url.find(DRIVE_FILE_SEGMENT)? + DRIVE_FILE_SEGMENT.len();
    let rest = &url[start..];
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    Some(&rest[..end]).filter(|id| !id.is_empty())
}
