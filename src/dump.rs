//! Streaming `<page>` blocks out of a MediaWiki XML dump.

use bzip2::read::BzDecoder;
use lazy_static::lazy_static;
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

lazy_static! {
    pub static ref TITLE_PATTERN: Regex = Regex::new(r"<title>([^<]+)</title>").unwrap();
    pub static ref TEXT_PATTERN: Regex = Regex::new(r"(?s)<text[^>]*>(.+?)</text>").unwrap();
    // Reconstructed forms live at "Reconstruction:Proto-Germanic/hundaz"; keep the bare form
    static ref RECONSTRUCTION_PREFIX: Regex = Regex::new(r"Reconstruction:[^:]*/").unwrap();
}

/// Title and wikitext of one page, numbered in dump order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPage {
    pub title: String,
    pub text: String,
    pub page_id: usize,
}

/// Open a dump file, decompressing `.bz2` input on the fly.
pub fn open_dump(path: &Path) -> std::io::Result<Box<dyn BufRead + Send>> {
    let file = File::open(path)?;
    let reader: Box<dyn BufRead + Send> = if path.to_string_lossy().ends_with(".bz2") {
        Box::new(BufReader::with_capacity(256 * 1024, BzDecoder::new(file)))
    } else {
        Box::new(BufReader::with_capacity(256 * 1024, file))
    };
    Ok(reader)
}

/// Call `callback` with each complete `<page>...</page>` block in the stream.
/// Stops early when the callback returns false.
pub fn scan_pages(mut reader: impl BufRead, mut callback: impl FnMut(String) -> bool) -> std::io::Result<()> {
    let mut buffer = String::new();
    let mut pending: Vec<u8> = Vec::new();
    let mut chunk = vec![0u8; 1024 * 1024]; // 1MB chunks

    loop {
        let bytes_read = reader.read(&mut chunk)?;
        if bytes_read == 0 {
            break;
        }

        // A chunk may end in the middle of a multi-byte character; hold the tail back
        pending.extend_from_slice(&chunk[..bytes_read]);
        let valid = match std::str::from_utf8(&pending) {
            Ok(_) => pending.len(),
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            Err(_) => pending.len(),
        };
        buffer.push_str(&String::from_utf8_lossy(&pending[..valid]));
        pending.drain(..valid);

        // Extract complete pages
        while let Some(start) = buffer.find("<page>") {
            if let Some(end_offset) = buffer[start..].find("</page>") {
                let end = start + end_offset + "</page>".len();
                let page_xml = buffer[start..end].to_string();
                buffer.drain(..end);

                if !callback(page_xml) {
                    return Ok(());
                }
            } else {
                buffer.drain(..start);
                break;
            }
        }

        if buffer.len() > 10 && !buffer.contains("<page>") {
            let mut cut = buffer.len() - 10;
            while !buffer.is_char_boundary(cut) {
                cut -= 1;
            }
            buffer.drain(..cut);
        }
    }

    Ok(())
}

/// Pull the title and text out of one page block.
///
/// Pages without a title or a non-empty text element are skipped.
pub fn parse_page(page_xml: &str, page_id: usize) -> Option<RawPage> {
    let title = TITLE_PATTERN.captures(page_xml)?;
    let title = clean_title(&unescape_xml(&title[1]));

    let text = TEXT_PATTERN.captures(page_xml)?;
    let text = unescape_xml(&text[1]);

    Some(RawPage { title, text, page_id })
}

pub fn clean_title(title: &str) -> String {
    RECONSTRUCTION_PREFIX.replace_all(title, "").into_owned()
}

/// Decode the predefined XML entities. `&amp;` goes last so `&amp;lt;` stays `&lt;`.
pub fn unescape_xml(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
