use std::fmt::Display;
use std::path::{Path, PathBuf};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

/// SEC-003: Maximum allowed nesting depth for OPML outline elements.
/// Prevents stack overflow attacks from maliciously crafted deeply nested OPMLs.
const MAX_OPML_DEPTH: usize = 50;

/// Outline `type` that marks a feed subscription.
const RSS_OUTLINE_TYPE: &str = "rss";

/// Errors that can occur during OPML parsing.
#[derive(Debug, Error)]
pub enum OpmlError {
    /// The OPML file does not exist.
    #[error("OPML file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The document is not well-formed XML.
    #[error("Error parsing OPML file: {0}")]
    Malformed(String),

    /// SEC-003: OPML nesting depth exceeds safety limit.
    #[error("OPML nesting depth exceeds maximum of {0} levels")]
    MaxDepthExceeded(usize),

    /// Any other failure reading the file.
    #[error("Failed to read OPML file: {0}")]
    Io(#[from] std::io::Error),
}

fn malformed(e: impl Display) -> OpmlError {
    OpmlError::Malformed(e.to_string())
}

/// Parses an OPML file from disk and returns its RSS subscription URLs.
///
/// URLs are returned in document order. Duplicates are kept.
///
/// # Errors
///
/// - [`OpmlError::NotFound`] if `path` does not exist
/// - [`OpmlError::Malformed`] if the content is not well-formed XML
/// - [`OpmlError::MaxDepthExceeded`] if outlines nest deeper than 50 levels
/// - [`OpmlError::Io`] for any other read failure
///
/// # Security
///
/// XXE (XML External Entity) attacks are mitigated because `quick-xml` (0.37)
/// does not parse `<!ENTITY>` declarations. Custom entities anywhere in the
/// document make it malformed.
pub async fn parse(path: &Path) -> Result<Vec<String>, OpmlError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(OpmlError::NotFound(path.to_path_buf()));
        }
        Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
            return Err(malformed("file is not valid UTF-8"));
        }
        Err(e) => return Err(OpmlError::Io(e)),
    };

    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
    let urls = parse_opml_content(content)?;
    tracing::info!(path = %path.display(), feeds = urls.len(), "Found {} RSS feed(s)", urls.len());
    Ok(urls)
}

/// Parses OPML content and extracts the `xmlUrl` of every `type="rss"` outline.
///
/// Outlines are matched at any nesting depth, in document order. Outlines of
/// another type, and rss outlines without an `xmlUrl`, are skipped.
///
/// The whole document must be well-formed: exactly one root element with
/// nothing but whitespace around it, every start tag closed by a matching end
/// tag, every attribute quoted, and every entity reference one of the XML
/// builtins.
pub fn parse_opml_content(content: &str) -> Result<Vec<String>, OpmlError> {
    // SEC-002: XXE protection: quick-xml (0.37) never parses <!ENTITY> declarations from
    // DOCTYPE. Only the 5 XML builtins resolve; custom entities like &xxe; fail in
    // `unescape()` / `decode_and_unescape_value()` and surface as `OpmlError::Malformed`.
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut urls = Vec::new();
    let mut buf = Vec::new();
    // Open elements of any name, for well-formedness
    let mut open_elements: usize = 0;
    // SEC-003: Open outline elements, to bound nesting
    let mut outline_depth: usize = 0;
    let mut seen_root = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                check_single_root(&mut seen_root, open_elements)?;
                open_elements += 1;
                let attributes = decoded_attributes(&e, &reader)?;
                if e.name().as_ref() == b"outline" {
                    outline_depth += 1;
                    // SEC-003: Reject excessively nested OPMLs
                    if outline_depth > MAX_OPML_DEPTH {
                        return Err(OpmlError::MaxDepthExceeded(MAX_OPML_DEPTH));
                    }
                    if let Some(url) = rss_feed_url(attributes) {
                        urls.push(url);
                    }
                }
            }
            Ok(Event::Empty(e)) => {
                // Self-closing elements don't affect depth
                check_single_root(&mut seen_root, open_elements)?;
                let attributes = decoded_attributes(&e, &reader)?;
                if e.name().as_ref() == b"outline" {
                    if let Some(url) = rss_feed_url(attributes) {
                        urls.push(url);
                    }
                }
            }
            Ok(Event::End(e)) => {
                open_elements = open_elements.saturating_sub(1);
                if e.name().as_ref() == b"outline" {
                    outline_depth = outline_depth.saturating_sub(1);
                }
            }
            Ok(Event::Text(e)) => {
                if open_elements == 0 && e.iter().any(|b| !b.is_ascii_whitespace()) {
                    return Err(malformed("text outside the document element"));
                }
                // Bare `&` and unknown entities (`&nbsp;`) are not well-formed
                e.unescape().map_err(malformed)?;
            }
            Ok(Event::CData(_)) if open_elements == 0 => {
                return Err(malformed("CDATA outside the document element"));
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(malformed(format!(
                    "{} (at byte {})",
                    e,
                    reader.error_position()
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    if !seen_root {
        return Err(malformed("no element found"));
    }
    if open_elements > 0 {
        return Err(malformed(format!(
            "document ended with {} unclosed element(s)",
            open_elements
        )));
    }

    Ok(urls)
}

/// Fails if a second top-level element starts after the root has closed.
fn check_single_root(seen_root: &mut bool, open_elements: usize) -> Result<(), OpmlError> {
    if open_elements == 0 {
        if *seen_root {
            return Err(malformed("junk after document element"));
        }
        *seen_root = true;
    }
    Ok(())
}

/// Decodes and unescapes every attribute of an element.
///
/// Any attribute error (unquoted or duplicated attribute, bad entity
/// reference) makes the whole document malformed, whatever the element.
fn decoded_attributes(
    e: &BytesStart<'_>,
    reader: &Reader<&[u8]>,
) -> Result<Vec<(Vec<u8>, String)>, OpmlError> {
    let decoder = reader.decoder();
    e.attributes()
        .map(|attr_result| {
            let attr = attr_result.map_err(malformed)?;
            let value = attr.decode_and_unescape_value(decoder).map_err(malformed)?;
            Ok((attr.key.as_ref().to_vec(), value.into_owned()))
        })
        .collect()
}

/// Returns the feed URL of an outline if it is an rss subscription with a
/// non-empty `xmlUrl`.
fn rss_feed_url(attributes: Vec<(Vec<u8>, String)>) -> Option<String> {
    let mut is_rss = false;
    let mut xml_url = None;

    for (key, value) in attributes {
        match key.as_slice() {
            b"type" => is_rss = value == RSS_OUTLINE_TYPE,
            b"xmlUrl" => xml_url = Some(value),
            _ => {}
        }
    }

    xml_url.filter(|url| is_rss && !url.is_empty())
}
