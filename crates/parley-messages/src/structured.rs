// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structured message content: an XML prolog followed by one element tree.
//!
//! Only tags and attributes matter here, so the document is checked with a
//! small tag scanner rather than a full XML parser. Comments and CDATA
//! sections are dropped before scanning. The scanner rejects stray `<`,
//! unbalanced or mismatched tags, and more than one root element.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static PROLOG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*<\?xml[^>]*>").expect("prolog regex"));

static IGNORED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<!\[CDATA\[.*?\]\]>|<!--.*?-->").expect("cdata regex")
});

static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"<(/?)([A-Za-z_][\w:.-]*)((?:\s+[A-Za-z_][\w:.-]*\s*=\s*(?:"[^"]*"|'[^']*'))*)\s*(/?)>"#,
    )
    .expect("tag regex")
});

static ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_][\w:.-]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("attribute regex")
});

/// Structured content that could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed structured content: {reason}")]
pub struct MalformedContent {
    pub reason: String,
}

fn malformed(reason: impl Into<String>) -> MalformedContent {
    MalformedContent {
        reason: reason.into(),
    }
}

/// One start or empty-element tag with its attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attrs: HashMap<String, String>,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str).filter(|v| !v.is_empty())
    }

    pub fn attr_u64(&self, name: &str) -> Option<u64> {
        self.attr(name).and_then(|v| v.trim().parse().ok())
    }

    pub fn attr_u32(&self, name: &str) -> Option<u32> {
        self.attr(name).and_then(|v| v.trim().parse().ok())
    }
}

/// What a well-formed document describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Structured {
    Image(Element),
    Voice(Element),
    Video(Element),
    /// Well-formed, but not a media element this console understands.
    Other { root: String },
}

/// Whether `content` opens with an XML prolog.
pub fn is_structured(content: &str) -> bool {
    PROLOG.is_match(content)
}

/// Scan a prolog-prefixed document and find its media element.
///
/// The first `img`, `voicemsg` or `videomsg` element anywhere in the tree
/// wins.
pub fn parse(content: &str) -> Result<Structured, MalformedContent> {
    let prolog = PROLOG
        .find(content)
        .ok_or_else(|| malformed("missing XML prolog"))?;
    let body = IGNORED.replace_all(&content[prolog.end()..], "");
    let elements = scan(&body)?;

    let media = elements
        .iter()
        .position(|e| matches!(e.name.as_str(), "img" | "voicemsg" | "videomsg"));
    match media {
        Some(index) => {
            let element = elements.into_iter().nth(index).ok_or_else(|| malformed("element vanished"))?;
            Ok(match element.name.as_str() {
                "img" => Structured::Image(element),
                "voicemsg" => Structured::Voice(element),
                _ => Structured::Video(element),
            })
        }
        None => Ok(Structured::Other {
            root: elements
                .first()
                .map(|e| e.name.clone())
                .unwrap_or_default(),
        }),
    }
}

fn scan(body: &str) -> Result<Vec<Element>, MalformedContent> {
    let mut open: Vec<&str> = Vec::new();
    let mut elements = Vec::new();
    let mut cursor = 0;
    let mut root_closed = false;

    for caps in TAG.captures_iter(body) {
        let Some(tag) = caps.get(0) else { continue };
        let text = &body[cursor..tag.start()];
        if text.contains('<') {
            return Err(malformed(format!("unexpected markup at byte {cursor}")));
        }
        if root_closed && !text.trim().is_empty() {
            return Err(malformed("text after root element"));
        }
        cursor = tag.end();

        let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        let self_closing = caps.get(4).is_some_and(|m| !m.as_str().is_empty());
        let name = caps.get(2).map_or("", |m| m.as_str());

        if closing {
            if self_closing {
                return Err(malformed(format!("invalid closing tag </{name}/>")));
            }
            match open.pop() {
                Some(expected) if expected == name => {}
                Some(expected) => {
                    return Err(malformed(format!("expected </{expected}>, found </{name}>")));
                }
                None => return Err(malformed(format!("unmatched </{name}>"))),
            }
            if open.is_empty() {
                root_closed = true;
            }
            continue;
        }

        if root_closed {
            return Err(malformed("more than one root element"));
        }
        elements.push(Element {
            name: name.to_string(),
            attrs: parse_attrs(caps.get(3).map_or("", |m| m.as_str())),
        });
        if self_closing {
            root_closed |= open.is_empty();
        } else {
            open.push(name);
        }
    }

    let tail = &body[cursor..];
    if tail.contains('<') {
        return Err(malformed(format!("unexpected markup at byte {cursor}")));
    }
    if root_closed && !tail.trim().is_empty() {
        return Err(malformed("text after root element"));
    }
    if let Some(name) = open.last() {
        return Err(malformed(format!("unclosed <{name}>")));
    }
    if elements.is_empty() {
        return Err(malformed("no element after prolog"));
    }
    Ok(elements)
}

fn parse_attrs(raw: &str) -> HashMap<String, String> {
    ATTR.captures_iter(raw)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str().to_string();
            let value = caps.get(2).or_else(|| caps.get(3)).map_or("", |m| m.as_str());
            Some((name, unescape(value)))
        })
        .collect()
}

fn unescape(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
