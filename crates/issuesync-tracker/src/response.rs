//! SOAP response parsing.
//!
//! The tracker answers with RPC/encoded bodies. Complex values usually arrive
//! as `multiRef` elements referenced from the return array; some servers
//! inline them instead. Records are located either way by an anchor field that
//! every record of that type carries.

use crate::TrackerError;
use issuesync_core::issue::{RemoteComment, RemoteIssue, WorkflowAction};
use regex::Regex;
use std::collections::HashMap;
use std::sync::{LazyLock, Mutex};

static MULTI_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<multiRef\b[^>]*>(.*?)</multiRef>").unwrap());

static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(lt|gt|amp|quot|apos|#[0-9]+|#x[0-9a-fA-F]+);").unwrap());

static CDATA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").unwrap());

// Compiled element patterns, keyed by `(element name, full element)`
static ELEMENTS: LazyLock<Mutex<HashMap<(String, bool), Regex>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Pattern for an element named `name`, namespace prefix ignored. With `full`
/// it matches the whole element and captures its content; otherwise only the
/// opening tag.
fn element(name: &str, full: bool) -> Option<Regex> {
    let mut cache = ELEMENTS.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(re) = cache.get(&(name.to_string(), full)) {
        return Some(re.clone());
    }

    let name_re = regex::escape(name);
    let pattern = if full {
        format!(r"(?s)<(?:[\w-]+:)?{name_re}\b[^>]*?(?:/>|>(.*?)</(?:[\w-]+:)?{name_re}>)")
    } else {
        format!(r"<(?:[\w-]+:)?{name_re}\b")
    };
    let re = Regex::new(&pattern).ok()?;
    cache.insert((name.to_string(), full), re.clone());
    Some(re)
}

/// Return the fault carried by a response, if any.
pub fn fault(xml: &str) -> Option<TrackerError> {
    let message = field(xml, "faultstring")?;
    let code = field(xml, "faultcode").unwrap_or_default();
    Some(TrackerError::Fault { code, message })
}

/// Text content of the first element named `name` (namespace prefix ignored).
/// Self-closing and `xsi:nil` elements yield `None`. CDATA sections are taken
/// verbatim.
pub fn field(xml: &str, name: &str) -> Option<String> {
    let caps = element(name, true)?.captures(xml)?;
    caps.get(1).map(|m| text(m.as_str().trim()))
}

/// Character data of an element: entities are decoded outside CDATA sections.
fn text(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut last = 0;
    for caps in CDATA.captures_iter(content) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push_str(&unescape(&content[last..whole.start()]));
        out.push_str(inner.as_str());
        last = whole.end();
    }
    out.push_str(&unescape(&content[last..]));
    out
}

/// Split a response into the records that carry an `anchor` element.
pub fn records<'a>(xml: &'a str, anchor: &str) -> Vec<&'a str> {
    let Some(anchor_re) = element(anchor, false) else {
        return Vec::new();
    };

    let refs: Vec<&str> = MULTI_REF
        .captures_iter(xml)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|block| anchor_re.is_match(block))
        .collect();
    if !refs.is_empty() {
        return refs;
    }

    // Inlined values: each record starts at its anchor element
    let starts: Vec<usize> = anchor_re.find_iter(xml).map(|m| m.start()).collect();
    starts
        .iter()
        .enumerate()
        .map(|(i, start)| {
            let end = starts.get(i + 1).copied().unwrap_or(xml.len());
            &xml[*start..end]
        })
        .collect()
}

/// Replace the predefined XML entities and character references.
pub fn unescape(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &regex::Captures| {
            let entity = &caps[1];
            match entity {
                "lt" => "<".to_string(),
                "gt" => ">".to_string(),
                "amp" => "&".to_string(),
                "quot" => "\"".to_string(),
                "apos" => "'".to_string(),
                _ => {
                    let code = match entity.strip_prefix("#x") {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => entity[1..].parse::<u32>().ok(),
                    };
                    code.and_then(char::from_u32)
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| caps[0].to_string())
                }
            }
        })
        .to_string()
}

pub fn parse_login(xml: &str) -> Result<String, TrackerError> {
    field(xml, "loginReturn")
        .filter(|token| !token.is_empty())
        .ok_or_else(|| TrackerError::Parse("no token in login response".to_string()))
}

pub fn parse_issues(xml: &str) -> Vec<RemoteIssue> {
    records(xml, "key")
        .into_iter()
        .filter_map(|record| {
            let key = field(record, "key")?;
            Some(RemoteIssue {
                key,
                status: field(record, "status"),
                summary: field(record, "summary"),
            })
        })
        .collect()
}

pub fn parse_comments(xml: &str) -> Vec<RemoteComment> {
    // `author` is the first field the server writes for each comment
    let mut found = records(xml, "author");
    if found.is_empty() {
        found = records(xml, "body");
    }

    found
        .into_iter()
        .filter_map(|record| {
            let body = field(record, "body")?;
            Some(RemoteComment {
                body,
                author: field(record, "author"),
            })
        })
        .collect()
}

pub fn parse_actions(xml: &str) -> Vec<WorkflowAction> {
    records(xml, "id")
        .into_iter()
        .filter_map(|record| {
            let id = field(record, "id")?;
            let name = field(record, "name")?;
            Some(WorkflowAction { id, name })
        })
        .collect()
}
