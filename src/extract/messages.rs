use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use tracing::warn;

use super::has_class;
use crate::error::{DataSet, DumpError, PageRef};
use crate::records::Message;

static THREAD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"threadid=(\d+)").unwrap());
static MESSAGE_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^message_(\d+)$").unwrap());
static TIMESTAMP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+), 'MESSAGE_FORMAT'").unwrap());

static HREF_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());
static BUDDYNAME_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"input[name="buddyname"]"#).unwrap());
static MESSAGE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[id^="message_"]"#).unwrap());
static SCRIPT_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("script").unwrap());
static BODY_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".message_body").unwrap());

/// Collect every conversation id referenced on a folder listing page.
/// Duplicates are possible (and expected across folders); the caller
/// owns deduplication.
pub fn thread_ids(doc: &Html) -> Vec<String> {
    doc.select(&HREF_SEL)
        .filter_map(|a| {
            let href = a.value().attr("href")?;
            Some(THREAD_RE.captures(href)?[1].to_string())
        })
        .collect()
}

/// Extract every message on a thread page. The counterpart's name is
/// read once from the `buddyname` form field; direction per message
/// comes from the `from_me` class.
pub fn extract(doc: &Html, thread_id: &str, owner: &str) -> Result<Vec<Message>, DumpError> {
    let counterpart = doc
        .select(&BUDDYNAME_SEL)
        .next()
        .and_then(|el| el.value().attr("value"))
        .ok_or_else(|| {
            DumpError::missing(
                DataSet::Messages,
                PageRef::Thread(thread_id.to_string()),
                "buddyname",
            )
        })?;

    let mut messages = Vec::new();
    for container in doc.select(&MESSAGE_SEL) {
        let Some(id) = container
            .value()
            .attr("id")
            .and_then(|id| MESSAGE_ID_RE.captures(id))
            .map(|caps| caps[1].to_string())
        else {
            continue;
        };

        let (sender, recipient) = if has_class(container, "from_me") {
            (owner.to_string(), counterpart.to_string())
        } else {
            (counterpart.to_string(), owner.to_string())
        };

        // First marker match wins; later scripts on the same message
        // are ignored.
        let timestamp = container.select(&SCRIPT_SEL).find_map(|script| {
            let text = script.text().collect::<String>();
            TIMESTAMP_RE.captures(&text)?[1].parse::<i64>().ok()
        });
        if timestamp.is_none() {
            warn!("No timestamp on message {} in thread {}", id, thread_id);
        }

        let body = container.select(&BODY_SEL).next().ok_or_else(|| {
            DumpError::missing(
                DataSet::Messages,
                PageRef::Thread(thread_id.to_string()),
                "message_body",
            )
        })?;
        let text = body
            .text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        messages.push(Message {
            id,
            thread_id: thread_id.to_string(),
            sender,
            recipient,
            timestamp,
            body: text,
        });
    }

    Ok(messages)
}

// ── Tests ──
