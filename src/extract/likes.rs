use std::sync::LazyLock;

use scraper::{Html, Selector};

use super::has_class;
use crate::error::{DataSet, DumpError, PageRef};
use crate::records::Like;

static LIKE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[data-username][data-event-time]").unwrap());
static PAGINATION_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".pagination").unwrap());
static NEXT_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".next").unwrap());
static LINK_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// Extract the likes on one page plus the continuation to the next
/// page, if any. The page only encodes one like-direction at a time,
/// so `mutual` is supplied by the caller per listing.
pub fn extract(
    doc: &Html,
    page_url: &str,
    mutual: bool,
) -> Result<(Vec<Like>, Option<String>), DumpError> {
    let likes = doc
        .select(&LIKE_SEL)
        .filter_map(|node| {
            let el = node.value();
            Some(Like {
                username: el.attr("data-username")?.to_string(),
                mutual,
                timestamp: el.attr("data-event-time")?.to_string(),
            })
        })
        .collect();

    let next = continuation(doc, page_url)?;
    Ok((likes, next))
}

/// The pagination control is authoritative about whether more data
/// exists: a disabled next control ends the chain.
fn continuation(doc: &Html, page_url: &str) -> Result<Option<String>, DumpError> {
    let page = || PageRef::Url(page_url.to_string());

    let pagination = doc
        .select(&PAGINATION_SEL)
        .next()
        .ok_or_else(|| DumpError::missing(DataSet::Likes, page(), "pagination"))?;
    let next = pagination
        .select(&NEXT_SEL)
        .next()
        .ok_or_else(|| DumpError::missing(DataSet::Likes, page(), "pagination next control"))?;

    if has_class(next, "disabled") {
        return Ok(None);
    }

    let href = next
        .value()
        .attr("href")
        .map(str::to_string)
        .or_else(|| {
            next.select(&LINK_SEL)
                .next()
                .and_then(|a| a.value().attr("href"))
                .map(str::to_string)
        })
        .ok_or_else(|| DumpError::missing(DataSet::Likes, page(), "next page link"))?;
    Ok(Some(href))
}

// ── Tests ──
