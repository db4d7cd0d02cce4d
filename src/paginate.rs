//! The three pagination heuristics the site exposes, modeled as named
//! strategies over one fetch-parse-extract-accumulate shape. Each
//! reports one unit of progress per fetched page, independent of how
//! many records the page yields.

use indicatif::ProgressBar;
use scraper::Html;

use crate::error::{DataSet, DumpError};
use crate::extract::parse_page;
use crate::net::Transport;

/// Result of the preliminary count request: how many pages exist and
/// how many rows each page holds.
#[derive(Debug, Clone, Copy)]
pub struct PageExtent {
    pub pages: u64,
    pub rows: u64,
}

/// One probe request reveals the extent up front; pages are then
/// fetched at offsets 1, 1+rows, … strictly below `pages * rows`.
pub fn count_then_iterate<T, R>(
    transport: &T,
    pb: &ProgressBar,
    probe_url: &str,
    read_extent: impl Fn(&Html, &str) -> Result<PageExtent, DumpError>,
    page_url: impl Fn(u64) -> String,
    mut extract: impl FnMut(&Html) -> Result<Vec<R>, DumpError>,
) -> Result<Vec<R>, DumpError>
where
    T: Transport + ?Sized,
{
    let probe = transport.open(probe_url, None)?;
    let extent = read_extent(&parse_page(&probe), probe_url)?;
    pb.set_length(extent.pages);

    let mut records = Vec::new();
    if extent.rows == 0 {
        return Ok(records);
    }

    let bound = extent.pages.saturating_mul(extent.rows);
    let mut low = 1;
    while low < bound {
        let page = transport.open(&page_url(low), None)?;
        records.extend(extract(&parse_page(&page))?);
        pb.inc(1);
        low += extent.rows;
    }
    Ok(records)
}

/// No count is available: fetch offsets 1, 1+step, … until a page
/// yields nothing. Crossing `ceiling` without draining means the site
/// stopped behaving as expected and is fatal.
pub fn probe_until_empty<T, R>(
    transport: &T,
    pb: &ProgressBar,
    data_set: DataSet,
    page_url: impl Fn(u64) -> String,
    step: u64,
    ceiling: u64,
    mut extract: impl FnMut(&Html) -> Result<Vec<R>, DumpError>,
) -> Result<Vec<R>, DumpError>
where
    T: Transport + ?Sized,
{
    let mut records = Vec::new();
    let mut low = 1;
    while low < ceiling {
        let page = transport.open(&page_url(low), None)?;
        pb.inc(1);
        let found = extract(&parse_page(&page))?;
        if found.is_empty() {
            return Ok(records);
        }
        records.extend(found);
        low += step;
    }
    Err(DumpError::PaginationBound { data_set, ceiling })
}

/// Cursor pagination: the page itself says whether more data exists.
/// `extract` returns the records plus the next page's address, or
/// None when the listing is exhausted.
pub fn follow_next<T, R>(
    transport: &T,
    pb: &ProgressBar,
    entry_url: String,
    mut extract: impl FnMut(&Html, &str) -> Result<(Vec<R>, Option<String>), DumpError>,
) -> Result<Vec<R>, DumpError>
where
    T: Transport + ?Sized,
{
    let mut records = Vec::new();
    let mut next = Some(entry_url);
    while let Some(url) = next {
        let page = transport.open(&url, None)?;
        pb.inc(1);
        let (found, continuation) = extract(&parse_page(&page), &url)?;
        records.extend(found);
        next = continuation;
    }
    Ok(records)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{likes, messages};
    use crate::net::testing::ScriptedSite;

    fn thread_page(ids: &[&str]) -> String {
        let rows: String = ids
            .iter()
            .map(|id| format!(r#"<a href="/messages?readmsg=true&amp;threadid={id}">t</a>"#))
            .collect();
        format!("<html><body>{rows}</body></html>")
    }

    #[test]
    fn count_then_iterate_steps_by_page_size() {
        let site = ScriptedSite::new(|_| String::from("<html></html>"));
        let pb = ProgressBar::hidden();

        let records: Vec<u32> = count_then_iterate(
            &site,
            &pb,
            "http://test/questions",
            |_, _| Ok(PageExtent { pages: 3, rows: 10 }),
            |low| format!("http://test/questions?low={low}"),
            |_| Ok(vec![]),
        )
        .unwrap();

        assert!(records.is_empty());
        assert_eq!(
            *site.requests.borrow(),
            vec![
                "http://test/questions",
                "http://test/questions?low=1",
                "http://test/questions?low=11",
                "http://test/questions?low=21",
            ]
        );
    }

    #[test]
    fn count_then_iterate_with_no_pages_only_probes() {
        let site = ScriptedSite::new(|_| String::from("<html></html>"));
        let pb = ProgressBar::hidden();

        let records: Vec<u32> = count_then_iterate(
            &site,
            &pb,
            "http://test/questions",
            |_, _| Ok(PageExtent { pages: 0, rows: 10 }),
            |low| format!("http://test/questions?low={low}"),
            |_| Ok(vec![]),
        )
        .unwrap();

        assert!(records.is_empty());
        assert_eq!(site.requests.borrow().len(), 1);
    }

    #[test]
    fn probe_stops_on_first_empty_page() {
        let site = ScriptedSite::new(|url| {
            if url.ends_with("low=1") {
                thread_page(&["42", "57", "99"])
            } else if url.ends_with("low=31") {
                thread_page(&["118", "203"])
            } else {
                thread_page(&[])
            }
        });
        let pb = ProgressBar::hidden();

        let ids = probe_until_empty(
            &site,
            &pb,
            DataSet::Messages,
            |low| format!("http://test/messages?low={low}"),
            30,
            999,
            |doc| Ok(messages::thread_ids(doc)),
        )
        .unwrap();

        assert_eq!(site.requests.borrow().len(), 3);
        assert_eq!(ids, vec!["42", "57", "99", "118", "203"]);
    }

    #[test]
    fn probe_crossing_ceiling_is_fatal() {
        let site = ScriptedSite::new(|_| thread_page(&["42"]));
        let pb = ProgressBar::hidden();

        let err = probe_until_empty(
            &site,
            &pb,
            DataSet::Messages,
            |low| format!("http://test/messages?low={low}"),
            30,
            91,
            |doc| Ok(messages::thread_ids(doc)),
        )
        .unwrap_err();

        // Offsets 1, 31, 61 fetched; 91 crosses the ceiling.
        assert_eq!(site.requests.borrow().len(), 3);
        assert!(matches!(
            err,
            DumpError::PaginationBound {
                data_set: DataSet::Messages,
                ceiling: 91,
            }
        ));
    }

    #[test]
    fn follow_next_walks_continuations_until_exhausted() {
        let first = r##"<html><body>
            <div data-username="aurora_b" data-event-time="100"></div>
            <ul class="pagination"><li class="next"><a href="http://test/likes?page=2">next</a></li></ul>
        </body></html>"##;
        let second = r##"<html><body>
            <div data-username="kepler22" data-event-time="200"></div>
            <ul class="pagination"><li class="next disabled"></li></ul>
        </body></html>"##;

        let site = ScriptedSite::new(move |url| {
            if url.contains("page=2") {
                second.to_string()
            } else {
                first.to_string()
            }
        });
        let pb = ProgressBar::hidden();

        let collected = follow_next(
            &site,
            &pb,
            "http://test/likes".to_string(),
            |doc, url| likes::extract(doc, url, true),
        )
        .unwrap();

        assert_eq!(site.requests.borrow().len(), 2);
        let names: Vec<&str> = collected.iter().map(|l| l.username.as_str()).collect();
        assert_eq!(names, vec!["aurora_b", "kepler22"]);
    }
}
