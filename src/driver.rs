use std::collections::BTreeSet;
use std::sync::LazyLock;

use indicatif::{ProgressBar, ProgressStyle};
use scraper::Selector;
use tracing::info;

use crate::config::Credentials;
use crate::error::{DataSet, DumpError};
use crate::extract::{likes, messages, parse_page, questions};
use crate::net::Transport;
use crate::paginate;
use crate::records::{ExportDocument, Like, Message, Question};

const BASE_URL: &str = "https://www.okcupid.com";
const THREADS_PER_PAGE: u64 = 30;
const MAX_THREAD_OFFSET: u64 = 999;

static PASSWORD_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"input[name="password"]"#).unwrap());

/// Which data sets this run extracts. At most one selection per run.
#[derive(Debug, Clone, Copy)]
pub struct Selection {
    pub questions: bool,
    pub messages: bool,
    pub likes: bool,
}

impl Selection {
    pub fn all() -> Self {
        Selection {
            questions: true,
            messages: true,
            likes: true,
        }
    }
}

#[derive(Clone, Copy)]
enum Folder {
    Sent,
    Received,
}

impl Folder {
    fn param(self) -> u8 {
        match self {
            Folder::Sent => 2,
            Folder::Received => 1,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Folder::Sent => "sent",
            Folder::Received => "received",
        }
    }
}

/// Authenticate once, then walk each selected data set with its
/// pagination strategy and assemble the collected records.
pub fn run<T>(
    transport: &T,
    creds: &Credentials,
    selection: Selection,
) -> Result<ExportDocument, DumpError>
where
    T: Transport + ?Sized,
{
    login(transport, creds)?;

    let mut document = ExportDocument::default();
    if selection.questions {
        document.questions = fetch_questions(transport, &creds.username)?;
        info!("Collected {} questions", document.questions.len());
    }
    if selection.messages {
        document.messages = fetch_messages(transport, &creds.username)?;
        info!("Collected {} messages", document.messages.len());
    }
    if selection.likes {
        document.likes = fetch_likes(transport)?;
        info!("Collected {} likes", document.likes.len());
    }
    Ok(document)
}

fn login<T>(transport: &T, creds: &Credentials) -> Result<(), DumpError>
where
    T: Transport + ?Sized,
{
    info!("Logging in as {}", creds.username);
    let url = format!("{BASE_URL}/login");
    let form = [
        ("username", creds.username.as_str()),
        ("password", creds.password.as_str()),
    ];
    let body = transport.open(&url, Some(&form[..]))?;

    // A rejected login is answered with the login form again.
    let doc = parse_page(&body);
    if doc.select(&PASSWORD_SEL).next().is_some() {
        return Err(DumpError::Authentication(
            "credentials rejected, login form served again".to_string(),
        ));
    }
    Ok(())
}

fn fetch_questions<T>(transport: &T, username: &str) -> Result<Vec<Question>, DumpError>
where
    T: Transport + ?Sized,
{
    info!("Fetching questions");
    let pb = page_bar(None);
    let probe_url = format!("{BASE_URL}/profile/{username}/questions");
    let result = paginate::count_then_iterate(
        transport,
        &pb,
        &probe_url,
        questions::page_extent,
        |low| format!("{BASE_URL}/profile/{username}/questions?low={low}"),
        |doc| Ok(questions::extract(doc)),
    );
    pb.finish_and_clear();
    result
}

fn fetch_messages<T>(transport: &T, username: &str) -> Result<Vec<Message>, DumpError>
where
    T: Transport + ?Sized,
{
    // Thread discovery. The same conversation can surface in both
    // folders; the id set is the dedup accumulator for the whole
    // phase.
    let mut thread_ids = BTreeSet::new();
    for folder in [Folder::Sent, Folder::Received] {
        info!("Scanning {} folder for threads", folder.name());
        let pb = page_bar(None);
        let found = paginate::probe_until_empty(
            transport,
            &pb,
            DataSet::Messages,
            |low| format!("{BASE_URL}/messages?low={low}&folder={}", folder.param()),
            THREADS_PER_PAGE,
            MAX_THREAD_OFFSET,
            |doc| Ok(messages::thread_ids(doc)),
        );
        pb.finish_and_clear();
        thread_ids.extend(found?);
    }

    info!("Fetching {} threads", thread_ids.len());
    let pb = page_bar(Some(thread_ids.len() as u64));
    let mut collected = Vec::new();
    for thread_id in &thread_ids {
        let url = format!("{BASE_URL}/messages?readmsg=true&threadid={thread_id}");
        let page = transport.open(&url, None)?;
        collected.extend(messages::extract(&parse_page(&page), thread_id, username)?);
        pb.inc(1);
    }
    pb.finish_and_clear();
    Ok(collected)
}

fn fetch_likes<T>(transport: &T) -> Result<Vec<Like>, DumpError>
where
    T: Transport + ?Sized,
{
    // Each listing encodes a single direction, so the flag is fixed
    // per chain.
    let mut collected = Vec::new();
    for (mutual, entry) in [(true, "/likes/mutual"), (false, "/likes/you-like")] {
        info!(
            "Fetching {} likes",
            if mutual { "mutual" } else { "one-directional" }
        );
        let pb = page_bar(None);
        let chain = paginate::follow_next(
            transport,
            &pb,
            format!("{BASE_URL}{entry}"),
            |doc, url| {
                let (found, next) = likes::extract(doc, url, mutual)?;
                Ok((found, next.map(|href| absolute(&href))))
            },
        );
        pb.finish_and_clear();
        collected.extend(chain?);
    }
    Ok(collected)
}

fn absolute(href: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else {
        format!("{BASE_URL}{href}")
    }
}

fn page_bar(len: Option<u64>) -> ProgressBar {
    match len {
        Some(n) => {
            let pb = ProgressBar::new(n);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("[{elapsed_precise}] {bar:40} {pos}/{len} pages")
                    .unwrap()
                    .progress_chars("=> "),
            );
            pb
        }
        None => {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {pos} pages")
                    .unwrap(),
            );
            pb
        }
    }
}

// ── Tests ──
