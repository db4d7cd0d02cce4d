use std::fmt;

use thiserror::Error;

/// The three extractable data sets. Doubles as the identity used to
/// select an extraction function and to label errors and progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSet {
    Questions,
    Messages,
    Likes,
}

impl fmt::Display for DataSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DataSet::Questions => "questions",
            DataSet::Messages => "messages",
            DataSet::Likes => "likes",
        })
    }
}

/// Where in a data set an error happened, precise enough to resume a
/// run by hand. Page urls carry their offset or cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRef {
    Thread(String),
    Url(String),
}

impl fmt::Display for PageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageRef::Thread(id) => write!(f, "thread {id}"),
            PageRef::Url(url) => f.write_str(url),
        }
    }
}

#[derive(Debug, Error)]
pub enum DumpError {
    /// Fatal before any extraction begins; never retried.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// A page was missing structure we rely on. Skipping the page
    /// would corrupt progress accounting, so the run stops here.
    #[error("{data_set} page at {page}: expected {element} was not found")]
    Extraction {
        data_set: DataSet,
        page: PageRef,
        element: &'static str,
    },

    /// Probe pagination crossed its hard ceiling without draining:
    /// either a logic error or the site changed behavior.
    #[error("{data_set} pagination crossed the {ceiling} offset ceiling without terminating")]
    PaginationBound { data_set: DataSet, ceiling: u64 },

    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl DumpError {
    pub fn missing(data_set: DataSet, page: PageRef, element: &'static str) -> Self {
        DumpError::Extraction {
            data_set,
            page,
            element,
        }
    }

    pub fn transport(
        url: &str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        DumpError::Transport {
            url: url.to_string(),
            source: Box::new(source),
        }
    }
}
