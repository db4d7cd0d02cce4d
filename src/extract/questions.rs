use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::warn;

use super::{has_class, next_sibling_element, squash_ws};
use crate::error::{DataSet, DumpError, PageRef};
use crate::paginate::PageExtent;
use crate::records::{Answer, Question};

static QUESTION_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^question_(\d+)$").unwrap());
static QTEXT_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^qtext_(\d+)$").unwrap());
static IMPORTANCE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^importance_(\d+)$").unwrap());

static QUESTION_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[id^="question_"]"#).unwrap());
static QTEXT_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[id^="qtext_"]"#).unwrap());
static IMPORTANCE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[id^="importance_"]"#).unwrap());
static LI_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("li").unwrap());
static TEXTAREA_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("textarea").unwrap());
static PAGES_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#questions_pages").unwrap());

/// Read the total-pages / rows-per-page indicator from the first
/// questions page.
pub fn page_extent(doc: &Html, url: &str) -> Result<PageExtent, DumpError> {
    let el = doc.select(&PAGES_SEL).next().ok_or_else(|| {
        DumpError::missing(
            DataSet::Questions,
            PageRef::Url(url.to_string()),
            "questions_pages",
        )
    })?;
    Ok(PageExtent {
        pages: read_count(el, "data-total-pages", url)?,
        rows: read_count(el, "data-rows", url)?,
    })
}

fn read_count(el: ElementRef<'_>, attr: &'static str, url: &str) -> Result<u64, DumpError> {
    el.value()
        .attr(attr)
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| DumpError::missing(DataSet::Questions, PageRef::Url(url.to_string()), attr))
}

/// Extract every answered question on the page. Containers without a
/// prompt are placeholders and skipped; containers where no answer
/// entry carries the `mine` class are unanswered and dropped.
pub fn extract(doc: &Html) -> Vec<Question> {
    let mut questions = Vec::new();

    for container in doc.select(&QUESTION_SEL) {
        let Some(container_id) = container.value().attr("id") else {
            continue;
        };
        if !QUESTION_ID_RE.is_match(container_id) {
            continue;
        }
        let public = has_class(container, "public");

        // The question id comes from the prompt node, not the container.
        let prompt = container.select(&QTEXT_SEL).find_map(|el| {
            let caps = QTEXT_ID_RE.captures(el.value().attr("id")?)?;
            Some((el, caps[1].to_string()))
        });
        let Some((prompt, id)) = prompt else {
            warn!("Question container {} has no prompt, skipping", container_id);
            continue;
        };
        let prompt_text = squash_ws(&prompt.text().collect::<String>());

        let Some(answer_block) = next_sibling_element(prompt) else {
            warn!("Question {} has no answer block, skipping", id);
            continue;
        };

        let answers: Vec<Answer> = answer_block
            .select(&LI_SEL)
            .map(|li| Answer {
                text: squash_ws(&li.text().collect::<String>()),
                mine: has_class(li, "mine"),
                matched: has_class(li, "match"),
            })
            .collect();
        if !answers.iter().any(|a| a.mine) {
            // unanswered
            continue;
        }

        let explanation = answer_block
            .select(&TEXTAREA_SEL)
            .next()
            .map(|t| t.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty());

        let importance = container
            .select(&IMPORTANCE_SEL)
            .filter(|el| {
                el.value()
                    .attr("id")
                    .is_some_and(|id| IMPORTANCE_ID_RE.is_match(id))
            })
            .find(|el| el.value().attr("checked").is_some())
            .and_then(|el| el.value().attr("value"))
            .map(str::to_string);

        questions.push(Question {
            id,
            prompt: prompt_text,
            public,
            importance,
            answers,
            explanation,
        });
    }

    questions
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> Html {
        let html = std::fs::read_to_string(format!("tests/fixtures/{}.html", name)).unwrap();
        Html::parse_document(&html)
    }

    #[test]
    fn answered_question_with_importance() {
        let questions = extract(&fixture("questions"));
        assert_eq!(questions.len(), 1);

        let q = &questions[0];
        assert_eq!(q.id, "7025");
        assert_eq!(q.prompt, "Do you like scary movies?");
        assert!(q.public);
        assert_eq!(q.importance.as_deref(), Some("3"));
        assert_eq!(q.answers.len(), 2);
        assert!(q.answers[0].mine && !q.answers[0].matched);
        assert!(!q.answers[1].mine && q.answers[1].matched);
        assert_eq!(q.explanation.as_deref(), Some("Halloween marathon every year."));
    }

    #[test]
    fn unanswered_and_promptless_containers_dropped() {
        let questions = extract(&fixture("questions"));
        assert!(questions.iter().all(|q| q.id != "8800"));
        assert!(questions.iter().all(|q| q.id != "9001"));
    }

    #[test]
    fn every_kept_question_has_an_own_answer() {
        let questions = extract(&fixture("questions"));
        assert!(!questions.is_empty());
        assert!(questions
            .iter()
            .all(|q| q.answers.iter().any(|a| a.mine)));
    }

    #[test]
    fn reads_page_extent() {
        let extent = page_extent(&fixture("questions"), "http://test/questions").unwrap();
        assert_eq!(extent.pages, 3);
        assert_eq!(extent.rows, 10);
    }

    #[test]
    fn missing_extent_indicator_is_extraction_error() {
        let doc = Html::parse_document("<html><body></body></html>");
        let err = page_extent(&doc, "http://test/questions").unwrap_err();
        assert!(matches!(
            err,
            DumpError::Extraction {
                data_set: DataSet::Questions,
                element: "questions_pages",
                ..
            }
        ));
    }
}
