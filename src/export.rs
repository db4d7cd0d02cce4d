//! One-shot XML assembly of the collected records. The buffer is only
//! handed back whole; nothing is streamed, so a failed run never
//! leaves a partial document behind.

use anyhow::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::records::{ExportDocument, Like, Message, Question};

/// Serialize the document: a single root holding the three record
/// collections in questions, messages, likes order.
pub fn write_document(document: &ExportDocument) -> Result<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new("okc-backup")))?;

    writer.write_event(Event::Start(BytesStart::new("questions")))?;
    for question in &document.questions {
        write_question(&mut writer, question)?;
    }
    writer.write_event(Event::End(BytesEnd::new("questions")))?;

    writer.write_event(Event::Start(BytesStart::new("messages")))?;
    for message in &document.messages {
        write_message(&mut writer, message)?;
    }
    writer.write_event(Event::End(BytesEnd::new("messages")))?;

    writer.write_event(Event::Start(BytesStart::new("likes")))?;
    for like in &document.likes {
        write_like(&mut writer, like)?;
    }
    writer.write_event(Event::End(BytesEnd::new("likes")))?;

    writer.write_event(Event::End(BytesEnd::new("okc-backup")))?;

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    Ok(bytes)
}

// Boolean flags are emitted only when true; an absent attribute reads
// back as false. Absent importance/explanation are omitted entirely.
fn write_question(writer: &mut Writer<Vec<u8>>, question: &Question) -> Result<()> {
    let mut el = BytesStart::new("question");
    el.push_attribute(("id", question.id.as_str()));
    if let Some(importance) = &question.importance {
        el.push_attribute(("importance", importance.as_str()));
    }
    if question.public {
        el.push_attribute(("public", "true"));
    }
    writer.write_event(Event::Start(el))?;

    text_element(writer, "prompt", &question.prompt)?;

    writer.write_event(Event::Start(BytesStart::new("responses")))?;
    for answer in &question.answers {
        let mut el = BytesStart::new("response");
        if answer.mine {
            el.push_attribute(("mine", "true"));
        }
        if answer.matched {
            el.push_attribute(("match", "true"));
        }
        writer.write_event(Event::Start(el))?;
        writer.write_event(Event::Text(BytesText::new(&answer.text)))?;
        writer.write_event(Event::End(BytesEnd::new("response")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("responses")))?;

    if let Some(explanation) = &question.explanation {
        text_element(writer, "explanation", explanation)?;
    }

    writer.write_event(Event::End(BytesEnd::new("question")))?;
    Ok(())
}

fn write_message(writer: &mut Writer<Vec<u8>>, message: &Message) -> Result<()> {
    let mut el = BytesStart::new("message");
    el.push_attribute(("id", message.id.as_str()));
    el.push_attribute(("thread_id", message.thread_id.as_str()));
    if let Some(timestamp) = message.timestamp {
        el.push_attribute(("timestamp", timestamp.to_string().as_str()));
    }
    el.push_attribute(("sender", message.sender.as_str()));
    el.push_attribute(("recipient", message.recipient.as_str()));

    writer.write_event(Event::Start(el))?;
    writer.write_event(Event::Text(BytesText::new(&message.body)))?;
    writer.write_event(Event::End(BytesEnd::new("message")))?;
    Ok(())
}

// Both mutual states are meaningful, so the flag is always explicit.
fn write_like(writer: &mut Writer<Vec<u8>>, like: &Like) -> Result<()> {
    let mut el = BytesStart::new("like");
    el.push_attribute(("username", like.username.as_str()));
    el.push_attribute(("mutual", if like.mutual { "true" } else { "false" }));
    el.push_attribute(("timestamp", like.timestamp.as_str()));
    writer.write_event(Event::Empty(el))?;
    Ok(())
}

fn text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Answer;

    fn render(document: &ExportDocument) -> String {
        String::from_utf8(write_document(document).unwrap()).unwrap()
    }

    fn sample_question(public: bool, importance: Option<&str>) -> Question {
        Question {
            id: "7025".to_string(),
            prompt: "Scary movies?".to_string(),
            public,
            importance: importance.map(str::to_string),
            answers: vec![
                Answer {
                    text: "Yes".to_string(),
                    mine: true,
                    matched: false,
                },
                Answer {
                    text: "No".to_string(),
                    mine: false,
                    matched: true,
                },
            ],
            explanation: None,
        }
    }

    #[test]
    fn collections_appear_in_order() {
        let xml = render(&ExportDocument::default());
        let q = xml.find("<questions").unwrap();
        let m = xml.find("<messages").unwrap();
        let l = xml.find("<likes").unwrap();
        assert!(q < m && m < l);
    }

    #[test]
    fn boolean_attributes_are_omitted_when_false() {
        let document = ExportDocument {
            questions: vec![sample_question(false, None)],
            ..Default::default()
        };
        let xml = render(&document);

        assert!(!xml.contains("public="));
        assert!(!xml.contains("importance="));
        assert!(xml.contains(r#"<response mine="true">Yes</response>"#));
        assert!(xml.contains("<response>No</response>") || xml.contains(r#"<response match="true">No</response>"#));
        assert!(!xml.contains(r#"mine="false""#));
        assert!(!xml.contains(r#"match="false""#));
    }

    #[test]
    fn true_flags_and_importance_are_emitted() {
        let document = ExportDocument {
            questions: vec![sample_question(true, Some("3"))],
            ..Default::default()
        };
        let xml = render(&document);

        assert!(xml.contains(r#"importance="3""#));
        assert!(xml.contains(r#"public="true""#));
        assert!(xml.contains(r#"match="true""#));
    }

    #[test]
    fn mutual_is_always_explicit() {
        let document = ExportDocument {
            likes: vec![
                Like {
                    username: "aurora_b".to_string(),
                    mutual: true,
                    timestamp: "100".to_string(),
                },
                Like {
                    username: "kepler22".to_string(),
                    mutual: false,
                    timestamp: "200".to_string(),
                },
            ],
            ..Default::default()
        };
        let xml = render(&document);

        assert!(xml.contains(r#"mutual="true""#));
        assert!(xml.contains(r#"mutual="false""#));
    }

    #[test]
    fn absent_message_timestamp_is_omitted() {
        let document = ExportDocument {
            messages: vec![Message {
                id: "101".to_string(),
                thread_id: "42".to_string(),
                sender: "owner".to_string(),
                recipient: "pal".to_string(),
                timestamp: None,
                body: "hi".to_string(),
            }],
            ..Default::default()
        };
        let xml = render(&document);

        assert!(!xml.contains("timestamp="));
        assert!(xml.contains(r#"thread_id="42""#));
    }

    #[test]
    fn body_text_is_escaped() {
        let document = ExportDocument {
            messages: vec![Message {
                id: "101".to_string(),
                thread_id: "42".to_string(),
                sender: "owner".to_string(),
                recipient: "pal".to_string(),
                timestamp: Some(1364412847),
                body: "tea > coffee & <cake>".to_string(),
            }],
            ..Default::default()
        };
        let xml = render(&document);

        assert!(xml.contains("tea &gt; coffee &amp; &lt;cake&gt;"));
    }
}
