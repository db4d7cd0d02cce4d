//! Domain records collected during a run. Every value is built once by
//! an extractor and never mutated afterwards.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
    pub mine: bool,
    /// Serialized as the `match` attribute.
    pub matched: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// Numeric site id, kept as a string to avoid precision loss.
    pub id: String,
    pub prompt: String,
    pub public: bool,
    /// Value of the checked importance level, if any is checked.
    pub importance: Option<String>,
    pub answers: Vec<Answer>,
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    /// Lookup key into the conversation the message belongs to.
    pub thread_id: String,
    pub sender: String,
    pub recipient: String,
    /// Epoch seconds scraped from the page; None when unparsable.
    pub timestamp: Option<i64>,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Like {
    pub username: String,
    pub mutual: bool,
    /// Raw event-time attribute, carried verbatim.
    pub timestamp: String,
}

/// One run's worth of collected data, serialized once at the end.
#[derive(Debug, Default)]
pub struct ExportDocument {
    pub questions: Vec<Question>,
    pub messages: Vec<Message>,
    pub likes: Vec<Like>,
}
