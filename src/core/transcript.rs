//! Ordered, append-only conversation history.

use crate::api::ChatMessage;
use crate::core::constants::GREETING;
use crate::core::message::Message;

/// The conversation shown to the user.
///
/// Insertion order is display order. The transcript is never empty: it is
/// created holding the bot greeting, and entries are only ever appended.
#[derive(Debug, Clone)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::with_greeting(GREETING)
    }

    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::bot(greeting)],
        }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn bot_message_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_bot()).count()
    }

    /// Build the request context: every user-authored entry, in order.
    /// Bot entries are not forwarded.
    pub fn outbound_messages(&self) -> Vec<ChatMessage> {
        self.messages
            .iter()
            .filter_map(|message| {
                message
                    .sender()
                    .to_api_role()
                    .map(|role| ChatMessage::new(role, message.text()))
            })
            .collect()
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_transcript_holds_the_greeting() {
        let transcript = Transcript::new();
        assert_eq!(transcript.len(), 1);
        let first = transcript.last().expect("greeting");
        assert!(first.is_bot());
        assert_eq!(first.text(), GREETING);
    }

    #[test]
    fn outbound_messages_skip_bot_entries() {
        let mut transcript = Transcript::with_greeting("Hi");
        transcript.push(Message::user("first"));
        transcript.push(Message::bot("reply"));
        transcript.push(Message::user("second"));

        let outbound = transcript.outbound_messages();
        let contents: Vec<&str> = outbound.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second"]);
        assert!(outbound.iter().all(|m| m.role == "user"));
    }

    #[test]
    fn iteration_preserves_insertion_order() {
        let mut transcript = Transcript::with_greeting("Hi");
        transcript.push(Message::user("a"));
        transcript.push(Message::bot("b"));

        let texts: Vec<&str> = transcript.iter().map(Message::text).collect();
        assert_eq!(texts, vec!["Hi", "a", "b"]);
        assert_eq!(transcript.bot_message_count(), 2);
    }
}
