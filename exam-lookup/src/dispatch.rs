//! Query dispatch: turn one incoming message into renderable payloads

use exam_common::digits::translate_digits;
use serde::Serialize;
use tracing::{debug, error};

use crate::error::LookupError;
use crate::render::{render_document, render_text};
use crate::search::SearchResult;
use crate::service::{Batch, LookupService};
use crate::vocab;

/// Command that continues the last name search
pub const MORE_COMMAND: &str = "/more";

/// One message sent back to the requester
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    Text {
        text: String,
    },
    Document {
        file_name: String,
        content_type: String,
        content: String,
    },
}

impl Payload {
    pub fn text(text: impl Into<String>) -> Self {
        Payload::Text { text: text.into() }
    }
}

/// Ordered payloads answering one query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub messages: Vec<Payload>,
}

impl Reply {
    fn single(text: impl Into<String>) -> Self {
        Self {
            messages: vec![Payload::text(text)],
        }
    }
}

/// What a query text asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Identifier,
    Name,
}

/// Identifier when the text has a digit (any script) and no letters
pub fn classify(text: &str) -> QueryKind {
    let translated = translate_digits(text);
    let has_digit = translated.chars().any(|c| c.is_ascii_digit());
    let has_letter = translated.chars().any(char::is_alphabetic);
    if has_digit && !has_letter {
        QueryKind::Identifier
    } else {
        QueryKind::Name
    }
}

/// Answer one message from `requester_id`
pub async fn handle_query(service: &LookupService, requester_id: &str, raw_text: &str) -> Reply {
    let text = raw_text.trim();
    if text.is_empty() {
        return Reply::single(vocab::EMPTY_QUERY);
    }
    if text == MORE_COMMAND {
        return handle_more(service, requester_id).await;
    }

    service.record_query(requester_id);

    match classify(text) {
        QueryKind::Identifier => {
            debug!("Identifier query from {}: {}", requester_id, text);
            match service.search_by_identifier(text).await {
                Ok(result) => Reply {
                    messages: result_payloads(service, &result),
                },
                Err(e) => failure(&e),
            }
        }
        QueryKind::Name => {
            debug!("Name query from {}: {}", requester_id, text);
            match service
                .get_next_batch(requester_id, text, service.batch_size())
                .await
            {
                Ok(batch) => batch_reply(service, batch),
                Err(LookupError::NotFound(_)) => Reply::single(vocab::NAME_NOT_FOUND),
                Err(e) => failure(&e),
            }
        }
    }
}

/// Continue the requester's last name search
pub async fn handle_more(service: &LookupService, requester_id: &str) -> Reply {
    service.record_query(requester_id);
    match service.more_results(requester_id).await {
        Some(batch) => batch_reply(service, batch),
        None => Reply::single(vocab::NOTHING_TO_CONTINUE),
    }
}

fn batch_reply(service: &LookupService, batch: Batch) -> Reply {
    if batch.results.is_empty() {
        return Reply::single(vocab::NO_MORE_RESULTS);
    }

    let mut messages = Vec::with_capacity(batch.results.len() * 2 + 1);
    if batch.is_first {
        messages.push(Payload::text(vocab::matches_found(
            batch.total,
            batch.results.len(),
        )));
    }
    for result in &batch.results {
        messages.extend(result_payloads(service, result));
    }
    Reply { messages }
}

fn result_payloads(service: &LookupService, result: &SearchResult) -> Vec<Payload> {
    let text = render_text(&result.record, &result.cohort, service.render_settings());
    let document = render_document(&result.record, &result.cohort);
    vec![
        Payload::text(text),
        Payload::Document {
            file_name: document.file_name,
            content_type: document.content_type,
            content: document.body,
        },
    ]
}

fn failure(e: &LookupError) -> Reply {
    if matches!(e, LookupError::Io(_) | LookupError::NoCohorts) {
        error!("Query failed: {}", e);
    } else {
        debug!("Query failed: {}", e);
    }
    Reply::single(e.user_message())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert_eq!(classify("51234"), QueryKind::Identifier);
        assert_eq!(classify("٠٥١٢٣٤"), QueryKind::Identifier);
        assert_eq!(classify("51 234"), QueryKind::Identifier);
        assert_eq!(classify("Ahmad"), QueryKind::Name);
        assert_eq!(classify("احمد"), QueryKind::Name);
        assert_eq!(classify("Ahmad 2"), QueryKind::Name);
        assert_eq!(classify("--"), QueryKind::Name);
    }

    #[test]
    fn test_payload_serialization() {
        let json = serde_json::to_value(Payload::text("hi")).unwrap();
        assert_eq!(json["kind"], "text");
        assert_eq!(json["text"], "hi");

        let json = serde_json::to_value(Payload::Document {
            file_name: "result_51.html".into(),
            content_type: "text/html".into(),
            content: "<html/>".into(),
        })
        .unwrap();
        assert_eq!(json["kind"], "document");
        assert_eq!(json["file_name"], "result_51.html");
    }
}
