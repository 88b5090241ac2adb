// src/infrastructure/connect.rs
use serde_json::{json, Value};
use tracing::{debug, info, instrument};

use crate::domain::{ConnectError, NoteId, NotePayload, NoteRecord};
use crate::infrastructure::transport::Transport;

/// Typed AnkiConnect actions over an arbitrary transport.
///
/// Each method sends one action, unwraps the `{result, error}` envelope and
/// validates the result shape for that action. A non-null `error` member
/// always becomes `ConnectError::Api`; a result that does not match the
/// action's contract does too.
pub struct AnkiConnectClient<T: Transport> {
    transport: T,
}

impl<T: Transport> AnkiConnectClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn invoke(&self, action: &str, params: Value) -> Result<Value, ConnectError> {
        let envelope = self.transport.call(action, params)?;
        unwrap_envelope(action, envelope)
    }

    /// Liveness probe. Returns the AnkiConnect API version.
    pub fn version(&self) -> Result<i64, ConnectError> {
        let result = self.invoke("version", json!({}))?;
        result.as_i64().ok_or_else(|| {
            ConnectError::Api(format!("version response is not a number: {}", result))
        })
    }

    pub fn deck_names(&self) -> Result<Vec<String>, ConnectError> {
        let result = self.invoke("deckNames", json!({}))?;
        serde_json::from_value(result)
            .map_err(|e| ConnectError::Api(format!("unexpected deckNames result: {}", e)))
    }

    pub fn create_deck(&self, name: &str) -> Result<(), ConnectError> {
        self.invoke("createDeck", json!({ "deck": name }))?;
        Ok(())
    }

    /// Create the deck when it does not exist yet. Returns whether it had
    /// to be created.
    pub fn ensure_deck(&self, name: &str) -> Result<bool, ConnectError> {
        if self.deck_names()?.iter().any(|deck| deck == name) {
            debug!(deck = name, "Deck already exists");
            return Ok(false);
        }
        info!(deck = name, "Creating missing deck");
        self.create_deck(name)?;
        Ok(true)
    }

    /// Submit one note. The returned id is what the server claims; callers
    /// that need certainty must read the note back.
    #[instrument(level = "debug", skip(self, note))]
    pub fn add_note(&self, note: &NotePayload) -> Result<NoteId, ConnectError> {
        let result = self.invoke("addNote", json!({ "note": note }))?;
        coerce_note_id(&result).ok_or_else(|| {
            ConnectError::Api(format!(
                "add-note reported no error but the missing result leaves no note id: {}",
                result
            ))
        })
    }

    #[instrument(level = "debug", skip(self))]
    pub fn notes_info(&self, ids: &[NoteId]) -> Result<Vec<NoteRecord>, ConnectError> {
        let result = self.invoke("notesInfo", json!({ "notes": ids }))?;
        serde_json::from_value(result)
            .map_err(|e| ConnectError::Api(format!("unexpected notesInfo result: {}", e)))
    }

    #[instrument(level = "debug", skip(self))]
    pub fn find_notes(&self, query: &str) -> Result<Vec<NoteId>, ConnectError> {
        let result = self.invoke("findNotes", json!({ "query": query }))?;
        serde_json::from_value(result)
            .map_err(|e| ConnectError::Api(format!("unexpected findNotes result: {}", e)))
    }

    /// Delete the given notes in one call. All-or-nothing: there is no
    /// per-id outcome on the wire.
    #[instrument(level = "debug", skip(self))]
    pub fn delete_notes(&self, ids: &[NoteId]) -> Result<(), ConnectError> {
        self.invoke("deleteNotes", json!({ "notes": ids }))?;
        Ok(())
    }

    /// Store an already base64-encoded media file under `filename`.
    #[instrument(level = "debug", skip(self, data_b64))]
    pub fn store_media_file(&self, filename: &str, data_b64: &str) -> Result<(), ConnectError> {
        self.invoke(
            "storeMediaFile",
            json!({ "filename": filename, "data": data_b64 }),
        )?;
        Ok(())
    }
}

fn unwrap_envelope(action: &str, envelope: Value) -> Result<Value, ConnectError> {
    let Value::Object(mut members) = envelope else {
        return Err(ConnectError::Api(format!(
            "{} response is not an envelope object",
            action
        )));
    };
    let error = members.remove("error").unwrap_or(Value::Null);
    if !error.is_null() {
        let message = error
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(ConnectError::Api(message));
    }
    Ok(members.remove("result").unwrap_or(Value::Null))
}

/// Note ids arrive as JSON numbers, but old plugin builds have been seen
/// sending digit strings. Anything else is not an id.
fn coerce_note_id(result: &Value) -> Option<NoteId> {
    match result {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Search query matching every note of a deck.
pub fn deck_query(deck: &str) -> String {
    format!(r#"deck:"{}""#, escape_term(deck))
}

/// Search query matching notes in `deck` whose `field` equals `text`.
pub fn field_query(deck: &str, field: &str, text: &str) -> String {
    format!(
        r#"deck:"{}" {}:"{}""#,
        escape_term(deck),
        field,
        escape_term(text)
    )
}

fn escape_term(term: &str) -> String {
    term.replace('\\', r"\\").replace('"', r#"\""#)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::util::testing::{error_envelope, ok_envelope, StubTransport};

    #[test]
    fn given_ok_envelope_when_reading_version_then_returns_number() {
        let transport = StubTransport::builder()
            .with_envelope("version", ok_envelope(json!(6)))
            .build();
        let client = AnkiConnectClient::new(transport);

        let version = client.version().expect("version should parse");

        assert_eq!(version, 6);
    }

    #[test]
    fn given_error_member_when_invoking_then_api_error_with_message() {
        let transport = StubTransport::builder()
            .with_envelope("deckNames", error_envelope("collection is not available"))
            .build();
        let client = AnkiConnectClient::new(transport);

        let result = client.deck_names();

        assert_eq!(
            result,
            Err(ConnectError::Api("collection is not available".to_string()))
        );
    }

    #[test]
    fn given_non_string_error_member_when_invoking_then_message_is_stringified() {
        let transport = StubTransport::builder()
            .with_envelope("version", json!({"result": null, "error": {"code": 17}}))
            .build();
        let client = AnkiConnectClient::new(transport);

        let err = client.version().expect_err("must fail");

        assert_eq!(err, ConnectError::Api(r#"{"code":17}"#.to_string()));
    }

    #[test]
    fn given_null_result_when_adding_note_then_missing_result_is_api_error() {
        let transport = StubTransport::builder()
            .with_envelope("addNote", ok_envelope(Value::Null))
            .build();
        let client = AnkiConnectClient::new(transport);
        let payload = sample_payload();

        let err = client.add_note(&payload).expect_err("must fail");

        match err {
            ConnectError::Api(msg) => assert!(msg.contains("missing result")),
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn given_numeric_result_when_adding_note_then_returns_id() {
        let transport = StubTransport::builder()
            .with_envelope("addNote", ok_envelope(json!(1502298033753_i64)))
            .build();
        let client = AnkiConnectClient::new(transport);

        let id = client.add_note(&sample_payload()).expect("id expected");

        assert_eq!(id, 1502298033753);
    }

    #[test]
    fn given_digit_string_result_when_adding_note_then_id_is_coerced() {
        let transport = StubTransport::builder()
            .with_envelope("addNote", ok_envelope(json!("4242")))
            .build();
        let client = AnkiConnectClient::new(transport);

        let id = client.add_note(&sample_payload()).expect("id expected");

        assert_eq!(id, 4242);
    }

    #[test]
    fn given_known_deck_when_ensuring_then_create_is_not_called() {
        let transport = StubTransport::builder()
            .with_envelope("deckNames", ok_envelope(json!(["Default", "Knowledge"])))
            .build();
        let client = AnkiConnectClient::new(transport);

        let created = client.ensure_deck("Knowledge").expect("must succeed");

        assert!(!created);
        assert_eq!(client_calls(&client, "createDeck"), 0);
    }

    #[test]
    fn given_unknown_deck_when_ensuring_then_deck_is_created() {
        let transport = StubTransport::builder()
            .with_envelope("deckNames", ok_envelope(json!(["Default"])))
            .with_envelope("createDeck", ok_envelope(json!(1700000000000_i64)))
            .build();
        let client = AnkiConnectClient::new(transport);

        let created = client.ensure_deck("Knowledge").expect("must succeed");

        assert!(created);
        assert_eq!(client_calls(&client, "createDeck"), 1);
    }

    #[test]
    fn given_non_object_body_when_invoking_then_api_error() {
        let transport = StubTransport::builder()
            .with_envelope("version", json!(6))
            .build();
        let client = AnkiConnectClient::new(transport);

        let err = client.version().expect_err("must fail");

        assert!(matches!(err, ConnectError::Api(_)));
    }

    #[test]
    fn given_deck_and_front_when_building_queries_then_terms_are_quoted_and_escaped() {
        assert_eq!(deck_query("My Deck"), r#"deck:"My Deck""#);
        assert_eq!(
            field_query("My Deck", "Front", r#"What is a "closure"?"#),
            r#"deck:"My Deck" Front:"What is a \"closure\"?""#
        );
        assert_eq!(deck_query(r"a\b"), r#"deck:"a\\b""#);
    }

    fn sample_payload() -> NotePayload {
        crate::domain::NoteBuilder::new("Knowledge", "Basic").build("Q", "A", None, None)
    }

    fn client_calls(client: &AnkiConnectClient<StubTransport>, action: &str) -> usize {
        client.transport().calls_for(action)
    }
}
