// src/util/testing.rs

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::env;

use anyhow::Result;
use serde_json::{json, Value};
use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::{ConnectError, NoteId};
use crate::infrastructure::transport::Transport;

/// Shared stub transport for testing everything that speaks AnkiConnect.
///
/// Responses are scripted per action as raw `{result, error}` envelopes and
/// consumed in order, so a test exercises exactly the wire conversation it
/// declares. Every call is recorded with its params for assertions about
/// what was (or was not) sent.
///
/// # Examples
///
/// ```
/// use ankipush::util::testing::{ok_envelope, StubTransport};
/// use serde_json::json;
///
/// let stub = StubTransport::builder()
///     .with_envelope("version", ok_envelope(json!(6)))
///     .with_transport_failure("addNote", "connection refused")
///     .build();
/// ```
pub struct StubTransport {
    envelopes: RefCell<HashMap<String, VecDeque<Result<Value, ConnectError>>>>,
    calls: RefCell<Vec<RecordedCall>>,
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub action: String,
    pub params: Value,
}

impl StubTransport {
    pub fn builder() -> StubTransportBuilder {
        StubTransportBuilder::new()
    }

    /// All calls made so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }

    /// How often `action` was invoked.
    pub fn calls_for(&self, action: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.action == action)
            .count()
    }

    /// Params of every invocation of `action`, in order.
    pub fn params_for(&self, action: &str) -> Vec<Value> {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.action == action)
            .map(|call| call.params.clone())
            .collect()
    }
}

impl Transport for StubTransport {
    fn call(&self, action: &str, params: Value) -> Result<Value, ConnectError> {
        self.calls.borrow_mut().push(RecordedCall {
            action: action.to_string(),
            params,
        });
        match self
            .envelopes
            .borrow_mut()
            .get_mut(action)
            .and_then(|queue| queue.pop_front())
        {
            Some(response) => response,
            None => Err(ConnectError::Transport(format!(
                "no scripted response for action '{}'",
                action
            ))),
        }
    }
}

/// Builder for StubTransport
///
/// Provides a fluent interface for scripting the wire conversation.
pub struct StubTransportBuilder {
    envelopes: HashMap<String, VecDeque<Result<Value, ConnectError>>>,
}

impl StubTransportBuilder {
    pub fn new() -> Self {
        Self {
            envelopes: HashMap::new(),
        }
    }

    /// Queue a raw response envelope for the next invocation of `action`.
    pub fn with_envelope(mut self, action: &str, envelope: Value) -> Self {
        self.envelopes
            .entry(action.to_string())
            .or_default()
            .push_back(Ok(envelope));
        self
    }

    /// Queue a transport-level failure for the next invocation of `action`.
    pub fn with_transport_failure(mut self, action: &str, message: &str) -> Self {
        self.envelopes
            .entry(action.to_string())
            .or_default()
            .push_back(Err(ConnectError::Transport(message.to_string())));
        self
    }

    pub fn build(self) -> StubTransport {
        StubTransport {
            envelopes: RefCell::new(self.envelopes),
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl Default for StubTransportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Envelope with a successful result.
pub fn ok_envelope(result: Value) -> Value {
    json!({ "result": result, "error": null })
}

/// Envelope carrying an API error message.
pub fn error_envelope(message: &str) -> Value {
    json!({ "result": null, "error": message })
}

/// One notes-info entry as AnkiConnect renders it for a Basic note.
pub fn note_info_record(id: NoteId, front: &str, back: &str, mod_time: i64) -> Value {
    json!({
        "noteId": id,
        "modelName": "Basic",
        "fields": {
            "Front": { "value": front, "order": 0 },
            "Back": { "value": back, "order": 1 },
        },
        "mod": mod_time,
        "tags": [],
    })
}

pub fn init_test_setup() -> Result<()> {
    // Set up logging first
    setup_test_logging();

    info!("Test Setup complete");
    Ok(())
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "trace");
    }

    // Create a filter for noisy modules
    let noisy_modules = ["reqwest", "hyper", "mio", "want"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    // Set up the subscriber with environment filter
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    // Build and set the subscriber
    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[ctor::ctor]
    fn init() {
        init_test_setup().expect("Failed to initialize test setup");
    }

    #[test]
    fn given_scripted_envelope_when_calling_then_returns_it_verbatim() {
        let stub = StubTransport::builder()
            .with_envelope("version", ok_envelope(json!(6)))
            .build();

        let envelope = stub.call("version", json!({})).expect("scripted");

        assert_eq!(envelope, json!({ "result": 6, "error": null }));
    }

    #[test]
    fn given_queued_envelopes_when_calling_twice_then_consumed_in_order() {
        let stub = StubTransport::builder()
            .with_envelope("findNotes", ok_envelope(json!([1])))
            .with_envelope("findNotes", ok_envelope(json!([2, 3])))
            .build();

        let first = stub.call("findNotes", json!({})).expect("first");
        let second = stub.call("findNotes", json!({})).expect("second");

        assert_eq!(first["result"], json!([1]));
        assert_eq!(second["result"], json!([2, 3]));
    }

    #[test]
    fn given_no_script_when_calling_then_transport_error() {
        let stub = StubTransport::builder().build();

        let result = stub.call("deckNames", json!({}));

        assert!(matches!(result, Err(ConnectError::Transport(_))));
    }

    #[test]
    fn given_scripted_failure_when_calling_then_returns_it() {
        let stub = StubTransport::builder()
            .with_transport_failure("addNote", "connection refused")
            .build();

        let result = stub.call("addNote", json!({}));

        assert_eq!(
            result,
            Err(ConnectError::Transport("connection refused".to_string()))
        );
    }

    #[test]
    fn given_calls_when_inspecting_then_actions_and_params_are_recorded() {
        let stub = StubTransport::builder()
            .with_envelope("deleteNotes", ok_envelope(Value::Null))
            .build();

        let _ = stub.call("deleteNotes", json!({ "notes": [7, 8] }));

        assert_eq!(stub.calls_for("deleteNotes"), 1);
        assert_eq!(stub.calls_for("addNote"), 0);
        assert_eq!(
            stub.params_for("deleteNotes"),
            vec![json!({ "notes": [7, 8] })]
        );
        assert_eq!(stub.calls()[0].action, "deleteNotes");
    }

    #[test]
    fn given_record_helper_when_deserializing_then_matches_note_record_schema() {
        let value = note_info_record(123, "Q", "A", 1700000000);

        let record: crate::domain::NoteRecord =
            serde_json::from_value(value).expect("schema must line up");

        assert_eq!(record.note_id, Some(123));
        assert_eq!(record.field_value("Front"), "Q");
        assert_eq!(record.mod_time, 1700000000);
    }
}
