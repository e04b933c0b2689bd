//! Stub record model.
//!
//! Defines the persisted stub shape: the expected request, the canned
//! response or forwarding target, and the canonical JSON content carried
//! by all of them.

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use tracing::error;

/// Canonical, whitespace-compacted JSON text.
///
/// An unset value stands for the empty object: it reads and writes as `{}`,
/// and matches as an object with no fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonString(String);

impl JsonString {
    /// Compact raw JSON text into canonical form.
    ///
    /// Malformed input does not fail the caller: it is reported and yields
    /// the unset value, so downstream matching sees an object with no
    /// fields.
    pub fn canonicalize(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return Self::default();
        }
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => Self::from_value(&value),
            Err(err) => {
                error!(%err, content = raw, "error compacting json");
                Self::default()
            }
        }
    }

    fn from_value(value: &Value) -> Self {
        if value.is_null() {
            return Self::default();
        }
        // serde_json::to_string emits no insignificant whitespace
        Self(serde_json::to_string(value).unwrap_or_default())
    }

    /// Canonical text; `{}` when unset, so the result is always parseable.
    pub fn as_str(&self) -> &str {
        if self.0.is_empty() {
            "{}"
        } else {
            &self.0
        }
    }

    /// Whether the value was never set (or held malformed text).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decode to an object map for matching.
    ///
    /// Unset values and non-object roots both decode to the empty map.
    pub(crate) fn as_object(&self) -> serde_json::Map<String, Value> {
        match serde_json::from_str::<Value>(self.as_str()) {
            Ok(Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        }
    }

    /// Partial match: every field of `self` must appear in `actual` with an
    /// equal value; extra fields in `actual` are ignored.
    pub fn matches(&self, actual: &JsonString) -> bool {
        crate::matcher::matches(&self.as_object(), &actual.as_object())
    }

    /// Exact match: as [`matches`](Self::matches), plus `actual` must carry
    /// no fields beyond the expected ones at any object level.
    pub fn equals(&self, actual: &JsonString) -> bool {
        crate::matcher::equals(&self.as_object(), &actual.as_object())
    }
}

impl fmt::Display for JsonString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Value> for JsonString {
    fn from(value: Value) -> Self {
        Self::from_value(&value)
    }
}

impl Serialize for JsonString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value: Value = serde_json::from_str(self.as_str()).map_err(serde::ser::Error::custom)?;
        value.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for JsonString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

/// Stub behavior tag: serve a canned response or forward to a live server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StubType {
    /// Serve the configured response
    #[default]
    Mock,
    /// Proxy the request to the configured server address
    Forward,
}

impl<'de> Deserialize<'de> for StubType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // null and "" decode to mock so that records written before the
        // forward variant existed keep working
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref() {
            None | Some("") | Some("mock") => Ok(StubType::Mock),
            Some("forward") => Ok(StubType::Forward),
            Some(other) => Err(de::Error::unknown_variant(other, &["mock", "forward"])),
        }
    }
}

/// Discipline used to compare expected and actual request content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Expected and actual must agree on every field, with no extras
    Exact,
    /// Actual may carry fields beyond the expected ones
    #[default]
    Partial,
}

/// Whether a mock stub answers with a payload or a gRPC error status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    #[default]
    Success,
    Error,
}

/// One mock/forward rule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stub {
    /// Fully qualified RPC method, e.g. `/helloworld.Greeter/SayHello`
    #[serde(default)]
    pub full_method: String,

    /// mock | forward
    #[serde(rename = "type", default)]
    pub stub_type: StubType,

    /// Expected request shape, always required
    #[serde(default)]
    pub request: Option<StubRequest>,

    /// Canned response, required when the type is mock, ignored otherwise
    #[serde(default)]
    pub response: Option<StubResponse>,

    /// Forward target, required when the type is forward, ignored otherwise
    #[serde(default)]
    pub forward: Option<StubForward>,
}

impl Stub {
    /// Collect human-readable validation errors for this record.
    ///
    /// An empty result means the record is well formed. This only explains;
    /// whether to reject the record is the caller's call.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.full_method.is_empty() {
            errors.push("fullMethod is required".to_string());
        }
        if self.request.is_none() {
            errors.push("request is required".to_string());
        }
        match self.stub_type {
            StubType::Mock if self.response.is_none() => {
                errors.push("response is required when type is mock".to_string());
            }
            StubType::Forward if self.forward.is_none() => {
                errors.push("forward is required when type is forward".to_string());
            }
            _ => {}
        }
        errors
    }

    /// A fully populated record to show alongside validation errors.
    pub fn example() -> Self {
        Stub {
            full_method: "/helloworld.Greeter/SayHello".to_string(),
            stub_type: StubType::Mock,
            request: Some(StubRequest {
                match_mode: MatchMode::Partial,
                content: JsonString::canonicalize(r#"{"name": "world"}"#),
                metadata: HashMap::from([(
                    "authorization".to_string(),
                    vec!["Bearer token".to_string()],
                )]),
            }),
            response: Some(StubResponse {
                response_type: ResponseType::Success,
                content: JsonString::canonicalize(r#"{"message": "hello, world"}"#),
                error: Some(ErrorResponse {
                    code: 3,
                    message: "name must not be empty".to_string(),
                    details: Some(ErrorDetails {
                        spec: Some(ErrorDetailsSpec {
                            import: "google/rpc/error_details.proto".to_string(),
                            kind: "google.rpc.BadRequest".to_string(),
                        }),
                        values: vec![ErrorDetailsValue {
                            spec_override: None,
                            value: JsonString::canonicalize(r#"{"field": "name"}"#),
                        }],
                    }),
                }),
            }),
            forward: Some(StubForward {
                server_address: "localhost:4770".to_string(),
                record: false,
            }),
        }
    }
}

/// Expected request shape for a stub.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StubRequest {
    /// exact | partial
    #[serde(rename = "match", default)]
    pub match_mode: MatchMode,

    /// Expected request payload
    #[serde(default)]
    pub content: JsonString,

    /// Expected header values. Recorded for the transport layer; content
    /// matching does not consult it.
    #[serde(default)]
    pub metadata: HashMap<String, Vec<String>>,
}

impl fmt::Display for StubRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(text) => f.write_str(&text),
            Err(_) => Err(fmt::Error),
        }
    }
}

/// Canned response for a mock stub.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StubResponse {
    /// success | error
    #[serde(rename = "type", default)]
    pub response_type: ResponseType,

    /// Response payload, used when the type is success
    #[serde(default)]
    pub content: JsonString,

    /// Status returned to the caller when the type is error
    #[serde(default)]
    pub error: Option<ErrorResponse>,
}

/// Forwarding target for a forward stub.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StubForward {
    /// Address of the live server, host:port
    pub server_address: String,

    /// Record the forwarded exchange
    #[serde(default)]
    pub record: bool,
}

/// gRPC status carried by an error response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// gRPC status code
    #[serde(default)]
    pub code: u32,

    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub details: Option<ErrorDetails>,
}

/// Structured error details together with their schema specification.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Schema shared by every value, unless overridden per value
    #[serde(default)]
    pub spec: Option<ErrorDetailsSpec>,

    #[serde(default)]
    pub values: Vec<ErrorDetailsValue>,
}

/// One error detail value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetailsValue {
    /// Replaces the parent spec for this value when set
    #[serde(default)]
    pub spec_override: Option<ErrorDetailsSpec>,

    #[serde(default)]
    pub value: JsonString,
}

/// Import/type pair identifying a concrete error-detail schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorDetailsSpec {
    /// Proto file the type is imported from
    #[serde(default)]
    pub import: String,

    /// Fully qualified message type
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Explains why a submitted stub record failed validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvalidStubResponse {
    /// Human-readable problems with the submitted record
    pub errors: Vec<String>,

    /// A well-formed record for comparison
    pub example: Stub,
}

impl InvalidStubResponse {
    /// Build a report for `stub`, or `None` when the record is well formed.
    pub fn for_stub(stub: &Stub) -> Option<Self> {
        let errors = stub.validate();
        if errors.is_empty() {
            None
        } else {
            Some(Self {
                errors,
                example: Stub::example(),
            })
        }
    }
}
