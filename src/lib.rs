//! gRPC Mock Server
//!
//! A stub engine for mocking gRPC services: stub records declare the shape
//! of an expected request and either a canned response or a forwarding
//! target, and incoming payloads are compared against those expectations
//! with a structural JSON matcher.
//!
//! # Features
//!
//! - **Structural Matching**: partial (subset) or exact comparison of JSON
//!   payloads, recursive over nested objects, unordered over arrays
//! - **Canonical Content**: stored content is whitespace-compacted JSON;
//!   unset content always reads and writes as `{}`
//! - **Forwarding Rules**: a stub may point at a live backend instead of a
//!   canned response
//! - **Validation Reports**: malformed records are explained with error
//!   strings plus a well-formed example
//! - **Registry**: ordered, method-keyed stub collection with JSON/YAML
//!   file loading
//!
//! # Example Stub
//!
//! ```json
//! {
//!   "fullMethod": "/helloworld.Greeter/SayHello",
//!   "type": "mock",
//!   "request": {
//!     "match": "partial",
//!     "content": {"name": "world"}
//!   },
//!   "response": {
//!     "type": "success",
//!     "content": {"message": "hello, world"}
//!   }
//! }
//! ```

pub mod matcher;
pub mod registry;
pub mod stub;

pub use registry::{RegistryError, StubRegistry};
pub use stub::{InvalidStubResponse, JsonString, Stub};
