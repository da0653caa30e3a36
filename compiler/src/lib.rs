//! kalam-codegen
//!
//! Turns a resolved protobuf descriptor graph into RPC client bindings:
//!  1) an intermediate representation per `.proto` file (`ir`),
//!  2) per-language capability and type tables (`language`, `type_map`),
//!  3) Kotlin, Swift and Dart templates (`templates`),
//!  4) the embedded transport runtimes (`runtime`),
//!  5) the generation pass and protoc response assembly (`driver`).

pub mod code_writer;
pub mod driver;
pub mod error;
pub mod ir;
pub mod language;
pub mod naming;
pub mod options;
pub mod runtime;
pub mod templates;
pub mod type_map;

pub use driver::{error_response, generate, to_response, GeneratedFile};
pub use error::CodegenError;
pub use language::Language;
pub use options::GeneratorOptions;
