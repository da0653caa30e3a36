//! This crate holds the resolved protobuf descriptor graph that the Kalam code
//! generator consumes. The graph is built once per run, either from a protoc
//! `CodeGeneratorRequest` or from a serialized `FileDescriptorSet`, and is never
//! mutated afterwards.
//!
//! ```
//! use kalam_schema::*;
//!
//! let file = FileDescriptor::new("chat.proto", "chat")
//!     .with_message(MessageDescriptor::new("Msg", vec![
//!         FieldDescriptor::singular("text", 1, FieldKind::String),
//!     ]))
//!     .with_service(ServiceDescriptor::new("Chat", vec![
//!         MethodDescriptor::new("Send", TypeRef::new("chat", "Msg"), TypeRef::new("chat", "Msg"), false),
//!     ]));
//!
//! let graph = DescriptorGraph::new(vec![file]);
//! assert_eq!(graph.files_to_generate().count(), 1);
//! ```

pub mod descriptor;
pub mod error;
pub mod request;

pub use descriptor::*;
pub use error::SchemaError;
