//! The normalized per-file intermediate representation the templates render.
//!
//! A [`FileData`] is built once per schema file and target language and never
//! changes afterwards. Cross-entity links are plain type names, resolved by
//! the target compiler, not by this crate.

use kalam_schema::{
    EnumDescriptor, FileDescriptor, MessageDescriptor, MethodDescriptor, ServiceDescriptor,
};
use serde::Serialize;

use crate::{
    language::Language,
    naming::{lower_camel, lower_first, upper_first},
    type_map::TypeTable,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileData {
    /// Path of the schema file as given by the descriptor graph.
    pub file_name: String,
    /// `file_name` without its extension.
    pub base_name: String,
    pub package:   String,
    pub enums:     Vec<Enum>,
    pub messages:  Vec<Message>,
    pub services:  Vec<Service>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Enum {
    pub name:   String,
    pub values: Vec<EnumValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumValue {
    pub name:   String,
    pub number: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub name:   String,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name:          String,
    #[serde(rename = "type")]
    pub type_name:     String,
    pub number:        i32,
    pub default_value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Service {
    pub name:    String,
    /// Routing prefix, `<ServiceName>/`.
    pub prefix:  String,
    pub methods: Vec<Method>,
}

impl Service {
    /// Full routed name of a method, e.g. `Chat/Send`.
    pub fn route(&self, method: &Method) -> String {
        format!("{}{}", self.prefix, method.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Method {
    pub name:             String,
    pub call_name:        String,
    pub input:            String,
    pub output:           String,
    pub server_streaming: bool,
}

impl FileData {
    /// A copy of this file that carries only the service at `index`. Used by
    /// per-service targets, which never emit enums or messages.
    pub fn service_projection(&self, index: usize) -> FileData {
        FileData {
            file_name: self.file_name.clone(),
            base_name: self.base_name.clone(),
            package:   self.package.clone(),
            enums:     Vec::new(),
            messages:  Vec::new(),
            services:  self.services.get(index).cloned().into_iter().collect(),
        }
    }
}

/// Strips the extension of the last path component: `pkg/thing.proto`
/// becomes `pkg/thing`. Dots in directory names are left alone.
pub fn base_name(path: &str) -> &str {
    let file_start = path.rfind('/').map(|i| i + 1).unwrap_or(0);
    match path[file_start..].rfind('.') {
        Some(dot) if dot > 0 => &path[..file_start + dot],
        _ => path,
    }
}

/// Name prefix for flat-namespace targets: `a.b` becomes `A_B_`, and an
/// empty package yields an empty prefix.
pub fn type_prefix(package: &str) -> String {
    if package.is_empty() {
        return String::new();
    }
    let segments: Vec<String> = package.split('.').map(upper_first).collect();
    format!("{}_", segments.join("_"))
}

#[tracing::instrument(skip_all, fields(file = %file.path, lang = %language))]
pub fn build_file_data(file: &FileDescriptor, language: Language) -> FileData {
    let caps = language.capabilities();

    let package = match caps.namespace_fallback {
        Some(fallback) if file.package.is_empty() => fallback.to_string(),
        _ => file.package.clone(),
    };

    let mut data = FileData {
        file_name: file.path.clone(),
        base_name: base_name(&file.path).to_string(),
        package,
        enums:     Vec::new(),
        messages:  Vec::new(),
        services:  Vec::new(),
    };

    if caps.emits_types {
        data.enums = file.enums.iter().map(build_enum).collect();
        data.messages = file.messages.iter().map(|m| build_message(m, caps.types)).collect();
    }

    // The prefix follows the referencing file's package, wherever the
    // referenced message was declared.
    let prefix = if caps.flat_namespace {
        type_prefix(&file.package)
    } else {
        String::new()
    };

    data.services = file.services.iter().map(|s| build_service(s, &prefix)).collect();
    data
}

pub fn build_enum(e: &EnumDescriptor) -> Enum {
    Enum {
        name:   e.name.clone(),
        values: e
            .values
            .iter()
            .map(|v| EnumValue { name: v.name.clone(), number: v.number })
            .collect(),
    }
}

pub fn build_message(m: &MessageDescriptor, types: &TypeTable) -> Message {
    Message {
        name:   m.name.clone(),
        fields: m
            .fields
            .iter()
            .map(|f| Field {
                name:          lower_camel(&f.name),
                type_name:     types.map_type(f),
                number:        f.number,
                default_value: types.default_value(f),
            })
            .collect(),
    }
}

pub fn build_service(s: &ServiceDescriptor, type_prefix: &str) -> Service {
    Service {
        name:    s.name.clone(),
        prefix:  format!("{}/", s.name),
        methods: s.methods.iter().map(|m| build_method(m, type_prefix)).collect(),
    }
}

fn build_method(m: &MethodDescriptor, type_prefix: &str) -> Method {
    Method {
        name:             m.name.clone(),
        call_name:        lower_first(&m.name),
        input:            format!("{}{}", type_prefix, m.input.name),
        output:           format!("{}{}", type_prefix, m.output.name),
        server_streaming: m.server_streaming,
    }
}
