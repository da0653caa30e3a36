//! Builds a [`DescriptorGraph`] from the raw protobuf descriptors protoc hands
//! to a plugin.
//!
//! Every `type_name` in the raw descriptors is fully qualified
//! (`.pkg.Outer.Inner`). Resolution indexes every declaration of every file in
//! the request, nested ones included, then replaces each reference with the
//! declaration it names.

use std::collections::{HashMap, HashSet};

use prost::Message;
use prost_types::compiler::CodeGeneratorRequest;
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{
    DescriptorProto, EnumDescriptorProto, FieldDescriptorProto, FileDescriptorProto,
    FileDescriptorSet, MethodDescriptorProto, ServiceDescriptorProto,
};

use crate::{
    descriptor::{
        DescriptorGraph, EnumDescriptor, EnumValueDescriptor, FieldDescriptor, FieldKind,
        FileDescriptor, MessageDescriptor, MethodDescriptor, ServiceDescriptor, TypeRef,
        Cardinality,
    },
    error::SchemaError,
};

enum Declared {
    Enum(EnumDescriptor),
    Message(TypeRef),
    /// Synthetic `map<K, V>` entry, fields `key = 1` and `value = 2`.
    MapEntry(DescriptorProto),
}

struct TypeIndex {
    types: HashMap<String, Declared>,
}

impl TypeIndex {
    fn build(files: &[FileDescriptorProto]) -> Self {
        let mut types = HashMap::new();
        for file in files {
            let scope = qualified_scope(file.package());
            for e in &file.enum_type {
                index_enum(&mut types, &scope, e);
            }
            for m in &file.message_type {
                index_message(&mut types, &scope, file.package(), m);
            }
        }
        TypeIndex { types }
    }

    fn lookup(&self, type_name: &str, file: &str) -> Result<&Declared, SchemaError> {
        let key = if type_name.starts_with('.') {
            type_name.to_string()
        } else {
            format!(".{}", type_name)
        };
        self.types.get(&key).ok_or_else(|| SchemaError::UnresolvedType {
            type_name: type_name.to_string(),
            file:      file.to_string(),
        })
    }

    fn message(&self, type_name: &str, file: &str) -> Result<TypeRef, SchemaError> {
        match self.lookup(type_name, file)? {
            Declared::Message(r) => Ok(r.clone()),
            Declared::Enum(_) | Declared::MapEntry(_) => Err(SchemaError::UnresolvedType {
                type_name: type_name.to_string(),
                file:      file.to_string(),
            }),
        }
    }
}

fn qualified_scope(package: &str) -> String {
    if package.is_empty() {
        String::new()
    } else {
        format!(".{}", package)
    }
}

fn index_enum(types: &mut HashMap<String, Declared>, scope: &str, e: &EnumDescriptorProto) {
    types.insert(format!("{}.{}", scope, e.name()), Declared::Enum(convert_enum(e)));
}

fn index_message(
    types: &mut HashMap<String, Declared>,
    scope: &str,
    package: &str,
    m: &DescriptorProto,
) {
    let full_name = format!("{}.{}", scope, m.name());
    for nested in &m.nested_type {
        index_message(types, &full_name, package, nested);
    }
    for e in &m.enum_type {
        index_enum(types, &full_name, e);
    }
    let is_map_entry = m.options.as_ref().is_some_and(|o| o.map_entry());
    let declared = if is_map_entry {
        Declared::MapEntry(m.clone())
    } else {
        Declared::Message(TypeRef::new(package, m.name()))
    };
    types.insert(full_name, declared);
}

fn convert_enum(e: &EnumDescriptorProto) -> EnumDescriptor {
    EnumDescriptor::new(
        e.name(),
        e.value
            .iter()
            .map(|v| EnumValueDescriptor::new(v.name(), v.number()))
            .collect(),
    )
}

impl DescriptorGraph {
    /// Resolves a protoc plugin request. Only files listed in
    /// `file_to_generate` are marked for generation; the rest are kept so
    /// their declarations can be referenced.
    pub fn from_request(request: &CodeGeneratorRequest) -> Result<Self, SchemaError> {
        let targets: HashSet<&str> = request.file_to_generate.iter().map(String::as_str).collect();
        resolve(&request.proto_file, |path| targets.contains(path))
    }

    /// Decodes a serialized `FileDescriptorSet` (as written by
    /// `protoc --descriptor_set_out --include_imports`). An empty `generate`
    /// list marks every file in the set; naming a file the set does not
    /// contain is an error.
    pub fn from_descriptor_set(bytes: &[u8], generate: &[String]) -> Result<Self, SchemaError> {
        let set = FileDescriptorSet::decode(bytes)?;
        if let Some(missing) = generate.iter().find(|g| !set.file.iter().any(|f| f.name() == g.as_str())) {
            return Err(SchemaError::UnknownFile { file: missing.clone() });
        }
        resolve(&set.file, |path| generate.is_empty() || generate.iter().any(|g| g == path))
    }
}

/// Decodes a serialized `CodeGeneratorRequest`.
pub fn decode_request(bytes: &[u8]) -> Result<CodeGeneratorRequest, SchemaError> {
    Ok(CodeGeneratorRequest::decode(bytes)?)
}

fn resolve<F>(files: &[FileDescriptorProto], is_target: F) -> Result<DescriptorGraph, SchemaError>
where
    F: Fn(&str) -> bool,
{
    let index = TypeIndex::build(files);
    let mut resolved = Vec::with_capacity(files.len());

    for file in files {
        let path = file.name();
        let mut out = FileDescriptor::new(path, file.package()).with_generate(is_target(path));

        out.enums = file.enum_type.iter().map(convert_enum).collect();

        for m in &file.message_type {
            let fields = m
                .field
                .iter()
                .map(|f| convert_field(&index, path, f))
                .collect::<Result<Vec<_>, _>>()?;
            out.messages.push(MessageDescriptor::new(m.name(), fields));
        }

        for s in &file.service {
            out.services.push(convert_service(&index, path, s)?);
        }

        resolved.push(out);
    }

    Ok(DescriptorGraph::new(resolved))
}

fn convert_field(
    index: &TypeIndex,
    file: &str,
    f: &FieldDescriptorProto,
) -> Result<FieldDescriptor, SchemaError> {
    let kind = convert_kind(index, file, f)?;

    // protoc labels map fields repeated; the map kind already says so.
    let cardinality = if f.label() == Label::Repeated && !matches!(kind, FieldKind::Map { .. }) {
        Cardinality::Repeated
    } else {
        Cardinality::Singular
    };

    Ok(FieldDescriptor {
        name: f.name().to_string(),
        number: f.number(),
        kind,
        cardinality,
    })
}

fn convert_kind(index: &TypeIndex, file: &str, f: &FieldDescriptorProto) -> Result<FieldKind, SchemaError> {
    let raw_type = f.r#type.and_then(|raw| Type::try_from(raw).ok());
    let kind = match raw_type {
        Some(Type::Bool) => FieldKind::Bool,
        Some(Type::Int32 | Type::Sint32 | Type::Sfixed32) => FieldKind::Int32,
        Some(Type::Int64 | Type::Sint64 | Type::Sfixed64) => FieldKind::Int64,
        Some(Type::Uint32 | Type::Fixed32) => FieldKind::UInt32,
        Some(Type::Uint64 | Type::Fixed64) => FieldKind::UInt64,
        Some(Type::Float) => FieldKind::Float,
        Some(Type::Double) => FieldKind::Double,
        Some(Type::String) => FieldKind::String,
        Some(Type::Bytes) => FieldKind::Bytes,
        Some(Type::Enum) => match index.lookup(f.type_name(), file)? {
            Declared::Enum(e) => FieldKind::Enum(e.clone()),
            Declared::Message(_) | Declared::MapEntry(_) => {
                return Err(SchemaError::UnresolvedType {
                    type_name: f.type_name().to_string(),
                    file:      file.to_string(),
                })
            }
        },
        Some(Type::Message | Type::Group) => match index.lookup(f.type_name(), file)? {
            Declared::Message(r) => FieldKind::Message(r.clone()),
            Declared::MapEntry(entry) => map_kind(index, file, entry)?,
            Declared::Enum(_) => {
                return Err(SchemaError::UnresolvedType {
                    type_name: f.type_name().to_string(),
                    file:      file.to_string(),
                })
            }
        },
        None => FieldKind::Unknown,
    };
    Ok(kind)
}

fn map_kind(index: &TypeIndex, file: &str, entry: &DescriptorProto) -> Result<FieldKind, SchemaError> {
    let part = |number: i32| -> Result<FieldKind, SchemaError> {
        match entry.field.iter().find(|f| f.number() == number) {
            Some(f) => convert_kind(index, file, f),
            None => Ok(FieldKind::Unknown),
        }
    };
    Ok(FieldKind::map(part(1)?, part(2)?))
}

fn convert_service(
    index: &TypeIndex,
    file: &str,
    s: &ServiceDescriptorProto,
) -> Result<ServiceDescriptor, SchemaError> {
    let methods = s
        .method
        .iter()
        .map(|m| convert_method(index, file, m))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ServiceDescriptor::new(s.name(), methods))
}

fn convert_method(
    index: &TypeIndex,
    file: &str,
    m: &MethodDescriptorProto,
) -> Result<MethodDescriptor, SchemaError> {
    Ok(MethodDescriptor::new(
        m.name(),
        index.message(m.input_type(), file)?,
        index.message(m.output_type(), file)?,
        m.server_streaming(),
    ))
}
