/// The full set of schema files handed to one generation run, in request order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DescriptorGraph {
    pub files: Vec<FileDescriptor>,
}

impl DescriptorGraph {
    pub fn new(files: Vec<FileDescriptor>) -> Self {
        DescriptorGraph { files }
    }

    /// Files marked for generation, in input order.
    pub fn files_to_generate(&self) -> impl Iterator<Item = &FileDescriptor> {
        self.files.iter().filter(|f| f.generate)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileDescriptor {
    pub path:     String,
    pub package:  String,
    pub enums:    Vec<EnumDescriptor>,
    pub messages: Vec<MessageDescriptor>,
    pub services: Vec<ServiceDescriptor>,
    pub generate: bool,
}

impl FileDescriptor {
    /// Creates an empty file that is marked for generation.
    pub fn new(path: impl Into<String>, package: impl Into<String>) -> Self {
        FileDescriptor {
            path:     path.into(),
            package:  package.into(),
            enums:    Vec::new(),
            messages: Vec::new(),
            services: Vec::new(),
            generate: true,
        }
    }

    pub fn with_enum(mut self, e: EnumDescriptor) -> Self {
        self.enums.push(e);
        self
    }

    pub fn with_message(mut self, m: MessageDescriptor) -> Self {
        self.messages.push(m);
        self
    }

    pub fn with_service(mut self, s: ServiceDescriptor) -> Self {
        self.services.push(s);
        self
    }

    pub fn with_generate(mut self, generate: bool) -> Self {
        self.generate = generate;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDescriptor {
    pub name:   String,
    pub values: Vec<EnumValueDescriptor>,
}

impl EnumDescriptor {
    pub fn new(name: impl Into<String>, values: Vec<EnumValueDescriptor>) -> Self {
        EnumDescriptor { name: name.into(), values }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValueDescriptor {
    pub name:   String,
    pub number: i32,
}

impl EnumValueDescriptor {
    pub fn new(name: impl Into<String>, number: i32) -> Self {
        EnumValueDescriptor { name: name.into(), number }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageDescriptor {
    pub name:   String,
    pub fields: Vec<FieldDescriptor>,
}

impl MessageDescriptor {
    pub fn new(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        MessageDescriptor { name: name.into(), fields }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Singular,
    Repeated,
}

/// The shape of a field's value.
///
/// Enum and message kinds carry the resolved declaration they point at, so
/// consumers never have to look names up again. Signed variants cover the
/// zigzag and fixed-width encodings of the same width.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Bool,
    Int32,
    Int64,
    UInt32,
    UInt64,
    Float,
    Double,
    String,
    Bytes,
    Enum(EnumDescriptor),
    Message(TypeRef),
    /// A `map<K, V>` field. The synthetic entry message is folded away.
    Map {
        key:   Box<FieldKind>,
        value: Box<FieldKind>,
    },
    /// A kind the decoder did not recognise.
    Unknown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name:        String,
    pub number:      i32,
    pub kind:        FieldKind,
    pub cardinality: Cardinality,
}

impl FieldDescriptor {
    pub fn singular(name: impl Into<String>, number: i32, kind: FieldKind) -> Self {
        FieldDescriptor { name: name.into(), number, kind, cardinality: Cardinality::Singular }
    }

    pub fn repeated(name: impl Into<String>, number: i32, kind: FieldKind) -> Self {
        FieldDescriptor { name: name.into(), number, kind, cardinality: Cardinality::Repeated }
    }

    pub fn is_repeated(&self) -> bool {
        self.cardinality == Cardinality::Repeated
    }
}

impl FieldKind {
    pub fn map(key: FieldKind, value: FieldKind) -> Self {
        FieldKind::Map { key: Box::new(key), value: Box::new(value) }
    }
}

/// A by-name reference to a message declared somewhere in the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    /// Package of the file that declares the type.
    pub package: String,
    /// Short (unqualified) type name.
    pub name:    String,
}

impl TypeRef {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        TypeRef { package: package.into(), name: name.into() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDescriptor {
    pub name:    String,
    pub methods: Vec<MethodDescriptor>,
}

impl ServiceDescriptor {
    pub fn new(name: impl Into<String>, methods: Vec<MethodDescriptor>) -> Self {
        ServiceDescriptor { name: name.into(), methods }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDescriptor {
    pub name:             String,
    pub input:            TypeRef,
    pub output:           TypeRef,
    pub server_streaming: bool,
}

impl MethodDescriptor {
    pub fn new(name: impl Into<String>, input: TypeRef, output: TypeRef, server_streaming: bool) -> Self {
        MethodDescriptor { name: name.into(), input, output, server_streaming }
    }
}
