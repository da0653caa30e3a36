//! Maps a schema field to a target type name and a default-value literal.
//!
//! Each target has one static [`TypeTable`]. Repeated fields always take the
//! table's empty-list literal, whatever the element kind.

use kalam_schema::{FieldDescriptor, FieldKind};
use tracing::warn;

#[derive(Debug)]
pub struct Scalar {
    pub name:    &'static str,
    pub default: &'static str,
}

#[derive(Debug)]
pub struct ListShape {
    pub open:  &'static str,
    pub close: &'static str,
    pub empty: &'static str,
}

#[derive(Debug)]
pub struct MapShape {
    pub open:      &'static str,
    pub separator: &'static str,
    pub close:     &'static str,
    pub empty:     &'static str,
}

#[derive(Debug)]
pub struct TypeTable {
    pub bool_:  Scalar,
    pub int32:  Scalar,
    pub int64:  Scalar,
    pub uint32: Scalar,
    pub uint64: Scalar,
    pub float:  Scalar,
    pub double: Scalar,
    pub string: Scalar,
    pub bytes:  Scalar,
    /// Fallback for kinds the table has no entry for.
    pub any:    Scalar,
    pub list:   ListShape,
    pub map:    MapShape,
    /// Appended to a message name to form its zero-argument constructor call.
    pub new_call: &'static str,
}

pub static KOTLIN_TYPES: TypeTable = TypeTable {
    bool_:  Scalar { name: "Boolean",   default: "false" },
    int32:  Scalar { name: "Int",       default: "0" },
    int64:  Scalar { name: "Long",      default: "0L" },
    uint32: Scalar { name: "UInt",      default: "0u" },
    uint64: Scalar { name: "ULong",     default: "0uL" },
    float:  Scalar { name: "Float",     default: "0f" },
    double: Scalar { name: "Double",    default: "0.0" },
    string: Scalar { name: "String",    default: "\"\"" },
    bytes:  Scalar { name: "ByteArray", default: "byteArrayOf()" },
    any:    Scalar { name: "Any",       default: "null" },
    list:   ListShape { open: "List<", close: ">", empty: "emptyList()" },
    map:    MapShape { open: "Map<", separator: ", ", close: ">", empty: "emptyMap()" },
    new_call: "()",
};

pub static SWIFT_TYPES: TypeTable = TypeTable {
    bool_:  Scalar { name: "Bool",   default: "false" },
    int32:  Scalar { name: "Int32",  default: "0" },
    int64:  Scalar { name: "Int64",  default: "0" },
    uint32: Scalar { name: "UInt32", default: "0" },
    uint64: Scalar { name: "UInt64", default: "0" },
    float:  Scalar { name: "Float",  default: "0" },
    double: Scalar { name: "Double", default: "0" },
    string: Scalar { name: "String", default: "\"\"" },
    bytes:  Scalar { name: "Data",   default: "Data()" },
    any:    Scalar { name: "Any",    default: "nil" },
    list:   ListShape { open: "[", close: "]", empty: "[]" },
    map:    MapShape { open: "[", separator: ": ", close: "]", empty: "[:]" },
    new_call: "()",
};

pub static DART_TYPES: TypeTable = TypeTable {
    bool_:  Scalar { name: "bool",      default: "false" },
    int32:  Scalar { name: "int",       default: "0" },
    int64:  Scalar { name: "Int64",     default: "Int64.ZERO" },
    uint32: Scalar { name: "int",       default: "0" },
    uint64: Scalar { name: "Int64",     default: "Int64.ZERO" },
    float:  Scalar { name: "double",    default: "0.0" },
    double: Scalar { name: "double",    default: "0.0" },
    string: Scalar { name: "String",    default: "''" },
    bytes:  Scalar { name: "List<int>", default: "<int>[]" },
    any:    Scalar { name: "dynamic",   default: "null" },
    list:   ListShape { open: "List<", close: ">", empty: "const []" },
    map:    MapShape { open: "Map<", separator: ", ", close: ">", empty: "const {}" },
    new_call: "()",
};

impl TypeTable {
    fn scalar(&self, kind: &FieldKind) -> Option<&Scalar> {
        match kind {
            FieldKind::Bool => Some(&self.bool_),
            FieldKind::Int32 => Some(&self.int32),
            FieldKind::Int64 => Some(&self.int64),
            FieldKind::UInt32 => Some(&self.uint32),
            FieldKind::UInt64 => Some(&self.uint64),
            FieldKind::Float => Some(&self.float),
            FieldKind::Double => Some(&self.double),
            FieldKind::String => Some(&self.string),
            FieldKind::Bytes => Some(&self.bytes),
            FieldKind::Enum(_) | FieldKind::Message(_) | FieldKind::Map { .. } => None,
            FieldKind::Unknown => Some(&self.any),
        }
    }

    /// Type of a single element, ignoring cardinality.
    pub fn scalar_type(&self, kind: &FieldKind) -> String {
        match kind {
            FieldKind::Enum(e) => e.name.clone(),
            FieldKind::Message(m) => m.name.clone(),
            FieldKind::Map { key, value } => format!(
                "{}{}{}{}{}",
                self.map.open,
                self.scalar_type(key),
                self.map.separator,
                self.scalar_type(value),
                self.map.close
            ),
            other => self.scalar(other).map(|s| s.name).unwrap_or(self.any.name).to_string(),
        }
    }

    pub fn map_type(&self, field: &FieldDescriptor) -> String {
        let element = self.scalar_type(&field.kind);
        if field.is_repeated() {
            format!("{}{}{}", self.list.open, element, self.list.close)
        } else {
            element
        }
    }

    pub fn default_value(&self, field: &FieldDescriptor) -> String {
        if field.is_repeated() {
            return self.list.empty.to_string();
        }
        match &field.kind {
            FieldKind::Enum(e) => match e.values.first() {
                Some(first) => format!("{}.{}", e.name, first.name),
                None => {
                    warn!(field = %field.name, enum_name = %e.name, "enum has no values, defaulting to UNKNOWN");
                    format!("{}.UNKNOWN", e.name)
                }
            },
            FieldKind::Message(m) => format!("{}{}", m.name, self.new_call),
            FieldKind::Map { .. } => self.map.empty.to_string(),
            FieldKind::Unknown => {
                warn!(field = %field.name, "unknown field kind, mapping to the catch-all type");
                self.any.default.to_string()
            }
            other => self.scalar(other).map(|s| s.default).unwrap_or(self.any.default).to_string(),
        }
    }
}
