//! One template per target language.
//!
//! A template turns a [`FileData`] into the text of one generated file. Before
//! anything is written, every identifier the template will declare or
//! reference is checked, so a bad name fails the run instead of producing
//! source the target compiler rejects.

mod dart;
mod kotlin;
mod swift;

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

use crate::{code_writer::CodeWriter, error::CodegenError, ir::FileData, language::Language};

pub use dart::DartTemplate;
pub use kotlin::KotlinTemplate;
pub use swift::SwiftTemplate;

lazy_static! {
    static ref IDENTIFIER: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

pub const GENERATED_HEADER: &str = "Code generated by protoc-gen-kalam. DO NOT EDIT.";

pub trait Template: Sync {
    fn render(&self, data: &FileData) -> Result<String, CodegenError>;
}

static KOTLIN: KotlinTemplate = KotlinTemplate;
static SWIFT: SwiftTemplate = SwiftTemplate;
static DART: DartTemplate = DartTemplate;

pub fn template_for(language: Language) -> &'static dyn Template {
    match language {
        Language::Kotlin => &KOTLIN,
        Language::Swift => &SWIFT,
        Language::Dart => &DART,
    }
}

pub fn is_identifier(s: &str) -> bool {
    IDENTIFIER.is_match(s)
}

/// Fails with [`CodegenError::Render`] on the first name that is not a plain
/// identifier. Field types are skipped: they are built from checked names
/// plus the type table's own syntax.
pub fn check_identifiers(data: &FileData) -> Result<(), CodegenError> {
    let bad = |service: Option<&str>, what: &str, name: &str| {
        CodegenError::render(&data.file_name, service, format!("{} {:?} is not a valid identifier", what, name))
    };

    if !data.package.is_empty() {
        for segment in data.package.split('.') {
            if !is_identifier(segment) {
                return Err(bad(None, "package segment", segment));
            }
        }
    }
    for e in &data.enums {
        if !is_identifier(&e.name) {
            return Err(bad(None, "enum", &e.name));
        }
        if let Some(v) = e.values.iter().find(|v| !is_identifier(&v.name)) {
            return Err(bad(None, "enum value", &v.name));
        }
    }
    for m in &data.messages {
        if !is_identifier(&m.name) {
            return Err(bad(None, "message", &m.name));
        }
        if let Some(f) = m.fields.iter().find(|f| !is_identifier(&f.name)) {
            return Err(bad(None, "field", &f.name));
        }
    }
    for s in &data.services {
        if !is_identifier(&s.name) {
            return Err(bad(Some(s.name.as_str()), "service", &s.name));
        }
        for m in &s.methods {
            for (what, name) in [("method", &m.name), ("input type", &m.input), ("output type", &m.output)] {
                if !is_identifier(name) {
                    return Err(bad(Some(s.name.as_str()), what, name));
                }
            }
        }
    }
    Ok(())
}

/// Runs `body` against a fresh writer after checking identifiers. Formatting
/// errors become render errors for the file.
pub(crate) fn render_with<F>(data: &FileData, indent: usize, body: F) -> Result<String, CodegenError>
where
    F: FnOnce(&mut CodeWriter<&mut String>, &FileData) -> fmt::Result,
{
    check_identifiers(data)?;

    let mut out = String::new();
    {
        let mut w = CodeWriter::with_indent_spaces(&mut out, indent);
        body(&mut w, data)
            .map_err(|_| CodegenError::render(&data.file_name, None, "formatting generated source failed"))?;
    }
    Ok(out)
}

pub(crate) fn write_header(w: &mut CodeWriter<&mut String>, data: &FileData) -> fmt::Result {
    w.comment("//", GENERATED_HEADER)?;
    w.comment("//", &format!("source: {}", data.file_name))?;
    w.blank_line()
}

/// Backtick-quotes `name` when it collides with a reserved word.
pub(crate) fn backtick_keyword(name: &str, keywords: &[&str]) -> String {
    if keywords.contains(&name) {
        format!("`{}`", name)
    } else {
        name.to_string()
    }
}
