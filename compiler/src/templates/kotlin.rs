//! Kotlin target: kotlinx-serialization data classes and enums, plus a client
//! object, handler interface and router per service.

use std::fmt;

use super::{backtick_keyword, render_with, write_header, Template};
use crate::{
    code_writer::CodeWriter,
    cw_writeln,
    error::CodegenError,
    ir::{Enum, FileData, Message, Method, Service},
};

const KEYWORDS: &[&str] = &[
    "as", "break", "class", "continue", "do", "else", "false", "for", "fun", "if", "in",
    "interface", "is", "null", "object", "package", "return", "super", "this", "throw",
    "true", "try", "typealias", "typeof", "val", "var", "when", "while",
];

pub struct KotlinTemplate;

impl Template for KotlinTemplate {
    fn render(&self, data: &FileData) -> Result<String, CodegenError> {
        render_with(data, 4, write_file)
    }
}

type Writer<'a> = CodeWriter<&'a mut String>;

fn write_file(w: &mut Writer<'_>, data: &FileData) -> fmt::Result {
    write_header(w, data)?;
    cw_writeln!(w, "package {}", data.package)?;
    w.blank_line()?;
    write_imports(w, data)?;

    for e in &data.enums {
        w.blank_line()?;
        write_enum(w, e)?;
    }
    for m in &data.messages {
        w.blank_line()?;
        write_message(w, m)?;
    }
    for s in &data.services {
        w.blank_line()?;
        write_client(w, s)?;
        w.blank_line()?;
        write_handler(w, s)?;
        w.blank_line()?;
        write_router(w, s)?;
    }
    Ok(())
}

fn write_imports(w: &mut Writer<'_>, data: &FileData) -> fmt::Result {
    let has_services = !data.services.is_empty();
    let has_streams = data.services.iter().flat_map(|s| &s.methods).any(|m| m.server_streaming);

    let mut imports = Vec::new();
    if has_services {
        imports.extend(["com.kalam.Kalam", "com.kalam.ResponseSink", "com.kalam.ServiceRouter"]);
    }
    if has_streams {
        imports.extend(["kotlinx.coroutines.flow.Flow", "kotlinx.coroutines.flow.map"]);
    }
    imports.extend([
        "kotlinx.serialization.ExperimentalSerializationApi",
        "kotlinx.serialization.Serializable",
    ]);
    if has_services {
        imports.extend([
            "kotlinx.serialization.decodeFromByteArray",
            "kotlinx.serialization.encodeToByteArray",
            "kotlinx.serialization.protobuf.ProtoBuf",
        ]);
    }
    imports.push("kotlinx.serialization.protobuf.ProtoNumber");

    for import in imports {
        cw_writeln!(w, "import {}", import)?;
    }
    Ok(())
}

fn write_enum(w: &mut Writer<'_>, e: &Enum) -> fmt::Result {
    w.writeln("@OptIn(ExperimentalSerializationApi::class)")?;
    w.writeln("@Serializable")?;
    w.block(&format!("enum class {}", e.name), |w| {
        for v in &e.values {
            cw_writeln!(w, "@ProtoNumber({}) {},", v.number, backtick_keyword(&v.name, KEYWORDS))?;
        }
        Ok(())
    })
}

fn write_message(w: &mut Writer<'_>, m: &Message) -> fmt::Result {
    w.writeln("@OptIn(ExperimentalSerializationApi::class)")?;
    w.writeln("@Serializable")?;
    if m.fields.is_empty() {
        // Data classes need at least one constructor parameter.
        return cw_writeln!(w, "class {}", m.name);
    }
    cw_writeln!(w, "data class {}(", m.name)?;
    {
        let _indent = w.indent();
        for f in &m.fields {
            cw_writeln!(
                w,
                "@ProtoNumber({}) val {}: {} = {},",
                f.number,
                backtick_keyword(&f.name, KEYWORDS),
                f.type_name,
                f.default_value
            )?;
        }
    }
    w.writeln(")")
}

fn signature(m: &Method) -> String {
    let name = backtick_keyword(&m.call_name, KEYWORDS);
    if m.server_streaming {
        format!("fun {}(request: {}): Flow<{}>", name, m.input, m.output)
    } else {
        format!("suspend fun {}(request: {}): {}", name, m.input, m.output)
    }
}

fn write_client(w: &mut Writer<'_>, s: &Service) -> fmt::Result {
    w.writeln("@OptIn(ExperimentalSerializationApi::class)")?;
    w.block(&format!("object {}", s.name), |w| {
        for (i, m) in s.methods.iter().enumerate() {
            if i > 0 {
                w.blank_line()?;
            }
            cw_writeln!(w, "{} =", signature(m))?;
            let _indent = w.indent();
            if m.server_streaming {
                cw_writeln!(
                    w,
                    "Kalam.instance.stream(\"{}\", ProtoBuf.encodeToByteArray(request))",
                    s.route(m)
                )?;
                let _chain = w.indent();
                cw_writeln!(w, ".map {{ ProtoBuf.decodeFromByteArray<{}>(it) }}", m.output)?;
            } else {
                cw_writeln!(
                    w,
                    "ProtoBuf.decodeFromByteArray<{}>(Kalam.instance.call(\"{}\", ProtoBuf.encodeToByteArray(request)))",
                    m.output,
                    s.route(m)
                )?;
            }
        }
        Ok(())
    })
}

fn write_handler(w: &mut Writer<'_>, s: &Service) -> fmt::Result {
    w.block(&format!("interface {}Handler", s.name), |w| {
        for m in &s.methods {
            w.writeln(&signature(m))?;
        }
        Ok(())
    })
}

fn write_router(w: &mut Writer<'_>, s: &Service) -> fmt::Result {
    w.writeln("@OptIn(ExperimentalSerializationApi::class)")?;
    let header = format!(
        "class {}Router(private val handler: {}Handler) : ServiceRouter",
        s.name, s.name
    );
    w.block(&header, |w| {
        w.block(
            "override suspend fun handle(method: String, payload: ByteArray, sink: ResponseSink)",
            |w| {
                w.block("when (method)", |w| {
                    for m in &s.methods {
                        w.block(&format!("\"{}\" ->", s.route(m)), |w| {
                            cw_writeln!(w, "val request = ProtoBuf.decodeFromByteArray<{}>(payload)", m.input)?;
                            let call = backtick_keyword(&m.call_name, KEYWORDS);
                            if m.server_streaming {
                                cw_writeln!(
                                    w,
                                    "handler.{}(request).collect {{ sink.sendChunk(ProtoBuf.encodeToByteArray(it)) }}",
                                    call
                                )?;
                                w.writeln("sink.sendEnd()")
                            } else {
                                cw_writeln!(w, "sink.sendUnary(ProtoBuf.encodeToByteArray(handler.{}(request)))", call)
                            }
                        })?;
                    }
                    w.writeln("else -> sink.sendError(\"Unknown method: $method\")")
                })
            },
        )
    })
}
