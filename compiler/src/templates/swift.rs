//! Swift target. Message types come from SwiftProtobuf, so only services are
//! rendered here: an `enum` namespace of async client calls, a handler
//! protocol and a router.

use std::fmt;

use super::{backtick_keyword, render_with, write_header, Template};
use crate::{
    code_writer::CodeWriter,
    cw_writeln,
    error::CodegenError,
    ir::{FileData, Method, Service},
};

const KEYWORDS: &[&str] = &[
    "associatedtype", "class", "default", "defer", "deinit", "do", "else", "enum", "extension",
    "fileprivate", "for", "func", "guard", "if", "import", "in", "init", "inout", "internal",
    "is", "let", "operator", "private", "protocol", "public", "repeat", "return", "self",
    "static", "struct", "subscript", "super", "switch", "throw", "throws", "try", "typealias",
    "var", "where", "while",
];

pub struct SwiftTemplate;

impl Template for SwiftTemplate {
    fn render(&self, data: &FileData) -> Result<String, CodegenError> {
        render_with(data, 4, write_file)
    }
}

type Writer<'a> = CodeWriter<&'a mut String>;

fn write_file(w: &mut Writer<'_>, data: &FileData) -> fmt::Result {
    write_header(w, data)?;
    w.writeln("import Foundation")?;
    w.writeln("import SwiftProtobuf")?;

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

fn write_client(w: &mut Writer<'_>, s: &Service) -> fmt::Result {
    w.block(&format!("enum {}", s.name), |w| {
        for (i, m) in s.methods.iter().enumerate() {
            if i > 0 {
                w.blank_line()?;
            }
            let name = backtick_keyword(&m.call_name, KEYWORDS);
            if m.server_streaming {
                write_stream_call(w, s, m, &name)?;
            } else {
                let header = format!(
                    "static func {}(_ request: {}) async throws -> {}",
                    name, m.input, m.output
                );
                w.block(&header, |w| {
                    cw_writeln!(
                        w,
                        "let payload = try await Kalam.shared.call(\"{}\", request.serializedData())",
                        s.route(m)
                    )?;
                    cw_writeln!(w, "return try {}(serializedData: payload)", m.output)
                })?;
            }
        }
        Ok(())
    })
}

fn write_stream_call(w: &mut Writer<'_>, s: &Service, m: &Method, name: &str) -> fmt::Result {
    let header = format!(
        "static func {}(_ request: {}) -> AsyncThrowingStream<{}, Error>",
        name, m.input, m.output
    );
    w.block(&header, |w| {
        w.writeln("AsyncThrowingStream { continuation in")?;
        {
            let _body = w.indent();
            w.writeln("let task = Task {")?;
            {
                let _task = w.indent();
                write_do_catch(
                    w,
                    |w| {
                        w.writeln("let payload = try request.serializedData()")?;
                        w.block(
                            &format!("for try await chunk in Kalam.shared.stream(\"{}\", payload)", s.route(m)),
                            |w| cw_writeln!(w, "continuation.yield(try {}(serializedData: chunk))", m.output),
                        )?;
                        w.writeln("continuation.finish()")
                    },
                    |w| w.writeln("continuation.finish(throwing: error)"),
                )?;
            }
            w.writeln("}")?;
            w.writeln("continuation.onTermination = { _ in task.cancel() }")?;
        }
        w.writeln("}")
    })
}

/// Writes `do { .. } catch { .. }` with Swift's usual brace placement.
fn write_do_catch<B, C>(w: &mut Writer<'_>, body: B, catch: C) -> fmt::Result
where
    B: FnOnce(&mut Writer<'_>) -> fmt::Result,
    C: FnOnce(&mut Writer<'_>) -> fmt::Result,
{
    w.writeln("do {")?;
    {
        let _do = w.indent();
        body(w)?;
    }
    w.writeln("} catch {")?;
    {
        let _catch = w.indent();
        catch(w)?;
    }
    w.writeln("}")
}

fn write_handler(w: &mut Writer<'_>, s: &Service) -> fmt::Result {
    w.block(&format!("protocol {}Handler", s.name), |w| {
        for m in &s.methods {
            let name = backtick_keyword(&m.call_name, KEYWORDS);
            if m.server_streaming {
                cw_writeln!(
                    w,
                    "func {}(_ request: {}, onChunk: @escaping ({}) -> Void, onEnd: @escaping () -> Void)",
                    name, m.input, m.output
                )?;
            } else {
                cw_writeln!(
                    w,
                    "func {}(_ request: {}, completion: @escaping (Result<{}, Error>) -> Void)",
                    name, m.input, m.output
                )?;
            }
        }
        Ok(())
    })
}

fn write_router(w: &mut Writer<'_>, s: &Service) -> fmt::Result {
    w.block(&format!("final class {}Router: ServiceRouter", s.name), |w| {
        cw_writeln!(w, "private let handler: {}Handler", s.name)?;
        w.blank_line()?;
        w.block(&format!("init(_ handler: {}Handler)", s.name), |w| {
            w.writeln("self.handler = handler")
        })?;
        w.blank_line()?;
        w.block("func handle(method: String, payload: Data, sink: ResponseSink)", |w| {
            w.writeln("switch method {")?;
            for m in &s.methods {
                cw_writeln!(w, "case \"{}\":", s.route(m))?;
                let _case = w.indent();
                write_route_case(w, m)?;
            }
            w.writeln("default:")?;
            {
                let _case = w.indent();
                w.writeln("sink.sendError(\"Unknown method: \\(method)\")")?;
            }
            w.writeln("}")
        })
    })
}

fn write_route_case(w: &mut Writer<'_>, m: &Method) -> fmt::Result {
    let name = backtick_keyword(&m.call_name, KEYWORDS);
    write_do_catch(
        w,
        |w| {
            cw_writeln!(w, "let request = try {}(serializedData: payload)", m.input)?;
            if m.server_streaming {
                cw_writeln!(w, "handler.{}(request, onChunk: {{ response in", name)?;
                {
                    let _body = w.indent();
                    w.writeln("if let data = try? response.serializedData() { sink.sendChunk(data) }")?;
                }
                w.writeln("}, onEnd: { sink.sendEnd() })")
            } else {
                cw_writeln!(w, "handler.{}(request) {{ result in", name)?;
                {
                    let _body = w.indent();
                    w.writeln("switch result {")?;
                    w.writeln("case .success(let response):")?;
                    {
                        let _case = w.indent();
                        w.writeln("if let data = try? response.serializedData() {")?;
                        w.writeln("    sink.sendUnary(data)")?;
                        w.writeln("} else {")?;
                        w.writeln("    sink.sendError(\"failed to encode response\")")?;
                        w.writeln("}")?;
                    }
                    w.writeln("case .failure(let error):")?;
                    {
                        let _case = w.indent();
                        w.writeln("sink.sendError(\"\\(error)\")")?;
                    }
                    w.writeln("}")?;
                }
                w.writeln("}")
            }
        },
        |w| w.writeln("sink.sendError(\"\\(error)\")"),
    )
}
