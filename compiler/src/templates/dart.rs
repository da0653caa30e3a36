//! Dart target. Messages come from protoc-gen-dart (`<base>.pb.dart`); each
//! service becomes a class of static calls over the bundled `kalam.dart`
//! runtime.

use std::fmt;

use super::{render_with, write_header, Template};
use crate::{
    code_writer::CodeWriter,
    cw_writeln,
    error::CodegenError,
    ir::{FileData, Service},
};

const RESERVED: &[&str] = &[
    "assert", "break", "case", "catch", "class", "const", "continue", "default", "do", "else",
    "enum", "extends", "false", "final", "finally", "for", "if", "in", "is", "new", "null",
    "rethrow", "return", "super", "switch", "this", "throw", "true", "try", "var", "void",
    "while", "with",
];

pub struct DartTemplate;

impl Template for DartTemplate {
    fn render(&self, data: &FileData) -> Result<String, CodegenError> {
        render_with(data, 2, write_file)
    }
}

type Writer<'a> = CodeWriter<&'a mut String>;

/// Dart cannot quote reserved words, so they get a trailing underscore.
fn member_name(name: &str) -> String {
    if RESERVED.contains(&name) {
        format!("{}_", name)
    } else {
        name.to_string()
    }
}

/// Relative path from the generated file back to the output root, where the
/// runtime file is written.
fn root_relative(base_name: &str) -> String {
    "../".repeat(base_name.matches('/').count())
}

fn file_stem(base_name: &str) -> &str {
    base_name.rsplit('/').next().unwrap_or(base_name)
}

fn write_file(w: &mut Writer<'_>, data: &FileData) -> fmt::Result {
    write_header(w, data)?;
    cw_writeln!(w, "import '{}kalam.dart';", root_relative(&data.base_name))?;
    cw_writeln!(w, "import '{}.pb.dart';", file_stem(&data.base_name))?;

    for s in &data.services {
        w.blank_line()?;
        write_client(w, s)?;
    }
    Ok(())
}

fn write_client(w: &mut Writer<'_>, s: &Service) -> fmt::Result {
    w.block(&format!("class {}", s.name), |w| {
        cw_writeln!(w, "{}._();", s.name)?;
        for m in &s.methods {
            w.blank_line()?;
            let name = member_name(&m.call_name);
            if m.server_streaming {
                w.block(&format!("static Stream<{}> {}({} request)", m.output, name, m.input), |w| {
                    w.writeln("return Kalam.instance")?;
                    let _chain = w.indent();
                    let _chain2 = w.indent();
                    cw_writeln!(w, ".stream('{}', request.writeToBuffer())", s.route(m))?;
                    cw_writeln!(w, ".map({}.fromBuffer);", m.output)
                })?;
            } else {
                w.block(
                    &format!("static Future<{}> {}({} request) async", m.output, name, m.input),
                    |w| {
                        cw_writeln!(
                            w,
                            "final payload = await Kalam.instance.call('{}', request.writeToBuffer());",
                            s.route(m)
                        )?;
                        cw_writeln!(w, "return {}.fromBuffer(payload);", m.output)
                    },
                )?;
            }
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Method;

    fn greeter(base: &str) -> FileData {
        FileData {
            file_name: format!("{}.proto", base),
            base_name: base.into(),
            package:   "".into(),
            enums:     vec![],
            messages:  vec![],
            services:  vec![Service {
                name:    "Greeter".into(),
                prefix:  "Greeter/".into(),
                methods: vec![
                    Method {
                        name:             "SayHello".into(),
                        call_name:        "sayHello".into(),
                        input:            "HelloRequest".into(),
                        output:           "HelloReply".into(),
                        server_streaming: false,
                    },
                    Method {
                        name:             "Is".into(),
                        call_name:        "is".into(),
                        input:            "HelloRequest".into(),
                        output:           "HelloReply".into(),
                        server_streaming: true,
                    },
                ],
            }],
        }
    }

    #[test]
    fn test_renders_static_client() {
        let out = DartTemplate.render(&greeter("greeter")).unwrap();
        assert!(out.contains("import 'kalam.dart';\nimport 'greeter.pb.dart';\n"));
        assert!(out.contains("class Greeter {\n  Greeter._();\n"));
        assert!(out.contains("  static Future<HelloReply> sayHello(HelloRequest request) async {\n"));
        assert!(out.contains("Kalam.instance.call('Greeter/SayHello', request.writeToBuffer());"));
        assert!(out.contains("return HelloReply.fromBuffer(payload);"));
        assert!(out.contains("static Stream<HelloReply> is_(HelloRequest request) {"));
        assert!(out.contains("        .stream('Greeter/Is', request.writeToBuffer())\n"));
    }

    #[test]
    fn test_nested_output_imports_runtime_from_root() {
        let out = DartTemplate.render(&greeter("api/v1/greeter")).unwrap();
        assert!(out.contains("import '../../kalam.dart';\nimport 'greeter.pb.dart';\n"));
    }
}
