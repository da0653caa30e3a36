use kalam_codegen::{
    driver::{generate, to_response},
    error::CodegenError,
    language::Language,
    options::GeneratorOptions,
};
use kalam_schema::{
    request::decode_request, DescriptorGraph, FieldDescriptor, FieldKind, FileDescriptor,
    MessageDescriptor, MethodDescriptor, ServiceDescriptor, TypeRef,
};
use prost::Message;
use prost_types::{
    compiler::CodeGeneratorRequest, field_descriptor_proto::Type, DescriptorProto,
    FieldDescriptorProto, FileDescriptorProto, MethodDescriptorProto, ServiceDescriptorProto,
};

fn options(language: Language) -> GeneratorOptions {
    GeneratorOptions { language, bundle_runtime: true }
}

fn unary(name: &str, package: &str, input: &str, output: &str) -> MethodDescriptor {
    MethodDescriptor::new(name, TypeRef::new(package, input), TypeRef::new(package, output), false)
}

fn chat_file(path: &str) -> FileDescriptor {
    FileDescriptor::new(path, "chat")
        .with_message(MessageDescriptor::new(
            "Msg",
            vec![FieldDescriptor::singular("text", 1, FieldKind::String)],
        ))
        .with_service(ServiceDescriptor::new("Chat", vec![unary("Send", "chat", "Msg", "Msg")]))
}

fn text(file: &kalam_codegen::GeneratedFile) -> &str {
    std::str::from_utf8(&file.content).unwrap()
}

#[test]
fn test_kotlin_chat_end_to_end() {
    let graph = DescriptorGraph::new(vec![chat_file("chat.proto")]);
    let files = generate(&graph, &options(Language::Kotlin)).unwrap();

    assert_eq!(files.len(), 1);
    assert_eq!(files[0].name, "chat.klm.kt");
    let out = text(&files[0]);
    assert!(out.contains("package chat\n"));
    assert!(out.contains("val text: String = \"\""));
    assert!(out.contains("object Chat {"));
    assert!(out.contains("suspend fun send(request: Msg): Msg"));
    assert!(out.contains("\"Chat/Send\""));
}

#[test]
fn test_kotlin_output_keeps_directory() {
    let graph = DescriptorGraph::new(vec![chat_file("pkg/thing.proto")]);
    let files = generate(&graph, &options(Language::Kotlin)).unwrap();
    assert_eq!(files[0].name, "pkg/thing.klm.kt");
}

#[test]
fn test_kotlin_empty_package_falls_back() {
    let graph = DescriptorGraph::new(vec![FileDescriptor::new("plain.proto", "")]);
    let files = generate(&graph, &options(Language::Kotlin)).unwrap();
    assert!(text(&files[0]).contains("package generated\n"));
}

#[test]
fn test_kotlin_map_field_uses_native_map() {
    let file = FileDescriptor::new("item.proto", "shop").with_message(MessageDescriptor::new(
        "Item",
        vec![FieldDescriptor::singular("tags", 1, FieldKind::map(FieldKind::String, FieldKind::Int64))],
    ));
    let files = generate(&DescriptorGraph::new(vec![file]), &options(Language::Kotlin)).unwrap();
    assert!(text(&files[0]).contains("@ProtoNumber(1) val tags: Map<String, Long> = emptyMap(),"));
}

#[test]
fn test_files_not_marked_are_skipped() {
    let graph = DescriptorGraph::new(vec![
        chat_file("dep.proto").with_generate(false),
        chat_file("chat.proto"),
    ]);
    let files = generate(&graph, &options(Language::Kotlin)).unwrap();
    let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["chat.klm.kt"]);
}

#[test]
fn test_failure_produces_no_files() {
    let broken = FileDescriptor::new("b.proto", "chat")
        .with_message(MessageDescriptor::new("Bad-Name", vec![]));
    let graph = DescriptorGraph::new(vec![chat_file("a.proto"), broken, chat_file("c.proto")]);

    let err = generate(&graph, &options(Language::Kotlin)).unwrap_err();
    match err {
        CodegenError::Render { file, msg, .. } => {
            assert_eq!(file, "b.proto");
            assert!(msg.contains("Bad-Name"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_dart_writes_one_file_per_service_and_runtime_once() {
    let thing = FileDescriptor::new("pkg/thing.proto", "pkg")
        .with_service(ServiceDescriptor::new("UserService", vec![unary("Get", "pkg", "Req", "Res")]))
        .with_service(ServiceDescriptor::new("Admin", vec![unary("Ban", "pkg", "Req", "Res")]));
    let other = FileDescriptor::new("other.proto", "pkg")
        .with_service(ServiceDescriptor::new("Ping", vec![unary("Ping", "pkg", "Req", "Res")]));
    let graph = DescriptorGraph::new(vec![thing, other]);

    let files = generate(&graph, &GeneratorOptions::default()).unwrap();
    let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        names,
        ["pkg/thing_user_service.klm.dart", "pkg/thing_admin.klm.dart", "other_ping.klm.dart", "kalam.dart"]
    );

    let user_service = text(&files[0]);
    assert!(user_service.contains("class UserService {"));
    assert!(!user_service.contains("class Admin {"));
    assert!(user_service.contains("import '../kalam.dart';"));
    assert!(text(&files[3]).contains("class Kalam"));
}

#[test]
fn test_dart_render_error_names_service() {
    let file = FileDescriptor::new("svc.proto", "pkg")
        .with_service(ServiceDescriptor::new("Broken", vec![unary("Get", "pkg", "Not A Type", "Res")]));
    let graph = DescriptorGraph::new(vec![file]);

    let err = generate(&graph, &GeneratorOptions::default()).unwrap_err();
    assert!(err.to_string().contains("(service Broken)"), "{err}");
}

#[test]
fn test_swift_prefixes_types_and_bundles_runtime() {
    let file = FileDescriptor::new("thing.proto", "acme.v1")
        .with_service(ServiceDescriptor::new("Users", vec![unary("GetUser", "acme.v1", "GetUserRequest", "User")]));
    let graph = DescriptorGraph::new(vec![file]);

    let files = generate(&graph, &options(Language::Swift)).unwrap();
    let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["thing.klm.swift", "kalam.swift"]);
    assert!(text(&files[0])
        .contains("static func getUser(_ request: Acme_V1_GetUserRequest) async throws -> Acme_V1_User {"));
}

#[test]
fn test_runtime_can_be_disabled() {
    let graph = DescriptorGraph::new(vec![chat_file("chat.proto")]);
    let opts: GeneratorOptions = "lang=swift,runtime=false".parse().unwrap();
    let files = generate(&graph, &opts).unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].name, "chat.klm.swift");
}

#[test]
fn test_empty_graph_still_bundles_runtime() {
    let files = generate(&DescriptorGraph::new(vec![]), &GeneratorOptions::default()).unwrap();
    let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["kalam.dart"]);
}

fn chat_request() -> CodeGeneratorRequest {
    let text_field = FieldDescriptorProto {
        name: Some("text".into()),
        number: Some(1),
        r#type: Some(Type::String as i32),
        ..Default::default()
    };
    let file = FileDescriptorProto {
        name: Some("chat.proto".into()),
        package: Some("chat".into()),
        message_type: vec![DescriptorProto {
            name: Some("Msg".into()),
            field: vec![text_field],
            ..Default::default()
        }],
        service: vec![ServiceDescriptorProto {
            name: Some("Chat".into()),
            method: vec![MethodDescriptorProto {
                name: Some("Send".into()),
                input_type: Some(".chat.Msg".into()),
                output_type: Some(".chat.Msg".into()),
                ..Default::default()
            }],
            ..Default::default()
        }],
        ..Default::default()
    };
    CodeGeneratorRequest {
        file_to_generate: vec!["chat.proto".into()],
        parameter: Some("lang=kotlin".into()),
        proto_file: vec![file],
        ..Default::default()
    }
}

#[test]
fn test_plugin_request_to_response() {
    let bytes = chat_request().encode_to_vec();
    let request = decode_request(&bytes).unwrap();
    let opts = GeneratorOptions::parse(request.parameter()).unwrap();
    let graph = DescriptorGraph::from_request(&request).unwrap();

    let response = to_response(generate(&graph, &opts).unwrap()).unwrap();
    assert!(response.error.is_none());
    assert_eq!(response.file.len(), 1);
    assert_eq!(response.file[0].name(), "chat.klm.kt");
    assert!(response.file[0].content().contains("data class Msg("));
}
