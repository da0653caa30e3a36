use kalam_schema::{request::decode_request, DescriptorGraph, FieldKind, SchemaError, TypeRef};
use prost::Message;
use prost_types::{
    compiler::CodeGeneratorRequest, field_descriptor_proto::Type, DescriptorProto,
    FieldDescriptorProto, FileDescriptorProto, FileDescriptorSet, MethodDescriptorProto,
    ServiceDescriptorProto,
};

/// `dep.proto` declares `dep.User`; `main.proto` uses it as a field type and
/// as a method output.
fn dep_and_main() -> Vec<FileDescriptorProto> {
    let dep = FileDescriptorProto {
        name:    Some("dep.proto".into()),
        package: Some("dep".into()),
        message_type: vec![DescriptorProto {
            name: Some("User".into()),
            ..Default::default()
        }],
        ..Default::default()
    };
    let main = FileDescriptorProto {
        name:       Some("main.proto".into()),
        package:    Some("app".into()),
        dependency: vec!["dep.proto".into()],
        message_type: vec![DescriptorProto {
            name:  Some("Lookup".into()),
            field: vec![FieldDescriptorProto {
                name:      Some("owner".into()),
                number:    Some(1),
                r#type:    Some(Type::Message as i32),
                type_name: Some(".dep.User".into()),
                ..Default::default()
            }],
            ..Default::default()
        }],
        service: vec![ServiceDescriptorProto {
            name:   Some("Users".into()),
            method: vec![MethodDescriptorProto {
                name:        Some("Find".into()),
                input_type:  Some(".app.Lookup".into()),
                output_type: Some(".dep.User".into()),
                ..Default::default()
            }],
            ..Default::default()
        }],
        ..Default::default()
    };
    vec![dep, main]
}

fn descriptor_set() -> Vec<u8> {
    FileDescriptorSet { file: dep_and_main() }.encode_to_vec()
}

fn marked(graph: &DescriptorGraph) -> Vec<&str> {
    graph.files_to_generate().map(|f| f.path.as_str()).collect()
}

#[test]
fn test_empty_selection_marks_every_file() {
    let graph = DescriptorGraph::from_descriptor_set(&descriptor_set(), &[]).unwrap();
    assert_eq!(marked(&graph), ["dep.proto", "main.proto"]);
}

#[test]
fn test_named_selection_marks_only_that_file() {
    let graph = DescriptorGraph::from_descriptor_set(&descriptor_set(), &["main.proto".to_string()]).unwrap();
    assert_eq!(marked(&graph), ["main.proto"]);
    assert_eq!(graph.files.len(), 2);
}

#[test]
fn test_selection_outside_the_set_is_an_error() {
    let err = DescriptorGraph::from_descriptor_set(&descriptor_set(), &["mian.proto".to_string()]).unwrap_err();
    assert!(matches!(err, SchemaError::UnknownFile { ref file } if file == "mian.proto"), "{:?}", err);
}

#[test]
fn test_garbage_descriptor_set_fails_to_decode() {
    let err = DescriptorGraph::from_descriptor_set(&[0xff, 0xff, 0xff], &[]).unwrap_err();
    assert!(matches!(err, SchemaError::Decode(_)), "{:?}", err);
}

#[test]
fn test_request_marks_file_to_generate_and_resolves_dependency_types() {
    let request = CodeGeneratorRequest {
        file_to_generate: vec!["main.proto".into()],
        proto_file: dep_and_main(),
        ..Default::default()
    };
    let request = decode_request(&request.encode_to_vec()).unwrap();
    let graph = DescriptorGraph::from_request(&request).unwrap();

    assert_eq!(marked(&graph), ["main.proto"]);
    assert!(!graph.files[0].generate);

    let main = &graph.files[1];
    assert_eq!(main.messages[0].fields[0].kind, FieldKind::Message(TypeRef::new("dep", "User")));
    let find = &main.services[0].methods[0];
    assert_eq!(find.input, TypeRef::new("app", "Lookup"));
    assert_eq!(find.output, TypeRef::new("dep", "User"));
}
