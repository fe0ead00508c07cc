use prost::Message;
use prost_types::compiler::code_generator_response::Feature;
use prost_types::compiler::CodeGeneratorRequest;
use prost_types::{DescriptorProto, FileDescriptorProto, MethodDescriptorProto, ServiceDescriptorProto};
use protogate_codegen::{decode_request, generate, generate_files, GenerateError};

fn message(name: &str) -> DescriptorProto {
    DescriptorProto {
        name: Some(name.into()),
        ..Default::default()
    }
}

fn method(name: &str, input: &str, output: &str) -> MethodDescriptorProto {
    MethodDescriptorProto {
        name: Some(name.into()),
        input_type: Some(input.into()),
        output_type: Some(output.into()),
        ..Default::default()
    }
}

fn greeter_file() -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some("helloworld.proto".into()),
        package: Some("helloworld".into()),
        message_type: vec![message("HelloRequest"), message("HelloReply")],
        service: vec![ServiceDescriptorProto {
            name: Some("Greeter".into()),
            method: vec![
                method("SayHello", ".helloworld.HelloRequest", ".helloworld.HelloReply"),
                method("sayGoodbye", ".helloworld.HelloRequest", ".helloworld.HelloReply"),
                MethodDescriptorProto {
                    server_streaming: Some(true),
                    ..method("WatchHello", ".helloworld.HelloRequest", ".helloworld.HelloReply")
                },
            ],
            ..Default::default()
        }],
        ..Default::default()
    }
}

fn types_file() -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some("types.proto".into()),
        package: Some("helloworld".into()),
        message_type: vec![message("Unused")],
        ..Default::default()
    }
}

fn request(files: &[&str], parameter: &str) -> CodeGeneratorRequest {
    CodeGeneratorRequest {
        file_to_generate: files.iter().map(|f| f.to_string()).collect(),
        parameter: Some(parameter.into()),
        proto_file: vec![types_file(), greeter_file()],
        ..Default::default()
    }
}

#[test]
fn generates_one_file_per_file_with_services() {
    let files = generate_files(&request(&["types.proto", "helloworld.proto"], "pb_path=crate::pb")).unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].name, "helloworld.http.rs");

    let content = &files[0].content;
    assert!(content.starts_with("// Code generated by protoc-gen-protogate. DO NOT EDIT.\n// source: helloworld.proto\n"));
    assert!(content.contains("use crate::pb as pb;"));
    assert!(content.contains("pub struct GreeterGateway<S>"));
    assert!(content.contains("\"/greeter/say_hello\""));
    assert!(content.contains("\"/greeter/say_goodbye\""));
    assert!(content.contains("\"/helloworld.Greeter/SayHello\""));
    assert!(content.contains("pub fn register_greeter_server"));
    assert!(!content.contains("watch_hello"), "streaming methods get no route");
}

#[test]
fn output_is_valid_rust() {
    let files = generate_files(&request(&["helloworld.proto"], "pb_path=crate::pb")).unwrap();
    let parsed = syn::parse_file(&files[0].content).unwrap();
    assert!(parsed.attrs.is_empty(), "generated code must be includable in a module");
}

#[test]
fn generation_is_deterministic() {
    let request = request(&["helloworld.proto"], "pb_path=crate::pb");
    let first = generate(&request).unwrap();
    let second = generate(&request).unwrap();
    assert_eq!(first.encode_to_vec(), second.encode_to_vec());
}

#[test]
fn response_declares_proto3_optional() {
    let response = generate(&request(&["helloworld.proto"], "pb_path=crate::pb")).unwrap();
    assert_eq!(response.supported_features, Some(Feature::Proto3Optional as u64));
    assert_eq!(response.file[0].name(), "helloworld.http.rs");
}

#[test]
fn interceptors_can_be_turned_off() {
    let files = generate_files(&request(&["helloworld.proto"], "pb_path=crate::pb,interceptors=false")).unwrap();
    let content = &files[0].content;
    assert!(!content.contains("invoke_intercepted"));
    assert!(!content.contains("InterceptorSlot"));
    assert!(content.contains("impl ::std::default::Default for Server"));
}

#[test]
fn runtime_path_is_configurable() {
    let files = generate_files(&request(&["helloworld.proto"], "pb_path=crate::pb,runtime_path=crate::rt")).unwrap();
    assert!(files[0].content.contains("crate::rt::unary("));
    assert!(!files[0].content.contains("::protogate::"));
}

#[test]
fn missing_pb_path_is_fatal() {
    let err = generate(&request(&["helloworld.proto"], "")).unwrap_err();
    assert!(matches!(err, GenerateError::MissingOption("pb_path")));
}

#[test]
fn empty_file_list_is_fatal() {
    let err = generate(&request(&[], "pb_path=crate::pb")).unwrap_err();
    assert!(matches!(err, GenerateError::NoFilesToGenerate));
}

#[test]
fn unknown_file_is_fatal() {
    let err = generate(&request(&["nope.proto"], "pb_path=crate::pb")).unwrap_err();
    assert!(matches!(err, GenerateError::UnknownFile(ref name) if name == "nope.proto"));
}

#[test]
fn unresolved_type_aborts_without_output() {
    let mut request = request(&["helloworld.proto"], "pb_path=crate::pb");
    request.proto_file[1].service[0].method[0].output_type = Some(".other.Reply".into());
    let err = generate(&request).unwrap_err();
    assert!(matches!(err, GenerateError::UnresolvedType { ref type_name, .. } if type_name == ".other.Reply"));
}

#[test]
fn decodes_protoc_envelope() {
    let request = request(&["helloworld.proto"], "pb_path=crate::pb");
    let decoded = decode_request(&request.encode_to_vec()).unwrap();
    assert_eq!(decoded, request);

    assert!(matches!(decode_request(&[0xff, 0xff, 0xff]), Err(GenerateError::Decode(_))));
}

#[test]
fn empty_messages_use_the_runtime_type() {
    let mut request = request(&["helloworld.proto"], "pb_path=crate::pb");
    request.proto_file[1].service[0]
        .method
        .push(method("Ping", ".google.protobuf.Empty", ".google.protobuf.Empty"));
    let files = generate_files(&request).unwrap();
    let content = &files[0].content;

    assert!(content.contains("input: ::protogate::Empty"));
    assert!(content.contains("Result<::protogate::Empty, ::protogate::tonic::Status>"));
    assert!(content.contains("ctx.into_request(::std::convert::From::from(input))"));
    assert!(content.contains("::protogate::Empty::from(response.into_inner())"));
}

#[test]
fn rpc_named_like_gateway_items_gets_renamed_wrapper() {
    let mut request = request(&["helloworld.proto"], "pb_path=crate::pb");
    request.proto_file[1].service[0]
        .method
        .push(method("New", ".helloworld.HelloRequest", ".helloworld.HelloReply"));
    let files = generate_files(&request).unwrap();
    let content = &files[0].content;

    assert!(content.contains("pub async fn new_rpc("));
    assert!(content.contains("pb::greeter_server::Greeter::new(&*srv"));
    assert!(content.contains("\"/greeter/new\""));
    assert_eq!(content.matches("pub fn new(").count(), 1);
}
