use std::io;
use std::path::PathBuf;

use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{
    DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto,
    FileDescriptorProto, FileDescriptorSet, MethodDescriptorProto, ServiceDescriptorProto,
};
use protogate_codegen::{generate_files, request_from_descriptor_set, write_files, GenerateError};

fn field(name: &str, number: i32, ty: Type, type_name: Option<&str>) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.into()),
        number: Some(number),
        label: Some(Label::Optional as i32),
        r#type: Some(ty as i32),
        type_name: type_name.map(Into::into),
        json_name: None,
        ..Default::default()
    }
}

fn message(name: &str, fields: Vec<FieldDescriptorProto>) -> DescriptorProto {
    DescriptorProto {
        name: Some(name.into()),
        field: fields,
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

/// Descriptor for `helloworld.proto`, kept in sync with `src/pb.rs`.
fn helloworld() -> FileDescriptorProto {
    let mood = EnumDescriptorProto {
        name: Some("Mood".into()),
        value: ["MOOD_UNSPECIFIED", "MOOD_HAPPY", "MOOD_SAD"]
            .iter()
            .zip(0..)
            .map(|(name, number)| EnumValueDescriptorProto {
                name: Some((*name).into()),
                number: Some(number),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    };

    let shorten_reply = DescriptorProto {
        nested_type: vec![message("Link", vec![field("url", 1, Type::String, None)])],
        ..message(
            "ShortenReply",
            vec![
                field("link", 1, Type::Message, Some(".helloworld.ShortenReply.Link")),
                field("code", 2, Type::String, None),
            ],
        )
    };

    FileDescriptorProto {
        name: Some("helloworld.proto".into()),
        package: Some("helloworld".into()),
        dependency: vec!["google/protobuf/empty.proto".into()],
        syntax: Some("proto3".into()),
        enum_type: vec![mood],
        message_type: vec![
            message("HelloRequest", vec![field("name", 1, Type::String, None)]),
            message(
                "HelloReply",
                vec![
                    field("message", 1, Type::String, None),
                    field("mood", 2, Type::Enum, Some(".helloworld.Mood")),
                    field("count", 3, Type::Int32, None),
                ],
            ),
            message("ShortenRequest", vec![field("url", 1, Type::String, None)]),
            shorten_reply,
        ],
        service: vec![
            ServiceDescriptorProto {
                name: Some("Greeter".into()),
                method: vec![
                    method("SayHello", ".helloworld.HelloRequest", ".helloworld.HelloReply"),
                    method("SayGoodbye", ".helloworld.HelloRequest", ".helloworld.HelloReply"),
                    method("Ping", ".google.protobuf.Empty", ".google.protobuf.Empty"),
                ],
                ..Default::default()
            },
            ServiceDescriptorProto {
                name: Some("URLShortener".into()),
                method: vec![
                    method("ShortenURL", ".helloworld.ShortenRequest", ".helloworld.ShortenReply"),
                    method("Expand", ".helloworld.ShortenReply.Link", ".helloworld.ShortenRequest"),
                    method("New", ".helloworld.ShortenRequest", ".helloworld.ShortenReply"),
                ],
                ..Default::default()
            },
        ],
        ..Default::default()
    }
}

fn main() -> Result<(), GenerateError> {
    println!("cargo:rerun-if-changed=build.rs");
    let out_dir = std::env::var_os("OUT_DIR")
        .map(PathBuf::from)
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "OUT_DIR is not set"))?;
    let set = FileDescriptorSet {
        file: vec![helloworld()],
    };

    let request = request_from_descriptor_set(&set, &["helloworld.proto"], "pb_path=crate::pb");
    write_files(&generate_files(&request)?, &out_dir)?;

    let request = request_from_descriptor_set(
        &set,
        &["helloworld.proto"],
        "pb_path=crate::pb,interceptors=false",
    );
    write_files(&generate_files(&request)?, &out_dir.join("plain"))?;
    Ok(())
}
