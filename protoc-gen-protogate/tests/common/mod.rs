#![allow(dead_code)]

use std::path::{Path, PathBuf};

use prost::Message;
use prost_types::{
    DescriptorProto, FileDescriptorProto, FileDescriptorSet, MethodDescriptorProto, ServiceDescriptorProto,
};

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

pub fn greeter_file() -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some("helloworld.proto".into()),
        package: Some("helloworld".into()),
        message_type: vec![message("HelloRequest"), message("HelloReply")],
        service: vec![ServiceDescriptorProto {
            name: Some("Greeter".into()),
            method: vec![
                method("SayHello", ".helloworld.HelloRequest", ".helloworld.HelloReply"),
                method("SayGoodbye", ".helloworld.HelloRequest", ".helloworld.HelloReply"),
            ],
            ..Default::default()
        }],
        ..Default::default()
    }
}

pub fn types_file() -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some("types.proto".into()),
        package: Some("helloworld".into()),
        message_type: vec![message("Unused")],
        ..Default::default()
    }
}

pub fn descriptor_set() -> FileDescriptorSet {
    FileDescriptorSet {
        file: vec![types_file(), greeter_file()],
    }
}

/// Write the fixture set to `dir/descriptor.bin`.
pub fn write_descriptor_set(dir: &Path) -> PathBuf {
    let path = dir.join("descriptor.bin");
    std::fs::write(&path, descriptor_set().encode_to_vec()).unwrap();
    path
}
