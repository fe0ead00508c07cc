//! In-memory model of the schema files a generation pass works on.
//!
//! Built once from the `FileDescriptorProto`s of a request and never
//! mutated afterwards.

use std::fmt;

use prost_types::{FileDescriptorProto, MethodDescriptorProto, ServiceDescriptorProto};

/// Fully qualified protobuf type name, as written in descriptors
/// (`.package.Outer.Inner`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeReference(String);

impl TypeReference {
    /// Normalize `name` to its fully qualified form with a leading dot.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        if name.starts_with('.') {
            Self(name)
        } else {
            Self(format!(".{name}"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub name: String,
    pub input_type: TypeReference,
    pub output_type: TypeReference,
    pub client_streaming: bool,
    pub server_streaming: bool,
}

impl MethodDescriptor {
    pub fn is_unary(&self) -> bool {
        !self.client_streaming && !self.server_streaming
    }

    fn from_proto(method: &MethodDescriptorProto) -> Self {
        Self {
            name: method.name().to_owned(),
            input_type: TypeReference::new(method.input_type()),
            output_type: TypeReference::new(method.output_type()),
            client_streaming: method.client_streaming(),
            server_streaming: method.server_streaming(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    pub name: String,
    pub methods: Vec<MethodDescriptor>,
}

impl ServiceDescriptor {
    fn from_proto(service: &ServiceDescriptorProto) -> Self {
        Self {
            name: service.name().to_owned(),
            methods: service.method.iter().map(MethodDescriptor::from_proto).collect(),
        }
    }
}

/// One input compilation unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaFile {
    /// Path of the file as protoc knows it, e.g. `helloworld/helloworld.proto`.
    pub name: String,
    pub package: String,
    pub services: Vec<ServiceDescriptor>,
}

impl SchemaFile {
    pub fn from_proto(file: &FileDescriptorProto) -> Self {
        Self {
            name: file.name().to_owned(),
            package: file.package().to_owned(),
            services: file.service.iter().map(ServiceDescriptor::from_proto).collect(),
        }
    }

    pub fn has_services(&self) -> bool {
        !self.services.is_empty()
    }

    /// `package.Service`, or just `Service` for files without a package.
    pub fn qualified_service_name(&self, service: &ServiceDescriptor) -> String {
        if self.package.is_empty() {
            service.name.clone()
        } else {
            format!("{}.{}", self.package, service.name)
        }
    }

    /// Name of the generated file: the schema file name without a
    /// `.proto`/`.protodevel` extension, plus `.http.rs`.
    pub fn output_file_name(&self) -> String {
        let stem = [".proto", ".protodevel"]
            .iter()
            .find_map(|ext| self.name.strip_suffix(ext))
            .unwrap_or(&self.name);
        format!("{stem}.http.rs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> SchemaFile {
        SchemaFile {
            name: name.to_owned(),
            package: "helloworld".to_owned(),
            services: Vec::new(),
        }
    }

    #[test]
    fn output_file_name_strips_known_extensions() {
        assert_eq!(file("helloworld.proto").output_file_name(), "helloworld.http.rs");
        assert_eq!(file("a/b/legacy.protodevel").output_file_name(), "a/b/legacy.http.rs");
        assert_eq!(file("notes.txt").output_file_name(), "notes.txt.http.rs");
    }

    #[test]
    fn type_reference_is_fully_qualified() {
        assert_eq!(TypeReference::new("pkg.Msg").as_str(), ".pkg.Msg");
        assert_eq!(TypeReference::new(".pkg.Msg").as_str(), ".pkg.Msg");
    }

    #[test]
    fn from_proto_keeps_declaration_order() {
        let proto = FileDescriptorProto {
            name: Some("svc.proto".into()),
            package: Some("acme".into()),
            service: vec![ServiceDescriptorProto {
                name: Some("Store".into()),
                method: vec![
                    MethodDescriptorProto {
                        name: Some("Put".into()),
                        input_type: Some(".acme.Item".into()),
                        output_type: Some(".acme.Item".into()),
                        ..Default::default()
                    },
                    MethodDescriptorProto {
                        name: Some("Get".into()),
                        input_type: Some(".acme.Key".into()),
                        output_type: Some(".acme.Item".into()),
                        server_streaming: Some(true),
                        ..Default::default()
                    },
                ],
                ..Default::default()
            }],
            ..Default::default()
        };

        let schema = SchemaFile::from_proto(&proto);
        let names: Vec<_> = schema.services[0].methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Put", "Get"]);
        assert!(schema.services[0].methods[0].is_unary());
        assert!(!schema.services[0].methods[1].is_unary());
        assert_eq!(schema.qualified_service_name(&schema.services[0]), "acme.Store");
    }
}
