//! Naming protobuf types in generated Rust.
//!
//! Message types follow prost's layout: a message `.pkg.Outer.Inner` lives
//! at `<pkg module>::outer::Inner`. The package module is imported once per
//! generated file under a short alias, so the body only ever names
//! `pb::...` or `pb_<package>::...`.

use std::collections::BTreeMap;

use heck::{ToSnakeCase, ToUpperCamelCase};
use proc_macro2::Span;
use prost_types::{DescriptorProto, FileDescriptorProto};
use syn::{Ident, Path, PathSegment};

use crate::error::GenerateError;
use crate::options::GeneratorOptions;
use crate::schema::TypeReference;

/// Alias under which the file's own package is imported.
pub const OWN_PACKAGE_ALIAS: &str = "pb";

/// Well-known empty message; prost maps it to `()`.
pub const EMPTY: &str = ".google.protobuf.Empty";

/// Where a message type is declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageLocation {
    pub package: String,
    /// Message names from the outermost to the type itself.
    pub nesting: Vec<String>,
}

/// Every message type declared by the files of a request.
#[derive(Debug, Default)]
pub struct DescriptorIndex {
    messages: BTreeMap<String, MessageLocation>,
}

impl DescriptorIndex {
    pub fn new<'a>(files: impl IntoIterator<Item = &'a FileDescriptorProto>) -> Self {
        let mut index = Self::default();
        for file in files {
            let package = file.package();
            let scope = if package.is_empty() {
                String::new()
            } else {
                format!(".{package}")
            };
            for message in &file.message_type {
                index.add(package, &scope, &[], message);
            }
        }
        index
    }

    fn add(&mut self, package: &str, scope: &str, parents: &[String], message: &DescriptorProto) {
        let name = format!("{scope}.{}", message.name());
        let mut nesting = parents.to_vec();
        nesting.push(message.name().to_owned());
        for nested in &message.nested_type {
            self.add(package, &name, &nesting, nested);
        }
        self.messages.insert(
            name,
            MessageLocation {
                package: package.to_owned(),
                nesting,
            },
        );
    }

    pub fn get(&self, ty: &TypeReference) -> Option<&MessageLocation> {
        self.messages.get(ty.as_str())
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// A protobuf type together with the Rust type that names it.
#[derive(Debug, Clone)]
pub struct ResolvedType {
    pub proto: TypeReference,
    /// Type on the HTTP side of the gateway.
    pub rust: syn::Type,
}

impl ResolvedType {
    /// `google.protobuf.Empty`: the gateway speaks the runtime's `Empty`
    /// while the tonic trait takes and returns `()`.
    pub fn is_empty_message(&self) -> bool {
        self.proto.as_str() == EMPTY
    }
}

/// `use <path> as <alias>;` items a generated file needs, keyed by alias.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSet {
    imports: BTreeMap<String, String>,
}

impl ImportSet {
    /// Import `path` under `alias`, returning the alias actually used.
    ///
    /// When `alias` already names another path, a numeric suffix is added
    /// (`pb_a_b_2`, `pb_a_b_3`, ...) until the alias is free or already
    /// bound to `path`.
    pub fn register(&mut self, alias: impl Into<String>, path: impl Into<String>) -> String {
        let base = alias.into();
        let path = path.into();
        let mut candidate = base.clone();
        let mut suffix = 1;
        loop {
            match self.imports.get(&candidate) {
                None => {
                    self.imports.insert(candidate.clone(), path);
                    return candidate;
                }
                Some(bound) if *bound == path => return candidate,
                Some(_) => {
                    suffix += 1;
                    candidate = format!("{base}_{suffix}");
                }
            }
        }
    }

    /// `(alias, path)` pairs in alias order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.imports.iter().map(|(alias, path)| (alias.as_str(), path.as_str()))
    }

    pub fn len(&self) -> usize {
        self.imports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
    }
}

/// Maps protobuf type names to Rust types, recording the imports the
/// resulting paths depend on.
pub trait TypeResolver {
    fn resolve(&mut self, ty: &TypeReference) -> Result<ResolvedType, GenerateError>;

    /// Module path of the file's own package, e.g. for server traits.
    fn own_package(&mut self) -> Path;

    fn imports(&self) -> &ImportSet;
}

/// [`TypeResolver`] for prost-generated message modules.
pub struct ProstResolver<'a> {
    file: &'a str,
    package: &'a str,
    index: &'a DescriptorIndex,
    options: &'a GeneratorOptions,
    imports: ImportSet,
}

impl<'a> ProstResolver<'a> {
    pub fn new(
        file: &'a str,
        package: &'a str,
        index: &'a DescriptorIndex,
        options: &'a GeneratorOptions,
    ) -> Self {
        Self {
            file,
            package,
            index,
            options,
            imports: ImportSet::default(),
        }
    }

    pub fn into_imports(self) -> ImportSet {
        self.imports
    }

    fn package_alias(&mut self, ty: &TypeReference, package: &str) -> Result<String, GenerateError> {
        if package == self.package {
            self.imports
                .register(OWN_PACKAGE_ALIAS, self.options.pb_path.as_str());
            return Ok(OWN_PACKAGE_ALIAS.to_owned());
        }
        let path = self.options.extern_module(package).ok_or_else(|| {
            self.unresolved(
                ty,
                format!("package `{package}` is not covered by an `extern_path` option"),
            )
        })?;
        let alias = format!("{OWN_PACKAGE_ALIAS}_{}", package.replace('.', "_").to_snake_case());
        Ok(self.imports.register(alias, path))
    }

    fn unresolved(&self, ty: &TypeReference, reason: impl Into<String>) -> GenerateError {
        GenerateError::UnresolvedType {
            file: self.file.to_owned(),
            type_name: ty.to_string(),
            reason: reason.into(),
        }
    }
}

impl TypeResolver for ProstResolver<'_> {
    fn resolve(&mut self, ty: &TypeReference) -> Result<ResolvedType, GenerateError> {
        if ty.as_str() == EMPTY {
            let rt: Path = syn::parse_str(&self.options.runtime_path).map_err(|err| {
                self.unresolved(ty, format!("runtime path `{}`: {err}", self.options.runtime_path))
            })?;
            return Ok(ResolvedType {
                proto: ty.clone(),
                rust: syn::parse_quote!(#rt::Empty),
            });
        }
        let location = self
            .index
            .get(ty)
            .ok_or_else(|| self.unresolved(ty, "no message with this name in the request"))?
            .clone();
        let alias = self.package_alias(ty, &location.package)?;

        let (name, outer) = location
            .nesting
            .split_last()
            .ok_or_else(|| self.unresolved(ty, "empty message name"))?;
        let segments = std::iter::once(ident(&alias))
            .chain(outer.iter().map(|parent| ident(&module_ident(parent))))
            .chain(std::iter::once(ident(&type_ident(name))));

        Ok(ResolvedType {
            proto: ty.clone(),
            rust: syn::Type::Path(syn::TypePath {
                qself: None,
                path: path_of(segments),
            }),
        })
    }

    fn own_package(&mut self) -> Path {
        self.imports
            .register(OWN_PACKAGE_ALIAS, self.options.pb_path.as_str());
        path_of([ident(OWN_PACKAGE_ALIAS)])
    }

    fn imports(&self) -> &ImportSet {
        &self.imports
    }
}

/// prost's name for a message, enum or service trait.
pub fn type_ident(name: &str) -> String {
    let mut ident = name.to_upper_camel_case();
    if ident == "Self" {
        ident.push('_');
    }
    ident
}

/// prost's name for a module or method, raw-escaped when it is a keyword.
pub fn module_ident(name: &str) -> String {
    let mut ident = name.to_snake_case();
    match ident.as_str() {
        "as" | "break" | "const" | "continue" | "else" | "enum" | "false" | "fn" | "for"
        | "if" | "impl" | "in" | "let" | "loop" | "match" | "mod" | "move" | "mut" | "pub"
        | "ref" | "return" | "static" | "struct" | "trait" | "true" | "type" | "unsafe"
        | "use" | "where" | "while" | "dyn" | "abstract" | "become" | "box" | "do"
        | "final" | "macro" | "override" | "priv" | "typeof" | "unsized" | "virtual"
        | "yield" | "async" | "await" | "try" | "gen" => ident.insert_str(0, "r#"),
        "_" | "super" | "self" | "crate" | "extern" => ident.push('_'),
        _ => {}
    }
    ident
}

/// tonic's module name for a service: lowercase, `_` before each uppercase
/// letter of the UpperCamel service name.
pub fn server_module(service: &str) -> String {
    let name = type_ident(service);
    let mut module = String::with_capacity(name.len() + 4);
    let mut chars = name.chars().peekable();
    while let Some(c) = chars.next() {
        module.push(c.to_ascii_lowercase());
        if chars.peek().is_some_and(|next| next.is_uppercase()) {
            module.push('_');
        }
    }
    module.push_str("_server");
    module
}

/// Identifier from a name that may carry an `r#` prefix.
pub fn ident(name: &str) -> Ident {
    match name.strip_prefix("r#") {
        Some(raw) => Ident::new_raw(raw, Span::call_site()),
        None => Ident::new(name, Span::call_site()),
    }
}

pub fn path_of(segments: impl IntoIterator<Item = Ident>) -> Path {
    Path {
        leading_colon: None,
        segments: segments.into_iter().map(PathSegment::from).collect(),
    }
}
