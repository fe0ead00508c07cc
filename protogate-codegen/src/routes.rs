use std::collections::BTreeMap;

use syn::Ident;
use tracing::warn;

use crate::error::GenerateError;
use crate::mangle::mangle;
use crate::resolver::{ident, module_ident, ResolvedType, TypeResolver};
use crate::schema::{SchemaFile, ServiceDescriptor};

/// One HTTP route bound to one RPC method.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    /// `/<service>/<method>`, both mangled.
    pub path: String,
    /// gRPC method name, `/package.Service/Method`.
    pub full_method: String,
    /// Method name as declared in the schema.
    pub method: String,
    /// Name of the method on the tonic server trait.
    pub rust_method: Ident,
    /// Name of the typed wrapper on the generated gateway.
    pub wrapper_method: Ident,
    pub input: ResolvedType,
    pub output: ResolvedType,
}

/// Associated items every generated gateway defines besides its wrappers.
pub const RESERVED_GATEWAY_ITEMS: &[&str] = &["new", "from_parts", "route_map"];

/// Wrapper name for a trait method, moved aside when it would clash with
/// one of the gateway's own associated items.
pub fn wrapper_ident(rust_method: &str) -> Ident {
    if RESERVED_GATEWAY_ITEMS.contains(&rust_method) {
        ident(&format!("{rust_method}_rpc"))
    } else {
        ident(rust_method)
    }
}

/// Build the routes of `service`, in declaration order.
///
/// Streaming methods cannot be served as a single JSON request/response
/// and are skipped. Any unresolvable input or output type fails the whole
/// file.
pub fn build_route_table(
    file: &SchemaFile,
    service: &ServiceDescriptor,
    resolver: &mut dyn TypeResolver,
) -> Result<Vec<RouteEntry>, GenerateError> {
    let service_segment = mangle(&service.name);
    let qualified = file.qualified_service_name(service);
    let mut routes = Vec::with_capacity(service.methods.len());

    for method in &service.methods {
        if !method.is_unary() {
            warn!(
                file = %file.name,
                service = %qualified,
                method = %method.name,
                "skipping streaming method: only unary methods can be bridged to HTTP/JSON"
            );
            continue;
        }
        let rust_method = module_ident(&method.name);
        routes.push(RouteEntry {
            path: format!("/{service_segment}/{}", mangle(&method.name)),
            full_method: format!("/{qualified}/{}", method.name),
            method: method.name.clone(),
            wrapper_method: wrapper_ident(&rust_method),
            rust_method: ident(&rust_method),
            input: resolver.resolve(&method.input_type)?,
            output: resolver.resolve(&method.output_type)?,
        });
    }

    Ok(routes)
}

/// Paths claimed by more than one route, with the methods claiming them.
pub fn path_collisions<'a>(routes: impl IntoIterator<Item = &'a RouteEntry>) -> Vec<(&'a str, Vec<&'a str>)> {
    let mut by_path: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for route in routes {
        by_path
            .entry(route.path.as_str())
            .or_default()
            .push(route.full_method.as_str());
    }
    by_path
        .into_iter()
        .filter(|(_, methods)| methods.len() > 1)
        .collect()
}
