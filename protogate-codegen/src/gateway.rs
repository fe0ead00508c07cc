//! The fully resolved description of one generated file.
//!
//! A [`GatewaySpec`] is built in one go: every type of every service is
//! resolved before anything is synthesized, so a file either renders
//! completely or not at all.

use std::collections::BTreeSet;

use syn::{Ident, Path};
use tracing::{debug, warn};

use crate::error::GenerateError;
use crate::options::GeneratorOptions;
use crate::resolver::{
    ident, path_of, server_module, type_ident, DescriptorIndex, ImportSet, ProstResolver, TypeResolver,
};
use crate::routes::{build_route_table, path_collisions, RouteEntry};
use crate::schema::SchemaFile;

/// How many interceptors a generated gateway can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterceptorSlot {
    /// Wrappers call the service directly.
    None,
    /// Constructors accept zero or one interceptor.
    Single,
}

#[derive(Debug, Clone)]
pub struct ServiceGateway {
    /// Service name as declared in the schema.
    pub name: String,
    /// `package.Service`.
    pub qualified_name: String,
    /// `<Service>Gateway`.
    pub gateway_ident: Ident,
    /// Path of the tonic server trait, `pb::<service>_server::<Service>`.
    pub trait_path: Path,
    /// `register_<service>_server` on the aggregate server.
    pub register_ident: Ident,
    pub routes: Vec<RouteEntry>,
    pub interceptor: InterceptorSlot,
}

#[derive(Debug, Clone)]
pub struct GatewaySpec {
    /// Schema file the output was generated from.
    pub source: String,
    pub output_file: String,
    pub imports: ImportSet,
    pub runtime_path: String,
    pub services: Vec<ServiceGateway>,
}

impl GatewaySpec {
    /// Resolve `file` against the request's descriptors.
    ///
    /// Returns `Ok(None)` for files that declare no service.
    pub fn build(
        file: &SchemaFile,
        index: &DescriptorIndex,
        options: &GeneratorOptions,
    ) -> Result<Option<Self>, GenerateError> {
        if !file.has_services() {
            debug!(file = %file.name, "no services, nothing to generate");
            return Ok(None);
        }

        let interceptor = if options.interceptors {
            InterceptorSlot::Single
        } else {
            InterceptorSlot::None
        };
        let mut resolver = ProstResolver::new(&file.name, &file.package, index, options);
        let mut services = Vec::with_capacity(file.services.len());

        for service in &file.services {
            let routes = build_route_table(file, service, &mut resolver)?;
            let mut wrappers = BTreeSet::new();
            if let Some(route) = routes.iter().find(|route| !wrappers.insert(route.wrapper_method.to_string())) {
                return Err(GenerateError::Render {
                    file: file.name.clone(),
                    reason: format!(
                        "method `{}` of `{}` maps to gateway method `{}`, which is already taken",
                        route.method, service.name, route.wrapper_method
                    ),
                });
            }
            let trait_name = type_ident(&service.name);
            let module = server_module(&service.name);
            let pb = resolver.own_package();
            let trait_path = path_of(
                pb.segments
                    .into_iter()
                    .map(|segment| segment.ident)
                    .chain([ident(&module), ident(&trait_name)]),
            );
            let qualified_name = file.qualified_service_name(service);
            debug!(
                file = %file.name,
                service = %qualified_name,
                routes = routes.len(),
                "resolved service"
            );
            services.push(ServiceGateway {
                name: service.name.clone(),
                qualified_name,
                gateway_ident: ident(&format!("{trait_name}Gateway")),
                trait_path,
                register_ident: ident(&format!("register_{module}")),
                routes,
                interceptor,
            });
        }

        for (path, methods) in path_collisions(services.iter().flat_map(|s| &s.routes)) {
            warn!(
                file = %file.name,
                path,
                methods = ?methods,
                "route path claimed by several methods; registering this file's server will fail"
            );
        }

        Ok(Some(Self {
            source: file.name.clone(),
            output_file: file.output_file_name(),
            imports: resolver.into_imports(),
            runtime_path: options.runtime_path.clone(),
            services,
        }))
    }
}
