//! Gateway synthesis: turns a [`GatewaySpec`] into a `syn::File`.
//!
//! Output is built from `quote!` fragments and parsed back into a
//! `syn::File`, so anything that is not a well-formed Rust item is caught
//! here rather than by the consumer's compiler.

mod server;
mod service;

use proc_macro2::TokenStream;
use quote::quote;

use crate::error::GenerateError;
use crate::gateway::GatewaySpec;
use crate::resolver::ident;

/// Build the items of one generated file.
pub fn synthesize(spec: &GatewaySpec) -> Result<syn::File, GenerateError> {
    let render_err = |reason: String| GenerateError::Render {
        file: spec.source.clone(),
        reason,
    };

    let rt: syn::Path = syn::parse_str(&spec.runtime_path)
        .map_err(|err| render_err(format!("runtime path `{}`: {err}", spec.runtime_path)))?;

    let mut imports = Vec::with_capacity(spec.imports.len());
    for (alias, path) in spec.imports.iter() {
        let path: syn::Path =
            syn::parse_str(path).map_err(|err| render_err(format!("import path `{path}`: {err}")))?;
        let alias = ident(alias);
        imports.push(quote! { use #path as #alias; });
    }

    let services: Vec<TokenStream> = spec
        .services
        .iter()
        .map(|service| service::generate_gateway(service, &rt))
        .collect();
    let server = server::generate_server(spec, &rt);

    let tokens = quote! {
        #(#imports)*
        #(#services)*
        #server
    };
    syn::parse2(tokens).map_err(|err| render_err(err.to_string()))
}
