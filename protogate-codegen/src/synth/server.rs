//! Aggregate `Server` merging every gateway of a file.

use proc_macro2::TokenStream;
use quote::quote;

use crate::gateway::{GatewaySpec, InterceptorSlot, ServiceGateway};

pub fn generate_server(spec: &GatewaySpec, rt: &syn::Path) -> TokenStream {
    let doc = format!(" Serves every gateway declared in `{}` from one router.", spec.source);
    let intercepted = spec
        .services
        .iter()
        .all(|service| service.interceptor == InterceptorSlot::Single);

    let constructor = if intercepted {
        quote! {
            /// Create a server sharing zero or one interceptor between all
            /// registered gateways. More than one is an error; compose them
            /// with an `InterceptorChain` instead.
            pub fn new<I>(interceptors: I) -> ::std::result::Result<Self, #rt::GatewayError>
            where
                I: ::std::iter::IntoIterator<Item = ::std::sync::Arc<dyn #rt::Interceptor>>,
            {
                ::std::result::Result::Ok(Self {
                    inner: #rt::GatewayServer::new(interceptors)?,
                })
            }
        }
    } else {
        quote! {
            pub fn new() -> Self {
                Self {
                    inner: #rt::GatewayServer::default(),
                }
            }
        }
    };

    let default_impl = (!intercepted).then(|| {
        quote! {
            impl ::std::default::Default for Server {
                fn default() -> Self {
                    Self::new()
                }
            }
        }
    });

    let registrations: Vec<TokenStream> = spec
        .services
        .iter()
        .map(|service| generate_registration(service, rt, intercepted))
        .collect();

    quote! {
        #[doc = #doc]
        pub struct Server {
            inner: #rt::GatewayServer,
        }

        #default_impl

        impl Server {
            #constructor

            /// Replace the JSON codec used by gateways registered afterwards.
            pub fn with_codec_options(self, options: #rt::CodecOptions) -> Self {
                Self {
                    inner: self.inner.with_codec_options(options),
                }
            }

            #(#registrations)*

            pub fn routes(&self) -> &#rt::RouteMap {
                self.inner.routes()
            }

            pub fn into_router(self) -> #rt::Router {
                self.inner.into_router()
            }

            /// Serve the merged routes until Ctrl-C or SIGTERM.
            pub async fn serve(
                self,
                listener: #rt::TcpListener,
            ) -> ::std::result::Result<(), #rt::GatewayError> {
                self.inner.serve(listener).await
            }

            pub async fn serve_with_shutdown<F>(
                self,
                listener: #rt::TcpListener,
                signal: F,
            ) -> ::std::result::Result<(), #rt::GatewayError>
            where
                F: ::std::future::Future<Output = ()> + ::std::marker::Send + 'static,
            {
                self.inner.serve_with_shutdown(listener, signal).await
            }
        }
    }
}

fn generate_registration(service: &ServiceGateway, rt: &syn::Path, intercepted: bool) -> TokenStream {
    let register = &service.register_ident;
    let gateway = &service.gateway_ident;
    let service_trait = &service.trait_path;
    let doc = format!(" Register the routes of `{}`.", service.qualified_name);
    let construct = if intercepted {
        quote! {
            #gateway::from_parts(
                ::std::sync::Arc::new(srv),
                ::std::clone::Clone::clone(self.inner.interceptor()),
                ::std::clone::Clone::clone(self.inner.codec()),
            )
        }
    } else {
        quote! {
            #gateway::from_parts(
                ::std::sync::Arc::new(srv),
                ::std::clone::Clone::clone(self.inner.codec()),
            )
        }
    };

    quote! {
        #[doc = #doc]
        pub fn #register<S: #service_trait>(
            &mut self,
            srv: S,
        ) -> ::std::result::Result<&mut Self, #rt::GatewayError> {
            let gateway = #construct;
            self.inner.register(gateway.route_map()?)?;
            ::std::result::Result::Ok(self)
        }
    }
}
