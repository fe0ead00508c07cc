//! Per-service gateway: struct, constructors, route map, method wrappers.

use proc_macro2::TokenStream;
use quote::quote;

use crate::gateway::{InterceptorSlot, ServiceGateway};
use crate::routes::RouteEntry;

pub fn generate_gateway(service: &ServiceGateway, rt: &syn::Path) -> TokenStream {
    let gateway = &service.gateway_ident;
    let service_trait = &service.trait_path;
    let qualified_name = &service.qualified_name;
    let doc = format!(" HTTP/JSON gateway for `{qualified_name}`.");
    let intercepted = service.interceptor == InterceptorSlot::Single;

    let (fields, clone_fields, constructors) = if intercepted {
        (
            quote! {
                srv: ::std::sync::Arc<S>,
                interceptor: #rt::InterceptorSlot,
                codec: ::std::sync::Arc<#rt::JsonCodec>,
            },
            quote! {
                srv: ::std::clone::Clone::clone(&self.srv),
                interceptor: ::std::clone::Clone::clone(&self.interceptor),
                codec: ::std::clone::Clone::clone(&self.codec),
            },
            quote! {
                /// Wrap `srv`, optionally routing every call through `interceptor`.
                pub fn new(
                    srv: S,
                    interceptor: ::std::option::Option<::std::sync::Arc<dyn #rt::Interceptor>>,
                ) -> Self {
                    Self::from_parts(
                        ::std::sync::Arc::new(srv),
                        #rt::InterceptorSlot::from(interceptor),
                        ::std::sync::Arc::new(#rt::JsonCodec::default()),
                    )
                }

                pub fn from_parts(
                    srv: ::std::sync::Arc<S>,
                    interceptor: #rt::InterceptorSlot,
                    codec: ::std::sync::Arc<#rt::JsonCodec>,
                ) -> Self {
                    Self { srv, interceptor, codec }
                }
            },
        )
    } else {
        (
            quote! {
                srv: ::std::sync::Arc<S>,
                codec: ::std::sync::Arc<#rt::JsonCodec>,
            },
            quote! {
                srv: ::std::clone::Clone::clone(&self.srv),
                codec: ::std::clone::Clone::clone(&self.codec),
            },
            quote! {
                pub fn new(srv: S) -> Self {
                    Self::from_parts(
                        ::std::sync::Arc::new(srv),
                        ::std::sync::Arc::new(#rt::JsonCodec::default()),
                    )
                }

                pub fn from_parts(
                    srv: ::std::sync::Arc<S>,
                    codec: ::std::sync::Arc<#rt::JsonCodec>,
                ) -> Self {
                    Self { srv, codec }
                }
            },
        )
    };

    let routes: Vec<TokenStream> = service.routes.iter().map(|route| generate_route(route, rt)).collect();
    let wrappers: Vec<TokenStream> = service
        .routes
        .iter()
        .map(|route| generate_wrapper(route, service_trait, rt, intercepted))
        .collect();

    quote! {
        #[doc = #doc]
        pub struct #gateway<S> {
            #fields
        }

        impl<S> ::std::clone::Clone for #gateway<S> {
            fn clone(&self) -> Self {
                Self { #clone_fields }
            }
        }

        impl<S: #service_trait> #gateway<S> {
            pub const SERVICE_NAME: &'static str = #qualified_name;

            #constructors

            /// One route per unary method, in declaration order.
            pub fn route_map(&self) -> ::std::result::Result<#rt::RouteMap, #rt::GatewayError> {
                ::std::result::Result::Ok(#rt::RouteMap::new() #(#routes)*)
            }

            #(#wrappers)*
        }
    }
}

/// `.with(path, handler)?` for one route.
fn generate_route(route: &RouteEntry, rt: &syn::Path) -> TokenStream {
    let path = &route.path;
    let method = &route.wrapper_method;
    let input = &route.input.rust;

    quote! {
        .with(#path, {
            let gateway = ::std::clone::Clone::clone(self);
            #rt::unary(
                #path,
                ::std::clone::Clone::clone(&self.codec),
                move |ctx: #rt::CallContext, input: #input| {
                    let gateway = ::std::clone::Clone::clone(&gateway);
                    async move { gateway.#method(ctx, input).await }
                },
            )
        })?
    }
}

/// Typed wrapper bridging the route to the tonic service method.
fn generate_wrapper(
    route: &RouteEntry,
    service_trait: &syn::Path,
    rt: &syn::Path,
    intercepted: bool,
) -> TokenStream {
    let method = &route.rust_method;
    let wrapper = &route.wrapper_method;
    let input = &route.input.rust;
    let output = &route.output.rust;
    let full_method = &route.full_method;
    let doc = format!(" Calls `{}` (`{}`).", route.method, route.path);
    let signature = quote! {
        #[doc = #doc]
        pub async fn #wrapper(
            &self,
            ctx: #rt::CallContext,
            input: #input,
        ) -> ::std::result::Result<#output, #rt::tonic::Status>
    };

    // `Empty` crosses into the tonic trait as `()`.
    let message = if route.input.is_empty_message() {
        quote! { ::std::convert::From::from(input) }
    } else {
        quote! { input }
    };
    let into_output = if route.output.is_empty_message() {
        quote! { |response| #output::from(response.into_inner()) }
    } else {
        quote! { #rt::tonic::Response::into_inner }
    };

    if !intercepted {
        return quote! {
            #signature {
                #service_trait::#method(&*self.srv, ctx.into_request(#message))
                    .await
                    .map(#into_output)
            }
        };
    }

    quote! {
        #signature {
            let srv = ::std::clone::Clone::clone(&self.srv);
            let call = move |ctx: #rt::CallContext, input: #input| async move {
                #service_trait::#method(&*srv, ctx.into_request(#message))
                    .await
                    .map(#into_output)
            };
            match self.interceptor.get() {
                ::std::option::Option::Some(interceptor) => {
                    let service: ::std::sync::Arc<dyn ::std::any::Any + ::std::marker::Send + ::std::marker::Sync> =
                        self.srv.clone();
                    let info = #rt::MethodInfo::new(#full_method, service);
                    #rt::invoke_intercepted(&**interceptor, &info, ctx, input, call).await
                }
                ::std::option::Option::None => call(ctx, input).await,
            }
        }
    }
}
