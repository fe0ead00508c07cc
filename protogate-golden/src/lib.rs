//! helloworld gateways generated by `build.rs`.
//!
//! `gateway` routes every call through an optional interceptor;
//! `plain_gateway` is generated with `interceptors=false`.

pub mod pb;
pub mod service;

pub mod gateway {
    include!(concat!(env!("OUT_DIR"), "/helloworld.http.rs"));
}

pub mod plain_gateway {
    include!(concat!(env!("OUT_DIR"), "/plain/helloworld.http.rs"));
}
