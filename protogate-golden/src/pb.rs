//! prost messages and tonic server traits for the `helloworld` package.
//!
//! Written in the shape `tonic-build` emits, with serde derives added the
//! way a `type_attribute(".", ...)` build option would.

#[derive(Clone, PartialEq, ::prost::Message, ::serde::Serialize, ::serde::Deserialize)]
#[serde(default)]
pub struct HelloRequest {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message, ::serde::Serialize, ::serde::Deserialize)]
#[serde(default)]
pub struct HelloReply {
    #[prost(string, tag = "1")]
    pub message: ::prost::alloc::string::String,
    #[prost(enumeration = "Mood", tag = "2")]
    pub mood: i32,
    #[prost(int32, tag = "3")]
    pub count: i32,
}

#[derive(Clone, PartialEq, ::prost::Message, ::serde::Serialize, ::serde::Deserialize)]
#[serde(default)]
pub struct ShortenRequest {
    #[prost(string, tag = "1")]
    pub url: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message, ::serde::Serialize, ::serde::Deserialize)]
#[serde(default)]
pub struct ShortenReply {
    #[prost(message, optional, tag = "1")]
    pub link: ::core::option::Option<shorten_reply::Link>,
    #[prost(string, tag = "2")]
    pub code: ::prost::alloc::string::String,
}

/// Nested message and enum types in `ShortenReply`.
pub mod shorten_reply {
    #[derive(Clone, PartialEq, ::prost::Message, ::serde::Serialize, ::serde::Deserialize)]
    #[serde(default)]
    pub struct Link {
        #[prost(string, tag = "1")]
        pub url: ::prost::alloc::string::String,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Mood {
    Unspecified = 0,
    Happy = 1,
    Sad = 2,
}

/// Generated server implementations.
pub mod greeter_server {
    use tonic::codegen::*;

    #[async_trait]
    pub trait Greeter: std::marker::Send + std::marker::Sync + 'static {
        async fn say_hello(
            &self,
            request: tonic::Request<super::HelloRequest>,
        ) -> std::result::Result<tonic::Response<super::HelloReply>, tonic::Status>;
        async fn say_goodbye(
            &self,
            request: tonic::Request<super::HelloRequest>,
        ) -> std::result::Result<tonic::Response<super::HelloReply>, tonic::Status>;
        async fn ping(
            &self,
            request: tonic::Request<()>,
        ) -> std::result::Result<tonic::Response<()>, tonic::Status>;
    }
}

/// Generated server implementations.
pub mod url_shortener_server {
    use tonic::codegen::*;

    #[async_trait]
    pub trait UrlShortener: std::marker::Send + std::marker::Sync + 'static {
        async fn shorten_url(
            &self,
            request: tonic::Request<super::ShortenRequest>,
        ) -> std::result::Result<tonic::Response<super::ShortenReply>, tonic::Status>;
        async fn expand(
            &self,
            request: tonic::Request<super::shorten_reply::Link>,
        ) -> std::result::Result<tonic::Response<super::ShortenRequest>, tonic::Status>;
        async fn new(
            &self,
            request: tonic::Request<super::ShortenRequest>,
        ) -> std::result::Result<tonic::Response<super::ShortenReply>, tonic::Status>;
    }
}
