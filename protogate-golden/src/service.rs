//! Reference service implementations used by the gateway tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Mutex;

use tonic::{Request, Response, Status};

use crate::pb::greeter_server::Greeter;
use crate::pb::shorten_reply::Link;
use crate::pb::url_shortener_server::UrlShortener;
use crate::pb::{HelloReply, HelloRequest, Mood, ShortenReply, ShortenRequest};

/// Metadata key whose value replaces the default greeting.
pub const GREETING_KEY: &str = "x-greeting";

/// Base URL of the links handed out by [`MemoryShortener`].
pub const SHORT_BASE: &str = "https://sho.rt/";

#[derive(Debug, Default)]
pub struct MyGreeter {
    calls: AtomicI32,
}

impl MyGreeter {
    pub fn calls(&self) -> i32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[tonic::async_trait]
impl Greeter for MyGreeter {
    async fn say_hello(&self, request: Request<HelloRequest>) -> Result<Response<HelloReply>, Status> {
        let count = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let greeting = request
            .metadata()
            .get(GREETING_KEY)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("Hello")
            .to_owned();
        let name = request.into_inner().name;
        Ok(Response::new(HelloReply {
            message: format!("{greeting} {name}"),
            mood: Mood::Happy as i32,
            count,
        }))
    }

    async fn say_goodbye(&self, request: Request<HelloRequest>) -> Result<Response<HelloReply>, Status> {
        let name = request.into_inner().name;
        if name.is_empty() {
            return Err(Status::invalid_argument("name is required"));
        }
        Ok(Response::new(HelloReply {
            message: format!("Goodbye {name}"),
            ..Default::default()
        }))
    }

    async fn ping(&self, _request: Request<()>) -> Result<Response<()>, Status> {
        Ok(Response::new(()))
    }
}

/// In-memory URL shortener.
#[derive(Debug, Default)]
pub struct MemoryShortener {
    links: Mutex<HashMap<String, String>>,
}

impl MemoryShortener {
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, Status> {
        self.links
            .lock()
            .map_err(|_| Status::internal("link table poisoned"))
    }

    fn shorten(&self, url: String) -> Result<ShortenReply, Status> {
        if url.is_empty() {
            return Err(Status::invalid_argument("url is required"));
        }
        let mut links = self.lock()?;
        let code = format!("{:x}", links.len() + 1);
        links.insert(format!("{SHORT_BASE}{code}"), url);
        Ok(ShortenReply {
            link: Some(Link {
                url: format!("{SHORT_BASE}{code}"),
            }),
            code,
        })
    }
}

#[tonic::async_trait]
impl UrlShortener for MemoryShortener {
    async fn shorten_url(&self, request: Request<ShortenRequest>) -> Result<Response<ShortenReply>, Status> {
        self.shorten(request.into_inner().url).map(Response::new)
    }

    /// Same as `shorten_url`; exists under a name the gateway has to rename.
    async fn new(&self, request: Request<ShortenRequest>) -> Result<Response<ShortenReply>, Status> {
        self.shorten(request.into_inner().url).map(Response::new)
    }

    async fn expand(&self, request: Request<Link>) -> Result<Response<ShortenRequest>, Status> {
        let short = request.into_inner().url;
        let url = self
            .lock()?
            .get(&short)
            .cloned()
            .ok_or_else(|| Status::not_found(format!("unknown link {short}")))?;
        Ok(Response::new(ShortenRequest { url }))
    }
}
