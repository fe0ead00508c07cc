use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use protogate::prelude::*;
use protogate::RouteMap;
use protogate_golden::gateway::{self, GreeterGateway, UrlShortenerGateway};
use protogate_golden::pb::{HelloReply, HelloRequest, Mood, ShortenRequest};
use protogate_golden::plain_gateway;
use protogate_golden::service::{MemoryShortener, MyGreeter, GREETING_KEY};
use protogate_test::TestApp;
use serde_json::json;

/// Counts calls, records method names and sets the greeting metadata.
#[derive(Default)]
struct Counter {
    calls: AtomicUsize,
    methods: Mutex<Vec<&'static str>>,
    names: Mutex<Vec<(String, String)>>,
}

impl Interceptor for Counter {
    fn intercept<'a>(
        &'a self,
        mut ctx: CallContext,
        request: Box<dyn DynMessage>,
        info: &'a MethodInfo,
        next: Next<'a>,
    ) -> BoxFuture<'a, InterceptResult> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.methods.lock().unwrap().push(info.full_method);
            self.names
                .lock()
                .unwrap()
                .push((info.service_name().to_owned(), info.method_name().to_owned()));
            ctx.headers_mut().insert(GREETING_KEY, "Hi".parse().unwrap());
            next.run(ctx, request).await
        })
    }
}

/// Rejects every call without reaching the service.
struct Deny;

impl Interceptor for Deny {
    fn intercept<'a>(
        &'a self,
        _ctx: CallContext,
        _request: Box<dyn DynMessage>,
        _info: &'a MethodInfo,
        _next: Next<'a>,
    ) -> BoxFuture<'a, InterceptResult> {
        Box::pin(async { Err(Status::permission_denied("denied")) })
    }
}

/// Rewrites the reply after the service ran.
struct Shout;

impl Interceptor for Shout {
    fn intercept<'a>(
        &'a self,
        ctx: CallContext,
        request: Box<dyn DynMessage>,
        info: &'a MethodInfo,
        next: Next<'a>,
    ) -> BoxFuture<'a, InterceptResult> {
        Box::pin(async move {
            assert!(info.service_ref::<MyGreeter>().is_some());
            let mut reply = next.run(ctx, request).await?;
            if let Some(reply) = reply.downcast_mut::<HelloReply>() {
                reply.message = reply.message.to_uppercase();
            }
            Ok(reply)
        })
    }
}

fn server(interceptor: Option<Arc<dyn Interceptor>>) -> gateway::Server {
    let mut server = gateway::Server::new(interceptor).unwrap();
    server
        .register_greeter_server(MyGreeter::default())
        .unwrap()
        .register_url_shortener_server(MemoryShortener::default())
        .unwrap();
    server
}

fn app(interceptor: Option<Arc<dyn Interceptor>>) -> TestApp {
    TestApp::new(server(interceptor).into_router())
}

#[tokio::test]
async fn unary_call_returns_every_field() {
    app(None)
        .call("/greeter/say_hello", &json!({"name": "Ada"}))
        .await
        .assert_ok()
        .assert_content_type("application/json")
        .assert_json_object(&["message", "mood", "count"])
        .assert_json(json!({"message": "Hello Ada", "mood": Mood::Happy as i32, "count": 1}));
}

#[tokio::test]
async fn defaults_are_emitted() {
    app(None)
        .call("/greeter/say_goodbye", &json!({"name": "Ada"}))
        .await
        .assert_ok()
        .assert_json(json!({"message": "Goodbye Ada", "mood": 0, "count": 0}));
}

#[tokio::test]
async fn empty_body_decodes_to_default_input() {
    app(None)
        .post("/greeter/say_hello")
        .send()
        .await
        .assert_ok()
        .assert_json_pointer("/message", "Hello ");
}

#[tokio::test]
async fn empty_message_is_an_empty_object() {
    let app = app(None);
    app.call("/greeter/ping", &json!({}))
        .await
        .assert_ok()
        .assert_content_type("application/json")
        .assert_json(json!({}));

    app.call_empty("/greeter/ping")
        .await
        .assert_ok()
        .assert_json(json!({}));
}

#[tokio::test]
async fn empty_message_ignores_unknown_fields() {
    app(None)
        .call("/greeter/ping", &json!({"extra": true}))
        .await
        .assert_ok()
        .assert_json(json!({}));
}

#[tokio::test]
async fn empty_message_through_interceptor() {
    let counter = Arc::new(Counter::default());
    app(Some(counter.clone()))
        .call("/greeter/ping", &json!({}))
        .await
        .assert_ok()
        .assert_json(json!({}));
    assert_eq!(*counter.methods.lock().unwrap(), ["/helloworld.Greeter/Ping"]);

    let reply = GreeterGateway::new(MyGreeter::default(), None)
        .ping(CallContext::default(), Empty {})
        .await
        .unwrap();
    assert_eq!(reply, Empty {});
}

#[tokio::test]
async fn nested_message_types_resolve() {
    let app = app(None);
    let reply = app
        .call("/url_shortener/shorten_url", &json!({"url": "https://example.com"}))
        .await
        .assert_ok()
        .assert_json_pointer("/code", "1");
    let link = reply.json::<serde_json::Value>()["link"].clone();
    assert_eq!(link, json!({"url": "https://sho.rt/1"}));

    app.call("/url_shortener/expand", &link)
        .await
        .assert_ok()
        .assert_json(json!({"url": "https://example.com"}));
}

#[tokio::test]
async fn only_post_is_allowed() {
    app(None)
        .get("/greeter/say_hello")
        .send()
        .await
        .assert_allow("POST")
        .assert_empty_body();
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    app(None)
        .call("/greeter/say_hi", &json!({}))
        .await
        .assert_not_found();
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    app(None)
        .post("/greeter/say_hello")
        .body(r#"{"name": "#)
        .send()
        .await
        .assert_bad_request();

    app(None)
        .call("/greeter/say_hello", &json!({"name": 7}))
        .await
        .assert_bad_request();
}

#[tokio::test]
async fn service_error_is_internal_error_with_empty_body() {
    app(None)
        .call("/greeter/say_goodbye", &json!({}))
        .await
        .assert_call_failed();

    app(None)
        .call("/url_shortener/expand", &json!({"url": "https://sho.rt/404"}))
        .await
        .assert_call_failed();
}

#[tokio::test]
async fn one_request_runs_the_interceptor_once() {
    let counter = Arc::new(Counter::default());
    app(Some(counter.clone()))
        .call("/greeter/say_hello", &json!({"name": "Ada"}))
        .await
        .assert_ok()
        .assert_json(json!({"message": "Hi Ada", "mood": Mood::Happy as i32, "count": 1}));

    assert_eq!(counter.calls.load(Ordering::SeqCst), 1);
    assert_eq!(*counter.methods.lock().unwrap(), ["/helloworld.Greeter/SayHello"]);
    assert_eq!(
        *counter.names.lock().unwrap(),
        [("helloworld.Greeter".to_owned(), "SayHello".to_owned())]
    );
}

#[tokio::test]
async fn interceptor_runs_once_per_call() {
    let counter = Arc::new(Counter::default());
    let app = app(Some(counter.clone()));

    app.call("/greeter/say_hello", &json!({"name": "Ada"}))
        .await
        .assert_ok()
        .assert_json_pointer("/message", "Hi Ada");
    app.call("/url_shortener/shorten_url", &json!({"url": "https://example.com"}))
        .await
        .assert_ok();

    assert_eq!(counter.calls.load(Ordering::SeqCst), 2);
    assert_eq!(
        *counter.methods.lock().unwrap(),
        ["/helloworld.Greeter/SayHello", "/helloworld.URLShortener/ShortenURL"]
    );
}

#[tokio::test]
async fn interceptor_can_short_circuit() {
    app(Some(Arc::new(Deny)))
        .call("/greeter/say_hello", &json!({"name": "Ada"}))
        .await
        .assert_call_failed();
}

#[tokio::test]
async fn interceptor_can_rewrite_the_reply() {
    let gateway = GreeterGateway::new(MyGreeter::default(), Some(Arc::new(Shout)));
    let reply = gateway
        .say_hello(CallContext::default(), HelloRequest { name: "ada".into() })
        .await
        .unwrap();
    assert_eq!(reply.message, "HELLO ADA");
}

#[tokio::test]
async fn chained_interceptors_share_one_slot() {
    let counter = Arc::new(Counter::default());
    let interceptors: Vec<Arc<dyn Interceptor>> = vec![counter.clone(), Arc::new(Shout)];
    let chain = InterceptorChain::new(interceptors);
    app(Some(Arc::new(chain)))
        .call("/greeter/say_hello", &json!({"name": "Ada"}))
        .await
        .assert_ok()
        .assert_json_pointer("/message", "HI ADA");
    assert_eq!(counter.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn more_than_one_interceptor_is_rejected() {
    let two: Vec<Arc<dyn Interceptor>> = vec![Arc::new(Deny), Arc::new(Shout)];
    assert!(matches!(
        gateway::Server::new(two),
        Err(GatewayError::TooManyInterceptors { count: 2 })
    ));
}

#[test]
fn routes_follow_declaration_order() {
    let server = server(None);
    assert_eq!(
        server.routes().paths().collect::<Vec<_>>(),
        [
            "/greeter/say_hello",
            "/greeter/say_goodbye",
            "/greeter/ping",
            "/url_shortener/shorten_url",
            "/url_shortener/expand",
            "/url_shortener/new",
        ]
    );
    assert_eq!(GreeterGateway::<MyGreeter>::SERVICE_NAME, "helloworld.Greeter");
    assert_eq!(UrlShortenerGateway::<MemoryShortener>::SERVICE_NAME, "helloworld.URLShortener");
}

#[test]
fn registering_a_service_twice_fails() {
    let mut server = gateway::Server::new(None).unwrap();
    server.register_greeter_server(MyGreeter::default()).unwrap();
    assert!(matches!(
        server.register_greeter_server(MyGreeter::default()),
        Err(GatewayError::DuplicateRoute(path)) if path == "/greeter/say_hello"
    ));
}

#[tokio::test]
async fn gateway_route_map_serves_alone() {
    let routes: RouteMap = UrlShortenerGateway::new(MemoryShortener::default(), None)
        .route_map()
        .unwrap();
    assert_eq!(routes.len(), 3);
    TestApp::new(routes.into_router())
        .call("/url_shortener/shorten_url", &json!({"url": "https://example.com"}))
        .await
        .assert_ok();
}

#[tokio::test]
async fn codec_options_drop_defaults() {
    let mut server = gateway::Server::new(None)
        .unwrap()
        .with_codec_options(CodecOptions {
            emit_defaults: false,
            ..CodecOptions::default()
        });
    server.register_greeter_server(MyGreeter::default()).unwrap();
    TestApp::new(server.into_router())
        .call("/greeter/say_goodbye", &json!({"name": "Ada"}))
        .await
        .assert_ok()
        .assert_json(json!({"message": "Goodbye Ada"}));
}

#[tokio::test]
async fn body_limit_is_enforced() {
    let mut server = gateway::Server::new(None)
        .unwrap()
        .with_codec_options(CodecOptions {
            body_limit: 16,
            ..CodecOptions::default()
        });
    server.register_greeter_server(MyGreeter::default()).unwrap();
    TestApp::new(server.into_router())
        .call("/greeter/say_hello", &json!({"name": "a name well past sixteen bytes"}))
        .await
        .assert_bad_request();
}

#[tokio::test]
async fn metadata_reaches_the_service() {
    app(None)
        .post("/greeter/say_hello")
        .header(GREETING_KEY, "Howdy")
        .json(&json!({"name": "Ada"}))
        .send()
        .await
        .assert_ok()
        .assert_json_pointer("/message", "Howdy Ada");
}

#[tokio::test]
async fn plain_gateway_has_no_interceptor_slot() {
    let mut server = plain_gateway::Server::default();
    server
        .register_greeter_server(MyGreeter::default())
        .unwrap()
        .register_url_shortener_server(MemoryShortener::default())
        .unwrap();
    assert_eq!(server.routes().len(), 6);

    let app = TestApp::new(server.into_router());
    app.call("/greeter/say_hello", &json!({"name": "Ada"}))
        .await
        .assert_ok()
        .assert_json_pointer("/message", "Hello Ada");

    let reply = plain_gateway::GreeterGateway::new(MyGreeter::default())
        .say_goodbye(CallContext::default(), HelloRequest { name: "Ada".into() })
        .await
        .unwrap();
    assert_eq!(reply.message, "Goodbye Ada");
}

#[tokio::test]
async fn rpc_named_new_is_served_through_a_renamed_wrapper() {
    let app = app(None);
    app.call("/url_shortener/new", &json!({"url": "https://example.com"}))
        .await
        .assert_ok()
        .assert_json_object(&["code", "link"])
        .assert_json(json!({"code": "1", "link": {"url": "https://sho.rt/1"}}));

    let gateway = UrlShortenerGateway::new(MemoryShortener::default(), None);
    let reply = gateway
        .new_rpc(CallContext::default(), ShortenRequest { url: "https://example.com".into() })
        .await
        .unwrap();
    assert_eq!(reply.code, "1");
}
