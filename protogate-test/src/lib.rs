mod app;

pub use app::{TestApp, TestRequest, TestResponse};
