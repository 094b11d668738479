//! A fake Steam for tests. Requests never leave the process; each one is recorded and answered
//! with a canned response registered for its path.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use reqwest::{Method, Request, Response};
use reqwest::cookie::Jar;
use reqwest::header::HeaderMap;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, Middleware, Next};
use tokio::time::Instant;
use url::Url;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<String>,
    pub at: Instant,
}

impl RecordedRequest {
    /// Decodes the form-encoded body.
    pub fn form(&self) -> HashMap<String, String> {
        self.body
            .as_deref()
            .map(|body| url::form_urlencoded::parse(body.as_bytes()).into_owned().collect())
            .unwrap_or_default()
    }

    pub fn query(&self) -> HashMap<String, String> {
        self.url.query_pairs().into_owned().collect()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

#[derive(Debug, Clone)]
pub struct MockResponse {
    status: u16,
    content_type: &'static str,
    body: String,
    refused: bool,
}

impl MockResponse {
    pub fn json(value: serde_json::Value) -> Self {
        Self {
            status: 200,
            content_type: "application/json; charset=utf-8",
            body: value.to_string(),
            refused: false,
        }
    }

    pub fn html(body: &str) -> Self {
        Self {
            status: 200,
            content_type: "text/html; charset=UTF-8",
            body: body.into(),
            refused: false,
        }
    }

    /// The connection is refused instead of answered.
    pub fn refused() -> Self {
        Self {
            refused: true,
            ..Self::html("")
        }
    }

    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    fn into_response(self) -> Response {
        let response = http::Response::builder()
            .status(self.status)
            .header("content-type", self.content_type)
            .body(self.body)
            .unwrap();

        Response::from(response)
    }
}

#[derive(Debug)]
struct Route {
    path: String,
    queue: VecDeque<MockResponse>,
    fallback: Option<MockResponse>,
}

#[derive(Debug, Default)]
pub struct MockSteam {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockSteam {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answers the next unanswered request to `path` with `response`. Queued responses are
    /// served in the order they were added.
    pub fn respond(&self, path: &str, response: MockResponse) {
        self.route(path, |route| route.queue.push_back(response));
    }

    /// Answers every request to `path` with `response` once its queue is empty.
    pub fn respond_always(&self, path: &str, response: MockResponse) {
        self.route(path, |route| route.fallback = Some(response));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.url.path().ends_with(path))
            .collect()
    }

    /// A client whose requests are all answered by this mock, along with its cookie jar.
    pub fn client(self: &Arc<Self>) -> (ClientWithMiddleware, Arc<Jar>) {
        let cookies = Arc::new(Jar::default());
        let client = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&cookies))
            .build()
            .unwrap();
        let client = ClientBuilder::new(client)
            .with_arc(Arc::clone(self) as Arc<dyn Middleware>)
            .build();

        (client, cookies)
    }

    fn route<F>(&self, path: &str, f: F)
    where
        F: FnOnce(&mut Route),
    {
        let mut routes = self.routes.lock().unwrap();

        if let Some(route) = routes.iter_mut().find(|route| route.path == path) {
            f(route);
            return;
        }

        let mut route = Route {
            path: path.into(),
            queue: VecDeque::new(),
            fallback: None,
        };

        f(&mut route);
        routes.push(route);
    }

    fn answer(&self, url: &Url) -> MockResponse {
        let mut routes = self.routes.lock().unwrap();
        let route = routes
            .iter_mut()
            .find(|route| url.path().ends_with(&route.path));

        route
            .and_then(|route| route.queue.pop_front().or_else(|| route.fallback.clone()))
            .unwrap_or_else(|| MockResponse::html("Not Found").status(404))
    }
}

/// A real connection error, from connecting to a port nothing listens on.
pub async fn connection_refused() -> reqwest::Error {
    reqwest::get("http://127.0.0.1:1/").await.unwrap_err()
}

#[async_trait::async_trait]
impl Middleware for MockSteam {
    async fn handle(
        &self,
        req: Request,
        _extensions: &mut http::Extensions,
        _next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        let body = req.body()
            .and_then(|body| body.as_bytes())
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned());

        self.requests.lock().unwrap().push(RecordedRequest {
            method: req.method().clone(),
            url: req.url().clone(),
            headers: req.headers().clone(),
            body,
            at: Instant::now(),
        });

        let response = self.answer(req.url());

        if response.refused {
            return Err(reqwest_middleware::Error::Reqwest(connection_refused().await));
        }

        Ok(response.into_response())
    }
}
