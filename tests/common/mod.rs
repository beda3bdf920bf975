#![allow(dead_code)]

use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wirebind::{
    Annotation, Arguments, AsyncNext, AsyncTransport, Backend, Blocking, BoundArguments, BoxError,
    CallResult, FieldAnnotation, Marker, MethodBinder, MethodMarker, NonBlocking, ParameterMarker,
    Protocol, Record, RequestScope, ResponseMarker, Retry, ScopeGuard, Transport,
    bind_async_method, bind_blocking_method,
};

// --- Test Setup: In-memory Protocol ---

/// Protocol whose requests are plain lists of named entries.
#[derive(Debug, Clone)]
pub struct Recording;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordedRequest {
    pub route: Option<String>,
    pub entries: Vec<(String, Value)>,
}

#[derive(Debug, Clone)]
pub struct RecordedResponse {
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

impl Protocol for Recording {
    type Request = RecordedRequest;
    type Response = RecordedResponse;

    fn payload(response: &RecordedResponse) -> Result<Value, String> {
        Ok(response.body.clone())
    }
}

/// Appends the argument as a named entry.
#[derive(Debug)]
pub struct Entry(pub &'static str);

impl ParameterMarker<Recording> for Entry {
    fn apply(&self, request: &mut RecordedRequest, value: &Value) -> Result<(), String> {
        request.entries.push((self.0.to_owned(), value.clone()));
        Ok(())
    }
}

impl From<Entry> for Marker<Recording> {
    fn from(marker: Entry) -> Self {
        Marker::parameter(marker)
    }
}

/// Parameter marker that never passes its bind-time check.
#[derive(Debug)]
pub struct Broken;

impl ParameterMarker<Recording> for Broken {
    fn apply(&self, _request: &mut RecordedRequest, _value: &Value) -> Result<(), String> {
        Ok(())
    }

    fn check(&self) -> Result<(), String> {
        Err("broken on purpose".to_owned())
    }
}

impl From<Broken> for Marker<Recording> {
    fn from(marker: Broken) -> Self {
        Marker::parameter(marker)
    }
}

/// Fixes the request route.
#[derive(Debug)]
pub struct Route(pub &'static str);

impl MethodMarker<Recording> for Route {
    fn prepare_request(
        &self,
        request: &mut RecordedRequest,
        _arguments: &BoundArguments,
    ) -> Result<(), String> {
        request.route = Some(self.0.to_owned());
        Ok(())
    }
}

impl From<Route> for Marker<Recording> {
    fn from(marker: Route) -> Self {
        Marker::method(marker)
    }
}

pub static WRAP_LOG: Mutex<Vec<&'static str>> = Mutex::new(Vec::new());

/// Records its name in [`WRAP_LOG`] when the wrapped call passes through it.
#[derive(Debug)]
pub struct Tag(pub &'static str);

impl MethodMarker<Recording> for Tag {
    fn around_blocking(
        &self,
        arguments: Arguments,
        next: &dyn Fn(Arguments) -> CallResult,
    ) -> CallResult {
        WRAP_LOG.lock().unwrap().push(self.0);
        next(arguments)
    }

    fn around_async(
        &self,
        arguments: Arguments,
        next: AsyncNext,
    ) -> futures::future::BoxFuture<'static, CallResult> {
        WRAP_LOG.lock().unwrap().push(self.0);
        next(arguments)
    }
}

impl From<Tag> for Marker<Recording> {
    fn from(marker: Tag) -> Self {
        Marker::method(marker)
    }
}

/// Reads a response header; fails when it is absent.
#[derive(Debug)]
pub struct FromHeader(pub &'static str);

impl ResponseMarker<Recording> for FromHeader {
    fn apply(&self, response: &RecordedResponse) -> Result<Value, String> {
        response
            .headers
            .iter()
            .find(|(name, _)| name == self.0)
            .map(|(_, value)| Value::String(value.clone()))
            .ok_or_else(|| format!("missing header `{}`", self.0))
    }
}

impl From<FromHeader> for Marker<Recording> {
    fn from(marker: FromHeader) -> Self {
        Marker::response(marker)
    }
}

/// Always produces the same value.
#[derive(Debug)]
pub struct Constant(pub &'static str);

impl ResponseMarker<Recording> for Constant {
    fn apply(&self, _response: &RecordedResponse) -> Result<Value, String> {
        Ok(Value::String(self.0.to_owned()))
    }
}

impl From<Constant> for Marker<Recording> {
    fn from(marker: Constant) -> Self {
        Marker::response(marker)
    }
}

// --- Test Setup: Records and Interfaces ---

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Item {
    pub id: i64,
    pub etag: String,
}

impl Record<Recording> for Item {
    fn field_annotations() -> Vec<FieldAnnotation<Recording>> {
        vec![FieldAnnotation::new(
            "etag",
            Annotation::new().with(FromHeader("etag")),
        )]
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Stamped {
    pub stamp: String,
}

impl Record<Recording> for Stamped {
    fn field_annotations() -> Vec<FieldAnnotation<Recording>> {
        vec![FieldAnnotation::new(
            "stamp",
            Annotation::new()
                .with(Constant("first"))
                .with(Constant("second")),
        )]
    }
}

wirebind::service! {
    /// Item catalog used across the binding tests.
    pub trait Catalog: Recording {
        /// Looks up one item.
        #[marker(Route("/items"))]
        fn lookup(
            &self,
            id: i64 => [Entry("id")],
            tag: String = "none" => [Entry("tag"), Entry("label")],
        ) -> Item;

        /// Sends both values to the same entry name.
        #[marker(Route("/pair"))]
        fn pair(&self, first: i64 => [Entry("value")], second: i64 => [Entry("value")]) -> Value;

        fn ping(&self);

        #[marker(Route("/stamp"))]
        fn stamp(&self) -> Stamped;

        #[marker(Retry::attempts(3))]
        fn flaky(&self, id: i64 => [Entry("id")]) -> Item;

        #[marker(Tag("inner"))]
        #[marker(Tag("outer"))]
        fn tagged(&self);
    }
}

// --- Test Setup: Backends ---

pub type Responder =
    Arc<dyn Fn(&RecordedRequest) -> Result<RecordedResponse, BoxError> + Send + Sync>;

/// Echoes the request entries back as the body; repeated names become
/// arrays. Always answers with an `etag: v1` header.
pub fn echo(request: &RecordedRequest) -> Result<RecordedResponse, BoxError> {
    let mut body = Map::new();
    if let Some(route) = &request.route {
        body.insert("route".to_owned(), Value::String(route.clone()));
    }
    for (name, value) in &request.entries {
        match body.remove(name) {
            None => {
                body.insert(name.clone(), value.clone());
            }
            Some(Value::Array(mut values)) => {
                values.push(value.clone());
                body.insert(name.clone(), Value::Array(values));
            }
            Some(previous) => {
                body.insert(name.clone(), Value::Array(vec![previous, value.clone()]));
            }
        }
    }

    Ok(RecordedResponse {
        headers: vec![("etag".to_owned(), "v1".to_owned())],
        body: Value::Object(body),
    })
}

/// Fails with a transport error `failures` times, then echoes.
pub fn failing(failures: usize) -> Responder {
    let count = Arc::new(AtomicUsize::new(0));
    Arc::new(move |request: &RecordedRequest| {
        if count.fetch_add(1, Ordering::SeqCst) < failures {
            return Err("connection reset".into());
        }
        echo(request)
    })
}

/// Request scope counting entries and currently held guards.
#[derive(Debug, Default)]
pub struct CountingScope {
    pub entered: AtomicUsize,
    pub active: Arc<AtomicUsize>,
}

struct CountingGuard(Arc<AtomicUsize>);

impl Drop for CountingGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl RequestScope for CountingScope {
    fn enter(&self, _method: &str) -> ScopeGuard {
        self.entered.fetch_add(1, Ordering::SeqCst);
        self.active.fetch_add(1, Ordering::SeqCst);
        Box::new(CountingGuard(Arc::clone(&self.active)))
    }
}

impl CountingScope {
    pub fn entered(&self) -> usize {
        self.entered.load(Ordering::SeqCst)
    }

    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

pub struct MockBackend {
    responder: Responder,
    requests: Mutex<Vec<RecordedRequest>>,
    scope: Option<Arc<CountingScope>>,
}

impl MockBackend {
    pub fn echo() -> Self {
        Self::with_responder(Arc::new(echo))
    }

    pub fn with_responder(responder: Responder) -> Self {
        Self {
            responder,
            requests: Mutex::new(Vec::new()),
            scope: None,
        }
    }

    pub fn with_scope(mut self, scope: Arc<CountingScope>) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Backend for MockBackend {
    type Protocol = Recording;
    type Mode = Blocking;

    fn binder(&self) -> MethodBinder<Self> {
        bind_blocking_method::<Self>
    }
}

impl Transport for MockBackend {
    fn send(&self, request: RecordedRequest) -> Result<RecordedResponse, BoxError> {
        self.requests.lock().unwrap().push(request.clone());
        (self.responder)(&request)
    }

    fn request_scope(&self) -> Option<&dyn RequestScope> {
        self.scope.as_deref().map(|scope| scope as &dyn RequestScope)
    }
}

pub struct MockAsyncBackend {
    responder: Responder,
    requests: Mutex<Vec<RecordedRequest>>,
    scope: Option<Arc<CountingScope>>,
    delay: Option<Duration>,
}

impl MockAsyncBackend {
    pub fn echo() -> Self {
        Self::with_responder(Arc::new(echo))
    }

    pub fn with_responder(responder: Responder) -> Self {
        Self {
            responder,
            requests: Mutex::new(Vec::new()),
            scope: None,
            delay: None,
        }
    }

    pub fn with_scope(mut self, scope: Arc<CountingScope>) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Backend for MockAsyncBackend {
    type Protocol = Recording;
    type Mode = NonBlocking;

    fn binder(&self) -> MethodBinder<Self> {
        bind_async_method::<Self>
    }
}

#[async_trait::async_trait]
impl AsyncTransport for MockAsyncBackend {
    async fn send(&self, request: RecordedRequest) -> Result<RecordedResponse, BoxError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.responder)(&request)
    }

    fn request_scope(&self) -> Option<&dyn RequestScope> {
        self.scope.as_deref().map(|scope| scope as &dyn RequestScope)
    }
}
