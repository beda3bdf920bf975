use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use wirebind::{Annotation, Blocking, FieldAnnotation, NonBlocking, Record};
use wirebind_http::{
    FormData, FormField, Header, Http, HttpMethod, Path, QueryParam, ReasonPhrase,
    ResponseHeader, ResponseStatus,
};

/// Form payload spread over the request form by [`FormData`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Data {
    pub foo: i64,
}

/// The echo returned by `/anything`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Anything {
    pub method: String,
    #[serde(default)]
    pub args: Map<String, Value>,
    #[serde(default)]
    pub form: Map<String, Value>,
    #[serde(default)]
    pub json: Value,
    #[serde(default)]
    pub headers: Map<String, Value>,
}

impl Record<Http> for Anything {}

/// The echo returned by `/headers`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Headers {
    pub headers: Map<String, Value>,
}

impl Record<Http> for Headers {}

impl Headers {
    /// Looks a header up the way httpbin reports it (`X-Foo`).
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(Value::as_str)
    }
}

/// Result of `/response-headers`, with fields lifted out of the raw response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Traced {
    pub status: u16,
    pub reason: Option<String>,
    pub trace_id: Option<String>,
}

impl Record<Http> for Traced {
    fn field_annotations() -> Vec<FieldAnnotation<Http>> {
        vec![
            FieldAnnotation::new("status", Annotation::new().with(ResponseStatus)),
            FieldAnnotation::new("reason", Annotation::new().with(ReasonPhrase)),
            FieldAnnotation::new(
                "trace_id",
                Annotation::new().with(ResponseHeader::new("x-trace-id")),
            ),
        ]
    }
}

/// Default for the `X-Baz` header, produced on every call that omits it.
pub fn default_baz() -> String {
    "bazval".to_owned()
}

wirebind::service! {
    /// The httpbin endpoints exercised by the HTTP backends.
    pub trait SupportsHttpbin: Http {
        /// Posts a form built from a record and two fields sharing one name.
        #[marker(HttpMethod::post())]
        #[marker(Path::new("/anything"))]
        fn post_anything(
            &self,
            data: Data => [FormData],
            bar: i64 => [FormField::new("barqux")],
            qux: i64 => [FormField::new("barqux")],
        ) -> Anything;

        /// Sends two values under one query parameter.
        #[marker(Path::new("/anything"))]
        fn get_anything(
            &self,
            foo: i64 => [QueryParam::new("foobar")],
            bar: i64 => [QueryParam::new("foobar")],
        ) -> Anything;

        #[marker(Path::new("/headers"))]
        fn get_headers(
            &self,
            foo: String => [Header::new("x-foo")],
            bar: String = "barval" => [Header::new("x-bar")],
            baz: String = default_baz() => [Header::new("x-baz")],
        ) -> Headers;

        /// Answers with the given status and an empty body.
        #[marker(Path::new("/status/{status}"))]
        fn get_status(&self, status: u16);

        #[marker(Path::new("/response-headers"))]
        fn get_traced(&self, trace_id: String => [QueryParam::new("x-trace-id")]) -> Traced;
    }
}

/// [`SupportsHttpbin`] on a blocking backend.
pub type BlockingHttpbin = dyn SupportsHttpbin<Mode = Blocking>;

/// [`SupportsHttpbin`] on an async backend.
pub type AsyncHttpbin = dyn SupportsHttpbin<Mode = NonBlocking>;
