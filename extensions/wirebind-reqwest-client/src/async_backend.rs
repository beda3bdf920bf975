use crate::error::TransportError;
use crate::prepare::{Body, finish, prepare};
use reqwest::{Client, Url};
use std::fmt;
use std::sync::Arc;
use wirebind::{
    AsyncTransport, Backend, BoxError, MethodBinder, NonBlocking, RequestScope, bind_async_method,
};
use wirebind_http::{Http, HttpRequest, HttpResponse};

/// Async HTTP backend driving a `reqwest::Client`.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
    scope: Option<Arc<dyn RequestScope>>,
}

impl HttpBackend {
    pub fn new(client: Client, base_url: Url) -> Self {
        Self {
            client,
            base_url,
            scope: None,
        }
    }

    /// A backend with a default client.
    pub fn with_base_url(base_url: &str) -> Result<Self, TransportError> {
        let base_url = Url::parse(base_url)
            .map_err(|error| TransportError::Prepare(format!("invalid base URL: {error}")))?;
        Ok(Self::new(Client::new(), base_url))
    }

    /// Wraps every request in `scope`.
    pub fn with_request_scope(mut self, scope: impl RequestScope) -> Self {
        self.scope = Some(Arc::new(scope));
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

impl fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpBackend")
            .field("base_url", &self.base_url.as_str())
            .field("scoped", &self.scope.is_some())
            .finish()
    }
}

impl Backend for HttpBackend {
    type Protocol = Http;
    type Mode = NonBlocking;

    fn binder(&self) -> MethodBinder<Self> {
        bind_async_method::<Self>
    }
}

#[async_trait::async_trait]
impl AsyncTransport for HttpBackend {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, BoxError> {
        let prepared = prepare(&self.base_url, &request)?;

        let builder = self
            .client
            .request(prepared.method, prepared.url)
            .headers(prepared.headers);
        let builder = match prepared.body {
            Body::Empty => builder,
            Body::Form(form) => builder.form(&form),
            Body::Json(json) => builder.json(&json),
        };

        let response = builder.send().await.map_err(TransportError::from)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(TransportError::from)?;

        Ok(finish(status, headers, body)?)
    }

    fn request_scope(&self) -> Option<&dyn RequestScope> {
        self.scope.as_deref()
    }
}
