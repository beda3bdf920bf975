use example_wirebind_service_definition::{AsyncHttpbin, BlockingHttpbin, Data, SupportsHttpbin};
use tokio::join;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use wirebind::BoxError;
use wirebind_httpbin_server::serve_with_listener;
use wirebind_reqwest_client::reqwest::{self, Url};
use wirebind_reqwest_client::{BlockingHttpBackend, HttpBackend};

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Bind to a random available port
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let base_url = Url::parse(&format!("http://{}/", listener.local_addr()?))?;

    let _server_task = tokio::spawn(async move {
        if let Err(error) = serve_with_listener(listener).await {
            tracing::error!("Httpbin server stopped: {}", error);
        }
    });

    {
        let service = AsyncHttpbin::bind(HttpBackend::new(reqwest::Client::new(), base_url.clone()))?;

        // Both calls are in flight at once
        let (form, query) = join!(
            service.post_anything(Data { foo: 42 }, 100500, 100501),
            service.get_anything(100500, 100501),
        );

        println!("Form echoed by post_anything(): {:?}", form?.form);
        println!("Query echoed by get_anything(): {:?}", query?.args);
    }

    // The blocking client must stay off the runtime's worker threads
    tokio::task::spawn_blocking(move || -> Result<(), BoxError> {
        let backend = BlockingHttpBackend::new(reqwest::blocking::Client::new(), base_url);
        let service = BlockingHttpbin::bind(backend)?;

        let headers = service.get_headers("fooval".to_owned(), None, None)?;
        println!("Headers echoed by get_headers(): {:?}", headers.headers);

        let traced = service.get_traced("demo-trace".to_owned())?;
        println!("Traced response: {:?}", traced);

        if let Err(error) = service.get_status(500) {
            println!("get_status(500) failed as expected: {}", error);
        }
        Ok(())
    })
    .await??;

    Ok(())
}
