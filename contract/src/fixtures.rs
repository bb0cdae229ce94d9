//! Suite fixtures: the configured transport, base URL, a known-absent id and
//! the schema directory, plus a local fake backend when no remote is set.

use std::net::SocketAddr;
use std::thread::JoinHandle;

use thiserror::Error;
use todo_core::{ApiError, HttpRequest, HttpResponse, TodoClient, Transport};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, SuiteConfig};
use crate::schema::SchemaSet;
use crate::transport::UreqTransport;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to bind local backend: {0}")]
    Bind(std::io::Error),

    #[error("failed to start local backend: {0}")]
    Start(std::io::Error),

    #[error("failed to load .env file: {0}")]
    EnvFile(dotenvy::Error),
}

/// A missing `.env` file is fine; an unreadable or malformed one is not.
fn env_file_loaded<T>(result: Result<T, dotenvy::Error>) -> Result<(), FixtureError> {
    match result {
        Ok(_) => Ok(()),
        Err(err) if err.not_found() => {
            debug!("no .env file found");
            Ok(())
        }
        Err(err) => Err(FixtureError::EnvFile(err)),
    }
}

/// The fake backend running on a dedicated thread with its own runtime.
/// Dropping it stops the server and joins the thread.
pub struct LocalServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<Result<(), mock_server::ServerError>>>,
}

impl LocalServer {
    pub fn start() -> Result<Self, FixtureError> {
        let std_listener = std::net::TcpListener::bind("127.0.0.1:0").map_err(FixtureError::Bind)?;
        let addr = std_listener.local_addr().map_err(FixtureError::Bind)?;
        std_listener.set_nonblocking(true).map_err(FixtureError::Bind)?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(FixtureError::Start)?;
        let (shutdown, stopped) = oneshot::channel::<()>();

        let thread = std::thread::Builder::new()
            .name("todo-fake-backend".to_string())
            .spawn(move || {
                runtime.block_on(async move {
                    let listener = tokio::net::TcpListener::from_std(std_listener)?;
                    mock_server::run_until(listener, async move {
                        let _ = stopped.await;
                    })
                    .await
                })
            })
            .map_err(FixtureError::Start)?;

        info!(%addr, "started local todo backend");
        Ok(Self {
            addr,
            shutdown: Some(shutdown),
            thread: Some(thread),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for LocalServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(thread) = self.thread.take() {
            match thread.join() {
                Ok(Ok(())) => info!(addr = %self.addr, "stopped local todo backend"),
                Ok(Err(err)) => warn!(addr = %self.addr, %err, "local todo backend failed"),
                Err(_) => warn!(addr = %self.addr, "local todo backend panicked"),
            }
        }
    }
}

/// Everything a case needs: client, transport, the absent id and schemas.
pub struct Harness {
    pub client: TodoClient,
    pub incorrect_todo_id: u64,
    pub schemas: SchemaSet,
    transport: Box<dyn Transport>,
    _server: Option<LocalServer>,
}

impl Harness {
    /// Build a harness around any response source.
    pub fn new(
        client: TodoClient,
        transport: impl Transport + 'static,
        incorrect_todo_id: u64,
        schemas: SchemaSet,
    ) -> Self {
        Self {
            client,
            incorrect_todo_id,
            schemas,
            transport: Box::new(transport),
            _server: None,
        }
    }

    /// Load `.env` and the environment, then target either the configured
    /// remote backend or a freshly started local one.
    pub fn from_env() -> Result<Self, FixtureError> {
        env_file_loaded(dotenvy::dotenv())?;
        let config = SuiteConfig::from_env()?;
        Self::from_config(config)
    }

    pub fn from_config(config: SuiteConfig) -> Result<Self, FixtureError> {
        let schemas = SchemaSet::new(config.schema_dir);
        let (base_url, server) = match config.base_url {
            Some(url) => {
                info!(%url, "targeting remote todo backend");
                (url, None)
            }
            None => {
                let server = LocalServer::start()?;
                (server.base_url(), Some(server))
            }
        };
        let mut harness = Self::new(
            TodoClient::new(&base_url),
            UreqTransport::new(),
            config.incorrect_todo_id,
            schemas,
        );
        harness._server = server;
        Ok(harness)
    }

    pub fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        self.transport.execute(request)
    }
}
