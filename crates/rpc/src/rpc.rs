use hyper::{http::HeaderValue, Method};
use jsonrpsee::{
    server::{middleware::http::ProxyGetRequestLayer, ServerBuilder, ServerHandle},
    Methods,
};
use sluice_primitives::constants::networking::HEALTH_PATH;
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::info;

/// JsonRpcServer is a wrapper around the `jsonrpsee` [ServerBuilder](ServerBuilder).
///
/// JSON-RPC requests are accepted as `POST` on any path, `GET /health` is answered by the
/// `system_health` method.
pub struct JsonRpcServer {
    /// The address to listen on.
    listen_address: String,
    /// The [cors layer](CorsLayer) to filter requests.
    cors_layer: Option<CorsLayer>,
    /// The RPC methods to be exposed.
    methods: Methods,
}

impl JsonRpcServer {
    /// Create a new JsonRpcServer.
    ///
    /// # Arguments
    /// * `listen_address: String` - The address to listen on.
    ///
    /// # Returns
    /// * `Self` - A new [JsonRpcServer](JsonRpcServer) instance.
    pub fn new(listen_address: String) -> Self {
        Self { listen_address, cors_layer: None, methods: Methods::new() }
    }

    /// Add a cors layer to the server.
    ///
    /// # Arguments
    /// * `cors_domain: Vec<String>` - A list of CORS filters in the form of String.
    ///
    /// # Returns
    /// * `Self` - A new [JsonRpcServer](JsonRpcServer) instance.
    pub fn with_cors(mut self, cors_domain: Vec<String>) -> Self {
        let cors_layer = if cors_domain.iter().any(|d| d == "*") {
            CorsLayer::new()
                .allow_headers(Any)
                .allow_methods([Method::GET, Method::POST])
                .allow_origin(Any)
        } else {
            let mut origins: Vec<HeaderValue> = vec![];

            for domain in cors_domain.iter() {
                if let Ok(origin) = domain.parse::<HeaderValue>() {
                    origins.push(origin);
                }
            }

            CorsLayer::new()
                .allow_headers(Any)
                .allow_methods([Method::GET, Method::POST])
                .allow_origin(AllowOrigin::list(origins))
        };

        self.cors_layer = Some(cors_layer);
        self
    }

    /// Add methods to the RPC server.
    ///
    /// # Arguments
    /// * `methods: impl Into<Methods>` - The RPC methods to be exposed.
    ///
    /// # Returns
    /// * `eyre::Result<()>` - None if no error.
    pub fn add_methods(&mut self, methods: impl Into<Methods>) -> eyre::Result<()> {
        self.methods.merge(methods)?;
        Ok(())
    }

    /// Start the [json RPC server](JsonRpcServer)
    ///
    /// # Returns
    /// * `eyre::Result<(SocketAddr, ServerHandle)>` - The bound address and the [handle](ServerHandle) of the server.
    pub async fn start(&self) -> eyre::Result<(SocketAddr, ServerHandle)> {
        let service = ServiceBuilder::new()
            .option_layer(self.cors_layer.clone())
            .layer(ProxyGetRequestLayer::new(HEALTH_PATH, "system_health")?);

        let server = ServerBuilder::default()
            .set_http_middleware(service)
            .build(&self.listen_address)
            .await?;
        let addr = server.local_addr()?;

        info!("JSON-RPC server listening on {addr}");

        Ok((addr, server.start(self.methods.clone())))
    }
}
