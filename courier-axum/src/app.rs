use std::sync::Arc;

use axum::handler::Handler;
use axum::routing::{get, MethodRouter};
use axum::Router;
use courier_core::CourierApp;
use tokio::net::{TcpListener, ToSocketAddrs};
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub struct AxumApp {
    pub app: Arc<CourierApp>,
    pub router: Router<()>,
}

impl Clone for AxumApp {
    fn clone(&self) -> Self {
        Self {
            app: Arc::clone(&self.app),
            router: self.router.clone(),
        }
    }
}

impl AxumApp {
    pub fn new(app: CourierApp) -> Self {
        Self {
            app: Arc::new(app),
            router: Router::new(),
        }
    }

    /// Register a method router at an exact path.
    pub fn use_route(mut self, path: &str, route: MethodRouter<()>) -> Self {
        self.router = self.router.route(path, route);
        self
    }

    pub fn use_get<H, T>(self, path: &str, handler: H) -> Self
    where
        H: Handler<T, ()> + Clone + Send + Sync + 'static,
        T: 'static,
    {
        self.use_route(path, get(handler))
    }

    pub fn service<H, T>(self, path: &str, handler: H) -> Self
    where
        H: Handler<T, ()> + Clone + Send + Sync + 'static,
        T: 'static,
    {
        self.use_get(path, handler)
    }

    /// Wrap every route registered so far with request ids and HTTP traces.
    ///
    /// Layers only apply to routes that already exist, so call this last.
    /// An incoming `x-request-id` is kept, otherwise a UUID is generated;
    /// either way it is echoed on the response.
    pub fn with_request_tracing(mut self) -> Self {
        self.router = self.router.layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        );
        self
    }

    pub async fn listen<A>(self, addr: A) -> anyhow::Result<()>
    where
        A: ToSocketAddrs,
    {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(addr = ?listener.local_addr().ok(), "listening");
        axum::serve(listener, self.router).await?;
        Ok(())
    }
}

pub fn axum(app: CourierApp) -> AxumApp {
    AxumApp::new(app)
}
