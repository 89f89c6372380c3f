use super::ApplicationState;
use crate::routing;
use axum::Router;
use tower_http::trace::TraceLayer;

pub fn create_application(application_state: ApplicationState) -> Router {
    routing::routing()
        .layer(TraceLayer::new_for_http())
        .with_state(application_state)
}
