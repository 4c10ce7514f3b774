use crate::controller::{device_controller, health_check_controller, oauth_controller};
use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};

use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

// Global OpenAPI document. To be a part
// of the rendered document, a path must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Leo Automation API"
        ),
        paths(
            device_controller::turn_off,
            health_check_controller::health_check,
            oauth_controller::authorize_google,
            oauth_controller::authorize_microsoft,
            oauth_controller::refresh_gmail,
            oauth_controller::refresh_microsoft,
        ),
        tags(
            (name = "leo", description = "OAuth token bootstrap and device automation")
        )
    )]
struct ApiDoc;

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(oauth_routes(app_state.clone()))
        .merge(device_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn oauth_routes(app_state: AppState) -> Router {
    Router::new()
        // The provider redirects back to the same endpoint, so both legs share one route.
        .route(
            "/oauth/google",
            get(oauth_controller::authorize_google).post(oauth_controller::authorize_google),
        )
        .route(
            "/oauth/microsoft",
            get(oauth_controller::authorize_microsoft)
                .post(oauth_controller::authorize_microsoft),
        )
        .route("/oauth/google/refresh", post(oauth_controller::refresh_gmail))
        .route(
            "/oauth/microsoft/refresh",
            post(oauth_controller::refresh_microsoft),
        )
        .with_state(app_state)
}

fn device_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/devices/turn-off", post(device_controller::turn_off))
        .with_state(app_state)
}
