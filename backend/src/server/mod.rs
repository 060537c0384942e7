//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;

use user_cache::Trace;
#[cfg(debug_assertions)]
use user_cache::doc::ApiDoc;
use user_cache::inbound::http::health::{HealthState, live, ready};
use user_cache::inbound::http::state::HttpState;
use user_cache::inbound::http::users;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .configure(users::configure)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let ServerConfig { bind_addr, users } = config;
    let http_state = web::Data::new(HttpState::new(users));

    let server = HttpServer::new(move || {
        build_app(server_health_state.clone(), http_state.clone())
    })
    .bind(bind_addr)?
    .run();

    info!(%bind_addr, "user cache server listening");
    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use std::sync::Arc;
    use user_cache::domain::UserCollectionService;
    use user_cache::outbound::cache::InMemoryUserCache;

    fn app_data() -> (web::Data<HealthState>, web::Data<HttpState>) {
        let users = UserCollectionService::new(Arc::new(InMemoryUserCache::new()));
        let health = web::Data::new(HealthState::new());
        health.mark_ready();
        (health, web::Data::new(HttpState::new(Arc::new(users))))
    }

    #[rstest]
    #[case("/users", StatusCode::OK)]
    #[case("/health/live", StatusCode::OK)]
    #[case("/health/ready", StatusCode::OK)]
    #[case("/users/17", StatusCode::NOT_FOUND)]
    #[actix_web::test]
    async fn routes_are_mounted(#[case] uri: &str, #[case] expected: StatusCode) {
        let (health, http) = app_data();
        let app = actix_test::init_service(build_app(health, http)).await;
        let res =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri(uri).to_request())
                .await;
        assert_eq!(res.status(), expected);
        assert!(res.headers().contains_key("trace-id"));
    }
}
