use crate::config::Config;
use crate::services::aggregate_service::AggregateService;
use crate::services::application_service::ApplicationService;
use crate::services::connection_service::ConnectionService;
use crate::services::conversation_service::ConversationService;
use crate::services::health_service::HealthService;
use crate::services::listing_service::ListingService;
use crate::services::message_service::MessageService;
use axum::body::Body;
use axum::http::Request;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub mod applications;
pub mod connections;
pub mod conversations;
pub mod health;
pub mod listings;
pub mod messages;
pub mod middleware;
pub mod schemas;

#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Config,
    pub listing_service: ListingService,
    pub application_service: ApplicationService,
    pub connection_service: ConnectionService,
    pub conversation_service: ConversationService,
    pub message_service: MessageService,
    pub aggregate_service: AggregateService,
}

#[derive(Clone, Debug)]
pub struct MgmtState {
    pub health_service: HealthService,
}

#[derive(Debug)]
pub struct ServiceContainer {
    pub listing_service: ListingService,
    pub application_service: ApplicationService,
    pub connection_service: ConnectionService,
    pub conversation_service: ConversationService,
    pub message_service: MessageService,
    pub aggregate_service: AggregateService,
}

/// Configures and returns the public API router.
pub fn app_router(config: Config, services: ServiceContainer) -> Router {
    let state = AppState {
        config,
        listing_service: services.listing_service,
        application_service: services.application_service,
        connection_service: services.connection_service,
        conversation_service: services.conversation_service,
        message_service: services.message_service,
        aggregate_service: services.aggregate_service,
    };

    let marketplace_routes = Router::new()
        .route("/listings", post(listings::create_listing))
        .route("/listings/response-counts", get(listings::response_counts))
        .route("/listings/{id}", get(listings::get_listing))
        .route("/listings/{id}/status", post(listings::transition_listing))
        .route(
            "/listings/{id}/applications",
            post(applications::submit_application).get(applications::list_listing_applications),
        )
        .route("/users/{userId}/listings", get(listings::list_user_listings))
        .route("/applications", get(applications::list_my_applications))
        .route("/applications/{id}/accept", post(applications::accept_application))
        .route("/applications/{id}/reject", post(applications::reject_application))
        .route("/connections", post(connections::request_connection).get(connections::list_connections))
        .route("/connections/{id}/response", post(connections::respond_to_connection));

    let messaging_routes = Router::new()
        .route(
            "/conversations",
            post(conversations::resolve_conversation).get(conversations::list_conversations),
        )
        .route("/conversations/{id}/messages", get(messages::list_messages).post(messages::send_message))
        .route("/conversations/{id}/read", post(messages::mark_read))
        .route("/conversations/{id}/unread", get(messages::unread_count))
        .route("/unread", get(messages::total_unread));

    Router::new()
        .nest("/v1", marketplace_routes.merge(messaging_routes))
        .layer(PropagateRequestIdLayer::new(axum::http::HeaderName::from_static("x-request-id")))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .extensions()
                        .get::<tower_http::request_id::RequestId>()
                        .and_then(|id| id.header_value().to_str().ok())
                        .unwrap_or_default()
                        .to_string();

                    tracing::info_span!(
                        "request",
                        "request_id" = %request_id,
                        "http.request.method" = %request.method(),
                        "url.path" = %request.uri().path(),
                        "http.response.status_code" = tracing::field::Empty,
                        "otel.kind" = "server",
                        "user_id" = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: std::time::Duration, _span: &tracing::Span| {
                        let status = response.status();
                        tracing::Span::current().record("http.response.status_code", status.as_u16());

                        tracing::info!(
                            latency_ms = %latency.as_millis(),
                            status = %status.as_u16(),
                            "request completed"
                        );
                    },
                )
                .on_failure(|error, _latency, _span: &tracing::Span| {
                    tracing::error!(error = %error, "request failed");
                }),
        )
        .layer(SetRequestIdLayer::new(
            axum::http::HeaderName::from_static("x-request-id"),
            middleware::MakeRequestUuidOrHeader,
        ))
        .with_state(state)
}

pub fn mgmt_router(state: MgmtState) -> Router {
    Router::new().route("/livez", get(health::livez)).route("/readyz", get(health::readyz)).with_state(state)
}
