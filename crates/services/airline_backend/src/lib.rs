// --- File: crates/services/airline_backend/src/lib.rs ---
//! Router assembly for the airline backend. Every service crate contributes its own
//! router; this crate merges the enabled ones under `/api`.

pub mod health;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;
use tracing::info;

use airline_common::Notifier;
use airline_config::AppConfig;
use airline_db::DbClient;
use airline_payment::PaymentGateway;

use crate::health::{health_handler, HealthState};

/// Collaborators the services reach outside the database.
#[derive(Clone)]
pub struct Dependencies {
    pub notifier: Arc<dyn Notifier>,
    pub gateway: Arc<dyn PaymentGateway>,
}

/// Builds the `/api` router from the services enabled in `config`.
pub fn build_router(config: Arc<AppConfig>, db: DbClient, deps: Dependencies) -> Router {
    let health_state = Arc::new(HealthState {
        db: db.clone(),
        service: "airline-backend",
    });
    let mut router = Router::new()
        .route("/health", get(health_handler))
        .with_state(health_state);

    if config.use_auth {
        info!("Mounting auth routes");
        let state = airline_auth::AuthState::new(config.clone(), db.clone());
        router = router.merge(airline_auth::routes(Arc::new(state)));
    }
    if config.use_booking {
        info!("Mounting booking routes");
        let state =
            airline_booking::BookingState::new(config.clone(), db.clone(), deps.notifier.clone());
        router = router.merge(airline_booking::routes(Arc::new(state)));
    }
    if config.use_payment {
        info!("Mounting payment routes");
        let state = airline_payment::PaymentState::new(
            config.clone(),
            db.clone(),
            deps.gateway.clone(),
            deps.notifier.clone(),
        );
        router = router.merge(airline_payment::routes(Arc::new(state)));
    }
    if config.use_baggage {
        info!("Mounting baggage routes");
        let state =
            airline_baggage::BaggageState::new(config.clone(), db.clone(), deps.notifier.clone());
        router = router.merge(airline_baggage::routes(Arc::new(state)));
    }
    if config.use_notification {
        info!("Mounting notification routes");
        let state = airline_notification::NotificationState::new(config.clone(), db.clone());
        router = router.merge(airline_notification::routes(Arc::new(state)));
    }
    if config.use_admin {
        info!("Mounting admin routes");
        let state = airline_admin::AdminState::new(config.clone(), db, deps.notifier.clone());
        router = router.merge(airline_admin::routes(Arc::new(state)));
    }

    #[allow(unused_mut)] // only mutated with the openapi feature
    let mut app = Router::new().nest("/api", router);

    #[cfg(feature = "openapi")]
    {
        use utoipa_swagger_ui::SwaggerUi;

        info!("Adding Swagger UI at /api/docs");
        let swagger_ui = SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi::merged());
        app = app.merge(swagger_ui);
    }

    app.layer(TraceLayer::new_for_http())
}

#[cfg(feature = "openapi")]
pub mod openapi {
    use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
    use utoipa::{Modify, OpenApi};

    struct BearerAuth;

    impl Modify for BearerAuth {
        fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
            let components = openapi.components.get_or_insert_with(Default::default);
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }

    #[derive(OpenApi)]
    #[openapi(
        info(
            title = "Airline API",
            version = "0.1.0",
            description = "Booking, payment, baggage, notification and admin services"
        ),
        paths(crate::health::health_handler),
        components(schemas(crate::health::HealthResponse)),
        modifiers(&BearerAuth),
        servers((url = "/api", description = "Main API Prefix"))
    )]
    struct ApiDoc;

    /// Every service's document folded into one.
    pub fn merged() -> utoipa::openapi::OpenApi {
        let mut doc = ApiDoc::openapi();
        doc.merge(airline_auth::doc::AuthApiDoc::openapi());
        doc.merge(airline_booking::doc::BookingApiDoc::openapi());
        doc.merge(airline_payment::doc::PaymentApiDoc::openapi());
        doc.merge(airline_baggage::doc::BaggageApiDoc::openapi());
        doc.merge(airline_notification::doc::NotificationApiDoc::openapi());
        doc.merge(airline_admin::doc::AdminApiDoc::openapi());
        doc
    }
}
