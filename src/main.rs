//src/main.rs

use axum::{
    Router,
    routing::{get, post, put},
};
use tokio::net::TcpListener;

use rma_backend::{config::AppState, handlers};

#[tokio::main]
async fn main() {
    // Inicializa o logger
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Cadastros de apoio
    let contact_routes = Router::new()
        .route("/", post(handlers::contacts::create_contact).get(handlers::contacts::list_contacts))
        .route(
            "/{id}",
            put(handlers::contacts::update_contact).delete(handlers::contacts::delete_contact),
        );

    let brand_routes = Router::new()
        .route("/", post(handlers::brands::create_brand).get(handlers::brands::list_brands))
        .route(
            "/{id}",
            put(handlers::brands::update_brand).delete(handlers::brands::delete_brand),
        );

    let service_centre_routes = Router::new()
        .route(
            "/",
            post(handlers::service_centres::create_service_centre)
                .get(handlers::service_centres::list_service_centres),
        )
        .route(
            "/{id}",
            put(handlers::service_centres::update_service_centre)
                .delete(handlers::service_centres::delete_service_centre),
        );

    let custom_field_routes = Router::new()
        .route(
            "/",
            post(handlers::custom_fields::create_custom_field)
                .get(handlers::custom_fields::list_custom_fields),
        )
        .route(
            "/{id}",
            put(handlers::custom_fields::update_custom_field)
                .delete(handlers::custom_fields::delete_custom_field),
        );

    let settings_routes = Router::new()
        .route("/", get(handlers::settings::get_settings).put(handlers::settings::update_settings));

    // Fluxo de RMA: criação, consultas e transições em lote
    let rma_routes = Router::new()
        .route("/", post(handlers::rmas::create_rma).get(handlers::rmas::list_rmas))
        .route("/search", get(handlers::rmas::search_rmas))
        .route("/stage/{status}", get(handlers::rmas::list_rmas_by_stage))
        .route("/{id}", get(handlers::rmas::get_rma).delete(handlers::rmas::delete_rma))
        .route("/{id}/pdf", get(handlers::rmas::download_rma_pdf))
        .route("/{id}/comments", put(handlers::rmas::update_comments))
        .route("/{id}/send-to-service-centre", post(handlers::rmas::send_to_service_centre))
        .route("/{id}/mark-ready", post(handlers::rmas::mark_ready))
        .route("/{id}/deliver", post(handlers::rmas::deliver))
        .route("/{id}/products/{productId}/resend-otp", post(handlers::rmas::resend_otp))
        .route("/{id}/products/{productId}/remark", put(handlers::rmas::update_remark));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/contacts", contact_routes)
        .nest("/api/brands", brand_routes)
        .nest("/api/service-centres", service_centre_routes)
        .nest("/api/custom-fields", custom_field_routes)
        .nest("/api/settings", settings_routes)
        .nest("/api/rmas", rma_routes)
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
