#[tokio::main]
async fn main() {
    rolegate_observability::init();

    let settings = rolegate_api::app::Settings::from_env()
        .expect("invalid configuration");

    let app = rolegate_api::app::build_app(settings).await;

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080")
        .await
        .expect("failed to bind 0.0.0.0:8080");

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
