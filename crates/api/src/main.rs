use atlaserp_auth::AuthConfig;

#[tokio::main]
async fn main() {
    atlaserp_observability::init();

    let access_token_secret = std::env::var("ACCESS_TOKEN_SECRET").unwrap_or_else(|_| {
        tracing::warn!("ACCESS_TOKEN_SECRET not set; using insecure dev default");
        "dev-access-secret".to_string()
    });
    let refresh_token_secret = std::env::var("REFRESH_TOKEN_SECRET").unwrap_or_else(|_| {
        tracing::warn!("REFRESH_TOKEN_SECRET not set; using insecure dev default");
        "dev-refresh-secret".to_string()
    });
    let secure_cookies = std::env::var("APP_ENV").is_ok_and(|env| env == "production");

    let config = AuthConfig {
        access_token_secret,
        refresh_token_secret,
        ..AuthConfig::default()
    };

    let app = atlaserp_api::app::build_app(config, secure_cookies);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080")
        .await
        .expect("failed to bind 0.0.0.0:8080");

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
