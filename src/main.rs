use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};
use log::info;

use ainode_server::{app_state::AppState, config::Config, handlers};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env();
    let host = config.web_server_host.clone();
    let port = config.web_server_port;
    let allowed_origin = config.allowed_origin.clone();

    let state = AppState::new(config)
        .map_err(|err| std::io::Error::other(err.to_string()))?;

    let sessions = state.sessions.clone();
    let session_ttl = std::time::Duration::from_secs(state.config.session_ttl_secs);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(60));
        loop {
            ticker.tick().await;
            sessions.sweep_expired(session_ttl).await;
        }
    });

    info!("starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&allowed_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(cors)
            .wrap(Logger::default())
            .service(handlers::health_check)
            .service(handlers::start_assessment)
            .service(handlers::get_assessment)
            .service(handlers::navigate_assessment)
            .service(handlers::answer_question)
            .service(handlers::submit_assessment)
            .service(handlers::retry_evaluation)
            .service(handlers::restart_assessment)
            .service(handlers::delete_assessment)
            .service(
                web::resource("/api/proxy/quiz").route(web::route().to(handlers::proxy_relay)),
            )
    })
    .bind((host, port))?
    .run()
    .await
}
