use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::Context;
use chrono::Local;
use env_logger::{Env, Target};
use std::io::Write;
use std::sync::Arc;

use aura_booking::{
    cache::{CacheService, LocalCache, RedisCache},
    config::Config,
    database::{create_pool, run_migrations},
    external::Mailer,
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    utils::JwtService,
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config =
        Config::from_toml().map_err(|e| anyhow::anyhow!("Failed to load configuration: {e}"))?;

    let pool = create_pool(&config.database)
        .await
        .context("Failed to create database connection pool")?;

    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let jwt_service = JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expires_in,
        config.jwt.refresh_token_expires_in,
    );

    // redis connects lazily; an unreachable server only degrades to the local store
    let redis = RedisCache::new(&config.redis.url).context("Invalid redis URL")?;
    let cache = CacheService::new(Arc::new(redis), LocalCache::new());

    let mailer = Mailer::new(&config.smtp).context("Failed to configure SMTP")?;

    let auth_service = AuthService::new(
        pool.clone(),
        jwt_service.clone(),
        mailer,
        cache,
        config.codes.clone(),
    );
    let user_service = UserService::new(pool.clone());
    let booking_service = BookingService::new(pool.clone());

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .wrap(create_cors())
            .wrap(Logger::default())
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(user_service.clone()))
            .app_data(web::Data::new(booking_service.clone()))
            .configure(swagger_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::auth_config)
                    .configure(handlers::user_config)
                    .configure(handlers::dates_config)
                    .configure(handlers::bookings_config)
                    .configure(handlers::admin_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await?;

    Ok(())
}
