use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, App, HttpServer};
use chrono::Duration;

use scoped_tasks::auth::{PasswordHasher, TokenCodec};
use scoped_tasks::config::Config;
use scoped_tasks::routes;
use scoped_tasks::state::AppState;
use scoped_tasks::store::{self, PgCredentialStore, PgTaskStore};

fn startup_error(err: impl std::fmt::Display) -> io::Error {
    io::Error::other(err.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env().map_err(startup_error)?;
    let hasher = PasswordHasher::new(config.bcrypt_cost).map_err(startup_error)?;
    let codec = TokenCodec::new(&config.jwt_secret, Duration::seconds(config.token_ttl_secs));

    let state = match &config.database_url {
        Some(url) => {
            let pool = store::postgres::connect(url, config.max_db_connections)
                .await
                .map_err(startup_error)?;
            log::info!("Connected to Postgres, migrations applied");
            AppState::new(
                Arc::new(PgCredentialStore::new(pool.clone())),
                Arc::new(PgTaskStore::new(pool)),
                hasher,
                codec,
            )
        }
        None => {
            log::warn!("DATABASE_URL is not set; records are kept in memory and lost on exit");
            AppState::in_memory(hasher, codec)
        }
    };

    log::info!("Starting server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(|cfg| state.configure(cfg))
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
