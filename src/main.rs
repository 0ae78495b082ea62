#[macro_use] extern crate log;

use actix::SyncArbiter;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};

use eggbbs::config::{self, Config};
use eggbbs::db::{init_pool, DbExecutor};
use eggbbs::routes::{self, AppState};

use std::process::exit;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let _ = dotenv::dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = config::app().get_matches();
    let config = match Config::from_matches(&matches) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            exit(1);
        },
    };

    let pool = match init_pool(&config.database_url) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            exit(1);
        },
    };
    info!("using database {}, uploads in {}", config.database_url, config.upload_dir.display());

    let upload_dir = config.upload_dir.clone();
    let addr = SyncArbiter::start(config.db_threads, move || {
        DbExecutor::new(pool.clone(), upload_dir.clone())
    });

    info!("listening on {}", config.bind);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(AppState { db: addr.clone() }))
            .configure(routes::configure)
    })
    .bind(config.bind.as_str())?
    .run()
    .await
}
