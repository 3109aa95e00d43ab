use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter

use prize_store::{
    config::Config,
    database::{create_pool, run_migrations},
    handlers,
    middlewares::create_cors,
    services::PrizeService,
    swagger::swagger_config,
};

fn init_logger() {
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
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_logger();

    let config = Config::from_toml().expect("Failed to load configuration");

    // 数据库不可用时直接退出，不对外提供服务
    let pool = create_pool(&config.database)
        .await
        .expect("Failed to connect to database");

    run_migrations(&pool)
        .await
        .expect("Failed to initialise database schema");

    // sqlx 连接池句柄，仅用于停机时关闭
    let pg_pool = pool.get_postgres_connection_pool().clone();
    let prize_service = web::Data::new(PrizeService::new(pool));

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .app_data(prize_service.clone())
            .configure(swagger_config)
            .configure(handlers::routes)
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await?;

    // 服务停止（SIGINT / SIGTERM）后释放连接池
    log::info!("HTTP server stopped, closing database pool");
    pg_pool.close().await;

    Ok(())
}
