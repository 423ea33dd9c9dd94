use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};

use crate::{
    app_data::AppData,
    app_error::AppError,
    controller,
    mongo::context::Context,
    services::ensure_admin,
    stores::{Blog, Category, Tag, User},
    utils::{config::Config, result::Result},
};

pub fn init_logger() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info,actix_web=info"),
    )
    .init();
}

async fn prepare(context: &Context, config: &Config) -> Result<()> {
    context.sync_indexes::<User>().await?;
    context.sync_indexes::<Blog>().await?;
    context.sync_indexes::<Category>().await?;
    context.sync_indexes::<Tag>().await?;
    ensure_admin(context, config).await?;
    Ok(())
}

pub async fn run() -> Result<()> {
    init_logger();

    let config = Config::from_env()?;
    let context = Context::new(&config).await?;
    if let Err(e) = prepare(&context, &config).await {
        log::error!(target: "zetta", "startup tasks failed: {:#}", e);
    }
    let bind = config.bind_name();
    let json_limit = config.json_limit_bytes;
    let data = web::Data::new(AppData::new(context, config));
    log::info!(target: "zetta", "listening on {}", bind);

    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .app_data(
                web::JsonConfig::default()
                    .limit(json_limit)
                    .error_handler(|err, _| AppError::bad_request(err.to_string()).into()),
            )
            .wrap(middleware::Logger::default())
            .wrap(Cors::permissive())
            .configure(controller::route)
    })
    .bind(bind)?
    .run()
    .await?;
    Ok(())
}
