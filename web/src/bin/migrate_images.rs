use std::io::{Error, ErrorKind, Result};

use zettanews_media::FsStore;
use zettanews_mongo::context::Context;
use zettanews_utils::config::Config;
use zettanews_web::{server::init_logger, services::migrate_images};

async fn run() -> zettanews_utils::result::Result<()> {
    init_logger();
    let config = Config::from_env()?;
    let context = Context::new(&config).await?;
    let store = FsStore::new(&config.uploads_dir);
    migrate_images(&context, &store).await?;
    Ok(())
}

#[actix_web::main]
async fn main() -> Result<()> {
    run().await.map_err(|err| Error::new(ErrorKind::Other, err))
}
