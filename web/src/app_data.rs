use std::sync::Arc;

use crate::{
    auth::JwtKeys,
    images::Media,
    mailer::{LogMailer, Mailer},
    mongo::context::Context,
    utils::config::Config,
};

pub struct AppData {
    pub context: Context,
    pub config: Config,
    pub media: Media,
    pub keys: JwtKeys,
    pub mailer: Arc<dyn Mailer>,
}

impl AppData {
    pub fn new(context: Context, config: Config) -> Self {
        Self {
            media: Media::from_config(&config, &context),
            keys: JwtKeys::from_config(&config),
            mailer: Arc::new(LogMailer),
            context,
            config,
        }
    }
}
