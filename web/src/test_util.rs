use std::sync::Arc;

use actix_web::web;

use crate::{
    app_data::AppData,
    auth::JwtKeys,
    images::Media,
    mailer::LogMailer,
    media::ContentStore,
    mongo::{context::Context, withid::{Id, WithId}},
    stores::{Blog, Role, User},
    utils::config::Config,
};

pub fn config(extra: &[(&str, &str)]) -> Config {
    let mut pairs = vec![
        ("ZETTA_HOST", "127.0.0.1"),
        ("ZETTA_DB_URI", "mongodb://localhost:27017"),
        ("ZETTA_DB_DATABASE", "zetta_test"),
        ("ZETTA_JWT_SECRET", "test-secret"),
    ];
    pairs.extend_from_slice(extra);
    Config::from_pairs(
        pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string())),
    )
    .unwrap()
}

pub async fn offline_context() -> Context {
    Context::connect("mongodb://localhost:27017", "zetta_test")
        .await
        .unwrap()
}

pub async fn app_data(
    store: Arc<dyn ContentStore>,
    blogs: Arc<dyn crate::media::ImageLookup>,
    categories: Arc<dyn crate::media::ImageLookup>,
) -> web::Data<AppData> {
    let config = config(&[]);
    web::Data::new(AppData {
        context: offline_context().await,
        media: Media::new(config.base_url(), store, blogs, categories),
        keys: JwtKeys::from_config(&config),
        mailer: Arc::new(LogMailer),
        config,
    })
}

pub fn token(data: &AppData, role: Role) -> String {
    let user = WithId(
        Id::new(),
        User::new("T".into(), "t@example.com".into(), String::new(), role),
    );
    data.keys.issue(&user).unwrap()
}

pub fn blog(title: &str) -> Blog {
    serde_json::from_value::<crate::stores::BlogInput>(serde_json::json!({
        "title": title,
        "description": "description",
        "content": "content",
    }))
    .unwrap()
    .into_blog(None)
}
