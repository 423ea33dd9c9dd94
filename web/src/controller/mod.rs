mod auth;
mod blogs;
mod categories;
mod health;
mod tags;
mod uploads;

use actix_web::{web, HttpResponse};

use crate::{app_data::AppData, app_error::Response, media::ImageLookup};

pub fn route(cfg: &mut web::ServiceConfig) {
    cfg.service(health::health)
        .service(auth::scope())
        .service(blogs::scope())
        .service(categories::scope())
        .service(tags::scope())
        .configure(uploads::route);
}

pub(crate) async fn serve_image(
    st: &AppData,
    filename: &str,
    lookup: &dyn ImageLookup,
) -> Response {
    let bytes = st
        .media
        .rehydrator
        .resolve(filename, lookup)
        .await?;
    Ok(HttpResponse::Ok()
        .content_type(mime_guess::from_path(filename).first_or_octet_stream().as_ref())
        .body(bytes))
}
