use actix_web::{delete, get, post, put, web, HttpResponse, Scope};

use crate::{
    app_data::AppData,
    app_error::Response,
    auth::AdminUser,
    services::{ListQuery, TagService},
    stores::{TagInput, TagPatch},
};

pub fn scope() -> Scope {
    web::scope("/api/tags")
        .service(list)
        .service(get_one)
        .service(create)
        .service(update)
        .service(remove)
}

#[get("")]
async fn list(st: web::Data<AppData>, query: web::Query<ListQuery>) -> Response {
    Ok(HttpResponse::Ok().json(TagService::new(&st).list(query.into_inner()).await?))
}

#[get("/{id}")]
async fn get_one(st: web::Data<AppData>, path: web::Path<String>) -> Response {
    Ok(HttpResponse::Ok().json(TagService::new(&st).get(&path).await?))
}

#[post("")]
async fn create(_admin: AdminUser, st: web::Data<AppData>, body: web::Json<TagInput>) -> Response {
    let out = TagService::new(&st).create(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(out))
}

#[put("/{id}")]
async fn update(
    _admin: AdminUser,
    st: web::Data<AppData>,
    path: web::Path<String>,
    body: web::Json<TagPatch>,
) -> Response {
    let out = TagService::new(&st).update(&path, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(out))
}

#[delete("/{id}")]
async fn remove(_admin: AdminUser, st: web::Data<AppData>, path: web::Path<String>) -> Response {
    Ok(HttpResponse::Ok().json(TagService::new(&st).delete(&path).await?))
}
