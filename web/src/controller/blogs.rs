use actix_web::{delete, get, post, put, web, HttpResponse, Scope};

use super::serve_image;
use crate::{
    app_data::AppData,
    app_error::Response,
    auth::AdminUser,
    services::{BlogService, ListQuery},
    stores::{BlogInput, BlogPatch},
};

pub fn scope() -> Scope {
    web::scope("/api/blogs")
        .service(list)
        .service(published)
        .service(image)
        .service(get_one)
        .service(create)
        .service(update)
        .service(remove)
}

#[get("")]
async fn list(st: web::Data<AppData>, query: web::Query<ListQuery>) -> Response {
    let out = BlogService::new(&st).list(query.into_inner(), false).await?;
    Ok(HttpResponse::Ok().json(out))
}

#[get("/published")]
async fn published(st: web::Data<AppData>, query: web::Query<ListQuery>) -> Response {
    let out = BlogService::new(&st).list(query.into_inner(), true).await?;
    Ok(HttpResponse::Ok().json(out))
}

#[get("/image/{filename}")]
async fn image(st: web::Data<AppData>, path: web::Path<String>) -> Response {
    serve_image(&st, &path, st.media.blogs.as_ref()).await
}

#[get("/{id}")]
async fn get_one(st: web::Data<AppData>, path: web::Path<String>) -> Response {
    let out = BlogService::new(&st).get(&path).await?;
    Ok(HttpResponse::Ok().json(out))
}

#[post("")]
async fn create(
    AdminUser(claims): AdminUser,
    st: web::Data<AppData>,
    body: web::Json<BlogInput>,
) -> Response {
    let out = BlogService::new(&st)
        .create(body.into_inner(), claims.id())
        .await?;
    Ok(HttpResponse::Created().json(out))
}

#[put("/{id}")]
async fn update(
    _admin: AdminUser,
    st: web::Data<AppData>,
    path: web::Path<String>,
    body: web::Json<BlogPatch>,
) -> Response {
    let out = BlogService::new(&st).update(&path, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(out))
}

#[delete("/{id}")]
async fn remove(_admin: AdminUser, st: web::Data<AppData>, path: web::Path<String>) -> Response {
    let out = BlogService::new(&st).delete(&path).await?;
    Ok(HttpResponse::Ok().json(out))
}
