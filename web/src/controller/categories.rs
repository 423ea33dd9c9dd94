use actix_web::{delete, get, post, put, web, HttpResponse, Scope};

use super::serve_image;
use crate::{
    app_data::AppData,
    app_error::Response,
    auth::AdminUser,
    services::{CategoryService, ListQuery},
    stores::{CategoryInput, CategoryPatch},
};

pub fn scope() -> Scope {
    web::scope("/api/categories")
        .service(list)
        .service(image)
        .service(subcategories)
        .service(get_one)
        .service(create)
        .service(update_subcategory)
        .service(update)
        .service(remove_subcategory)
        .service(remove)
}

#[get("")]
async fn list(st: web::Data<AppData>, query: web::Query<ListQuery>) -> Response {
    let out = CategoryService::new(&st).list(query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(out))
}

#[get("/image/{filename}")]
async fn image(st: web::Data<AppData>, path: web::Path<String>) -> Response {
    serve_image(&st, &path, st.media.categories.as_ref()).await
}

#[get("/{category_id}/subcategories")]
async fn subcategories(st: web::Data<AppData>, path: web::Path<String>) -> Response {
    let out = CategoryService::new(&st).subcategories(&path).await?;
    Ok(HttpResponse::Ok().json(out))
}

#[get("/{id}")]
async fn get_one(st: web::Data<AppData>, path: web::Path<String>) -> Response {
    let out = CategoryService::new(&st).get(&path).await?;
    Ok(HttpResponse::Ok().json(out))
}

#[post("")]
async fn create(
    _admin: AdminUser,
    st: web::Data<AppData>,
    body: web::Json<CategoryInput>,
) -> Response {
    let out = CategoryService::new(&st).create(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(out))
}

#[put("/{category_id}/subcategory/{subcategory_id}")]
async fn update_subcategory(
    _admin: AdminUser,
    st: web::Data<AppData>,
    path: web::Path<(String, String)>,
    body: web::Json<CategoryPatch>,
) -> Response {
    let (category, sub) = path.into_inner();
    let out = CategoryService::new(&st)
        .update_subcategory(&category, &sub, body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(out))
}

#[put("/{id}")]
async fn update(
    _admin: AdminUser,
    st: web::Data<AppData>,
    path: web::Path<String>,
    body: web::Json<CategoryPatch>,
) -> Response {
    let out = CategoryService::new(&st)
        .update(&path, body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(out))
}

#[delete("/{category_id}/subcategory/{subcategory_id}")]
async fn remove_subcategory(
    _admin: AdminUser,
    st: web::Data<AppData>,
    path: web::Path<(String, String)>,
) -> Response {
    let (category, sub) = path.into_inner();
    let out = CategoryService::new(&st)
        .delete_subcategory(&category, &sub)
        .await?;
    Ok(HttpResponse::Ok().json(out))
}

#[delete("/{id}")]
async fn remove(_admin: AdminUser, st: web::Data<AppData>, path: web::Path<String>) -> Response {
    let out = CategoryService::new(&st).delete(&path).await?;
    Ok(HttpResponse::Ok().json(out))
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use actix_web::{http::StatusCode, test, App};
    use pretty_assertions::assert_eq;

    use crate::{
        media::{ImageIngest, ImageLookup, ImageRef, MemoryStore},
        stores::Role,
        test_util,
    };

    const GIF: &str = "data:image/gif;base64,R0lGODlhAQABAAAAACw=";

    #[actix_web::test]
    async fn test_subcategory_image_served() {
        let ingest = ImageIngest::new("http://localhost:3004");
        let icon = ingest
            .ingest(Some(ImageRef::embedded(GIF)), "subcategory-icon")
            .unwrap();
        let none: Arc<dyn ImageLookup> = Arc::new(Vec::<ImageRef>::new());
        let categories: Arc<dyn ImageLookup> = Arc::new(vec![icon.clone()]);
        let data = test_util::app_data(Arc::new(MemoryStore::new()), none, categories).await;
        let app = test::init_service(App::new().app_data(data).service(super::scope())).await;

        let uri = format!("/api/categories/image/{}", icon.filename.as_deref().unwrap());
        let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
        assert_eq!(StatusCode::OK, resp.status());
        assert_eq!("image/gif", resp.headers().get("content-type").unwrap());
        let body = test::read_body(resp).await;
        assert_eq!(&b"GIF89a"[..], &body[..6]);
    }

    #[actix_web::test]
    async fn test_delete_requires_admin() {
        let none: Arc<dyn ImageLookup> = Arc::new(Vec::<ImageRef>::new());
        let data = test_util::app_data(Arc::new(MemoryStore::new()), none.clone(), none).await;
        let user = test_util::token(&data, Role::User);
        let app = test::init_service(App::new().app_data(data).service(super::scope())).await;
        let req = test::TestRequest::delete()
            .uri("/api/categories/0123456789abcdef01234567/subcategory/0123456789abcdef01234568")
            .insert_header(("Authorization", format!("Bearer {}", user)))
            .to_request();
        assert_eq!(
            StatusCode::FORBIDDEN,
            test::call_service(&app, req).await.status()
        );
    }
}
