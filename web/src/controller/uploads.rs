use actix_multipart::Multipart;
use actix_web::{get, post, web, HttpResponse};
use futures::TryStreamExt;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::serve_image;
use crate::{
    app_data::AppData,
    app_error::{AppError, Response},
    media::{codec::is_embedded, ImageRef},
};

pub fn route(cfg: &mut web::ServiceConfig) {
    cfg.service(uploaded).service(upload).service(upload_base64);
}

#[get("/uploads/{filename}")]
async fn uploaded(st: web::Data<AppData>, path: web::Path<String>) -> Response {
    serve_image(&st, &path, &st.media.all()).await
}

#[post("/api/upload")]
async fn upload(st: web::Data<AppData>, mut payload: Multipart) -> Response {
    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| AppError::bad_request(e.to_string()))?
    {
        let disposition = field.content_disposition();
        if disposition.get_name() != Some("image") {
            continue;
        }
        let original = disposition.get_filename().unwrap_or_default().to_string();
        let mut bytes = Vec::new();
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|e| AppError::bad_request(e.to_string()))?
        {
            bytes.extend_from_slice(&chunk);
        }
        let filename = st.media.ingest.names().generate_upload(&original);
        st.media.store().write(&filename, &bytes).await?;
        return Ok(HttpResponse::Ok().json(json!({
            "original_url": st.media.ingest.public_url(&filename),
            "filename": filename,
        })));
    }
    Err(AppError::bad_request("No file uploaded"))
}

#[derive(Deserialize, Debug)]
struct Base64Upload {
    thumbnail: Option<ImageRef>,
    #[serde(rename = "metaImage")]
    meta_image: Option<ImageRef>,
}

#[post("/api/upload/base64")]
async fn upload_base64(st: web::Data<AppData>, body: web::Json<Base64Upload>) -> Response {
    let body = body.into_inner();
    let mut out = Map::new();
    for (key, role, field) in [
        ("thumbnail", "thumbnail", body.thumbnail),
        ("metaImage", "meta-image", body.meta_image),
    ] {
        if let Some(url) = field.and_then(|f| f.original_url) {
            out.insert(key.to_string(), store_payload(&st, &url, role).await?);
        }
    }
    Ok(HttpResponse::Ok().json(Value::Object(out)))
}

async fn store_payload(st: &AppData, payload: &str, role: &str) -> Response<Value> {
    if !is_embedded(payload) {
        return Ok(Value::Null);
    }
    let (image, decoded) = match st.media.ingest.embed(payload, role) {
        Ok(embedded) => embedded,
        Err(e) => {
            log::warn!(target: "zetta", "rejected {} upload: {}", role, e);
            return Ok(Value::Null);
        }
    };
    let filename = image.filename.unwrap_or_default();
    st.media.store().write(&filename, &decoded.bytes).await?;
    Ok(json!({ "original_url": image.original_url, "filename": filename }))
}
