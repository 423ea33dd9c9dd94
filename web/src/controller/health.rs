use actix_web::{get, HttpResponse};
use serde_json::json;

#[get("/api/test")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "message": "API is working!",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
