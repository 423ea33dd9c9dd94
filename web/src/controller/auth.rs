use actix_web::{post, web, HttpResponse, Scope};

use crate::{
    app_data::AppData,
    app_error::Response,
    auth::AdminUser,
    services::{ForgotPasswordInput, LoginInput, RegisterInput, ResetPasswordInput, UserService},
};

pub fn scope() -> Scope {
    web::scope("/api/auth")
        .service(login)
        .service(register)
        .service(forgot_password)
        .service(reset_password)
        .service(register_admin)
}

#[post("/login")]
async fn login(st: web::Data<AppData>, body: web::Json<LoginInput>) -> Response {
    let out = UserService::new(&st).login(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(out))
}

#[post("/register")]
async fn register(st: web::Data<AppData>, body: web::Json<RegisterInput>) -> Response {
    let out = UserService::new(&st).register(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(out))
}

#[post("/forgot-password")]
async fn forgot_password(
    st: web::Data<AppData>,
    body: web::Json<ForgotPasswordInput>,
) -> Response {
    let out = UserService::new(&st)
        .forgot_password(body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(out))
}

#[post("/reset-password")]
async fn reset_password(
    st: web::Data<AppData>,
    body: web::Json<ResetPasswordInput>,
) -> Response {
    let out = UserService::new(&st)
        .reset_password(body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(out))
}

#[post("/register-admin")]
async fn register_admin(
    _admin: AdminUser,
    st: web::Data<AppData>,
    body: web::Json<RegisterInput>,
) -> Response {
    let out = UserService::new(&st)
        .register_admin(body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(out))
}
