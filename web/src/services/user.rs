use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use super::message;
use crate::{
    app_data::AppData,
    app_error::{AppError, Response},
    auth::{hash_password, reset_token, verify_password, JwtKeys},
    mailer::{self, Mailer},
    mongo::{
        bson::{doc, Bson, DateTime},
        context::Context,
        withid::{RepositoryWithId, WithId},
    },
    stores::{Role, User},
    utils::{config::Config, result::Result},
};

pub const RESET_SENT: &str =
    "If an account with that email exists, a password reset link has been sent.";

#[derive(Deserialize, Debug)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Validate, Debug)]
pub struct RegisterInput {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "a valid email is required"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
    pub phone: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ForgotPasswordInput {
    pub email: String,
}

#[derive(Deserialize, Debug)]
pub struct ResetPasswordInput {
    pub email: String,
    pub token: String,
    pub password: String,
    pub password_confirmation: String,
}

pub struct UserService<'a> {
    users: RepositoryWithId<User>,
    keys: &'a JwtKeys,
    mailer: &'a Arc<dyn Mailer>,
    config: &'a Config,
}

impl<'a> UserService<'a> {
    pub fn new(st: &'a AppData) -> Self {
        Self {
            users: RepositoryWithId::new(&st.context),
            keys: &st.keys,
            mailer: &st.mailer,
            config: &st.config,
        }
    }

    async fn by_email(&self, email: &str) -> Result<Option<WithId<User>>> {
        self.users.find_one(doc! { "email": email }).await
    }

    pub async fn login(&self, input: LoginInput) -> Response<Value> {
        let user = match self.by_email(&input.email).await? {
            Some(user) if verify_password(&input.password, &user.1.password) => user,
            _ => return Err(AppError::unauthorized("Invalid credentials")),
        };
        Ok(json!({
            "token": self.keys.issue(&user)?,
            "user": public(&user),
        }))
    }

    pub async fn register(&self, input: RegisterInput) -> Response<Value> {
        let user = self.insert(input, Role::User).await?;
        let (subject, body) = mailer::welcome(self.config, &user.1.name);
        if let Err(e) = self.mailer.send(&user.1.email, &subject, &body).await {
            log::error!(target: "zetta", "welcome mail to {} failed: {}", user.1.email, e);
        }
        Ok(json!({
            "message": "User registered successfully",
            "token": self.keys.issue(&user)?,
            "user": public(&user),
        }))
    }

    pub async fn register_admin(&self, input: RegisterInput) -> Response<Value> {
        let user = self.insert(input, Role::Admin).await?;
        log::info!(target: "zetta", "admin created: {}", user.1.email);
        message("Admin created successfully")
    }

    async fn insert(&self, input: RegisterInput, role: Role) -> Response<WithId<User>> {
        input.validate()?;
        if self.by_email(&input.email).await?.is_some() {
            return Err(AppError::bad_request("User with this email already exists"));
        }
        let mut user = User::new(input.name, input.email, hash_password(&input.password)?, role);
        user.phone = input.phone;
        let id = self.users.create(&user).await?;
        Ok(WithId(id, user))
    }

    /// Answers the same way whether or not the address is known.
    pub async fn forgot_password(&self, input: ForgotPasswordInput) -> Response<Value> {
        let user = match self.by_email(&input.email).await? {
            Some(user) => user,
            None => return message(RESET_SENT),
        };
        let token = reset_token();
        let expires = DateTime::from_chrono(Utc::now() + Duration::hours(1));
        self.users
            .update_raw(
                doc! { "_id": user.0 },
                doc! { "$set": { "resetPasswordToken": &token, "resetPasswordExpires": expires } },
            )
            .await?;
        let url = mailer::reset_url(self.config, &token, &user.1.email);
        let (subject, body) = mailer::password_reset(self.config, &url);
        match self.mailer.send(&user.1.email, &subject, &body).await {
            Ok(()) => message(RESET_SENT),
            Err(e) => {
                log::error!(target: "zetta", "reset mail to {} failed: {}", user.1.email, e);
                Err(AppError::new(
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to send password reset email. Please try again later.",
                ))
            }
        }
    }

    pub async fn reset_password(&self, input: ResetPasswordInput) -> Response<Value> {
        if input.password != input.password_confirmation {
            return Err(AppError::bad_request("Password confirmation does not match"));
        }
        if input.password.chars().count() < 6 {
            return Err(AppError::bad_request(
                "Password must be at least 6 characters long",
            ));
        }
        let query = doc! {
            "email": &input.email,
            "resetPasswordToken": &input.token,
            "resetPasswordExpires": { "$gt": DateTime::now() },
        };
        let user = self
            .users
            .find_one(query)
            .await?
            .ok_or_else(|| AppError::bad_request("Invalid or expired reset token"))?;
        self.users
            .update_raw(
                doc! { "_id": user.0 },
                doc! {
                    "$set": {
                        "password": hash_password(&input.password)?,
                        "updatedAt": DateTime::now(),
                    },
                    "$unset": { "resetPasswordToken": Bson::Null, "resetPasswordExpires": Bson::Null },
                },
            )
            .await?;
        message("Password reset successfully")
    }
}

fn public(user: &WithId<User>) -> Value {
    json!({
        "id": user.0.to_hex(),
        "name": user.1.name,
        "email": user.1.email,
        "phone": user.1.phone,
        "role": user.1.role,
    })
}

pub async fn ensure_admin(context: &Context, config: &Config) -> Result<bool> {
    let users = RepositoryWithId::<User>::new(context);
    if users
        .find_one(doc! { "email": &config.admin_email })
        .await?
        .is_some()
    {
        log::info!(target: "zetta", "admin user present: {}", config.admin_email);
        return Ok(false);
    }
    let admin = User::new(
        config.admin_name.clone(),
        config.admin_email.clone(),
        hash_password(&config.admin_password)?,
        Role::Admin,
    );
    users.create(&admin).await?;
    log::info!(target: "zetta", "admin user created: {}", config.admin_email);
    Ok(true)
}

#[cfg(test)]
mod test {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::{mongo::test_util::with_mongo, test_util};
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct Outbox(Mutex<Vec<(String, String)>>);

    #[async_trait]
    impl Mailer for Outbox {
        async fn send(&self, to: &str, _: &str, body: &str) -> Result<()> {
            self.0
                .lock()
                .unwrap()
                .push((to.to_string(), body.to_string()));
            Ok(())
        }
    }

    fn token_in(body: &str) -> String {
        let start = body.find("token=").unwrap() + "token=".len();
        body[start..].split('&').next().unwrap().to_string()
    }

    #[actix_web::test]
    async fn test_register_login_reset() {
        with_mongo(|ctx| async move {
            let outbox = Arc::new(Outbox::default());
            let mut st = AppData::new((*ctx).clone(), test_util::config(&[]));
            st.mailer = outbox.clone();
            let service = UserService::new(&st);

            let registered = service
                .register(serde_json::from_value(json!({
                    "name": "Ann",
                    "email": "ann@example.com",
                    "password": "secret1",
                }))?)
                .await
                .unwrap();
            assert_eq!("user", registered["user"]["role"]);
            let again = service
                .register(serde_json::from_value(json!({
                    "name": "Ann",
                    "email": "ann@example.com",
                    "password": "secret1",
                }))?)
                .await
                .unwrap_err();
            assert_eq!("User with this email already exists", again.message());

            let bad = LoginInput {
                email: "ann@example.com".into(),
                password: "nope".into(),
            };
            assert_eq!("Invalid credentials", service.login(bad).await.unwrap_err().message());

            let unknown = ForgotPasswordInput {
                email: "bob@example.com".into(),
            };
            assert_eq!(RESET_SENT, service.forgot_password(unknown).await.unwrap()["message"]);
            let known = ForgotPasswordInput {
                email: "ann@example.com".into(),
            };
            service.forgot_password(known).await.unwrap();
            let token = token_in(&outbox.0.lock().unwrap().last().unwrap().1);
            assert_eq!(64, token.len());

            let reset = ResetPasswordInput {
                email: "ann@example.com".into(),
                token: token.clone(),
                password: "secret2".into(),
                password_confirmation: "secret2".into(),
            };
            service.reset_password(reset).await.unwrap();
            let replay = ResetPasswordInput {
                email: "ann@example.com".into(),
                token,
                password: "secret3".into(),
                password_confirmation: "secret3".into(),
            };
            assert_eq!(
                "Invalid or expired reset token",
                service.reset_password(replay).await.unwrap_err().message()
            );

            let good = LoginInput {
                email: "ann@example.com".into(),
                password: "secret2".into(),
            };
            let login = service.login(good).await.unwrap();
            let claims = st.keys.verify(login["token"].as_str().unwrap())?;
            assert_eq!(Role::User, claims.role);
            Ok(())
        })
        .await
        .unwrap();
    }

    #[actix_web::test]
    async fn test_ensure_admin_once() {
        with_mongo(|ctx| async move {
            let config = test_util::config(&[]);
            assert!(ensure_admin(&ctx, &config).await?);
            assert!(!ensure_admin(&ctx, &config).await?);
            Ok(())
        })
        .await
        .unwrap();
    }

    #[actix_web::test]
    async fn test_reset_rejects_mismatch_before_lookup() {
        let st = AppData::new(test_util::offline_context().await, test_util::config(&[]));
        let input = ResetPasswordInput {
            email: "a@example.com".into(),
            token: "t".into(),
            password: "secret1".into(),
            password_confirmation: "secret2".into(),
        };
        let err = UserService::new(&st).reset_password(input).await.unwrap_err();
        assert_eq!("Password confirmation does not match", err.message());
    }
}
