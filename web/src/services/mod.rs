mod blog;
mod category;
mod migrate;
mod tag;
mod user;

pub use blog::BlogService;
pub use category::CategoryService;
pub use migrate::{backfill, migrate_images, MigrationReport};
pub use tag::TagService;
pub use user::{
    ensure_admin, ForgotPasswordInput, LoginInput, RegisterInput, ResetPasswordInput,
    UserService, RESET_SENT,
};

use mongodb::{error::ErrorKind, options::FindOptions};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    app_error::Response,
    mongo::{
        bson::{doc, Document},
        withid::parse_id,
    },
    utils::result::Error,
};

pub const MAX_LIMIT: u64 = 1000;

#[derive(Deserialize, Debug, Default, Clone, Copy)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl ListQuery {
    fn page(&self) -> Option<(u64, u64)> {
        let limit = self.limit.filter(|l| *l > 0)?.min(MAX_LIMIT);
        Some((self.page.unwrap_or(1).max(1), limit))
    }

    pub fn find_options(&self, sort: Document) -> FindOptions {
        let mut options = FindOptions::default();
        options.sort = Some(sort);
        if let Some((page, limit)) = self.page() {
            let skip = (page - 1).saturating_mul(limit).min(i64::MAX as u64);
            options.skip = Some(skip);
            options.limit = Some(limit as i64);
        }
        options
    }

    pub fn envelope(&self, data: Vec<Value>, total: u64) -> Value {
        let mut out = json!({ "data": data, "total": total });
        if let Some((page, limit)) = self.page() {
            out["page"] = json!(page);
            out["limit"] = json!(limit);
        }
        out
    }
}

pub fn by_id_or_slug(key: &str) -> Document {
    match parse_id(key) {
        Some(id) => doc! { "_id": id },
        None => doc! { "slug": key },
    }
}

pub fn message(text: &str) -> Response<Value> {
    Ok(json!({ "message": text }))
}

/// Server selection and `MaxTimeMSExpired` failures count as timeouts.
pub fn is_timeout(error: &Error) -> bool {
    if error.downcast_ref::<tokio::time::error::Elapsed>().is_some() {
        return true;
    }
    match error.downcast_ref::<mongodb::error::Error>() {
        Some(e) => match e.kind.as_ref() {
            ErrorKind::ServerSelection { .. } => true,
            ErrorKind::Command(command) => command.code == 50,
            ErrorKind::Io(io) => io.kind() == std::io::ErrorKind::TimedOut,
            _ => false,
        },
        None => false,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mongo::withid::Id;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_pagination() {
        let query = ListQuery {
            page: Some(3),
            limit: Some(10),
        };
        let options = query.find_options(doc! { "name": 1 });
        assert_eq!(Some(20), options.skip);
        assert_eq!(Some(10), options.limit);
        let out = query.envelope(vec![], 42);
        assert_eq!(json!({ "data": [], "total": 42, "page": 3, "limit": 10 }), out);
    }

    #[test]
    fn test_pagination_extremes_clamp() {
        let query = ListQuery {
            page: Some(u64::MAX),
            limit: Some(u64::MAX),
        };
        let options = query.find_options(doc! { "name": 1 });
        assert_eq!(Some(MAX_LIMIT as i64), options.limit);
        assert_eq!(Some(i64::MAX as u64), options.skip);
        let out = query.envelope(vec![], 0);
        assert_eq!(json!(MAX_LIMIT), out["limit"]);

        let query = ListQuery {
            page: Some(18446744073709551615),
            limit: Some(2),
        };
        let options = query.find_options(doc! { "name": 1 });
        assert_eq!(Some(2), options.limit);
        assert_eq!(Some(i64::MAX as u64), options.skip);
    }

    #[test]
    fn test_no_pagination() {
        let query = ListQuery::default();
        let options = query.find_options(doc! { "name": 1 });
        assert_eq!(None, options.limit);
        assert_eq!(json!({ "data": [], "total": 0 }), query.envelope(vec![], 0));
    }

    #[test]
    fn test_by_id_or_slug() {
        let id = Id::new();
        assert_eq!(doc! { "_id": id }, by_id_or_slug(&id.to_hex()));
        assert_eq!(doc! { "slug": "hello-world" }, by_id_or_slug("hello-world"));
    }

    #[actix_web::test]
    async fn test_elapsed_is_timeout() {
        let elapsed = tokio::time::timeout(
            std::time::Duration::from_millis(1),
            futures::future::pending::<()>(),
        )
        .await
        .unwrap_err();
        assert!(is_timeout(&elapsed.into()));
        assert!(!is_timeout(&crate::utils::simple_error!("nope")));
    }
}
