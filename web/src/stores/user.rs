use mongodm::{f, CollectionConfig, Index, IndexOption, Indexes, Model};
use serde::{Deserialize, Serialize};

use crate::mongo::bson::DateTime;

use super::now;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct User {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(
        rename = "resetPasswordToken",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub reset_password_token: Option<String>,
    #[serde(
        rename = "resetPasswordExpires",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub reset_password_expires: Option<DateTime>,
    #[serde(rename = "createdAt", default = "now")]
    pub created_at: DateTime,
    #[serde(rename = "updatedAt", default = "now")]
    pub updated_at: DateTime,
}

impl User {
    pub fn new(name: String, email: String, password_hash: String, role: Role) -> Self {
        let at = now();
        Self {
            name,
            email,
            password: password_hash,
            phone: None,
            role,
            reset_password_token: None,
            reset_password_expires: None,
            created_at: at,
            updated_at: at,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

pub struct UserCfg {}

impl CollectionConfig for UserCfg {
    fn collection_name() -> &'static str {
        "users"
    }

    fn indexes() -> Indexes {
        Indexes::new().with(Index::new(f!(email in User)).with_option(IndexOption::Unique))
    }
}

impl Model for User {
    type CollConf = UserCfg;
}
