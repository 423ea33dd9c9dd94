mod blog;
mod category;
mod tag;
mod user;

pub use blog::{Blog, BlogInput, BlogPatch};
pub use category::{Category, CategoryInput, CategoryPatch, Subcategory};
pub use tag::{Tag, TagInput, TagPatch};
pub use user::{Role, User};

use serde::{Deserialize, Deserializer};

use crate::mongo::{
    bson::DateTime,
    withid::{parse_id, Id},
};

pub(crate) fn now() -> DateTime {
    DateTime::now()
}

pub(crate) fn default_status() -> i32 {
    1
}

pub(crate) fn default_true() -> bool {
    true
}

pub(crate) fn parse_ids(values: &[String]) -> Vec<Id> {
    values.iter().filter_map(|v| parse_id(v.trim())).collect()
}

/// `null` becomes `Some(None)`, an absent field stays `None`.
pub(crate) fn double_option<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}
