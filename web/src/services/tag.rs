use serde_json::Value;
use validator::Validate;

use super::{by_id_or_slug, message, ListQuery};
use crate::{
    app_data::AppData,
    app_error::{AppError, Response},
    mongo::{
        bson::doc,
        withid::{parse_id, RepositoryWithId, WithId},
    },
    output::json_record,
    stores::{Tag, TagInput, TagPatch},
};

pub struct TagService {
    tags: RepositoryWithId<Tag>,
}

impl TagService {
    pub fn new(st: &AppData) -> Self {
        Self {
            tags: RepositoryWithId::new(&st.context),
        }
    }

    pub async fn list(&self, query: ListQuery) -> Response<Value> {
        let found = self
            .tags
            .find_all(doc! {}, query.find_options(doc! { "name": 1 }))
            .await?;
        let total = self.tags.count(doc! {}).await?;
        let data = found.iter().map(json_record).collect::<Result<Vec<_>, _>>()?;
        Ok(query.envelope(data, total))
    }

    pub async fn get(&self, key: &str) -> Response<Value> {
        let tag = self
            .tags
            .find_one(by_id_or_slug(key))
            .await?
            .ok_or_else(not_found)?;
        Ok(json_record(&tag)?)
    }

    pub async fn create(&self, input: TagInput) -> Response<Value> {
        input.validate()?;
        if self.tags.find_one(doc! { "name": &input.name }).await?.is_some() {
            return Err(AppError::bad_request("Tag with this name already exists"));
        }
        let tag = Tag::from(input);
        let id = self.tags.create(&tag).await?;
        Ok(json_record(&WithId(id, tag))?)
    }

    pub async fn update(&self, id: &str, patch: TagPatch) -> Response<Value> {
        patch.validate()?;
        let id = parse_id(id).ok_or_else(not_found)?;
        let WithId(id, mut tag) = self.tags.find_one_by_id(&id).await?.ok_or_else(not_found)?;
        patch.apply(&mut tag);
        let stored = WithId(id, tag);
        if !self.tags.update(&stored).await? {
            return Err(not_found());
        }
        Ok(json_record(&stored)?)
    }

    pub async fn delete(&self, id: &str) -> Response<Value> {
        let id = parse_id(id).ok_or_else(not_found)?;
        if !self.tags.delete(&id).await? {
            return Err(not_found());
        }
        message("Tag deleted successfully")
    }
}

fn not_found() -> AppError {
    AppError::not_found("Tag not found")
}
