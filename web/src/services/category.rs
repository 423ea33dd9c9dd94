use serde_json::Value;
use validator::Validate;

use super::{by_id_or_slug, message, ListQuery};
use crate::{
    app_data::AppData,
    app_error::{AppError, Response},
    images::Media,
    mongo::{
        bson::{doc, to_bson, to_document, Bson, DateTime},
        withid::{parse_id, Id, RepositoryWithId, WithId},
    },
    output::{json, json_record},
    stores::{Category, CategoryInput, CategoryPatch},
    utils::result::{Error, Result},
};

const CATEGORY_NOT_FOUND: &str = "Category not found";
const PARENT_NOT_FOUND: &str = "Parent category not found";
const SUBCATEGORY_NOT_FOUND: &str = "Subcategory not found";

pub struct CategoryService<'a> {
    categories: RepositoryWithId<Category>,
    media: &'a Media,
}

impl<'a> CategoryService<'a> {
    pub fn new(st: &'a AppData) -> Self {
        Self {
            categories: RepositoryWithId::new(&st.context),
            media: &st.media,
        }
    }

    pub async fn list(&self, query: ListQuery) -> Response<Value> {
        let filter = doc! { "parent": Bson::Null };
        let found = self
            .categories
            .find_all(filter.clone(), query.find_options(doc! { "name": 1 }))
            .await?;
        let total = self.categories.count(filter).await?;
        let mut data = Vec::with_capacity(found.len());
        for category in found {
            data.push(self.present(category).await?);
        }
        Ok(query.envelope(data, total))
    }

    pub async fn get(&self, key: &str) -> Response<Value> {
        let category = self
            .categories
            .find_one(by_id_or_slug(key))
            .await?
            .ok_or_else(|| AppError::not_found(CATEGORY_NOT_FOUND))?;
        Ok(self.present(category).await?)
    }

    pub async fn create(&self, input: CategoryInput) -> Response<Value> {
        input.validate()?;
        if let Some(parent) = input.parent.as_deref().and_then(parse_id) {
            return self.add_subcategory(parent, input).await;
        }
        if self
            .categories
            .find_one(doc! { "name": &input.name })
            .await?
            .is_some()
        {
            return Err(AppError::bad_request("Category with this name already exists"));
        }
        let mut category = input.into_category();
        self.media.ingest.ingest_all(&mut category);
        let id = self.categories.create(&category).await?;
        log::info!(target: "zetta", "category created: {}", id);
        Ok(self.present(WithId(id, category)).await?)
    }

    async fn add_subcategory(&self, parent: Id, input: CategoryInput) -> Response<Value> {
        let mut sub = input.into_subcategory();
        self.media.ingest.ingest_all(&mut sub);
        let matched = self
            .categories
            .update_raw(
                doc! { "_id": parent },
                doc! {
                    "$push": { "subcategories": bson(&sub)? },
                    "$set": { "updatedAt": DateTime::now() },
                },
            )
            .await?;
        if matched == 0 {
            return Err(AppError::not_found(PARENT_NOT_FOUND));
        }
        self.reload(&parent, PARENT_NOT_FOUND).await
    }

    pub async fn update(&self, id: &str, patch: CategoryPatch) -> Response<Value> {
        patch.validate()?;
        if let Some(parent) = patch.parent.as_deref().and_then(parse_id) {
            let sub = parse_id(id)
                .ok_or_else(|| AppError::not_found("Subcategory not found in parent category"))?;
            return self.update_in(parent, sub, patch, PARENT_NOT_FOUND).await;
        }
        let id = parse_id(id).ok_or_else(|| AppError::not_found(CATEGORY_NOT_FOUND))?;
        let WithId(id, mut category) = self
            .categories
            .find_one_by_id(&id)
            .await?
            .ok_or_else(|| AppError::not_found(CATEGORY_NOT_FOUND))?;
        patch.apply(&mut category);
        self.media.ingest.ingest_all(&mut category);
        let stored = WithId(id, category);
        if !self.categories.update(&stored).await? {
            return Err(AppError::not_found(CATEGORY_NOT_FOUND));
        }
        Ok(self.present(stored).await?)
    }

    pub async fn update_subcategory(
        &self,
        category: &str,
        sub: &str,
        patch: CategoryPatch,
    ) -> Response<Value> {
        patch.validate()?;
        let category =
            parse_id(category).ok_or_else(|| AppError::not_found(CATEGORY_NOT_FOUND))?;
        let sub = parse_id(sub).ok_or_else(|| AppError::not_found(SUBCATEGORY_NOT_FOUND))?;
        self.update_in(category, sub, patch, CATEGORY_NOT_FOUND).await
    }

    /// Rewrites only the matching array element; siblings and the parent's own fields stay.
    async fn update_in(
        &self,
        category: Id,
        sub: Id,
        patch: CategoryPatch,
        missing: &str,
    ) -> Response<Value> {
        let WithId(_, parent) = self
            .categories
            .find_one_by_id(&category)
            .await?
            .ok_or_else(|| AppError::not_found(missing))?;
        let mut updated = parent
            .subcategory(&sub)
            .cloned()
            .ok_or_else(|| AppError::not_found(SUBCATEGORY_NOT_FOUND))?;
        patch.apply_sub(&mut updated);
        self.media.ingest.ingest_all(&mut updated);
        let matched = self
            .categories
            .update_raw(
                doc! { "_id": category, "subcategories._id": sub },
                doc! {
                    "$set": {
                        "subcategories.$": bson(&updated)?,
                        "updatedAt": DateTime::now(),
                    }
                },
            )
            .await?;
        if matched == 0 {
            return Err(AppError::not_found(SUBCATEGORY_NOT_FOUND));
        }
        self.reload(&category, missing).await
    }

    pub async fn subcategories(&self, category: &str) -> Response<Value> {
        let category =
            parse_id(category).ok_or_else(|| AppError::not_found(CATEGORY_NOT_FOUND))?;
        let WithId(_, mut parent) = self
            .categories
            .find_one_by_id(&category)
            .await?
            .ok_or_else(|| AppError::not_found(CATEGORY_NOT_FOUND))?;
        self.media.present(&mut parent.subcategories).await;
        let total = parent.subcategories.len() as u64;
        let mut data = Vec::with_capacity(parent.subcategories.len());
        for sub in &parent.subcategories {
            data.push(json(to_document(sub).map_err(Error::from)?));
        }
        Ok(ListQuery::default().envelope(data, total))
    }

    pub async fn delete_subcategory(&self, category: &str, sub: &str) -> Response<Value> {
        let category =
            parse_id(category).ok_or_else(|| AppError::not_found(CATEGORY_NOT_FOUND))?;
        let sub = parse_id(sub).ok_or_else(|| AppError::not_found(SUBCATEGORY_NOT_FOUND))?;
        let WithId(_, parent) = self
            .categories
            .find_one_by_id(&category)
            .await?
            .ok_or_else(|| AppError::not_found(CATEGORY_NOT_FOUND))?;
        if parent.subcategory(&sub).is_none() {
            return Err(AppError::not_found(SUBCATEGORY_NOT_FOUND));
        }
        self.categories
            .update_raw(
                doc! { "_id": category },
                doc! {
                    "$pull": { "subcategories": { "_id": sub } },
                    "$set": { "updatedAt": DateTime::now() },
                },
            )
            .await?;
        message("Subcategory deleted successfully")
    }

    pub async fn delete(&self, id: &str) -> Response<Value> {
        let id = parse_id(id).ok_or_else(|| AppError::not_found(CATEGORY_NOT_FOUND))?;
        if !self.categories.delete(&id).await? {
            return Err(AppError::not_found(CATEGORY_NOT_FOUND));
        }
        message("Category deleted successfully")
    }

    async fn reload(&self, id: &Id, missing: &str) -> Response<Value> {
        let category = self
            .categories
            .find_one_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(missing))?;
        Ok(self.present(category).await?)
    }

    async fn present(&self, category: WithId<Category>) -> Result<Value> {
        let WithId(id, mut category) = category;
        self.media.present(&mut category).await;
        json_record(&WithId(id, category))
    }
}

fn bson<T: serde::Serialize>(value: &T) -> Result<Bson> {
    Ok(to_bson(value)?)
}
