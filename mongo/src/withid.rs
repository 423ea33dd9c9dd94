use futures::{stream::BoxStream, StreamExt, TryStreamExt};
use mongodm::{
    bson::{doc, from_document, oid::ObjectId, Bson, Document},
    mongo::{
        options::{FindOneOptions, FindOptions},
        Collection,
    },
    Model,
};

use crate::{
    context::MongodmContext,
    utils::{result::Result, simple_error},
};

pub type Id = ObjectId;

/// A stored model paired with its `_id`.
#[derive(Debug, Clone)]
pub struct WithId<M>(pub Id, pub M);

impl<M> WithId<M> {
    pub fn id(&self) -> &Id {
        &self.0
    }
}

pub type ModelWithIdStream<M> = BoxStream<'static, Result<WithId<M>>>;

pub struct RepositoryWithId<M>
where
    M: Model,
{
    repo: Collection<M>,
    coll: Collection<Document>,
}

impl<M> Clone for RepositoryWithId<M>
where
    M: Model,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            coll: self.coll.clone(),
        }
    }
}

impl<M> RepositoryWithId<M>
where
    M: Model + 'static,
{
    pub fn new(ctx: &impl MongodmContext) -> Self {
        let repo = ctx.collection::<M>();
        Self {
            coll: repo.clone_with_type::<Document>(),
            repo,
        }
    }

    pub async fn create(&self, model: &M) -> Result<Id> {
        Self::oid(self.repo.insert_one(model, None).await?.inserted_id)
    }

    /// Replaces the stored document. Returns `false` when no document has that id.
    pub async fn update(&self, model: &WithId<M>) -> Result<bool> {
        let result = self
            .repo
            .replace_one(doc! {"_id": Bson::ObjectId(model.0)}, &model.1, None)
            .await?;
        Ok(result.matched_count == 1)
    }

    /// Applies an update document to the first match. Returns the matched count.
    pub async fn update_raw(&self, query: Document, update: Document) -> Result<u64> {
        let result = self.coll.update_one(query, update, None).await?;
        Ok(result.matched_count)
    }

    pub async fn delete(&self, id: &Id) -> Result<bool> {
        let result = self
            .repo
            .delete_one(doc! {"_id": Bson::ObjectId(*id)}, None)
            .await?;
        Ok(result.deleted_count == 1)
    }

    pub async fn find_one(&self, query: Document) -> Result<Option<WithId<M>>> {
        self.find_one_with(query, None).await
    }

    pub async fn find_one_with(
        &self,
        query: Document,
        option: impl Into<Option<FindOneOptions>>,
    ) -> Result<Option<WithId<M>>> {
        match self.coll.find_one(query, option).await? {
            Some(doc) => Ok(Some(Self::doc_to_model_with_id(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn find_one_by_id(&self, id: &Id) -> Result<Option<WithId<M>>> {
        self.find_one(doc! {"_id": Bson::ObjectId(*id)}).await
    }

    pub async fn find(
        &self,
        query: Document,
        option: impl Into<Option<FindOptions>>,
    ) -> Result<ModelWithIdStream<M>> {
        let cursor = self.coll.find(query, option).await?;
        Ok(cursor
            .map(|doc| match doc {
                Ok(doc) => Self::doc_to_model_with_id(doc),
                Err(e) => Err(e.into()),
            })
            .boxed())
    }

    pub async fn find_all(
        &self,
        query: Document,
        option: impl Into<Option<FindOptions>>,
    ) -> Result<Vec<WithId<M>>> {
        self.find(query, option).await?.try_collect().await
    }

    pub async fn find_by_ids(&self, ids: &[Id]) -> Result<Vec<WithId<M>>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        self.find_all(doc! {"_id": {"$in": ids.to_vec()}}, None)
            .await
    }

    pub async fn count(&self, query: Document) -> Result<u64> {
        Ok(self.coll.count_documents(query, None).await?)
    }

    pub(crate) fn oid(bson: Bson) -> Result<Id> {
        match bson {
            Bson::ObjectId(oid) => Ok(oid),
            _ => Err(simple_error!("value is not ObjectId")),
        }
    }

    pub(crate) fn get_id_from_doc(doc: &Document) -> Result<Id> {
        match doc.get("_id") {
            Some(id) => Self::oid(id.clone()),
            None => Err(simple_error!("document doesn't have _id")),
        }
    }

    pub(crate) fn doc_to_model_with_id(doc: Document) -> Result<WithId<M>> {
        let id = Self::get_id_from_doc(&doc)?;
        Ok(WithId(id, from_document(doc)?))
    }
}

/// Parses a 24-hex id, returning `None` for anything else (slugs, garbage).
pub fn parse_id(value: &str) -> Option<Id> {
    if value.len() != 24 {
        return None;
    }
    ObjectId::parse_str(value).ok()
}
