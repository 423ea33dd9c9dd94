use std::sync::Arc;

use async_trait::async_trait;
use mongodm::Model;

use crate::{
    media::{
        sanitize, ChainLookup, ContentStore, FsStore, HasImages, ImageIngest, ImageLookup,
        ImageRef, Rehydrator,
    },
    mongo::{
        bson::{doc, Bson, Document},
        context::MongodmContext,
        withid::{RepositoryWithId, WithId},
    },
    stores::{Blog, Category},
    utils::{config::Config, result::Result},
};

pub struct MongoImageLookup<M: Model> {
    repo: RepositoryWithId<M>,
    paths: &'static [&'static str],
}

pub const BLOG_IMAGE_PATHS: &[&str] = &["thumbnail.filename", "metaImage.filename"];

pub const CATEGORY_IMAGE_PATHS: &[&str] = &[
    "icon.filename",
    "image.filename",
    "subcategories.icon.filename",
    "subcategories.image.filename",
];

impl<M> MongoImageLookup<M>
where
    M: Model + HasImages + Send + Sync + 'static,
{
    pub fn new(ctx: &impl MongodmContext, paths: &'static [&'static str]) -> Self {
        Self {
            repo: RepositoryWithId::new(ctx),
            paths,
        }
    }

    fn query(&self, filename: &str) -> Document {
        let any: Vec<Bson> = self
            .paths
            .iter()
            .map(|path| {
                let mut clause = Document::new();
                clause.insert(*path, filename);
                Bson::Document(clause)
            })
            .collect();
        doc! { "$or": any }
    }
}

#[async_trait]
impl<M> ImageLookup for MongoImageLookup<M>
where
    M: Model + HasImages + Send + Sync + 'static,
{
    async fn references(&self, filename: &str) -> Result<Vec<ImageRef>> {
        let found = self.repo.find_all(self.query(filename), None).await?;
        Ok(found
            .iter()
            .flat_map(|WithId(_, model)| model.images())
            .filter(|image| image.is_named(filename))
            .cloned()
            .collect())
    }
}

#[derive(Clone)]
pub struct Media {
    pub ingest: Arc<ImageIngest>,
    pub rehydrator: Rehydrator,
    pub blogs: Arc<dyn ImageLookup>,
    pub categories: Arc<dyn ImageLookup>,
}

impl Media {
    pub fn new(
        base_url: impl Into<String>,
        store: Arc<dyn ContentStore>,
        blogs: Arc<dyn ImageLookup>,
        categories: Arc<dyn ImageLookup>,
    ) -> Self {
        Self {
            ingest: Arc::new(ImageIngest::new(base_url)),
            rehydrator: Rehydrator::new(store),
            blogs,
            categories,
        }
    }

    pub fn from_config(config: &Config, ctx: &impl MongodmContext) -> Self {
        Self::new(
            config.base_url(),
            Arc::new(FsStore::new(&config.uploads_dir)),
            Arc::new(MongoImageLookup::<Blog>::new(ctx, BLOG_IMAGE_PATHS)),
            Arc::new(MongoImageLookup::<Category>::new(ctx, CATEGORY_IMAGE_PATHS)),
        )
    }

    pub fn store(&self) -> &Arc<dyn ContentStore> {
        self.rehydrator.store()
    }

    pub fn all(&self) -> ChainLookup {
        ChainLookup::new(vec![Arc::clone(&self.blogs), Arc::clone(&self.categories)])
    }

    pub async fn present<T: HasImages + ?Sized>(&self, entity: &mut T) {
        let missing = self.rehydrator.materialize_all(entity).await;
        if missing > 0 {
            log::warn!(target: "zetta", "{} image(s) could not be materialized", missing);
        }
        sanitize(entity);
    }
}
