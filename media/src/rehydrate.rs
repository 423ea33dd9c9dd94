use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    codec,
    error::MediaError,
    fields::{HasImages, ImageRef},
    store::{check_key, ContentStore},
    utils::result::Result,
};

#[async_trait]
pub trait ImageLookup: Send + Sync {
    async fn references(&self, filename: &str) -> Result<Vec<ImageRef>>;
}

#[async_trait]
impl ImageLookup for Vec<ImageRef> {
    async fn references(&self, filename: &str) -> Result<Vec<ImageRef>> {
        Ok(self.iter().filter(|i| i.is_named(filename)).cloned().collect())
    }
}

pub struct ChainLookup {
    lookups: Vec<Arc<dyn ImageLookup>>,
}

impl ChainLookup {
    pub fn new(lookups: Vec<Arc<dyn ImageLookup>>) -> Self {
        Self { lookups }
    }
}

#[async_trait]
impl ImageLookup for ChainLookup {
    async fn references(&self, filename: &str) -> Result<Vec<ImageRef>> {
        let mut found = Vec::new();
        for lookup in &self.lookups {
            found.extend(lookup.references(filename).await?);
        }
        Ok(found)
    }
}

#[derive(Clone)]
pub struct Rehydrator {
    store: Arc<dyn ContentStore>,
}

impl Rehydrator {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn ContentStore> {
        &self.store
    }

    pub async fn ensure_materialized(&self, image: &ImageRef) -> bool {
        let filename = match image.filename.as_deref() {
            Some(filename) => filename,
            None => return false,
        };
        match self
            .materialize(filename, image.base64_data.as_deref())
            .await
        {
            Ok(done) => done,
            Err(e) => {
                log::error!(target: "zetta", "cannot materialize {}: {}", filename, e);
                false
            }
        }
    }

    pub async fn materialize_all<T: HasImages + ?Sized>(&self, entity: &T) -> usize {
        let mut missing = 0;
        for image in entity.images() {
            if image.filename.is_some() && !self.ensure_materialized(image).await {
                missing += 1;
            }
        }
        missing
    }

    /// Bytes for `filename`, rebuilding the file from the first reference that can.
    pub async fn resolve(
        &self,
        filename: &str,
        lookup: &dyn ImageLookup,
    ) -> std::result::Result<Vec<u8>, MediaError> {
        if check_key(filename).is_err() {
            return Err(MediaError::NotFound(filename.to_string()));
        }
        if let Some(bytes) = self.store.read(filename).await? {
            return Ok(bytes);
        }
        let candidates = lookup
            .references(filename)
            .await
            .map_err(MediaError::Lookup)?;
        let mut referenced = false;
        for image in candidates.iter().filter(|i| i.is_named(filename)) {
            referenced = true;
            if self.ensure_materialized(image).await {
                if let Some(bytes) = self.store.read(filename).await? {
                    return Ok(bytes);
                }
            }
        }
        if referenced {
            log::error!(target: "zetta", "unrecoverable image: {}", filename);
            Err(MediaError::Unrecoverable(filename.to_string()))
        } else {
            Err(MediaError::NotFound(filename.to_string()))
        }
    }

    async fn materialize(
        &self,
        filename: &str,
        payload: Option<&str>,
    ) -> std::result::Result<bool, MediaError> {
        if self.store.exists(filename).await? {
            return Ok(true);
        }
        let decoded = match payload.map(codec::decode) {
            Some(Ok(decoded)) => decoded,
            Some(Err(_)) | None => {
                log::warn!(target: "zetta", "{} is missing and has no usable payload", filename);
                return Ok(false);
            }
        };
        self.store.write(filename, &decoded.bytes).await?;
        Ok(true)
    }
}
