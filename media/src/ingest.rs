use crate::{
    codec::{self, DecodedImage},
    error::MediaError,
    fields::{HasImages, ImageRef},
    naming::FilenameGenerator,
    store::check_key,
};

pub struct ImageIngest {
    base_url: String,
    names: FilenameGenerator,
}

impl ImageIngest {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            names: FilenameGenerator::new(),
        }
    }

    pub fn names(&self) -> &FilenameGenerator {
        &self.names
    }

    pub fn public_url(&self, filename: &str) -> String {
        format!("{}/uploads/{}", self.base_url, filename)
    }

    /// Field with an embedded payload: gets a fresh filename, a public link and keeps the
    /// payload verbatim. External links pass through. Malformed payloads drop the field.
    pub fn ingest(&self, field: Option<ImageRef>, role: &str) -> Option<ImageRef> {
        let field = field?;
        let payload = match field.original_url.as_deref() {
            Some(url) if codec::is_embedded(url) => url.to_string(),
            _ => return Some(field),
        };
        match self.embed(&payload, role) {
            Ok((image, _)) => Some(image),
            Err(e) => {
                log::warn!(target: "zetta", "dropping {} image: {}", role, e);
                None
            }
        }
    }

    pub fn ingest_all<T: HasImages + ?Sized>(&self, entity: &mut T) {
        for slot in entity.image_slots() {
            let current = slot.field.take();
            *slot.field = self.ingest(current, slot.role);
        }
    }

    pub fn embed(&self, payload: &str, role: &str) -> Result<(ImageRef, DecodedImage), MediaError> {
        let decoded = codec::decode(payload)?;
        let filename = self.names.generate(role, decoded.extension());
        check_key(&filename).map_err(|_| MediaError::InvalidPayload)?;
        let image = ImageRef {
            original_url: Some(self.public_url(&filename)),
            filename: Some(filename),
            base64_data: Some(payload.to_string()),
        };
        Ok((image, decoded))
    }
}
