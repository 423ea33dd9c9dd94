use mongodm::{f, CollectionConfig, Index, IndexOption, Indexes, Model};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::mongo::bson::DateTime;

use super::{default_status, now};

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Tag {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_status")]
    pub status: i32,
    #[serde(rename = "createdAt", default = "now")]
    pub created_at: DateTime,
    #[serde(rename = "updatedAt", default = "now")]
    pub updated_at: DateTime,
}

pub struct TagCfg {}

impl CollectionConfig for TagCfg {
    fn collection_name() -> &'static str {
        "tags"
    }

    fn indexes() -> Indexes {
        Indexes::new().with(Index::new(f!(name in Tag)).with_option(IndexOption::Unique))
    }
}

impl Model for Tag {
    type CollConf = TagCfg;
}

#[derive(Deserialize, Validate, Debug)]
pub struct TagInput {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub status: Option<i32>,
}

impl From<TagInput> for Tag {
    fn from(input: TagInput) -> Self {
        let at = now();
        Self {
            name: input.name,
            slug: input.slug,
            description: input.description,
            status: input.status.unwrap_or_else(default_status),
            created_at: at,
            updated_at: at,
        }
    }
}

#[derive(Deserialize, Validate, Debug, Default)]
pub struct TagPatch {
    #[validate(length(min = 1, message = "name cannot be empty"))]
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub status: Option<i32>,
}

impl TagPatch {
    pub fn apply(self, tag: &mut Tag) {
        if let Some(name) = self.name {
            tag.name = name;
        }
        if let Some(slug) = self.slug {
            tag.slug = Some(slug);
        }
        if let Some(description) = self.description {
            tag.description = Some(description);
        }
        if let Some(status) = self.status {
            tag.status = status;
        }
        tag.updated_at = now();
    }
}
