use mongodm::{f, CollectionConfig, Index, IndexOption, Indexes, Model};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    media::{impl_has_images, ImageRef},
    mongo::{bson::DateTime, withid::Id},
};

use super::{default_status, double_option, now};

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Subcategory {
    #[serde(rename = "_id")]
    pub id: Id,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<ImageRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,
    #[serde(default = "default_status")]
    pub status: i32,
}

impl_has_images!(Subcategory { "subcategory-icon" => icon, "subcategory-image" => image });

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Category {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_status")]
    pub status: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<ImageRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,
    #[serde(default)]
    pub parent: Option<Id>,
    #[serde(default)]
    pub subcategories: Vec<Subcategory>,
    #[serde(rename = "createdAt", default = "now")]
    pub created_at: DateTime,
    #[serde(rename = "updatedAt", default = "now")]
    pub updated_at: DateTime,
}

impl_has_images!(Category { "icon" => icon, "image" => image } nested { subcategories });

impl Category {
    pub fn subcategory(&self, id: &Id) -> Option<&Subcategory> {
        self.subcategories.iter().find(|s| &s.id == id)
    }
}

pub struct CategoryCfg {}

impl CollectionConfig for CategoryCfg {
    fn collection_name() -> &'static str {
        "categories"
    }

    fn indexes() -> Indexes {
        Indexes::new().with(Index::new(f!(name in Category)).with_option(IndexOption::Unique))
    }
}

impl Model for Category {
    type CollConf = CategoryCfg;
}

#[derive(Deserialize, Validate, Debug)]
pub struct CategoryInput {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub status: Option<i32>,
    pub icon: Option<ImageRef>,
    pub image: Option<ImageRef>,
    pub parent: Option<String>,
}

impl CategoryInput {
    pub fn into_category(self) -> Category {
        let at = now();
        Category {
            name: self.name,
            slug: self.slug,
            description: self.description,
            status: self.status.unwrap_or_else(default_status),
            icon: self.icon,
            image: self.image,
            parent: None,
            subcategories: vec![],
            created_at: at,
            updated_at: at,
        }
    }

    pub fn into_subcategory(self) -> Subcategory {
        Subcategory {
            id: Id::new(),
            name: self.name,
            slug: self.slug,
            description: self.description,
            icon: self.icon,
            image: self.image,
            status: self.status.unwrap_or_else(default_status),
        }
    }
}

#[derive(Deserialize, Validate, Debug, Default)]
pub struct CategoryPatch {
    #[validate(length(min = 1, message = "name cannot be empty"))]
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub status: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    pub icon: Option<Option<ImageRef>>,
    #[serde(default, deserialize_with = "double_option")]
    pub image: Option<Option<ImageRef>>,
    pub parent: Option<String>,
}

impl CategoryPatch {
    pub fn apply(self, category: &mut Category) {
        if let Some(name) = self.name {
            category.name = name;
        }
        if let Some(slug) = self.slug {
            category.slug = Some(slug);
        }
        if let Some(description) = self.description {
            category.description = Some(description);
        }
        if let Some(status) = self.status {
            category.status = status;
        }
        if let Some(icon) = self.icon {
            category.icon = icon;
        }
        if let Some(image) = self.image {
            category.image = image;
        }
        category.updated_at = now();
    }

    pub fn apply_sub(self, sub: &mut Subcategory) {
        if let Some(name) = self.name {
            sub.name = name;
        }
        if let Some(slug) = self.slug {
            sub.slug = Some(slug);
        }
        if let Some(description) = self.description {
            sub.description = Some(description);
        }
        if let Some(status) = self.status {
            sub.status = status;
        }
        if let Some(icon) = self.icon {
            sub.icon = icon;
        }
        if let Some(image) = self.image {
            sub.image = image;
        }
    }
}
