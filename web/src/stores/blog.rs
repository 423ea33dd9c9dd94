use mongodm::{f, CollectionConfig, Index, Indexes, Model};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    media::{impl_has_images, ImageRef},
    mongo::{bson::DateTime, withid::Id},
};

use super::{default_true, double_option, now, parse_ids};

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Blog {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub description: String,
    pub content: String,
    #[serde(rename = "metaTitle", default, skip_serializing_if = "Option::is_none")]
    pub meta_title: Option<String>,
    #[serde(
        rename = "metaDescription",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub meta_description: Option<String>,
    #[serde(rename = "metaImage", default, skip_serializing_if = "Option::is_none")]
    pub meta_image: Option<ImageRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<ImageRef>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub sticky: bool,
    #[serde(default = "default_true")]
    pub published: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<Id>,
    #[serde(default)]
    pub categories: Vec<Id>,
    #[serde(default)]
    pub tags: Vec<Id>,
    #[serde(rename = "createdAt", default = "now")]
    pub created_at: DateTime,
    #[serde(rename = "updatedAt", default = "now")]
    pub updated_at: DateTime,
}

impl_has_images!(Blog { "thumbnail" => thumbnail, "meta-image" => meta_image });

pub struct BlogCfg {}

impl CollectionConfig for BlogCfg {
    fn collection_name() -> &'static str {
        "blogs"
    }

    fn indexes() -> Indexes {
        Indexes::new().with(Index::new(f!(slug in Blog)))
    }
}

impl Model for Blog {
    type CollConf = BlogCfg;
}

#[derive(Deserialize, Validate, Debug)]
pub struct BlogInput {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    pub slug: Option<String>,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    #[validate(length(min = 1, message = "content is required"))]
    pub content: String,
    #[serde(rename = "metaTitle")]
    pub meta_title: Option<String>,
    #[serde(rename = "metaDescription")]
    pub meta_description: Option<String>,
    #[serde(rename = "metaImage")]
    pub meta_image: Option<ImageRef>,
    pub thumbnail: Option<ImageRef>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub sticky: bool,
    #[serde(default = "default_true")]
    pub published: bool,
    pub created_by: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl BlogInput {
    pub fn into_blog(self, author: Option<Id>) -> Blog {
        let at = now();
        let created_by = self
            .created_by
            .as_deref()
            .and_then(|id| parse_ids(&[id.to_string()]).pop())
            .or(author);
        Blog {
            title: self.title,
            slug: self.slug.filter(|s| !s.trim().is_empty()),
            description: self.description,
            content: self.content,
            meta_title: self.meta_title,
            meta_description: self.meta_description,
            meta_image: self.meta_image,
            thumbnail: self.thumbnail,
            featured: self.featured,
            sticky: self.sticky,
            published: self.published,
            created_by,
            categories: parse_ids(&self.categories),
            tags: parse_ids(&self.tags),
            created_at: at,
            updated_at: at,
        }
    }
}

#[derive(Deserialize, Validate, Debug, Default)]
pub struct BlogPatch {
    #[validate(length(min = 1, message = "title cannot be empty"))]
    pub title: Option<String>,
    pub slug: Option<String>,
    #[validate(length(min = 1, message = "description cannot be empty"))]
    pub description: Option<String>,
    #[validate(length(min = 1, message = "content cannot be empty"))]
    pub content: Option<String>,
    #[serde(rename = "metaTitle")]
    pub meta_title: Option<String>,
    #[serde(rename = "metaDescription")]
    pub meta_description: Option<String>,
    #[serde(rename = "metaImage", default, deserialize_with = "double_option")]
    pub meta_image: Option<Option<ImageRef>>,
    #[serde(default, deserialize_with = "double_option")]
    pub thumbnail: Option<Option<ImageRef>>,
    pub featured: Option<bool>,
    pub sticky: Option<bool>,
    pub published: Option<bool>,
    pub categories: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
}

impl BlogPatch {
    pub fn apply(self, blog: &mut Blog) {
        if let Some(title) = self.title {
            blog.title = title;
        }
        if let Some(slug) = self.slug {
            blog.slug = Some(slug).filter(|s| !s.trim().is_empty());
        }
        if let Some(description) = self.description {
            blog.description = description;
        }
        if let Some(content) = self.content {
            blog.content = content;
        }
        if let Some(meta_title) = self.meta_title {
            blog.meta_title = Some(meta_title);
        }
        if let Some(meta_description) = self.meta_description {
            blog.meta_description = Some(meta_description);
        }
        if let Some(meta_image) = self.meta_image {
            blog.meta_image = meta_image;
        }
        if let Some(thumbnail) = self.thumbnail {
            blog.thumbnail = thumbnail;
        }
        if let Some(featured) = self.featured {
            blog.featured = featured;
        }
        if let Some(sticky) = self.sticky {
            blog.sticky = sticky;
        }
        if let Some(published) = self.published {
            blog.published = published;
        }
        if let Some(categories) = self.categories {
            blog.categories = parse_ids(&categories);
        }
        if let Some(tags) = self.tags {
            blog.tags = parse_ids(&tags);
        }
        blog.updated_at = now();
    }
}
