use mongodm::Model;

use crate::{
    media::{
        codec::{encode, subtype_for_filename},
        ContentStore, HasImages, MediaError,
    },
    mongo::{
        bson::doc,
        context::MongodmContext,
        withid::{RepositoryWithId, WithId},
    },
    stores::{Blog, Category},
    utils::result::Result,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MigrationReport {
    pub blogs: usize,
    pub categories: usize,
    pub images: usize,
}

pub async fn backfill<T: HasImages + ?Sized>(
    entity: &mut T,
    store: &dyn ContentStore,
) -> std::result::Result<usize, MediaError> {
    let mut filled = 0;
    for slot in entity.image_slots() {
        let image = match slot.field {
            Some(image) if image.base64_data.is_none() => image,
            _ => continue,
        };
        let filename = match image.filename.as_deref() {
            Some(filename) => filename,
            None => continue,
        };
        if let Some(bytes) = store.read(filename).await? {
            image.base64_data = Some(encode(subtype_for_filename(filename), &bytes));
            filled += 1;
        }
    }
    Ok(filled)
}

async fn migrate<M>(ctx: &impl MongodmContext, store: &dyn ContentStore) -> Result<(usize, usize)>
where
    M: Model + HasImages + Send + Sync + 'static,
{
    let repo = RepositoryWithId::<M>::new(ctx);
    let (mut entities, mut images) = (0, 0);
    for WithId(id, mut model) in repo.find_all(doc! {}, None).await? {
        let filled = match backfill(&mut model, store).await {
            Ok(filled) => filled,
            Err(e) => {
                log::warn!(target: "zetta", "skipping {}: {}", id, e);
                continue;
            }
        };
        if filled > 0 && repo.update(&WithId(id, model)).await? {
            log::info!(target: "zetta", "migrated {} image(s) on {}", filled, id);
            entities += 1;
            images += filled;
        }
    }
    Ok((entities, images))
}

pub async fn migrate_images(
    ctx: &impl MongodmContext,
    store: &dyn ContentStore,
) -> Result<MigrationReport> {
    let (blogs, blog_images) = migrate::<Blog>(ctx, store).await?;
    let (categories, category_images) = migrate::<Category>(ctx, store).await?;
    let report = MigrationReport {
        blogs,
        categories,
        images: blog_images + category_images,
    };
    log::info!(
        target: "zetta",
        "image migration done: {} blog(s), {} categor(ies), {} image(s)",
        report.blogs,
        report.categories,
        report.images
    );
    Ok(report)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        media::{ImageRef, MemoryStore},
        mongo::test_util::with_mongo,
        stores::Subcategory,
        test_util,
    };
    use pretty_assertions::assert_eq;

    fn named(filename: &str) -> ImageRef {
        ImageRef {
            original_url: Some(format!("http://localhost:3004/uploads/{}", filename)),
            filename: Some(filename.to_string()),
            base64_data: None,
        }
    }

    #[actix_web::test]
    async fn test_backfill_only_missing_payloads() {
        let store = MemoryStore::new();
        store.write("1-thumbnail.png", b"png").await.unwrap();
        store.write("2-meta-image.jpg", b"jpg").await.unwrap();
        let mut blog = test_util::blog("Hello");
        blog.thumbnail = Some(named("1-thumbnail.png"));
        let mut meta = named("2-meta-image.jpg");
        meta.base64_data = Some("data:image/jpeg;base64,AAAA".into());
        blog.meta_image = Some(meta);

        assert_eq!(1, backfill(&mut blog, &store).await.unwrap());
        assert_eq!(
            Some("data:image/png;base64,cG5n"),
            blog.thumbnail.as_ref().unwrap().base64_data.as_deref()
        );
        assert_eq!(
            Some("data:image/jpeg;base64,AAAA"),
            blog.meta_image.as_ref().unwrap().base64_data.as_deref()
        );
        assert_eq!(0, backfill(&mut blog, &store).await.unwrap());
    }

    #[actix_web::test]
    async fn test_backfill_skips_absent_files() {
        let store = MemoryStore::new();
        let mut sub = Subcategory {
            id: crate::mongo::withid::Id::new(),
            name: "Local".into(),
            slug: None,
            description: None,
            icon: Some(named("3-subcategory-icon.gif")),
            image: None,
            status: 1,
        };
        assert_eq!(0, backfill(&mut sub, &store).await.unwrap());
        assert_eq!(None, sub.icon.unwrap().base64_data);
    }

    #[actix_web::test]
    async fn test_migrate_images() {
        with_mongo(|ctx| async move {
            let store = MemoryStore::new();
            store.write("1-thumbnail.png", b"png").await?;
            let repo = RepositoryWithId::<Blog>::new(ctx.as_ref());
            let mut blog = test_util::blog("Hello");
            blog.thumbnail = Some(named("1-thumbnail.png"));
            let id = repo.create(&blog).await?;

            let report = migrate_images(ctx.as_ref(), &store).await?;
            assert_eq!(
                MigrationReport {
                    blogs: 1,
                    categories: 0,
                    images: 1
                },
                report
            );
            let stored = repo.find_one_by_id(&id).await?.unwrap();
            assert!(stored.1.thumbnail.unwrap().base64_data.is_some());
            Ok(())
        })
        .await
        .unwrap();
    }
}
