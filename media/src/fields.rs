use serde::{Deserialize, Serialize};

/// An image attached to an entity: public link, content-store key and the embedded payload
/// the key can be rebuilt from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(
        rename = "base64Data",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub base64_data: Option<String>,
}

impl ImageRef {
    pub fn external(url: impl Into<String>) -> Self {
        Self {
            original_url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn embedded(payload: impl Into<String>) -> Self {
        Self::external(payload)
    }

    pub fn is_named(&self, filename: &str) -> bool {
        self.filename.as_deref() == Some(filename)
    }
}

pub struct ImageSlot<'a> {
    pub role: &'static str,
    pub field: &'a mut Option<ImageRef>,
}

impl<'a> ImageSlot<'a> {
    pub fn new(role: &'static str, field: &'a mut Option<ImageRef>) -> Self {
        Self { role, field }
    }
}

pub trait HasImages {
    fn image_slots(&mut self) -> Vec<ImageSlot<'_>>;
    fn images(&self) -> Vec<&ImageRef>;
}

impl<T: HasImages> HasImages for Vec<T> {
    fn image_slots(&mut self) -> Vec<ImageSlot<'_>> {
        self.iter_mut().flat_map(|e| e.image_slots()).collect()
    }

    fn images(&self) -> Vec<&ImageRef> {
        self.iter().flat_map(|e| e.images()).collect()
    }
}

impl<T: HasImages> HasImages for Option<T> {
    fn image_slots(&mut self) -> Vec<ImageSlot<'_>> {
        self.iter_mut().flat_map(|e| e.image_slots()).collect()
    }

    fn images(&self) -> Vec<&ImageRef> {
        self.iter().flat_map(|e| e.images()).collect()
    }
}

pub fn sanitize<T: HasImages + ?Sized>(entity: &mut T) {
    for slot in entity.image_slots() {
        if let Some(image) = slot.field {
            image.base64_data = None;
        }
    }
}

pub fn sanitized<T: HasImages + Clone>(entity: &T) -> T {
    let mut copy = entity.clone();
    sanitize(&mut copy);
    copy
}

/// Implements [`HasImages`] from a list of `"role" => field` pairs plus nested collections.
///
/// ```ignore
/// impl_has_images!(Category { "icon" => icon, "image" => image } nested { subcategories });
/// ```
#[macro_export]
macro_rules! impl_has_images {
    ($ty:ty { $($role:literal => $field:ident),* $(,)? } $(nested { $($nested:ident),* $(,)? })?) => {
        impl $crate::fields::HasImages for $ty {
            fn image_slots(&mut self) -> Vec<$crate::fields::ImageSlot<'_>> {
                #[allow(unused_mut)]
                let mut slots = vec![$($crate::fields::ImageSlot::new($role, &mut self.$field)),*];
                $($(slots.extend($crate::fields::HasImages::image_slots(&mut self.$nested));)*)?
                slots
            }

            fn images(&self) -> Vec<&$crate::fields::ImageRef> {
                #[allow(unused_mut)]
                let mut images: Vec<&$crate::fields::ImageRef> = Vec::new();
                $(images.extend(self.$field.iter());)*
                $($(images.extend($crate::fields::HasImages::images(&self.$nested));)*)?
                images
            }
        }
    };
}
