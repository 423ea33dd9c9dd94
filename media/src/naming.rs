use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

/// Generates `<millis>-<role>.<ext>` names. Timestamps strictly increase within a process,
/// so two images ingested in the same millisecond still get distinct names.
#[derive(Debug, Default)]
pub struct FilenameGenerator {
    last: AtomicU64,
}

impl FilenameGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generate(&self, role: &str, extension: &str) -> String {
        format!("{}-{}.{}", self.tick(), role, extension)
    }

    pub fn generate_upload(&self, original_name: &str) -> String {
        format!("{}-{}", self.tick(), clean_upload_name(original_name))
    }

    fn tick(&self) -> u64 {
        let now = now_millis();
        let mut prev = self.last.load(Ordering::SeqCst);
        loop {
            let next = now.max(prev + 1);
            match self
                .last
                .compare_exchange_weak(prev, next, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => return next,
                Err(actual) => prev = actual,
            }
        }
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn clean_upload_name(original: &str) -> String {
    let base = original.rsplit(|c| c == '/' || c == '\\').next().unwrap_or("");
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        String::from("upload")
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn stamp(name: &str) -> u64 {
        name.split('-').next().unwrap().parse().unwrap()
    }

    #[test]
    fn test_generate_shape() {
        let names = FilenameGenerator::new();
        let name = names.generate("icon", "png");
        let (ts, rest) = name.split_once('-').unwrap();
        assert!(ts.chars().all(|c| c.is_ascii_digit()));
        assert_eq!("icon.png", rest);
    }

    #[test]
    fn test_generate_is_strictly_increasing() {
        let names = FilenameGenerator::new();
        let a = names.generate("thumbnail", "jpg");
        let b = names.generate("thumbnail", "jpg");
        assert!(stamp(&b) > stamp(&a));
        assert_ne!(a, b);
    }

    #[test]
    fn test_generate_upload() {
        let names = FilenameGenerator::new();
        let name = names.generate_upload("../../etc/my photo.png");
        assert!(name.ends_with("-my_photo.png"));
        assert!(names.generate_upload("..").ends_with("-upload"));
    }
}
