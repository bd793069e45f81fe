use chrono::Utc;

use super::ImportReport;
use crate::models::ids::IMAGE_PREFIX;
use crate::models::{Image, new_id};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageError {
    #[error("No image with id {0}")]
    NotFound(String),
    #[error("Image name is required")]
    EmptyName,
}

/// Fields for an uploaded or linked image
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewImage {
    pub name: Option<String>,
    pub data: Option<String>,
    pub url: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// The image library
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageStore {
    images: Vec<Image>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a library from stored or restored images, re-minting duplicate ids
    pub fn from_images(images: Vec<Image>) -> Self {
        let mut store = Self::new();
        let report = store.import(images);
        if !report.reassigned_ids.is_empty() {
            log::warn!(
                "Repaired loaded images: {} duplicate ids",
                report.reassigned_ids.len()
            );
        }
        store
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    pub fn get(&self, id: &str) -> Option<&Image> {
        self.images.iter().find(|img| img.id == id)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Add an image; an unnamed image is called `image-<unix millis>`
    pub fn add(&mut self, new_image: NewImage) -> &Image {
        let now = Utc::now();
        let name = non_empty(new_image.name)
            .map(|n| n.trim().to_string())
            .unwrap_or_else(|| format!("image-{}", now.timestamp_millis()));

        let image = Image {
            id: new_id(IMAGE_PREFIX),
            name,
            data: non_empty(new_image.data),
            url: non_empty(new_image.url),
            created_at: now,
        };
        log::debug!("Added image {} ({})", image.id, image.name);
        self.images.push(image);
        &self.images[self.images.len() - 1]
    }

    pub fn rename(&mut self, id: &str, new_name: &str) -> Result<(), ImageError> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(ImageError::EmptyName);
        }
        let image = self
            .images
            .iter_mut()
            .find(|img| img.id == id)
            .ok_or_else(|| ImageError::NotFound(id.to_string()))?;
        image.name = new_name.to_string();
        Ok(())
    }

    pub fn delete(&mut self, id: &str) -> Result<Image, ImageError> {
        let index = self
            .images
            .iter()
            .position(|img| img.id == id)
            .ok_or_else(|| ImageError::NotFound(id.to_string()))?;
        Ok(self.images.remove(index))
    }

    /// Remove every image, returning how many were dropped
    pub fn clear(&mut self) -> usize {
        let count = self.images.len();
        self.images.clear();
        count
    }

    /// Merge imported images, minting fresh ids for colliding ones
    pub fn import(&mut self, incoming: Vec<Image>) -> ImportReport {
        let mut report = ImportReport::default();

        for mut image in incoming {
            if self.get(&image.id).is_some() {
                let fresh = new_id(IMAGE_PREFIX);
                report.reassigned_ids.push((image.id.clone(), fresh.clone()));
                image.id = fresh;
            }
            report.imported.push(image.id.clone());
            self.images.push(image);
        }

        report
    }
}
