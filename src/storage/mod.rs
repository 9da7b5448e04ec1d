// SPDX-License-Identifier: GPL-3.0-only

//! Photo library and its persistence
//!
//! The library is the only durable state: an ordered list of captured photos,
//! newest first, capped at a fixed number of entries.

pub mod store;

pub use store::{JsonFileStore, MemoryStore, PhotoStore};

use crate::constants::library;
use crate::filters::FilterKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A saved, filtered, encoded photo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedPhoto {
    /// Millisecond timestamp, unique and increasing within a library
    pub id: u64,
    /// JPEG bytes, serialized as a base64 data URL
    #[serde(with = "data_url")]
    pub data: Vec<u8>,
    /// Filter that was active when the photo was saved
    pub filter: FilterKind,
    pub timestamp: DateTime<Utc>,
    pub filename: String,
}

/// `data:image/jpeg;base64,` URL encoding for photo bytes
pub mod data_url {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const JPEG_PREFIX: &str = "data:image/jpeg;base64,";

    /// Encode bytes as a JPEG data URL
    pub fn encode(bytes: &[u8]) -> String {
        format!("{}{}", JPEG_PREFIX, STANDARD.encode(bytes))
    }

    /// Decode a data URL or bare base64 payload
    pub fn decode(value: &str) -> Result<Vec<u8>, base64::DecodeError> {
        let payload = match value.strip_prefix("data:") {
            Some(rest) => rest.split_once(";base64,").map_or(rest, |(_, b64)| b64),
            None => value,
        };
        STANDARD.decode(payload.trim())
    }

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let value = String::deserialize(deserializer)?;
        decode(&value).map_err(serde::de::Error::custom)
    }
}

/// Ordered, capped photo collection (most recent first)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoLibrary {
    photos: Vec<CapturedPhoto>,
    capacity: usize,
}

impl Default for PhotoLibrary {
    fn default() -> Self {
        Self::new(library::CAPACITY)
    }
}

impl PhotoLibrary {
    /// Empty library holding at most `capacity` photos (minimum 1)
    pub fn new(capacity: usize) -> Self {
        Self {
            photos: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Library from stored photos, newest first; entries past the cap are dropped
    pub fn from_photos(mut photos: Vec<CapturedPhoto>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        photos.truncate(capacity);
        Self { photos, capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    /// Photos, newest first
    pub fn photos(&self) -> &[CapturedPhoto] {
        &self.photos
    }

    pub fn get(&self, id: u64) -> Option<&CapturedPhoto> {
        self.photos.iter().find(|p| p.id == id)
    }

    /// Largest id in the library
    pub fn max_id(&self) -> Option<u64> {
        self.photos.iter().map(|p| p.id).max()
    }

    /// Prepend a photo, returning whatever fell off the end
    pub fn insert(&mut self, photo: CapturedPhoto) -> Vec<CapturedPhoto> {
        self.photos.insert(0, photo);
        if self.photos.len() > self.capacity {
            let evicted = self.photos.split_off(self.capacity);
            debug!(count = evicted.len(), "Evicted oldest photos");
            evicted
        } else {
            Vec::new()
        }
    }

    /// Remove a photo by id
    pub fn remove(&mut self, id: u64) -> Option<CapturedPhoto> {
        let index = self.photos.iter().position(|p| p.id == id)?;
        Some(self.photos.remove(index))
    }

    /// Undo an `insert`: drop the photo at the front and restore evicted entries
    pub(crate) fn rollback_insert(&mut self, id: u64, evicted: Vec<CapturedPhoto>) {
        if self.photos.first().is_some_and(|p| p.id == id) {
            self.photos.remove(0);
            self.photos.extend(evicted);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    pub(crate) fn photo(id: u64) -> CapturedPhoto {
        CapturedPhoto {
            id,
            data: vec![0xFF, 0xD8, id as u8],
            filter: FilterKind::Sepia,
            timestamp: Utc.timestamp_millis_opt(id as i64).unwrap(),
            filename: format!("photo_{}.jpg", id),
        }
    }

    #[test]
    fn test_insert_prepends_and_caps() {
        let mut library = PhotoLibrary::new(3);
        for id in 1..=3 {
            assert!(library.insert(photo(id)).is_empty());
        }
        let evicted = library.insert(photo(4));
        assert_eq!(evicted, vec![photo(1)]);
        let ids: Vec<u64> = library.photos().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![4, 3, 2]);
    }

    #[test]
    fn test_remove_by_id() {
        let mut library = PhotoLibrary::default();
        library.insert(photo(10));
        library.insert(photo(20));
        assert_eq!(library.remove(10).map(|p| p.id), Some(10));
        assert!(library.remove(10).is_none());
        assert_eq!(library.len(), 1);
    }

    #[test]
    fn test_rollback_restores_evicted() {
        let mut library = PhotoLibrary::new(2);
        library.insert(photo(1));
        library.insert(photo(2));
        let before = library.clone();

        let evicted = library.insert(photo(3));
        library.rollback_insert(3, evicted);
        assert_eq!(library, before);
    }

    #[test]
    fn test_record_json_shape() {
        let json = serde_json::to_value(photo(1_700_000_000_000)).unwrap();
        assert_eq!(json["id"], 1_700_000_000_000u64);
        assert_eq!(json["filter"], "sepia");
        assert_eq!(json["filename"], "photo_1700000000000.jpg");
        assert!(
            json["data"]
                .as_str()
                .unwrap()
                .starts_with(data_url::JPEG_PREFIX)
        );
        assert!(json["timestamp"].as_str().unwrap().starts_with("2023-11-14T"));
    }

    #[test]
    fn test_data_url_accepts_bare_base64() {
        assert_eq!(data_url::decode("AQID").unwrap(), vec![1, 2, 3]);
        assert_eq!(
            data_url::decode("data:image/png;base64,AQID").unwrap(),
            vec![1, 2, 3]
        );
        assert!(data_url::decode("data:image/jpeg;base64,@@").is_err());
    }
}
