use std::path::PathBuf;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use time::macros::format_description;
use time::OffsetDateTime;

use crate::db::metadata::PhotoRecord;
use photoverse_api_structs::PhotoSummary;

const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'.').remove(b'-').remove(b'_');

/// A listed photo as the templates and the API see it.
#[derive(Debug, PartialEq, Serialize)]
pub struct Photo {
    pub filename: String,
    /// `filename`, escaped for use as a URL path segment.
    pub key: String,
    pub url: String,
    pub original_name: String,
    pub caption: String,
    pub likes: u64,
    pub uploaded_at: f64,
    pub uploaded: String,
}

impl From<(PathBuf, PhotoRecord)> for Photo {
    fn from((path, record): (PathBuf, PhotoRecord)) -> Self {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let key = utf8_percent_encode(&filename, PATH_SEGMENT).to_string();

        Photo {
            url: format!("/media/{}", key),
            key,
            filename,
            original_name: record.original_name,
            caption: record.caption,
            likes: record.likes,
            uploaded: format_uploaded(record.uploaded_at),
            uploaded_at: record.uploaded_at,
        }
    }
}

impl From<Photo> for PhotoSummary {
    fn from(p: Photo) -> Self {
        PhotoSummary {
            filename: p.filename,
            url: p.url,
            original_name: p.original_name,
            caption: p.caption,
            likes: p.likes,
            uploaded_at: p.uploaded_at,
        }
    }
}

/// `YYYY-MM-DD HH:MM` in UTC, or an empty string for out-of-range values.
pub fn format_uploaded(uploaded_at: f64) -> String {
    OffsetDateTime::from_unix_timestamp(uploaded_at.trunc() as i64)
        .ok()
        .and_then(|at| {
            at.format(format_description!("[year]-[month]-[day] [hour]:[minute]"))
                .ok()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_upload_time() {
        assert_eq!(format_uploaded(0.0), "1970-01-01 00:00");
        assert_eq!(format_uploaded(1_700_000_000.9), "2023-11-14 22:13");
        assert_eq!(format_uploaded(f64::MAX), "");
    }

    #[test]
    fn from_listed_entry() {
        let record = PhotoRecord {
            original_name: "Cat.PNG".to_string(),
            caption: "cute".to_string(),
            likes: 3,
            uploaded_at: 0.0,
        };
        let photo = Photo::from((PathBuf::from("/srv/photos/abc.png"), record));

        assert_eq!(photo.filename, "abc.png");
        assert_eq!(photo.key, "abc.png");
        assert_eq!(photo.url, "/media/abc.png");
        assert_eq!(photo.likes, 3);
        assert_eq!(photo.uploaded, "1970-01-01 00:00");
    }

    #[test]
    fn key_escapes_unusual_characters() {
        let photo = Photo::from((PathBuf::from("abc.p g#"), PhotoRecord::default()));
        assert_eq!(photo.key, "abc.p%20g%23");
    }
}
