use std::path::Path;

use chrono::NaiveDate;
use ridejournal::error::ManifestError;
use ridejournal::pipeline::manifest::{
    day_index, fit_width, is_supported, photo_id, process_directory, write_manifest,
    ManifestOptions, DEFAULT_URL_PREFIX,
};
use ridejournal::types::photo::Photo;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("date")
}

fn scratch_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("ridejournal-{}-{}", name, uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("scratch dir");
    dir
}

#[test]
fn day_index_counts_from_trip_start() {
    let start = date(2025, 5, 17);
    assert_eq!(day_index(start, start), 1);
    assert_eq!(day_index(date(2025, 5, 18), start), 2);
    assert_eq!(day_index(date(2025, 7, 25), start), 70);
    assert_eq!(day_index(date(2025, 5, 16), start), 0);
    assert_eq!(day_index(date(2025, 5, 10), start), -6);
}

#[test]
fn fit_width_scales_down_only() {
    assert_eq!(fit_width(4032, 3024, 1200), (1200, 900));
    assert_eq!(fit_width(3024, 4032, 1200), (1200, 1600));
    assert_eq!(fit_width(800, 600, 1200), (800, 600));
    assert_eq!(fit_width(1200, 500, 1200), (1200, 500));
}

#[test]
fn photo_id_drops_every_extension() {
    assert_eq!(photo_id("IMG_1234.HEIC"), "IMG_1234");
    assert_eq!(photo_id("IMG_1234.edited.jpg"), "IMG_1234");
    assert_eq!(photo_id("README"), "README");
}

#[test]
fn supported_extensions_ignore_case() {
    assert!(is_supported(Path::new("raw/IMG_1.jpg")));
    assert!(is_supported(Path::new("raw/IMG_1.JPEG")));
    assert!(is_supported(Path::new("raw/IMG_1.HEIC")));
    assert!(!is_supported(Path::new("raw/IMG_1.mov")));
    assert!(!is_supported(Path::new("raw/notes")));
}

#[test]
fn directory_without_photos_gives_empty_manifest() {
    let input = scratch_dir("input");
    std::fs::write(input.join("notes.txt"), "not a photo").expect("write");

    let options = ManifestOptions {
        input_dir: input.clone(),
        output_dir: input.join("display"),
        manifest_path: input.join("photos.json"),
        trip_start: date(2025, 5, 17),
        today: date(2025, 6, 1),
        url_prefix: DEFAULT_URL_PREFIX.to_string(),
    };
    let (photos, summary) = process_directory(&options).expect("processed");

    assert!(photos.is_empty());
    assert_eq!(summary.written, 0);
    assert!(options.output_dir.is_dir());
}

#[test]
fn photo_without_exif_is_skipped() {
    let input = scratch_dir("input");
    std::fs::write(input.join("IMG_0001.jpg"), b"definitely not a jpeg").expect("write");

    let options = ManifestOptions {
        input_dir: input.clone(),
        output_dir: input.join("display"),
        manifest_path: input.join("photos.json"),
        trip_start: date(2025, 5, 17),
        today: date(2025, 6, 1),
        url_prefix: DEFAULT_URL_PREFIX.to_string(),
    };
    let (photos, summary) = process_directory(&options).expect("processed");

    assert!(photos.is_empty());
    assert_eq!(summary.scanned, 1);
    assert_eq!(summary.skipped, 1);
}

#[test]
fn manifest_is_written_as_json() {
    let dir = scratch_dir("manifest");
    let path = dir.join("photos.json");
    let photos = vec![Photo {
        id: "IMG_0001".to_string(),
        day: "3".parse().expect("day"),
        coordinates: [-98.1, 30.4],
        url: format!("{}/IMG_0001.jpg", DEFAULT_URL_PREFIX),
        caption: Some("IMG_0001.HEIC".to_string()),
    }];

    write_manifest(&path, &photos).expect("written");

    let bytes = std::fs::read(&path).expect("read");
    let back: Vec<Photo> = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(back, photos);
    let raw: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(raw[0]["day"], "3");
    assert_eq!(raw[0]["url"], "/photos/display/IMG_0001.jpg");
}

#[test]
fn missing_input_directory_is_an_error() {
    let options = ManifestOptions {
        input_dir: std::env::temp_dir().join(format!("ridejournal-missing-{}", uuid::Uuid::new_v4())),
        output_dir: scratch_dir("output"),
        manifest_path: std::env::temp_dir().join("unused.json"),
        trip_start: date(2025, 5, 17),
        today: date(2025, 6, 1),
        url_prefix: DEFAULT_URL_PREFIX.to_string(),
    };
    assert!(matches!(
        process_directory(&options),
        Err(ManifestError::Io { .. })
    ));
}
