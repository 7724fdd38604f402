//! Offline photo step: pull GPS and capture time out of each raw photo, shrink
//! it for the web and write the manifest the map reads.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use exif::{In, Tag, Value};
use ignore::WalkBuilder;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageReader};
use rayon::prelude::*;

use crate::error::ManifestError;
use crate::types::day::DayId;
use crate::types::photo::Photo;

pub const DISPLAY_WIDTH: u32 = 1200;
pub const JPEG_QUALITY: u8 = 80;
pub const DEFAULT_URL_PREFIX: &str = "/photos/display";

const SUPPORTED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "heic", "webp"];

#[derive(Debug, Clone)]
pub struct ManifestOptions {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub trip_start: NaiveDate,
    /// Stands in for photos with no capture time.
    pub today: NaiveDate,
    pub url_prefix: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManifestSummary {
    pub scanned: usize,
    pub written: usize,
    pub skipped: usize,
}

/// What the EXIF block tells us about one photo.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhotoExif {
    pub lat: f64,
    pub lng: f64,
    pub taken: Option<NaiveDateTime>,
    pub orientation: u32,
}

/// Journey day a photo taken on `date` belongs to. Can be zero or negative
/// for photos taken before the trip.
pub fn day_index(date: NaiveDate, trip_start: NaiveDate) -> i64 {
    (date - trip_start).num_days() + 1
}

/// Size after scaling down to at most `max_width` wide. Smaller images keep
/// their size.
pub fn fit_width(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width <= max_width || width == 0 {
        return (width, height);
    }
    let scaled = (height as f64 * max_width as f64 / width as f64).round() as u32;
    (max_width, scaled.max(1))
}

/// Manifest id: the file name up to its first dot.
pub fn photo_id(file_name: &str) -> String {
    file_name.split('.').next().unwrap_or(file_name).to_string()
}

pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

fn is_heic(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("heic"))
}

/// Reads every supported photo in `input_dir`, writes display copies to
/// `output_dir` and returns the manifest sorted by day then id. Photos that
/// cannot be placed are skipped with a warning.
pub fn process_directory(options: &ManifestOptions) -> Result<(Vec<Photo>, ManifestSummary), ManifestError> {
    fs::metadata(&options.input_dir).map_err(|source| ManifestError::Io {
        path: options.input_dir.clone(),
        source,
    })?;
    fs::create_dir_all(&options.output_dir).map_err(|source| ManifestError::Io {
        path: options.output_dir.clone(),
        source,
    })?;

    let files: Vec<PathBuf> = WalkBuilder::new(&options.input_dir)
        .max_depth(Some(1))
        .build()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
        .map(|entry| entry.into_path())
        .filter(|path| is_supported(path))
        .collect();

    tracing::info!(
        "Processing {} photos from {}",
        files.len(),
        options.input_dir.display()
    );

    let results: Vec<Result<Photo, ManifestError>> = files
        .par_iter()
        .map(|path| process_one(path, options))
        .collect();

    let mut summary = ManifestSummary {
        scanned: files.len(),
        ..Default::default()
    };
    let mut photos = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(photo) => photos.push(photo),
            Err(err) => {
                tracing::warn!("Skipping photo: {}", err);
                summary.skipped += 1;
            }
        }
    }
    photos.sort_by(|a, b| a.day.cmp(&b.day).then_with(|| a.id.cmp(&b.id)));
    summary.written = photos.len();

    tracing::info!(
        "Photo manifest ready: {} placed, {} skipped",
        summary.written,
        summary.skipped
    );
    Ok((photos, summary))
}

pub fn process_one(path: &Path, options: &ManifestOptions) -> Result<Photo, ManifestError> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| ManifestError::UnsupportedFormat(path.to_path_buf()))?;

    let exif = read_exif(path)?;
    let taken = exif.taken.map(|t| t.date()).unwrap_or(options.today);
    let day_number = day_index(taken, options.trip_start);
    let day = u16::try_from(day_number)
        .ok()
        .and_then(DayId::new)
        .ok_or_else(|| ManifestError::BeforeTrip {
            path: path.to_path_buf(),
            day: day_number,
        })?;

    let image = apply_orientation(decode(path)?, exif.orientation);
    let id = photo_id(file_name);
    let output_name = format!("{}.jpg", id);
    let output_path = options.output_dir.join(&output_name);
    write_display_copy(&image, &output_path)?;

    tracing::debug!("{} -> day {} at [{:.5}, {:.5}]", file_name, day, exif.lng, exif.lat);

    Ok(Photo {
        id,
        day,
        coordinates: [exif.lng, exif.lat],
        url: format!("{}/{}", options.url_prefix.trim_end_matches('/'), output_name),
        caption: Some(file_name.to_string()),
    })
}

pub fn write_manifest(path: &Path, photos: &[Photo]) -> Result<(), ManifestError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ManifestError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let file = File::create(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::to_writer_pretty(BufWriter::new(file), photos)?;
    Ok(())
}

pub fn read_exif(path: &Path) -> Result<PhotoExif, ManifestError> {
    let file = File::open(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::new(file);
    let mut exif_reader = exif::Reader::new();
    // Phone cameras write plenty of slightly broken maker notes.
    exif_reader.continue_on_error(true);

    let exif = match exif_reader.read_from_container(&mut reader) {
        Ok(exif) => exif,
        Err(exif::Error::PartialResult(partial)) => {
            let (exif, errors) = partial.into_inner();
            tracing::debug!("{}: {} EXIF errors ignored", path.display(), errors.len());
            exif
        }
        Err(_) => return Err(ManifestError::NoGps(path.to_path_buf())),
    };

    let lat = gps_coord(&exif, Tag::GPSLatitude, Tag::GPSLatitudeRef);
    let lng = gps_coord(&exif, Tag::GPSLongitude, Tag::GPSLongitudeRef);
    let (Some(lat), Some(lng)) = (lat, lng) else {
        return Err(ManifestError::NoGps(path.to_path_buf()));
    };

    Ok(PhotoExif {
        lat,
        lng,
        taken: capture_time(&exif),
        orientation: exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|f| f.value.get_uint(0))
            .unwrap_or(1),
    })
}

/// Degrees/minutes/seconds to decimal degrees; S and W are negative.
fn gps_coord(exif: &exif::Exif, coord_tag: Tag, ref_tag: Tag) -> Option<f64> {
    let coord = exif.get_field(coord_tag, In::PRIMARY)?;
    let Value::Rational(ref dms) = coord.value else {
        return None;
    };
    if dms.len() != 3 {
        return None;
    }
    let decimal = dms[0].to_f64() + dms[1].to_f64() / 60.0 + dms[2].to_f64() / 3600.0;

    let negative = exif
        .get_field(ref_tag, In::PRIMARY)
        .and_then(|f| f.display_value().to_string().chars().next())
        .is_some_and(|c| c == 'S' || c == 'W');
    Some(if negative { -decimal } else { decimal })
}

fn capture_time(exif: &exif::Exif) -> Option<NaiveDateTime> {
    [Tag::DateTimeOriginal, Tag::DateTime].into_iter().find_map(|tag| {
        let field = exif.get_field(tag, In::PRIMARY)?;
        let Value::Ascii(ref parts) = field.value else {
            return None;
        };
        let raw = std::str::from_utf8(parts.first()?).ok()?;
        NaiveDateTime::parse_from_str(raw.trim(), "%Y:%m:%d %H:%M:%S").ok()
    })
}

fn decode(path: &Path) -> Result<DynamicImage, ManifestError> {
    if is_heic(path) {
        return decode_heic(path);
    }
    ImageReader::open(path)
        .map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?
        .with_guessed_format()
        .map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?
        .decode()
        .map_err(|err| ManifestError::Decode {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
}

#[cfg(feature = "heic")]
fn decode_heic(path: &Path) -> Result<DynamicImage, ManifestError> {
    use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

    let decode_err = |message: String| ManifestError::Decode {
        path: path.to_path_buf(),
        message,
    };
    let path_str = path
        .to_str()
        .ok_or_else(|| decode_err("path is not valid UTF-8".to_string()))?;

    let ctx = HeifContext::read_from_file(path_str).map_err(|e| decode_err(e.to_string()))?;
    let handle = ctx.primary_image_handle().map_err(|e| decode_err(e.to_string()))?;
    let decoded = LibHeif::new()
        .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgb), None)
        .map_err(|e| decode_err(e.to_string()))?;

    let planes = decoded.planes();
    let plane = planes
        .interleaved
        .ok_or_else(|| decode_err("no interleaved RGB plane".to_string()))?;

    let (width, height) = (plane.width, plane.height);
    let row_bytes = width as usize * 3;
    let mut pixels = Vec::with_capacity(row_bytes * height as usize);
    for row in plane.data.chunks(plane.stride).take(height as usize) {
        pixels.extend_from_slice(&row[..row_bytes.min(row.len())]);
    }

    image::RgbImage::from_raw(width, height, pixels)
        .map(DynamicImage::ImageRgb8)
        .ok_or_else(|| decode_err("pixel buffer size mismatch".to_string()))
}

#[cfg(not(feature = "heic"))]
fn decode_heic(path: &Path) -> Result<DynamicImage, ManifestError> {
    Err(ManifestError::UnsupportedFormat(path.to_path_buf()))
}

fn apply_orientation(image: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => image.fliph(),
        3 => image.rotate180(),
        4 => image.flipv(),
        5 => image.rotate270().fliph(),
        6 => image.rotate90(),
        7 => image.rotate90().fliph(),
        8 => image.rotate270(),
        _ => image,
    }
}

fn write_display_copy(image: &DynamicImage, output_path: &Path) -> Result<(), ManifestError> {
    let (width, height) = fit_width(image.width(), image.height(), DISPLAY_WIDTH);
    let resized = if width == image.width() {
        image.to_rgb8()
    } else {
        image
            .resize_exact(width, height, image::imageops::FilterType::Lanczos3)
            .to_rgb8()
    };

    let file = File::create(output_path).map_err(|source| ManifestError::Io {
        path: output_path.to_path_buf(),
        source,
    })?;
    JpegEncoder::new_with_quality(BufWriter::new(file), JPEG_QUALITY)
        .encode_image(&resized)
        .map_err(|err| ManifestError::Encode {
            path: output_path.to_path_buf(),
            message: err.to_string(),
        })
}
