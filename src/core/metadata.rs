use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use little_exif::exif_tag::ExifTag;
use little_exif::ifd::ExifTagGroup;
use little_exif::metadata::Metadata as ExifMetadata;
use little_exif::rational::uR64;
use tracing::debug;

use crate::core::coords;
use crate::core::formats;
use crate::models::{
    Dms, ExifGroup, GeoPoint, GpsGroup, ImageFormat, ImageRecord, Rational,
    ALTITUDE_ABOVE_SEA_LEVEL, GPS_VERSION,
};

/// Fixed EXIF date/time layout, e.g. `2023:07:14 18:05:00`.
pub const EXIF_DATE_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

const EXIF_APP1_HEADER: &[u8] = b"Exif\0\0";

#[derive(Debug)]
pub enum MetadataError {
    FileNotFound(PathBuf),
    UnsupportedFormat(PathBuf),
    InvalidDate(String),
    Unreadable { path: PathBuf, source: std::io::Error },
    Io { path: PathBuf, source: std::io::Error },
}

impl fmt::Display for MetadataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileNotFound(path) => write!(f, "file not found: {}", path.display()),
            Self::UnsupportedFormat(path) => {
                write!(f, "cannot write EXIF to this file type: {}", path.display())
            }
            Self::InvalidDate(raw) => {
                write!(f, "invalid date {raw:?}, expected YYYY:MM:DD HH:MM:SS")
            }
            Self::Unreadable { path, source } => {
                write!(f, "existing metadata in {} cannot be decoded: {source}", path.display())
            }
            Self::Io { path, source } => write!(f, "io error on {}: {source}", path.display()),
        }
    }
}

impl std::error::Error for MetadataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } | Self::Unreadable { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, MetadataError>;

/// Metadata loaded from one file.
///
/// The GPS and Exif-date fields are decoded into typed groups. Everything else
/// stays inside the underlying container untouched and is written back as-is.
pub struct ExistingTags {
    pub gps: Option<GpsGroup>,
    pub exif: ExifGroup,
    raw: ExifMetadata,
}

impl ExistingTags {
    pub fn empty() -> Self {
        Self {
            gps: None,
            exif: ExifGroup::default(),
            raw: ExifMetadata::new(),
        }
    }

    pub fn has_gps(&self) -> bool {
        self.gps.is_some()
    }

    pub fn has_date(&self) -> bool {
        self.exif.date_time_original.is_some()
    }

    pub fn tag_count(&self) -> usize {
        (&self.raw).into_iter().count()
    }

    fn from_raw(raw: ExifMetadata) -> Self {
        let mut decoder = GpsDecoder::default();
        let mut exif = ExifGroup::default();

        for tag in &raw {
            if let ExifTag::DateTimeOriginal(value) = tag {
                let cleaned = clean_string(value);
                if !cleaned.is_empty() {
                    exif.date_time_original = Some(cleaned);
                }
                continue;
            }
            decoder.accept(tag);
        }

        Self {
            gps: decoder.finish(),
            exif,
            raw,
        }
    }
}

impl fmt::Debug for ExistingTags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExistingTags")
            .field("gps", &self.gps)
            .field("exif", &self.exif)
            .field("tag_count", &self.tag_count())
            .finish()
    }
}

pub struct MetadataEngine;

impl MetadataEngine {
    /// Loads whatever metadata the file has. A JPEG without an EXIF block
    /// yields empty tags; a block that exists but cannot be decoded is
    /// [`MetadataError::Unreadable`], so it is never overwritten blindly.
    pub fn read_tags(path: &Path) -> Result<ExistingTags> {
        if !path.exists() {
            return Err(MetadataError::FileNotFound(path.to_path_buf()));
        }
        if !formats::is_supported(path) {
            return Err(MetadataError::UnsupportedFormat(path.to_path_buf()));
        }

        match ExifMetadata::new_from_path(path) {
            Ok(raw) => Ok(ExistingTags::from_raw(raw)),
            Err(source) => {
                if may_hold_exif(path)? {
                    return Err(MetadataError::Unreadable {
                        path: path.to_path_buf(),
                        source,
                    });
                }
                debug!(path = %path.display(), "no EXIF block, starting empty");
                Ok(ExistingTags::empty())
            }
        }
    }

    /// Replaces the GPS group wholesale, including GPS tags this tool never
    /// writes. Other groups are not touched.
    pub fn merge_gps(mut tags: ExistingTags, point: &GeoPoint) -> ExistingTags {
        let group = Self::gps_group_for(point);

        let stale: Vec<ExifTag> = (&tags.raw)
            .into_iter()
            .filter(|tag| is_gps_tag(tag))
            .cloned()
            .collect();
        for tag in stale {
            tags.raw.remove_tag(tag);
        }

        tags.raw.set_tag(ExifTag::GPSVersionID(group.version.to_vec()));
        tags.raw.set_tag(ExifTag::GPSAltitudeRef(vec![group.altitude_ref]));
        tags.raw.set_tag(ExifTag::GPSAltitude(vec![ur64(group.altitude)]));
        tags.raw.set_tag(ExifTag::GPSLatitudeRef(group.latitude_ref.to_string()));
        tags.raw.set_tag(ExifTag::GPSLatitude(dms_to_ur64(group.latitude)));
        tags.raw.set_tag(ExifTag::GPSLongitudeRef(group.longitude_ref.to_string()));
        tags.raw.set_tag(ExifTag::GPSLongitude(dms_to_ur64(group.longitude)));

        tags.gps = Some(group);
        tags
    }

    /// Sets `DateTimeOriginal`. The string must match [`EXIF_DATE_FORMAT`]
    /// exactly; nothing is changed when it does not.
    pub fn merge_date(mut tags: ExistingTags, date: &str) -> Result<ExistingTags> {
        let date = validate_exif_date(date)?;

        tags.raw.set_tag(ExifTag::DateTimeOriginal(date.clone()));
        tags.exif.date_time_original = Some(date);
        Ok(tags)
    }

    /// Overwrites the file's metadata block in place.
    pub fn write_tags(path: &Path, tags: &ExistingTags) -> Result<()> {
        ensure_writable(path)?;

        tags.raw
            .write_to_file(path)
            .map_err(|source| MetadataError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        debug!(path = %path.display(), gps = tags.has_gps(), date = tags.has_date(), "metadata written");
        Ok(())
    }

    pub fn write_gps(path: &Path, point: &GeoPoint) -> Result<()> {
        ensure_writable(path)?;
        let tags = Self::merge_gps(Self::read_tags(path)?, point);
        Self::write_tags(path, &tags)
    }

    pub fn write_date(path: &Path, date: &str) -> Result<()> {
        ensure_writable(path)?;
        let tags = Self::merge_date(Self::read_tags(path)?, date)?;
        Self::write_tags(path, &tags)
    }

    /// Classifies one file. Unreadable files count as having neither GPS
    /// nor a capture date.
    pub fn inspect(path: &Path) -> ImageRecord {
        match Self::read_tags(path) {
            Ok(tags) => ImageRecord {
                path: path.to_path_buf(),
                has_gps: tags.has_gps(),
                has_date: tags.has_date(),
                location: tags.gps.as_ref().map(|gps| {
                    (
                        gps.latitude_decimal(),
                        gps.longitude_decimal(),
                        gps.altitude_meters(),
                    )
                }),
                date_taken: tags.exif.date_time_original.clone(),
            },
            Err(err) => {
                debug!(path = %path.display(), error = %err, "metadata unreadable, treating as untagged");
                ImageRecord::unreadable(path)
            }
        }
    }

    pub fn gps_group_for(point: &GeoPoint) -> GpsGroup {
        let (latitude, latitude_ref) = coords::latitude_to_dms(point.latitude);
        let (longitude, longitude_ref) = coords::longitude_to_dms(point.longitude);

        GpsGroup {
            version: GPS_VERSION,
            altitude_ref: ALTITUDE_ABOVE_SEA_LEVEL,
            altitude: altitude_rational(point.elevation_or_zero()),
            latitude,
            latitude_ref,
            longitude,
            longitude_ref,
        }
    }
}

/// Checks a user-entered capture date against the EXIF layout.
pub fn validate_exif_date(raw: &str) -> Result<String> {
    let invalid = || MetadataError::InvalidDate(raw.to_string());

    let parsed = NaiveDateTime::parse_from_str(raw, EXIF_DATE_FORMAT).map_err(|_| invalid())?;
    let formatted = parsed.format(EXIF_DATE_FORMAT).to_string();

    // chrono accepts unpadded fields; the EXIF contract does not.
    if formatted != raw {
        return Err(invalid());
    }
    Ok(formatted)
}

fn ensure_writable(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(MetadataError::FileNotFound(path.to_path_buf()));
    }
    if !formats::is_writable(path) {
        return Err(MetadataError::UnsupportedFormat(path.to_path_buf()));
    }
    Ok(())
}

/// Whether a failed decode may have hit a real EXIF block. Only a well-formed
/// JPEG whose header segments carry no Exif APP1 is known to have none.
fn may_hold_exif(path: &Path) -> Result<bool> {
    if formats::detect_format(path) != ImageFormat::Jpeg {
        return Ok(true);
    }

    let bytes = fs::read(path).map_err(|source| MetadataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(jpeg_has_exif_segment(&bytes).unwrap_or(true))
}

/// Walks the JPEG segments up to the first scan. `None` when the bytes do not
/// parse as a JPEG header.
fn jpeg_has_exif_segment(bytes: &[u8]) -> Option<bool> {
    if !bytes.starts_with(&[0xFF, 0xD8]) {
        return None;
    }

    let mut pos = 2;
    loop {
        if *bytes.get(pos)? != 0xFF {
            return None;
        }
        let marker = *bytes.get(pos + 1)?;
        match marker {
            0xFF => {
                pos += 1;
                continue;
            }
            0xD9 | 0xDA => return Some(false),
            0x01 | 0xD0..=0xD7 => {
                pos += 2;
                continue;
            }
            _ => {}
        }

        let length = u16::from_be_bytes([*bytes.get(pos + 2)?, *bytes.get(pos + 3)?]) as usize;
        if length < 2 {
            return None;
        }
        if marker == 0xE1 && bytes.get(pos + 4..pos + 2 + length)?.starts_with(EXIF_APP1_HEADER) {
            return Some(true);
        }
        pos += 2 + length;
    }
}

// ---------------------------------------------------------------------------
// GPS decoding
// ---------------------------------------------------------------------------

#[derive(Default)]
struct GpsDecoder {
    version: Option<[u8; 4]>,
    latitude_ref: Option<char>,
    latitude: Option<Dms>,
    longitude_ref: Option<char>,
    longitude: Option<Dms>,
    altitude_ref: Option<u8>,
    altitude: Option<Rational>,
}

impl GpsDecoder {
    fn accept(&mut self, tag: &ExifTag) {
        match tag {
            ExifTag::GPSVersionID(bytes) if bytes.len() >= 4 => {
                self.version = Some([bytes[0], bytes[1], bytes[2], bytes[3]]);
            }
            ExifTag::GPSLatitudeRef(value) => self.latitude_ref = ref_letter(value),
            ExifTag::GPSLatitude(rats) => self.latitude = ur64_to_dms(rats),
            ExifTag::GPSLongitudeRef(value) => self.longitude_ref = ref_letter(value),
            ExifTag::GPSLongitude(rats) => self.longitude = ur64_to_dms(rats),
            ExifTag::GPSAltitudeRef(bytes) => self.altitude_ref = bytes.first().copied(),
            ExifTag::GPSAltitude(rats) => {
                self.altitude = rats.first().map(|r| Rational::new(r.nominator, r.denominator));
            }
            _ => {}
        }
    }

    /// A GPS group only counts as present with both coordinates and their letters.
    fn finish(self) -> Option<GpsGroup> {
        Some(GpsGroup {
            version: self.version.unwrap_or(GPS_VERSION),
            altitude_ref: self.altitude_ref.unwrap_or(ALTITUDE_ABOVE_SEA_LEVEL),
            altitude: self.altitude.unwrap_or(Rational::new(0, 1)),
            latitude: self.latitude?,
            latitude_ref: self.latitude_ref?,
            longitude: self.longitude?,
            longitude_ref: self.longitude_ref?,
        })
    }
}

fn is_gps_tag(tag: &ExifTag) -> bool {
    tag.get_group() == ExifTagGroup::GPS
}

fn ref_letter(value: &str) -> Option<char> {
    clean_string(value)
        .chars()
        .next()
        .map(|letter| letter.to_ascii_uppercase())
}

fn ur64_to_dms(rats: &[uR64]) -> Option<Dms> {
    let [degrees, minutes, seconds] = rats.get(..3)? else {
        return None;
    };

    Some(Dms {
        degrees: Rational::new(degrees.nominator, degrees.denominator),
        minutes: Rational::new(minutes.nominator, minutes.denominator),
        seconds: Rational::new(seconds.nominator, seconds.denominator),
    })
}

fn dms_to_ur64(dms: Dms) -> Vec<uR64> {
    dms.as_array().into_iter().map(ur64).collect()
}

fn ur64(value: Rational) -> uR64 {
    uR64 {
        nominator: value.numerator,
        denominator: value.denominator,
    }
}

/// Meters as hundredths. Below-sea-level heights are written as 0 because the
/// altitude reference is always "above sea level".
fn altitude_rational(meters: f64) -> Rational {
    let clamped = meters.max(0.0);
    if clamped != meters {
        debug!(meters, "negative elevation clamped to sea level");
    }
    Rational::new((clamped * 100.0).round() as u32, 100)
}

fn clean_string(s: &str) -> String {
    s.trim_end_matches('\0').trim().to_string()
}
