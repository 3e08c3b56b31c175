#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use little_exif::exif_tag::ExifTag;
use little_exif::ifd::{ExifTagGroup, ImageFileDirectory};
use little_exif::metadata::Metadata;
use little_exif::rational::uR64;

pub const CAMERA_MAKE: &str = "TestCam";

pub fn unique_path(name: &str, ext: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time should be after unix epoch")
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("photo_geotag_{name}_{stamp}.{ext}"));
    path
}

/// APP1 segment holding a little-endian TIFF block with a single IFD0 entry:
/// Make = "TestCam".
const EXIF_APP1: &[u8] = &[
    0xFF, 0xE1, 0x00, 0x2A, // marker, length 42
    b'E', b'x', b'i', b'f', 0x00, 0x00, // identifier
    0x49, 0x49, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00, // "II", 42, IFD0 at 8
    0x01, 0x00, // one entry
    0x0F, 0x01, 0x02, 0x00, 0x08, 0x00, 0x00, 0x00, 0x1A, 0x00, 0x00, 0x00, // Make, ASCII, 8 bytes at 26
    0x00, 0x00, 0x00, 0x00, // no IFD1
    b'T', b'e', b's', b't', b'C', b'a', b'm', 0x00,
];

/// Writes a small real JPEG carrying a camera make and no GPS or date.
pub fn jpeg_with_make(name: &str) -> PathBuf {
    let path = unique_path(name, "jpg");
    image::RgbImage::from_pixel(16, 16, image::Rgb([120, 90, 60]))
        .save_with_format(&path, image::ImageFormat::Jpeg)
        .expect("should encode fixture jpeg");

    let encoded = fs::read(&path).expect("should read fixture jpeg");
    assert_eq!(&encoded[..2], &[0xFF, 0xD8], "fixture must start with SOI");

    let mut bytes = Vec::with_capacity(encoded.len() + EXIF_APP1.len());
    bytes.extend_from_slice(&encoded[..2]);
    bytes.extend_from_slice(EXIF_APP1);
    bytes.extend_from_slice(&encoded[2..]);
    fs::write(&path, bytes).expect("should write fixture jpeg");
    path
}

/// Byte offset of the TIFF byte-order mark inside [`jpeg_with_make`] files.
const TIFF_HEADER_OFFSET: usize = 2 + 4 + 6;

/// Breaks the byte-order mark of the embedded EXIF block so it no longer
/// decodes, while the APP1 segment itself stays in place.
pub fn corrupt_exif_block(path: &Path) {
    let mut bytes = fs::read(path).expect("should read fixture");
    bytes[TIFF_HEADER_OFFSET] = b'X';
    bytes[TIFF_HEADER_OFFSET + 1] = b'X';
    fs::write(path, bytes).expect("should write corrupted fixture");
}

/// A fixture with tags in IFD0, the Exif sub-IFD and IFD1 but no capture date.
pub fn jpeg_with_camera_tags(name: &str) -> PathBuf {
    let path = jpeg_with_make(name);

    let mut metadata = Metadata::new_from_path(&path).expect("should read fixture exif");
    metadata.set_tag(ExifTag::Model(String::from("Model 7")));
    metadata.set_tag(ExifTag::Software(String::from("fixture 1.0")));
    metadata.set_tag(ExifTag::FNumber(vec![uR64 { nominator: 28, denominator: 10 }]));
    metadata.set_tag(ExifTag::ExposureTime(vec![uR64 { nominator: 1, denominator: 250 }]));
    metadata.set_tag(ExifTag::ISO(vec![200]));
    metadata
        .get_ifd_mut(ExifTagGroup::GENERIC, 1)
        .set_tag(ExifTag::ImageDescription(String::from("second directory")));
    metadata.write_to_file(&path).expect("should write fixture exif");
    path
}

/// Every tag outside the GPS directory, keyed by directory, sorted. Offset
/// tags are left out since their values move whenever a block is rewritten.
pub fn non_gps_tags(path: &Path) -> Vec<String> {
    let metadata = Metadata::new_from_path(path).expect("should read exif");
    let mut tags: Vec<String> = metadata
        .get_ifds()
        .iter()
        .filter(|ifd| ifd.get_ifd_type() != ExifTagGroup::GPS)
        .flat_map(|ifd| {
            ifd.get_tags()
                .iter()
                .filter(|tag| !is_offset_tag(tag))
                .map(move |tag| {
                    format!(
                        "{:?}/{} {:?}",
                        ifd.get_ifd_type(),
                        ifd.get_generic_ifd_nr(),
                        tag
                    )
                })
        })
        .collect();
    tags.sort();
    tags
}

fn is_offset_tag(tag: &ExifTag) -> bool {
    ImageFileDirectory::get_ifd_type_for_offset_tag(tag).is_some()
        || matches!(
            tag,
            ExifTag::StripOffsets(..)
                | ExifTag::StripByteCounts(..)
                | ExifTag::ThumbnailOffset(..)
                | ExifTag::ThumbnailLength(..)
        )
}

pub fn camera_make(path: &Path) -> Option<String> {
    let metadata = Metadata::new_from_path(path).ok()?;
    let make = (&metadata).into_iter().find_map(|tag| match tag {
        ExifTag::Make(value) => Some(value.trim_end_matches('\0').to_string()),
        _ => None,
    });
    make
}

pub fn cleanup_file(path: &Path) {
    let _ = fs::remove_file(path);
}
