//! Reader for the pixel-dump text format, the CSS export of a pixel art
//! editor with the wrapping rule stripped:
//!
//! ```text
//! 0px 0px #FF0000,
//! 1px 0px #00ff00,
//! ```
//!
//! Records may come in any order, may repeat a coordinate (last one wins)
//! and need not cover every pixel (unlisted pixels are black).

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use glam::UVec2;
use image::Rgb;
use thiserror::Error;

use crate::{
    error::{Error, Result},
    pixel_image::{Pixel, PixelImage},
};

/// One `<x>px <y>px #RRGGBB,` line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Record {
    pub loc: UVec2,
    pub color: Pixel,
}

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum RecordError {
    #[error("expected 3 fields, found {0}")]
    FieldCount(usize),
    #[error("bad coordinate {0:?}, expected `<int>px`")]
    Coordinate(String),
    #[error("bad color {0:?}, expected `#RRGGBB`")]
    Color(String),
    #[error("coordinate {x},{y} lies outside the {width}x{height} px image")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
}

/// A line that isn't a record, skipped unless parsing strictly
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseWarning {
    /// 1-based
    pub line: usize,
    pub content: String,
    pub reason: RecordError,
}

pub fn parse_record(line: &str) -> std::result::Result<Record, RecordError> {
    let line = line.trim();
    let line = line
        .strip_suffix(',')
        .or_else(|| line.strip_suffix(';'))
        .unwrap_or(line);

    let fields: Vec<&str> = line.split_whitespace().collect();
    let [x, y, color] = fields[..] else {
        return Err(RecordError::FieldCount(fields.len()));
    };

    return Ok(Record {
        loc: UVec2 {
            x: parse_coordinate(x)?,
            y: parse_coordinate(y)?,
        },
        color: parse_color(color)?,
    });
}

fn parse_coordinate(field: &str) -> std::result::Result<u32, RecordError> {
    let bad = || RecordError::Coordinate(field.to_owned());
    let digits = field.strip_suffix("px").ok_or_else(bad)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(bad());
    }
    return digits.parse().map_err(|_| bad());
}

fn parse_color(field: &str) -> std::result::Result<Pixel, RecordError> {
    let bad = || RecordError::Color(field.to_owned());
    let hex = field.strip_prefix('#').ok_or_else(bad)?;
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(bad());
    }
    let rgb = u32::from_str_radix(hex, 16).map_err(|_| bad())?;
    return Ok(Rgb([(rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8]));
}

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    return Ok(BufReader::new(file));
}

/// Image dimensions in pixels: one past the largest coordinates of all
/// valid records in the dump at `path`.
pub fn scan_dimensions(path: &Path) -> Result<UVec2> {
    return scan_dimensions_from(open(path)?, path);
}

/// [`scan_dimensions`] over an already opened dump; `path` only labels errors.
pub fn scan_dimensions_from<R: BufRead>(reader: R, path: &Path) -> Result<UVec2> {
    let mut max: Option<UVec2> = None;
    for line in reader.lines() {
        let line = line.map_err(|e| Error::io(path, e))?;
        if let Ok(record) = parse_record(&line) {
            max = Some(max.map_or(record.loc, |m| m.max(record.loc)));
        }
    }

    let Some(max) = max else {
        return Err(Error::EmptyImage {
            path: path.to_path_buf(),
        });
    };
    // u32::MAX coordinates would overflow the +1
    let dims = UVec2 {
        x: max.x.saturating_add(1),
        y: max.y.saturating_add(1),
    };
    log::info!("[{}] is {}*{} px", path.display(), dims.x, dims.y);
    return Ok(dims);
}

/// Writes every record of the dump at `path` into `image`, which must have
/// been sized with [`scan_dimensions`].
///
/// Lines that aren't records are returned as warnings, or abort the parse
/// with [`Error::MalformedRecord`] when `strict`. A record outside the image
/// always aborts.
pub fn parse_pixels(path: &Path, image: &mut PixelImage, strict: bool) -> Result<Vec<ParseWarning>> {
    return parse_pixels_from(open(path)?, path, image, strict);
}

/// [`parse_pixels`] over an already opened dump; `path` only labels errors.
pub fn parse_pixels_from<R: BufRead>(
    reader: R,
    path: &Path,
    image: &mut PixelImage,
    strict: bool,
) -> Result<Vec<ParseWarning>> {
    let mut warnings = Vec::new();
    let mut records = 0usize;

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| Error::io(path, e))?;
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }

        let record = match parse_record(&line) {
            Ok(record) => record,
            Err(reason) if strict => {
                return Err(Error::MalformedRecord {
                    path: path.to_path_buf(),
                    line: line_no,
                    content: line,
                    reason,
                });
            }
            Err(reason) => {
                log::warn!("[{}] line {line_no}: skipping {line:?}: {reason}", path.display());
                warnings.push(ParseWarning {
                    line: line_no,
                    content: line,
                    reason,
                });
                continue;
            }
        };

        if !image.set_pixel(record.loc, record.color) {
            return Err(Error::MalformedRecord {
                path: path.to_path_buf(),
                line: line_no,
                content: line,
                reason: RecordError::OutOfBounds {
                    x: record.loc.x,
                    y: record.loc.y,
                    width: image.width(),
                    height: image.height(),
                },
            });
        }
        log::trace!(
            "px @ [{}, {}] : #{:02x}{:02x}{:02x}",
            record.loc.x,
            record.loc.y,
            record.color[0],
            record.color[1],
            record.color[2]
        );
        records += 1;
    }

    log::debug!(
        "[{}] {records} pixel records, {} skipped lines",
        path.display(),
        warnings.len()
    );
    return Ok(warnings);
}

/// Scans then parses the dump at `path` into a freshly allocated image.
pub fn load_dump(path: &Path, strict: bool) -> Result<(PixelImage, Vec<ParseWarning>)> {
    let dims = scan_dimensions(path)?;
    let mut image = PixelImage::black(dims)?;
    let warnings = parse_pixels(path, &mut image, strict)?;
    return Ok((image, warnings));
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;

    const RED: Pixel = Rgb([0xff, 0, 0]);

    fn dims_of(text: &str) -> Result<UVec2> {
        scan_dimensions_from(Cursor::new(text), Path::new("test.dat"))
    }

    fn parse(text: &str, strict: bool) -> Result<(PixelImage, Vec<ParseWarning>)> {
        let mut image = PixelImage::black(dims_of(text)?)?;
        let warnings = parse_pixels_from(Cursor::new(text), Path::new("test.dat"), &mut image, strict)?;
        Ok((image, warnings))
    }

    #[test]
    fn parses_records() {
        assert_eq!(
            parse_record("12px 3px #FF0000,"),
            Ok(Record {
                loc: UVec2 { x: 12, y: 3 },
                color: RED
            })
        );
        assert_eq!(
            parse_record("  0px 0px #0a0B0c;").map(|r| r.color),
            Ok(Rgb([0x0a, 0x0b, 0x0c]))
        );
        assert_eq!(parse_record("1px 1px #123456").map(|r| r.loc), Ok(UVec2::ONE));
    }

    #[test]
    fn rejects_malformed_records() {
        assert_eq!(parse_record("1px 2px"), Err(RecordError::FieldCount(2)));
        assert_eq!(
            parse_record("1 2px #000000,"),
            Err(RecordError::Coordinate("1".to_owned()))
        );
        assert_eq!(
            parse_record("-1px 2px #000000,"),
            Err(RecordError::Coordinate("-1px".to_owned()))
        );
        assert_eq!(
            parse_record("1px 2px #00000,"),
            Err(RecordError::Color("#00000".to_owned()))
        );
        assert_eq!(
            parse_record("1px 2px #GG0000,"),
            Err(RecordError::Color("#GG0000".to_owned()))
        );
        assert!(parse_record("box-shadow: 0px 0px #000000,").is_err());
    }

    #[test]
    fn dimensions_are_max_plus_one() {
        let text = "3px 0px #000000,\n0px 5px #000000,\n1px 1px #000000,\n";
        assert_eq!(dims_of(text).unwrap(), UVec2 { x: 4, y: 6 });
    }

    #[test]
    fn no_records_is_an_error() {
        let err = dims_of("\nnot a record\n").unwrap_err();
        assert!(matches!(err, Error::EmptyImage { .. }));
    }

    #[test]
    fn single_record_is_a_one_pixel_image() {
        assert_eq!(dims_of("0px 0px #ffffff,").unwrap(), UVec2::ONE);
    }

    #[test]
    fn unlisted_pixels_stay_black_and_last_duplicate_wins() {
        let text = "2px 1px #ff0000,\n0px 0px #00ff00,\n0px 0px #0000ff,\n";
        let (image, warnings) = parse(text, false).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(image.dims(), UVec2 { x: 3, y: 2 });
        assert_eq!(image.pixel(UVec2 { x: 2, y: 1 }), Some(RED));
        assert_eq!(image.pixel(UVec2::ZERO), Some(Rgb([0, 0, 0xff])));
        assert_eq!(image.pixel(UVec2 { x: 1, y: 0 }), Some(Rgb([0, 0, 0])));
    }

    #[test]
    fn malformed_lines_become_warnings() {
        let text = "0px 0px #ff0000,\n\ngarbage\n1px 0px #ff0000,\n";
        let (image, warnings) = parse(text, false).unwrap();
        assert_eq!(image.dims(), UVec2 { x: 2, y: 1 });
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].line, 3);
        assert_eq!(warnings[0].content, "garbage");
        assert_eq!(warnings[0].reason, RecordError::FieldCount(1));
    }

    #[test]
    fn strict_mode_fails_on_malformed_lines() {
        let text = "0px 0px #ff0000,\n1px 0px #ff00,\n";
        let err = parse(text, true).unwrap_err();
        match err {
            Error::MalformedRecord { line, reason, .. } => {
                assert_eq!(line, 2);
                assert_eq!(reason, RecordError::Color("#ff00".to_owned()));
            }
            other => panic!("expected MalformedRecord, got {other:?}"),
        }
    }

    #[test]
    fn out_of_bounds_record_is_rejected() {
        let mut image = PixelImage::black(UVec2::splat(2)).unwrap();
        let err = parse_pixels_from(
            Cursor::new("0px 0px #ff0000,\n2px 0px #ff0000,\n"),
            Path::new("test.dat"),
            &mut image,
            false,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedRecord {
                line: 2,
                reason: RecordError::OutOfBounds { x: 2, y: 0, .. },
                ..
            }
        ));
    }

    #[test]
    fn missing_file_is_reported() {
        let err = scan_dimensions(Path::new("definitely/not/here.dat")).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }
}
