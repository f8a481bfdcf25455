//! Camera fields read from an EXIF block.
//!
//! Parsing is done by `kamadak-exif`; this module maps the handful of tags the
//! metadata view, orientation handling and GPS location need.

use crate::error::{Error, Result};
use exif::{Exif, Field, In, Reader, Tag, Value};

const EXIF_HEADER: &[u8] = b"Exif\0\0";

/// Unsigned rational number (numerator, denominator).
pub type Rational = (u32, u32);

/// Fields extracted from an EXIF block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExifData {
    /// Orientation tag (1-8).
    pub orientation: Option<u16>,
    /// Camera manufacturer.
    pub make: Option<String>,
    /// Camera model.
    pub model: Option<String>,
    /// File modification date/time.
    pub date_time: Option<String>,
    /// Date/time the picture was taken.
    pub date_time_original: Option<String>,
    /// Exposure time in seconds.
    pub exposure_time: Option<Rational>,
    /// Aperture f-number.
    pub f_number: Option<Rational>,
    /// ISO speed rating.
    pub iso: Option<u32>,
    /// GPS latitude in signed decimal degrees.
    pub gps_latitude: Option<f64>,
    /// GPS longitude in signed decimal degrees.
    pub gps_longitude: Option<f64>,
}

impl ExifData {
    /// Best available capture timestamp.
    pub fn date_taken(&self) -> Option<&str> {
        self.date_time_original
            .as_deref()
            .or(self.date_time.as_deref())
    }

    /// GPS position when both coordinates are present.
    pub fn gps_position(&self) -> Option<(f64, f64)> {
        self.gps_latitude.zip(self.gps_longitude)
    }
}

/// Parse a raw EXIF block (with or without the `Exif\0\0` APP1 prefix).
pub fn parse_exif(raw: &[u8]) -> Result<ExifData> {
    let data = raw.strip_prefix(EXIF_HEADER).unwrap_or(raw);
    let exif = Reader::new()
        .read_raw(data.to_vec())
        .map_err(|e| Error::Exif {
            reason: e.to_string(),
        })?;

    Ok(ExifData {
        orientation: unsigned(&exif, Tag::Orientation).and_then(|v| u16::try_from(v).ok()),
        make: ascii(&exif, Tag::Make),
        model: ascii(&exif, Tag::Model),
        date_time: ascii(&exif, Tag::DateTime),
        date_time_original: ascii(&exif, Tag::DateTimeOriginal),
        exposure_time: rational(&exif, Tag::ExposureTime),
        f_number: rational(&exif, Tag::FNumber),
        iso: unsigned(&exif, Tag::PhotographicSensitivity),
        gps_latitude: coordinate(&exif, Tag::GPSLatitude, Tag::GPSLatitudeRef, "S"),
        gps_longitude: coordinate(&exif, Tag::GPSLongitude, Tag::GPSLongitudeRef, "W"),
    })
}

fn field(exif: &Exif, tag: Tag) -> Option<&Field> {
    exif.get_field(tag, In::PRIMARY)
}

fn ascii(exif: &Exif, tag: Tag) -> Option<String> {
    let Value::Ascii(parts) = &field(exif, tag)?.value else {
        return None;
    };
    let text = parts
        .iter()
        .map(|p| String::from_utf8_lossy(p))
        .collect::<Vec<_>>()
        .join(" ");
    let text = text.trim_end_matches('\0').trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn unsigned(exif: &Exif, tag: Tag) -> Option<u32> {
    field(exif, tag)?.value.get_uint(0)
}

fn rational(exif: &Exif, tag: Tag) -> Option<Rational> {
    match &field(exif, tag)?.value {
        Value::Rational(values) => values.first().map(|r| (r.num, r.denom)),
        _ => None,
    }
}

/// Signed decimal degrees from a DMS triple and its hemisphere reference.
fn coordinate(exif: &Exif, tag: Tag, ref_tag: Tag, negative_ref: &str) -> Option<f64> {
    let Value::Rational(dms) = &field(exif, tag)?.value else {
        return None;
    };
    let degrees = match dms.as_slice() {
        [d, m, s, ..] => ratio(d)? + ratio(m)? / 60.0 + ratio(s)? / 3600.0,
        _ => return None,
    };
    let negative = ascii(exif, ref_tag).is_some_and(|r| r.eq_ignore_ascii_case(negative_ref));
    Some(if negative { -degrees } else { degrees })
}

fn ratio(r: &exif::Rational) -> Option<f64> {
    (r.denom != 0).then(|| r.to_f64())
}

/// Format an exposure time as `"1/250 sec"`.
pub fn format_exposure(exposure: Rational) -> String {
    format!("{}/{} sec", exposure.0, exposure.1)
}

/// Format an f-number as `"f/2.8"`.
pub fn format_aperture(f_number: Rational) -> Option<String> {
    (f_number.1 != 0).then(|| format!("f/{:.1}", f64::from(f_number.0) / f64::from(f_number.1)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use exif::experimental::Writer;
    use std::io::Cursor;

    pub(crate) fn text(tag: Tag, value: &str) -> Field {
        Field {
            tag,
            ifd_num: In::PRIMARY,
            value: Value::Ascii(vec![value.as_bytes().to_vec()]),
        }
    }

    pub(crate) fn short(tag: Tag, value: u16) -> Field {
        Field {
            tag,
            ifd_num: In::PRIMARY,
            value: Value::Short(vec![value]),
        }
    }

    pub(crate) fn rationals(tag: Tag, values: &[(u32, u32)]) -> Field {
        Field {
            tag,
            ifd_num: In::PRIMARY,
            value: Value::Rational(
                values
                    .iter()
                    .map(|&(num, denom)| exif::Rational { num, denom })
                    .collect(),
            ),
        }
    }

    /// Encode fields as a little-endian TIFF block.
    pub(crate) fn block(fields: &[Field]) -> Vec<u8> {
        let mut writer = Writer::new();
        for f in fields {
            writer.push_field(f);
        }
        let mut buf = Cursor::new(Vec::new());
        writer.write(&mut buf, true).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_parse_camera_fields() {
        let raw = block(&[
            text(Tag::Make, "Browning"),
            text(Tag::Model, "Recon Force"),
            short(Tag::Orientation, 6),
            text(Tag::DateTime, "2024:05:01 06:12:44"),
            rationals(Tag::ExposureTime, &[(1, 250)]),
            rationals(Tag::FNumber, &[(28, 10)]),
            short(Tag::PhotographicSensitivity, 400),
        ]);

        let exif = parse_exif(&raw).unwrap();
        assert_eq!(exif.make.as_deref(), Some("Browning"));
        assert_eq!(exif.model.as_deref(), Some("Recon Force"));
        assert_eq!(exif.orientation, Some(6));
        assert_eq!(exif.date_taken(), Some("2024:05:01 06:12:44"));
        assert_eq!(exif.exposure_time, Some((1, 250)));
        assert_eq!(exif.iso, Some(400));
        assert_eq!(format_exposure((1, 250)), "1/250 sec");
        assert_eq!(format_aperture((28, 10)).as_deref(), Some("f/2.8"));
    }

    #[test]
    fn test_parse_gps_south_west() {
        let raw = block(&[
            text(Tag::GPSLatitudeRef, "S"),
            rationals(Tag::GPSLatitude, &[(33, 1), (30, 1), (0, 1)]),
            text(Tag::GPSLongitudeRef, "W"),
            rationals(Tag::GPSLongitude, &[(70, 1), (45, 1), (36, 1)]),
        ]);

        let (lat, lon) = parse_exif(&raw).unwrap().gps_position().unwrap();
        assert!((lat - -33.5).abs() < 1e-9);
        assert!((lon - -70.76).abs() < 1e-9);
    }

    #[test]
    fn test_parse_accepts_app1_prefix() {
        let mut raw = EXIF_HEADER.to_vec();
        raw.extend(block(&[short(Tag::Orientation, 3)]));
        assert_eq!(parse_exif(&raw).unwrap().orientation, Some(3));
    }

    #[test]
    fn test_zero_denominator_gps_is_ignored() {
        let raw = block(&[
            text(Tag::GPSLatitudeRef, "N"),
            rationals(Tag::GPSLatitude, &[(10, 0), (0, 1), (0, 1)]),
        ]);
        assert_eq!(parse_exif(&raw).unwrap().gps_latitude, None);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_exif(b"not exif at all").is_err());
        assert!(parse_exif(b"II").is_err());
    }

    #[test]
    fn test_truncated_block_is_error_not_panic() {
        let raw = block(&[text(Tag::Make, "A long camera maker name")]);
        for len in 0..raw.len() {
            let _ = parse_exif(&raw[..len]);
        }
        assert!(parse_exif(&raw[..6]).is_err());
    }
}
