//! Owner input: add-by-path and file-upload forms, tag parsing, image
//! compaction into `data:` URIs, and color validation.

use std::io::Cursor;
use std::path::Path;

use base64::Engine as _;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::GenericImageView;
use time::macros::format_description;
use time::OffsetDateTime;

use crate::error::InputError;
use crate::model::RawPhoto;

/// Tags kept from the upload form.
pub const UPLOAD_TAG_CAP: usize = 2;

/// Split a comma-separated tag field, dropping blanks.
pub fn parse_tags(raw: &str, cap: Option<usize>) -> Vec<String> {
    let tags = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    match cap {
        Some(n) => tags.take(n).collect(),
        None => tags.collect(),
    }
}

fn required(value: &str, field: &'static str) -> Result<String, InputError> {
    let v = value.trim();
    if v.is_empty() {
        Err(InputError::MissingField(field))
    } else {
        Ok(v.to_string())
    }
}

fn optional(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

/// Today's UTC date as `YYYY-MM-DD`.
pub fn today() -> String {
    let fmt = format_description!("[year]-[month]-[day]");
    OffsetDateTime::now_utc()
        .date()
        .format(&fmt)
        .unwrap_or_default()
}

/// Record an image that already lives next to the page.
#[derive(Debug, Clone, Default)]
pub struct AddByPath {
    pub src: String,
    pub title: String,
    pub date: String,
    pub tags: String,
    pub description: Option<String>,
}

impl AddByPath {
    pub fn into_record(self) -> Result<RawPhoto, InputError> {
        let src = required(&self.src, "image path")?;
        let date = required(&self.date, "date")?;
        let title = required(&self.title, "title")?;
        Ok(RawPhoto {
            data_url: None,
            src: Some(src),
            title: Some(title),
            description: optional(self.description.as_deref()),
            date: Some(date),
            tags: parse_tags(&self.tags, None),
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CompactOptions {
    /// Longest edge after downscaling, in pixels.
    pub max_edge: u32,
    pub jpeg_quality: u8,
}

impl Default for CompactOptions {
    fn default() -> Self {
        Self {
            max_edge: 1280,
            jpeg_quality: 85,
        }
    }
}

/// Decode an image, shrink it to fit `max_edge`, and re-encode it as a
/// base64 JPEG data URI.
pub fn encode_data_url(bytes: &[u8], opts: CompactOptions) -> Result<String, InputError> {
    if bytes.is_empty() {
        return Err(InputError::EmptyFile);
    }
    let img = image::load_from_memory(bytes)
        .map_err(|e| InputError::UnreadableImage(e.to_string()))?;
    let (w, h) = img.dimensions();
    let img = if w.max(h) > opts.max_edge {
        img.resize(opts.max_edge, opts.max_edge, FilterType::Triangle)
    } else {
        img
    };
    let rgb = img.to_rgb8();
    drop(img);
    let mut buf = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buf, opts.jpeg_quality.clamp(1, 100))
        .encode_image(&rgb)
        .map_err(|e| InputError::UnreadableImage(e.to_string()))?;
    let b64 = base64::engine::general_purpose::STANDARD.encode(buf.get_ref());
    Ok(format!("data:image/jpeg;base64,{b64}"))
}

/// A picked file plus the upload form fields.
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub description: String,
    pub tags: String,
    pub title: Option<String>,
    pub date: Option<String>,
}

impl UploadForm {
    /// Validate the form and compact the image. Only the first
    /// [`UPLOAD_TAG_CAP`] tags are kept.
    pub fn into_record(self, opts: CompactOptions) -> Result<RawPhoto, InputError> {
        if self.bytes.is_empty() {
            return Err(InputError::EmptyFile);
        }
        let description = required(&self.description, "description")?;
        let data_url = encode_data_url(&self.bytes, opts)?;
        let title = optional(self.title.as_deref()).or_else(|| {
            Path::new(&self.file_name)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .filter(|s| !s.is_empty())
        });
        Ok(RawPhoto {
            data_url: Some(data_url),
            src: None,
            title,
            description: Some(description),
            date: optional(self.date.as_deref()).or_else(|| Some(today())),
            tags: parse_tags(&self.tags, Some(UPLOAD_TAG_CAP)),
        })
    }
}

fn is_hex_color(hex: &str) -> bool {
    matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
}

fn is_rgb_tuple(rest: &str) -> bool {
    let Some(t) = rest.strip_suffix(')') else {
        return false;
    };
    let parts: Vec<_> = t.split(',').map(|p| p.trim()).collect();
    parts.len() == 3 && parts.iter().all(|p| p.parse::<u8>().is_ok())
}

/// Accepts `#rgb`, `#rrggbb`, `rgb(r, g, b)` and bare color keywords.
/// Returns the value trimmed and lowercased.
pub fn validate_color(s: &str) -> Result<String, InputError> {
    let k = s.trim().to_ascii_lowercase();
    let ok = if let Some(hex) = k.strip_prefix('#') {
        is_hex_color(hex)
    } else if let Some(rest) = k.strip_prefix("rgb(") {
        is_rgb_tuple(rest)
    } else {
        !k.is_empty() && k.len() <= 24 && k.chars().all(|c| c.is_ascii_alphabetic())
    };
    if ok {
        Ok(k)
    } else {
        Err(InputError::InvalidColor(s.to_string()))
    }
}

/// A hero image is either a generated data URI or a path next to the page.
/// Paths may not carry characters that would leave a CSS `url("...")`.
pub fn validate_hero_source(s: &str) -> Result<&str, InputError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(InputError::MissingField("hero image"));
    }
    if s.starts_with("data:image/") {
        return Ok(s);
    }
    let unsafe_char = |c: char| matches!(c, '<' | '>' | '(' | ')' | '"' | '\'' | '\\') || c.is_control();
    if s.chars().any(unsafe_char) {
        return Err(InputError::UnsafeSource(s.to_string()));
    }
    Ok(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use image::{ImageBuffer, Rgba, RgbaImage};

    fn png(w: u32, h: u32) -> Vec<u8> {
        let img: RgbaImage = ImageBuffer::from_pixel(w, h, Rgba([240, 159, 176, 255]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn tags_split_trim_and_cap() {
        assert_eq!(parse_tags(" a, b ,,c ", None), ["a", "b", "c"]);
        assert_eq!(parse_tags("a,b,c", Some(UPLOAD_TAG_CAP)), ["a", "b"]);
        assert!(parse_tags("  ", None).is_empty());
    }

    #[test]
    fn add_by_path_requires_fields() {
        let form = AddByPath {
            src: "images/a.jpg".into(),
            title: "".into(),
            date: "2024-01-01".into(),
            ..Default::default()
        };
        assert_eq!(form.into_record(), Err(InputError::MissingField("title")));
    }

    #[test]
    fn add_by_path_keeps_all_tags() {
        let rec = AddByPath {
            src: " images/a.jpg ".into(),
            title: "A".into(),
            date: "2024-01-01".into(),
            tags: "x, y, z".into(),
            description: Some("  ".into()),
        }
        .into_record()
        .unwrap();
        assert_eq!(rec.src.as_deref(), Some("images/a.jpg"));
        assert_eq!(rec.tags.len(), 3);
        assert_eq!(rec.description, None);
    }

    #[test]
    fn upload_caps_tags_and_builds_data_url() {
        let rec = UploadForm {
            file_name: "mochi-nap.png".into(),
            bytes: png(4, 3),
            description: "afternoon nap".into(),
            tags: "nap, sofa, sun".into(),
            ..Default::default()
        }
        .into_record(CompactOptions::default())
        .unwrap();
        assert_eq!(rec.tags, ["nap", "sofa"]);
        assert_eq!(rec.title.as_deref(), Some("mochi-nap"));
        assert!(rec.data_url.unwrap().starts_with("data:image/jpeg;base64,"));
        assert_eq!(rec.date.unwrap().len(), 10);
    }

    #[test]
    fn upload_rejects_missing_input() {
        let no_file = UploadForm {
            description: "d".into(),
            ..Default::default()
        };
        assert_eq!(no_file.into_record(CompactOptions::default()), Err(InputError::EmptyFile));
        let no_desc = UploadForm {
            file_name: "a.png".into(),
            bytes: png(1, 1),
            ..Default::default()
        };
        assert_eq!(
            no_desc.into_record(CompactOptions::default()),
            Err(InputError::MissingField("description"))
        );
        let garbage = UploadForm {
            file_name: "a.png".into(),
            bytes: b"not an image".to_vec(),
            description: "d".into(),
            ..Default::default()
        };
        assert_matches!(
            garbage.into_record(CompactOptions::default()),
            Err(InputError::UnreadableImage(_))
        );
    }

    #[test]
    fn large_images_are_downscaled() {
        let url = encode_data_url(&png(64, 32), CompactOptions { max_edge: 16, jpeg_quality: 80 }).unwrap();
        let b64 = url.trim_start_matches("data:image/jpeg;base64,");
        let bytes = base64::engine::general_purpose::STANDARD.decode(b64).unwrap();
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!(img.dimensions(), (16, 8));
    }

    #[test]
    fn colors() {
        assert_eq!(validate_color(" #F59FB0 ").unwrap(), "#f59fb0");
        assert!(validate_color("#fff").is_ok());
        assert!(validate_color("rgb(1, 2, 255)").is_ok());
        assert!(validate_color("pink").is_ok());
        assert!(validate_color("#ggg").is_err());
        assert!(validate_color("rgb(1,2,300)").is_err());
        assert!(validate_color("red;}body{").is_err());
    }

    #[test]
    fn hero_sources() {
        assert_eq!(validate_hero_source(" images/cover.jpg ").unwrap(), "images/cover.jpg");
        assert!(validate_hero_source("data:image/jpeg;base64,AAAA").is_ok());
        assert_matches!(validate_hero_source("  "), Err(InputError::MissingField(_)));
        assert_matches!(
            validate_hero_source("x.jpg\");}</style><script>alert(1)</script>"),
            Err(InputError::UnsafeSource(_))
        );
    }
}
