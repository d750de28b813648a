//! ID3 tag and cover writing through lofty

use anyhow::{Context, Result, bail};
use image::codecs::jpeg::JpegEncoder;
use lofty::config::WriteOptions;
use lofty::file::{AudioFile, TaggedFileExt};
use lofty::picture::{MimeType, Picture, PictureType};
use lofty::probe::Probe;
use lofty::tag::{Accessor, Tag, TagExt, TagType};
use std::path::Path;

const COVER_JPEG_QUALITY: u8 = 90;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFields {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
}

impl TagFields {
    /// Blank strings become `None`.
    #[must_use]
    pub fn from_input(title: &str, artist: &str, album: &str) -> Self {
        let keep = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        };
        Self {
            title: keep(title),
            artist: keep(artist),
            album: keep(album),
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.artist.is_none() && self.album.is_none()
    }
}

fn write_options() -> WriteOptions {
    WriteOptions::default().use_id3v23(true)
}

/// Run `edit` on the file's ID3v2 tag, creating it when missing, then save.
fn edit_id3v2(path: &Path, edit: impl FnOnce(&mut Tag)) -> Result<()> {
    let mut tagged_file = Probe::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?
        .read()
        .with_context(|| format!("Failed to read tags of {}", path.display()))?;

    if tagged_file.tag(TagType::Id3v2).is_none() {
        tagged_file.insert_tag(Tag::new(TagType::Id3v2));
    }
    let tag = tagged_file
        .tag_mut(TagType::Id3v2)
        .context("ID3v2 tag missing after insert")?;

    edit(tag);

    tag.save_to_path(path, write_options())
        .with_context(|| format!("Failed to save tags to {}", path.display()))?;
    Ok(())
}

/// Set the non-empty fields; other tag content is kept.
pub fn write_tags(path: &Path, fields: &TagFields) -> Result<()> {
    edit_id3v2(path, |tag| {
        if let Some(title) = &fields.title {
            tag.set_title(title.clone());
        }
        if let Some(artist) = &fields.artist {
            tag.set_artist(artist.clone());
        }
        if let Some(album) = &fields.album {
            tag.set_album(album.clone());
        }
    })
}

/// Replace the front cover with `jpeg` bytes.
pub fn write_cover(path: &Path, jpeg: &[u8]) -> Result<()> {
    let mut picture =
        Picture::from_reader(&mut &jpeg[..]).context("Cover bytes are not a readable image")?;
    if picture.mime_type() != Some(&MimeType::Jpeg) {
        bail!("Cover must be JPEG, got {:?}", picture.mime_type());
    }
    picture.set_pic_type(PictureType::CoverFront);

    edit_id3v2(path, |tag| {
        tag.remove_picture_type(PictureType::CoverFront);
        tag.push_picture(picture);
    })
}

/// Number of embedded pictures, used to verify cover writes.
pub fn picture_count(path: &Path) -> Result<usize> {
    let tagged_file = Probe::open(path)?.read()?;
    Ok(tagged_file
        .tag(TagType::Id3v2)
        .map_or(0, |tag| tag.pictures().len()))
}

/// Remove every tag lofty knows about from the file.
pub fn clear_all_tags(path: &Path) -> Result<()> {
    let tagged_file = Probe::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?
        .read()
        .with_context(|| format!("Failed to read tags of {}", path.display()))?;

    for tag in tagged_file.tags() {
        tag.tag_type()
            .remove_from_path(path)
            .with_context(|| {
                format!("Failed to remove {:?} from {}", tag.tag_type(), path.display())
            })?;
    }
    Ok(())
}

/// Read back the basic fields, used to verify writes.
pub fn read_tags(path: &Path) -> Result<TagFields> {
    let tagged_file = Probe::open(path)?.read()?;
    let Some(tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) else {
        return Ok(TagFields::default());
    };
    Ok(TagFields {
        title: tag.title().map(|s| s.to_string()),
        artist: tag.artist().map(|s| s.to_string()),
        album: tag.album().map(|s| s.to_string()),
    })
}

/// Duration as seen by the tag reader.
pub fn read_duration(path: &Path) -> Result<f64> {
    let tagged_file = Probe::open(path)?.read()?;
    Ok(tagged_file.properties().duration().as_secs_f64())
}

/// Decode any supported image and re-encode it as RGB JPEG.
pub fn image_to_jpeg(path: &Path) -> Result<Vec<u8>> {
    let img = image::open(path)
        .with_context(|| format!("Failed to open image {}", path.display()))?
        .to_rgb8();

    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, COVER_JPEG_QUALITY)
        .encode_image(&img)
        .with_context(|| format!("Failed to encode {} as JPEG", path.display()))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_tag_fields_from_input() {
        let fields = TagFields::from_input("  Human Nature ", "", "Live");
        assert_eq!(fields.title.as_deref(), Some("Human Nature"));
        assert_eq!(fields.artist, None);
        assert_eq!(fields.album.as_deref(), Some("Live"));
        assert!(!fields.is_empty());
        assert!(TagFields::from_input("", " ", "").is_empty());
    }

    #[test]
    fn test_image_to_jpeg_converts_png() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("cover.png");
        RgbImage::from_pixel(8, 8, Rgb([200, 10, 10])).save(&png).unwrap();

        let jpeg = image_to_jpeg(&png).unwrap();
        // JPEG SOI marker
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_image_to_jpeg_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("cover.png");
        std::fs::write(&bogus, b"not an image").unwrap();
        assert!(image_to_jpeg(&bogus).is_err());
    }
}
