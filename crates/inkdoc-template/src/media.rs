//! Media part allocation for embedded images.
//!
//! Each embedded image needs a part under `word/media/`, a relationship in
//! the document's rels part, and a content-type default for its extension.
//! The allocator hands out names and ids past whatever the template already
//! uses.

use std::io::Cursor;
use std::path::Path;

use image::{ImageFormat, ImageReader};
use inkdoc_ooxml::package::{CONTENT_TYPES_PART, DOCUMENT_RELS_PART, DocxPackage};
use inkdoc_ooxml::xml::XmlNode;

use crate::error::TemplateError;

/// Display width of embedded figures: 15 cm in EMU.
pub const IMAGE_WIDTH_EMU: u64 = 5_400_000;

const IMAGE_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
const RELS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

/// An image added to the package, ready to be referenced from a drawing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedImage {
    /// Relationship id (`rIdN`) pointing at the media part.
    pub rel_id: String,
    /// File name of the media part, e.g. `image1.png`.
    pub file_name: String,
    /// Unique drawing id for `wp:docPr` and `pic:cNvPr`.
    pub drawing_id: u32,
    /// Display width in EMU.
    pub width_emu: u64,
    /// Display height in EMU, scaled to keep the aspect ratio.
    pub height_emu: u64,
}

/// Allocates media parts, relationships, and drawing ids on a package.
pub struct MediaAllocator<'a> {
    package: &'a mut DocxPackage,
    next_image: usize,
    next_rel: usize,
    next_drawing: u32,
}

impl<'a> MediaAllocator<'a> {
    /// Prepare an allocator over the package.
    ///
    /// `first_drawing_id` must be greater than every drawing id already in
    /// the document part the images will be spliced into.
    ///
    /// # Errors
    ///
    /// Returns an error if the document rels part exists but cannot be
    /// parsed.
    pub fn new(
        package: &'a mut DocxPackage,
        first_drawing_id: u32,
    ) -> Result<Self, TemplateError> {
        let next_image = 1 + package
            .part_names()
            .filter_map(media_image_index)
            .max()
            .unwrap_or(0);
        let next_rel = next_relationship_number(package)?;
        Ok(Self {
            package,
            next_image,
            next_rel,
            next_drawing: first_drawing_id,
        })
    }

    /// Read an image file and add it to the package.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, its format is not
    /// recognized, or its dimensions cannot be decoded.
    pub fn allocate(&mut self, path: &Path) -> Result<EmbeddedImage, TemplateError> {
        let bytes = std::fs::read(path).map_err(|err| TemplateError::Image {
            path: path.to_path_buf(),
            source: image::ImageError::IoError(err),
        })?;
        let reader = ImageReader::new(Cursor::new(&bytes))
            .with_guessed_format()
            .map_err(|err| TemplateError::Image {
                path: path.to_path_buf(),
                source: image::ImageError::IoError(err),
            })?;
        let Some(format) = reader.format() else {
            return Err(TemplateError::UnknownImageFormat(path.to_path_buf()));
        };
        let Some((extension, content_type)) = format_names(format) else {
            return Err(TemplateError::UnknownImageFormat(path.to_path_buf()));
        };
        let (width, height) = reader
            .into_dimensions()
            .map_err(|source| TemplateError::Image {
                path: path.to_path_buf(),
                source,
            })?;
        if width == 0 {
            return Err(TemplateError::EmptyImage(path.to_path_buf()));
        }

        let file_name = format!("image{}.{extension}", self.next_image);
        self.next_image += 1;
        self.package
            .set_part(&format!("word/media/{file_name}"), bytes);
        self.ensure_content_type(extension, content_type)?;

        let rel_id = format!("rId{}", self.next_rel);
        self.next_rel += 1;
        self.add_relationship(&rel_id, &format!("media/{file_name}"))?;

        let drawing_id = self.next_drawing;
        self.next_drawing += 1;

        let height_emu = IMAGE_WIDTH_EMU * u64::from(height) / u64::from(width);
        Ok(EmbeddedImage {
            rel_id,
            file_name,
            drawing_id,
            width_emu: IMAGE_WIDTH_EMU,
            height_emu,
        })
    }

    /// Add a content-type default for the extension if none exists.
    fn ensure_content_type(
        &mut self,
        extension: &str,
        content_type: &str,
    ) -> Result<(), TemplateError> {
        let mut root = if self.package.has_part(CONTENT_TYPES_PART) {
            self.package.xml_part(CONTENT_TYPES_PART)?
        } else {
            XmlNode::new("Types").with_attr("xmlns", CONTENT_TYPES_NS)
        };
        let covered = root.children.iter().any(|child| {
            child.local() == "Default"
                && child
                    .attr("Extension")
                    .is_some_and(|e| e.eq_ignore_ascii_case(extension))
        });
        if !covered {
            root.children.push(
                XmlNode::new("Default")
                    .with_attr("Extension", extension)
                    .with_attr("ContentType", content_type),
            );
            self.package.set_xml_part(CONTENT_TYPES_PART, &root);
        }
        Ok(())
    }

    /// Append an image relationship to the document rels part.
    fn add_relationship(&mut self, rel_id: &str, target: &str) -> Result<(), TemplateError> {
        let mut root = if self.package.has_part(DOCUMENT_RELS_PART) {
            self.package.xml_part(DOCUMENT_RELS_PART)?
        } else {
            XmlNode::new("Relationships").with_attr("xmlns", RELS_NS)
        };
        root.children.push(
            XmlNode::new("Relationship")
                .with_attr("Id", rel_id)
                .with_attr("Type", IMAGE_REL_TYPE)
                .with_attr("Target", target),
        );
        self.package.set_xml_part(DOCUMENT_RELS_PART, &root);
        Ok(())
    }
}

/// Extension and content type for the image formats a figure may use.
fn format_names(format: ImageFormat) -> Option<(&'static str, &'static str)> {
    match format {
        ImageFormat::Png => Some(("png", "image/png")),
        ImageFormat::Jpeg => Some(("jpeg", "image/jpeg")),
        ImageFormat::Gif => Some(("gif", "image/gif")),
        ImageFormat::WebP => Some(("webp", "image/webp")),
        ImageFormat::Bmp => Some(("bmp", "image/bmp")),
        _ => None,
    }
}

/// Numeric index of a `word/media/imageN.*` part name.
fn media_image_index(name: &str) -> Option<usize> {
    let rest = name.strip_prefix("word/media/image")?;
    rest.split('.').next()?.parse().ok()
}

/// One past the highest `rIdN` in the document rels part.
fn next_relationship_number(package: &DocxPackage) -> Result<usize, TemplateError> {
    if !package.has_part(DOCUMENT_RELS_PART) {
        return Ok(1);
    }
    let root = package.xml_part(DOCUMENT_RELS_PART)?;
    let max = root
        .children
        .iter()
        .filter(|child| child.local() == "Relationship")
        .filter_map(|child| child.attr("Id"))
        .filter_map(|id| id.strip_prefix("rId"))
        .filter_map(|digits| digits.parse::<usize>().ok())
        .max()
        .unwrap_or(0);
    Ok(max + 1)
}

/// Highest drawing id (`docPr`/`cNvPr`) in a document tree.
pub(crate) fn max_drawing_id(node: &XmlNode) -> u32 {
    let own = if matches!(node.local(), "docPr" | "cNvPr") {
        node.attr_local("id").and_then(|id| id.parse().ok())
    } else {
        None
    };
    node.children
        .iter()
        .map(max_drawing_id)
        .chain(own)
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::new(width, height);
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn package_with_rels(rels_xml: &str) -> DocxPackage {
        let mut package = DocxPackage::default();
        package.set_part(
            CONTENT_TYPES_PART,
            br#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#
                .to_vec(),
        );
        package.set_part(DOCUMENT_RELS_PART, rels_xml.as_bytes().to_vec());
        package
    }

    #[test]
    fn test_allocate_adds_part_rel_and_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = dir.path().join("screen.png");
        std::fs::write(&image_path, png_bytes(4, 2)).unwrap();

        let mut package = package_with_rels(r"<Relationships/>");
        let mut media = MediaAllocator::new(&mut package, 1).unwrap();
        let embedded = media.allocate(&image_path).unwrap();

        assert_eq!(embedded.rel_id, "rId1");
        assert_eq!(embedded.file_name, "image1.png");
        assert_eq!(embedded.width_emu, IMAGE_WIDTH_EMU);
        assert_eq!(embedded.height_emu, IMAGE_WIDTH_EMU / 2);
        assert!(package.has_part("word/media/image1.png"));

        let rels = package.xml_part(DOCUMENT_RELS_PART).unwrap();
        assert_eq!(rels.children[0].attr("Target"), Some("media/image1.png"));

        let types = package.xml_part(CONTENT_TYPES_PART).unwrap();
        assert!(
            types
                .children
                .iter()
                .any(|c| c.attr("Extension") == Some("png"))
        );
    }

    #[test]
    fn test_allocate_numbers_past_existing() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = dir.path().join("screen.png");
        std::fs::write(&image_path, png_bytes(2, 2)).unwrap();

        let mut package = package_with_rels(
            r#"<Relationships><Relationship Id="rId7" Type="t" Target="styles.xml"/></Relationships>"#,
        );
        package.set_part("word/media/image3.png", vec![1, 2, 3]);

        let mut media = MediaAllocator::new(&mut package, 10).unwrap();
        let embedded = media.allocate(&image_path).unwrap();

        assert_eq!(embedded.file_name, "image4.png");
        assert_eq!(embedded.rel_id, "rId8");
        assert_eq!(embedded.drawing_id, 10);
    }

    #[test]
    fn test_allocate_sequential_ids() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = dir.path().join("screen.png");
        std::fs::write(&image_path, png_bytes(2, 2)).unwrap();

        let mut package = package_with_rels(r"<Relationships/>");
        let mut media = MediaAllocator::new(&mut package, 5).unwrap();
        let first = media.allocate(&image_path).unwrap();
        let second = media.allocate(&image_path).unwrap();

        assert_eq!(first.file_name, "image1.png");
        assert_eq!(second.file_name, "image2.png");
        assert_eq!(second.rel_id, "rId2");
        assert_eq!(second.drawing_id, 6);
    }

    #[test]
    fn test_allocate_creates_missing_rels_part() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = dir.path().join("screen.png");
        std::fs::write(&image_path, png_bytes(2, 2)).unwrap();

        let mut package = DocxPackage::default();
        let mut media = MediaAllocator::new(&mut package, 1).unwrap();
        media.allocate(&image_path).unwrap();

        assert!(package.has_part(DOCUMENT_RELS_PART));
        assert!(package.has_part(CONTENT_TYPES_PART));
    }

    #[test]
    fn test_allocate_unreadable_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut package = DocxPackage::default();
        let mut media = MediaAllocator::new(&mut package, 1).unwrap();

        let err = media.allocate(&dir.path().join("absent.png")).unwrap_err();
        assert!(matches!(err, TemplateError::Image { .. }));
    }

    #[test]
    fn test_allocate_unknown_format_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("note.txt");
        std::fs::write(&bogus, b"not an image").unwrap();

        let mut package = DocxPackage::default();
        let mut media = MediaAllocator::new(&mut package, 1).unwrap();

        let err = media.allocate(&bogus).unwrap_err();
        assert!(matches!(err, TemplateError::UnknownImageFormat(_)));
    }

    #[test]
    fn test_content_type_not_duplicated() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = dir.path().join("screen.png");
        std::fs::write(&image_path, png_bytes(2, 2)).unwrap();

        let mut package = DocxPackage::default();
        package.set_part(
            CONTENT_TYPES_PART,
            br#"<Types><Default Extension="png" ContentType="image/png"/></Types>"#.to_vec(),
        );
        let mut media = MediaAllocator::new(&mut package, 1).unwrap();
        media.allocate(&image_path).unwrap();

        let types = package.xml_part(CONTENT_TYPES_PART).unwrap();
        let png_defaults = types
            .children
            .iter()
            .filter(|c| c.attr("Extension") == Some("png"))
            .count();
        assert_eq!(png_defaults, 1);
    }

    #[test]
    fn test_max_drawing_id() {
        let root = inkdoc_ooxml::xml::parse_document(concat!(
            r#"<w:document><w:body><w:p><w:r><w:drawing>"#,
            r#"<wp:inline><wp:docPr id="3" name="a"/></wp:inline>"#,
            r#"</w:drawing></w:r></w:p></w:body></w:document>"#,
        ))
        .unwrap();
        assert_eq!(max_drawing_id(&root), 3);

        let empty = XmlNode::new("w:document");
        assert_eq!(max_drawing_id(&empty), 0);
    }
}
