//! Wrap arbitrary bytes into a minimal one-page PDF.

use image::{DynamicImage, ImageFormat};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, info, warn};

use crate::{finish_page_tree, serialize, DocumentError, NormalizedDocument, Outcome, PDF_VERSION};

pub const PLACEHOLDER_TEXT: &str = "This file could not be parsed. Uploaded raw content.";

/// Width and height of the placeholder page, in points.
pub const PLACEHOLDER_PAGE_SIZE: (i64, i64) = (600, 400);

const PLACEHOLDER_TEXT_ORIGIN: (i64, i64) = (50, 200);
const PLACEHOLDER_FONT_SIZE: i64 = 14;
const PLACEHOLDER_GRAY: f32 = 0.2;

const FONT_NAME: &[u8] = b"F1";
const IMAGE_NAME: &[u8] = b"Im0";

/// Tried in order; the first that decodes wins.
const EMBEDDABLE_FORMATS: [ImageFormat; 2] = [ImageFormat::Jpeg, ImageFormat::Png];

/// Wrap `buf` into a new single-page PDF.
///
/// If even that fails the original bytes are returned with
/// [`Outcome::Unchanged`].
pub fn wrap_as_pdf(buf: &[u8]) -> NormalizedDocument {
    try_wrap_as_pdf(buf).unwrap_or_else(|err| keep_original(buf, err))
}

fn keep_original(buf: &[u8], err: DocumentError) -> NormalizedDocument {
    warn!(error = %err, "failed to wrap buffer as PDF, keeping original bytes");
    NormalizedDocument {
        bytes: buf.to_vec(),
        outcome: Outcome::Unchanged,
    }
}

pub fn try_wrap_as_pdf(buf: &[u8]) -> Result<NormalizedDocument, DocumentError> {
    let mut doc = Document::with_version(PDF_VERSION);
    let pages_id = doc.new_object_id();

    let (page_id, outcome) = match decode_image(buf) {
        Some(image) => {
            let (page_id, width, height) = add_image_page(&mut doc, pages_id, image)?;
            info!(width, height, "wrapped raw image buffer into a new PDF");
            (page_id, Outcome::WrappedImage { width, height })
        }
        None => {
            let page_id = add_placeholder_page(&mut doc, pages_id)?;
            info!(bytes = buf.len(), "could not embed image, created fallback text PDF");
            (page_id, Outcome::Placeholder)
        }
    };

    finish_page_tree(&mut doc, pages_id, vec![page_id]);
    let bytes = serialize(&mut doc)?;

    Ok(NormalizedDocument { bytes, outcome })
}

fn decode_image(buf: &[u8]) -> Option<DynamicImage> {
    EMBEDDABLE_FORMATS.iter().find_map(|format| {
        match image::load_from_memory_with_format(buf, *format) {
            Ok(image) => Some(image),
            Err(err) => {
                debug!(?format, error = %err, "buffer is not an embeddable image");
                None
            }
        }
    })
}

/// Adds a page sized to the image with the image filling it.
fn add_image_page(
    doc: &mut Document,
    pages_id: ObjectId,
    image: DynamicImage,
) -> Result<(ObjectId, u32, u32), DocumentError> {
    let rgb = image.into_rgb8();
    let (width, height) = rgb.dimensions();
    let (w, h) = (i64::from(width), i64::from(height));

    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => w,
            "Height" => h,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        rgb.into_raw(),
    ));

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Integer(w),
                    0.into(),
                    0.into(),
                    Object::Integer(h),
                    0.into(),
                    0.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(IMAGE_NAME.to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = add_content(doc, content)?;

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), Object::Integer(w), Object::Integer(h)],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! { IMAGE_NAME.to_vec() => image_id },
        },
    });

    Ok((page_id, width, height))
}

/// Adds a 600x400 page with one line of gray Helvetica text.
fn add_placeholder_page(doc: &mut Document, pages_id: ObjectId) -> Result<ObjectId, DocumentError> {
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let (x, y) = PLACEHOLDER_TEXT_ORIGIN;
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new(
                "rg",
                vec![
                    Object::from(PLACEHOLDER_GRAY),
                    Object::from(PLACEHOLDER_GRAY),
                    Object::from(PLACEHOLDER_GRAY),
                ],
            ),
            Operation::new(
                "Tf",
                vec![Object::Name(FONT_NAME.to_vec()), Object::Integer(PLACEHOLDER_FONT_SIZE)],
            ),
            Operation::new("Td", vec![Object::Integer(x), Object::Integer(y)]),
            Operation::new("Tj", vec![Object::string_literal(PLACEHOLDER_TEXT)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = add_content(doc, content)?;

    let (width, height) = PLACEHOLDER_PAGE_SIZE;
    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), Object::Integer(width), Object::Integer(height)],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "Font" => dictionary! { FONT_NAME.to_vec() => font_id },
        },
    }))
}

fn add_content(doc: &mut Document, content: Content) -> Result<ObjectId, DocumentError> {
    let encoded = content
        .encode()
        .map_err(|e| DocumentError::Encode(e.to_string()))?;
    Ok(doc.add_object(Stream::new(lopdf::Dictionary::new(), encoded)))
}
