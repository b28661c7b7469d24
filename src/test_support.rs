//! In-memory PDF fixtures for unit tests.

use crate::document::DocumentHandle;
use lopdf::{dictionary, Document, Object, Stream};

/// Build a PDF whose pages have the given content streams. Every page has
/// a US Letter MediaBox and `/F1` bound to Helvetica.
pub(crate) fn pdf_bytes(pages: &[&[u8]]) -> Vec<u8> {
    build(pages, None)
}

/// Like [`pdf_bytes`], but page `broken` points its /Contents at an object
/// that does not exist.
pub(crate) fn pdf_bytes_with_missing_contents(pages: &[&[u8]], broken: usize) -> Vec<u8> {
    build(pages, Some(broken))
}

fn build(pages: &[&[u8]], broken: Option<usize>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let kids: Vec<Object> = pages
        .iter()
        .enumerate()
        .map(|(index, content)| {
            let content_id = if Some(index) == broken {
                (9999, 0)
            } else {
                doc.add_object(Stream::new(dictionary! {}, content.to_vec()))
            };
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            })
            .into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => kids.len() as i64,
            "Kids" => kids,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Open [`pdf_bytes`] as a handle named `memory.pdf`.
pub(crate) fn handle(pages: &[&[u8]]) -> DocumentHandle {
    DocumentHandle::from_bytes("memory.pdf", &pdf_bytes(pages)).unwrap()
}
