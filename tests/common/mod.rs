//! PDF fixtures shared by the integration tests.
#![allow(dead_code)]

use lopdf::{dictionary, Document, Object, Stream};
use std::path::{Path, PathBuf};

/// ToUnicode CMap mapping codes 0x01 and 0x02 to "H" and "i".
pub const HI_CMAP: &[u8] = b"/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
1 begincodespacerange
<00> <FF>
endcodespacerange
2 beginbfchar
<01> <0048>
<02> <0069>
endbfchar
endcmap
CMapName currentdict /CMap defineresource pop
end
end";

/// Content stream showing `text` at the top of the page.
pub fn line(text: &str) -> Vec<u8> {
    format!("BT /F1 12 Tf 72 720 Td ({}) Tj ET", text).into_bytes()
}

/// `count` pages whose only text is "Page N".
pub fn numbered_pages(count: usize) -> Vec<Vec<u8>> {
    (1..=count).map(|n| line(&format!("Page {}", n))).collect()
}

/// A PDF with one page per content stream. `/F1` is Helvetica; `/F2` is a
/// font whose codes only make sense through [`HI_CMAP`]. `/F3` (simple) and
/// `/F4` (Type0, Identity-H) carry width tables with codes far beyond
/// 0xFFFF.
pub fn pdf_bytes(pages: &[Vec<u8>]) -> Vec<u8> {
    build(pages, None)
}

/// Like [`pdf_bytes`], but page `broken` (0-based) refers to a content
/// stream that does not exist.
pub fn pdf_bytes_with_broken_page(pages: &[Vec<u8>], broken: usize) -> Vec<u8> {
    build(pages, Some(broken))
}

fn build(pages: &[Vec<u8>], broken: Option<usize>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let helvetica = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let cmap = doc.add_object(Stream::new(dictionary! {}, HI_CMAP.to_vec()));
    let mapped = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "ABCDEF+Custom",
        "ToUnicode" => cmap,
    });
    let overflowing_simple = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "TrueType",
        "BaseFont" => "Overflow",
        "FirstChar" => 4294967295i64,
        "LastChar" => 4294967296i64,
        "Widths" => vec![Object::Integer(500), Object::Integer(500)],
    });
    let cid_font = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType2",
        "BaseFont" => "Wide",
        "W" => vec![
            Object::Integer(4294967295),
            Object::Array(vec![Object::Integer(500), Object::Integer(600)]),
            Object::Integer(0),
            Object::Integer(4000000000),
            Object::Integer(500),
        ],
    });
    let overflowing_cid = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => "Wide",
        "Encoding" => "Identity-H",
        "DescendantFonts" => vec![Object::Reference(cid_font)],
    });
    let resources = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => helvetica,
            "F2" => mapped,
            "F3" => overflowing_simple,
            "F4" => overflowing_cid,
        },
    });

    let kids: Vec<Object> = pages
        .iter()
        .enumerate()
        .map(|(index, content)| {
            let content_id = if Some(index) == broken {
                (9999, 0)
            } else {
                doc.add_object(Stream::new(dictionary! {}, content.clone()))
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
            "Resources" => resources,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("serialize fixture");
    bytes
}

/// Write [`pdf_bytes`] to `dir/name`.
pub fn write_pdf(dir: &Path, name: &str, pages: &[Vec<u8>]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, pdf_bytes(pages)).expect("write fixture");
    path
}

/// Route library logs to the test harness.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
