//! Fixture builders shared by unit tests and the CLI's integration tests.
//!
//! Compiled for this crate's tests and, for other crates, behind the `test-util` feature.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

/// A minimal PDF with one page per entry; an empty entry yields a page with no text.
pub fn pdf_with_pages(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let mut operations = Vec::new();
        if !text.is_empty() {
            operations = vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ];
        }
        let content = Content { operations };
        let content_id =
            doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// One search-result item shaped like the YouTube Data API v3 `search.list` response.
pub fn item(kind: &str, id: &str, title: &str) -> serde_json::Value {
    let id_field = match kind {
        "youtube#video" => "videoId",
        "youtube#channel" => "channelId",
        _ => "playlistId",
    };
    serde_json::json!({
        "kind": "youtube#searchResult",
        "id": { "kind": kind, id_field: id },
        "snippet": {
            "title": title,
            "thumbnails": {
                "default": { "url": format!("https://i.ytimg.com/vi/{id}/default.jpg") },
                "high": { "url": format!("https://i.ytimg.com/vi/{id}/hqdefault.jpg") }
            }
        }
    })
}
