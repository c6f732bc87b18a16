//! Integration tests for pdf-core
//!
//! These tests build small PDFs in memory with lopdf and read them back.

use layout::{Axis, Tolerances};
use lopdf::dictionary;
use pdf_core::{extract_layout_from_pdf, PdfDocument, PdfError};
use pretty_assertions::assert_eq;

/// Create a PDF whose pages inherit their MediaBox from the Pages node
///
/// Each entry of `contents` becomes one page.
fn create_test_pdf(media_box: [f32; 4], contents: &[&str]) -> Vec<u8> {
    let mut doc = lopdf::Document::new();
    let pages_id = doc.new_object_id();

    let mut page_ids: Vec<lopdf::Object> = Vec::new();
    for content in contents {
        let contents_id = doc.add_object(lopdf::Stream::new(
            dictionary! {},
            content.as_bytes().to_vec(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Resources" => dictionary! {},
            "Contents" => contents_id,
        });
        page_ids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        lopdf::Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => contents.len() as i64,
            "Kids" => page_ids,
            "MediaBox" => media_box.iter().map(|v| lopdf::Object::from(*v)).collect::<Vec<_>>(),
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// A two-page spread: a boxed table on the left, a single rule on the right
const SPREAD: &str = "\
q 1.5 w 50 500 300 200 re S Q
0.5 w [2 1] 0 d 50 600 m 350 600 l S
[] 0 d 0.5 0.5 0.5 RG 450 650 m 750 650 l S
10 10 m 40 40 l S
";

#[test]
fn test_open_invalid_pdf() {
    let result = PdfDocument::open_from_bytes(b"not a pdf");
    assert!(matches!(result, Err(PdfError::OpenError(_))));
}

#[test]
fn test_page_count_and_inherited_media_box() {
    let bytes = create_test_pdf([0.0, 0.0, 800.0, 800.0], &["", ""]);
    let doc = PdfDocument::open_from_bytes(&bytes).unwrap();

    assert_eq!(doc.page_count(), 2);
    assert_eq!(doc.media_box(2).unwrap(), [0.0, 0.0, 800.0, 800.0]);
}

#[test]
fn test_invalid_page() {
    let bytes = create_test_pdf([0.0, 0.0, 800.0, 800.0], &[""]);
    let doc = PdfDocument::open_from_bytes(&bytes).unwrap();

    assert!(matches!(doc.drawing(0), Err(PdfError::InvalidPage(0, 1))));
    assert!(matches!(doc.drawing(2), Err(PdfError::InvalidPage(2, 1))));
}

#[test]
fn test_read_page_drawing() {
    let bytes = create_test_pdf([0.0, 0.0, 800.0, 800.0], &[SPREAD]);
    let doc = PdfDocument::open_from_bytes(&bytes).unwrap();

    let drawing = doc.drawing(1).unwrap();
    assert_eq!((drawing.width, drawing.height), (800.0, 800.0));
    // rectangle, two rules, one diagonal
    assert_eq!(drawing.ops.len(), 4);
    assert_eq!(drawing.ops[0].style().width, Some(1.5));
}

#[test]
fn test_extract_layout_from_pdf() {
    let bytes = create_test_pdf([0.0, 0.0, 800.0, 800.0], &[SPREAD]);
    let doc = PdfDocument::open_from_bytes(&bytes).unwrap();

    let layout = extract_layout_from_pdf(&doc, 1, &Tolerances::default()).unwrap();
    assert_eq!(layout.source_page_size_pt, [800.0, 800.0]);
    assert_eq!(layout.split_x_pt, 400.0);

    // box edges plus the dashed row rule
    assert_eq!(layout.page1_lines.len(), 5);
    let tol = Tolerances::default().orientation_tolerance_pt;
    let rows: Vec<f64> = layout
        .page1_lines
        .iter()
        .filter(|l| l.axis(tol) == Some(Axis::Horizontal))
        .map(|l| l.y0)
        .collect();
    assert_eq!(rows, vec![500.0, 600.0, 700.0]);

    let dashed = layout.page1_lines.iter().find(|l| l.y0 == 600.0).unwrap();
    assert_eq!(dashed.style.dash_pattern, vec![2.0, 1.0]);
    assert_eq!(dashed.style.width, 0.5);

    assert_eq!(layout.page2_lines.len(), 1);
    let rule = &layout.page2_lines[0];
    assert_eq!((rule.x0, rule.y0, rule.x1, rule.y1), (50.0, 650.0, 350.0, 650.0));
    assert_eq!(rule.style.color.to_array(), [0.5, 0.5, 0.5]);
    assert!(rule.style.dash_pattern.is_empty());
}

/// A one-page 800x800 PDF whose rule lines live in a form XObject
///
/// The `/XObject` resources sit on the Pages node and are inherited.
fn create_form_pdf() -> Vec<u8> {
    let mut doc = lopdf::Document::new();
    let pages_id = doc.new_object_id();

    let form_id = doc.add_object(lopdf::Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => vec![
                lopdf::Object::Integer(0),
                lopdf::Object::Integer(0),
                lopdf::Object::Integer(300),
                lopdf::Object::Integer(100),
            ],
            "Matrix" => vec![
                lopdf::Object::Integer(1),
                lopdf::Object::Integer(0),
                lopdf::Object::Integer(0),
                lopdf::Object::Integer(1),
                lopdf::Object::Integer(0),
                lopdf::Object::Integer(100),
            ],
        },
        b"0.5 w 0 0 m 300 0 l S 0 50 m 300 50 l S".to_vec(),
    ));
    let contents_id = doc.add_object(lopdf::Stream::new(
        dictionary! {},
        b"q 1 0 0 1 50 400 cm /Fm1 Do Q 450 650 m 750 650 l S".to_vec(),
    ));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => contents_id,
    });

    doc.objects.insert(
        pages_id,
        lopdf::Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => 1i64,
            "Kids" => vec![lopdf::Object::Reference(page_id)],
            "MediaBox" => [0.0f32, 0.0, 800.0, 800.0]
                .iter()
                .map(|v| lopdf::Object::from(*v))
                .collect::<Vec<_>>(),
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Fm1" => form_id },
            },
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

#[test]
fn test_form_xobject_lines_are_extracted() {
    let doc = PdfDocument::open_from_bytes(&create_form_pdf()).unwrap();

    let layout = extract_layout_from_pdf(&doc, 1, &Tolerances::default()).unwrap();
    let rows: Vec<(f64, f64, f64, f64, f64)> = layout
        .page1_lines
        .iter()
        .map(|l| (l.x0, l.y0, l.x1, l.y1, l.style.width))
        .collect();
    assert_eq!(
        rows,
        vec![
            (50.0, 500.0, 350.0, 500.0, 0.5),
            (50.0, 550.0, 350.0, 550.0, 0.5),
        ]
    );

    // the page-level rule after the form keeps the page's own width
    assert_eq!(layout.page2_lines.len(), 1);
    assert_eq!(layout.page2_lines[0].style.width, 1.0);
}

#[test]
fn test_empty_page_yields_empty_layout() {
    let bytes = create_test_pdf([0.0, 0.0, 595.28, 841.89], &[""]);
    let doc = PdfDocument::open_from_bytes(&bytes).unwrap();

    let layout = extract_layout_from_pdf(&doc, 1, &Tolerances::default()).unwrap();
    assert!(layout.page1_lines.is_empty());
    assert!(layout.page2_lines.is_empty());
    assert_eq!(layout.source_page_size_pt, [595.28, 841.89]);
    assert_eq!(layout.split_x_pt, 297.64);
}
