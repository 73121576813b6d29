//! End-to-end render tests: request in, parsed PDF out.
//!
//! Photos are written into a temporary public directory so each test
//! controls exactly which assets exist.

use image::{Rgb, RgbImage};
use memorial_pdf::{
    generate, generate_to_file, render_document, AssetError, DocumentRequest, ImageOutcome,
    MemorialEntry, PageKind, RenderConfig, Timestamp,
};
use serde_json::json;
use std::path::Path;
use tempfile::TempDir;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn public_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("uploads")).unwrap();
    dir
}

fn write_photo(root: &Path, name: &str, w: u32, h: u32) {
    RgbImage::from_pixel(w, h, Rgb([180, 120, 90]))
        .save(root.join("uploads").join(name))
        .unwrap();
}

fn config(root: &Path) -> RenderConfig {
    RenderConfig::builder()
        .assets_root(root)
        .compress(false)
        .utc_offset(chrono::FixedOffset::east_opt(0).unwrap())
        .build()
        .unwrap()
}

fn page_count(pdf: &[u8]) -> usize {
    lopdf::Document::load_mem(pdf)
        .expect("output must parse as PDF")
        .get_pages()
        .len()
}

fn contains(haystack: &[u8], needle: &str) -> bool {
    haystack
        .windows(needle.len())
        .any(|w| w == needle.as_bytes())
}

fn entry(file: Option<&str>, title: &str, message: &str) -> MemorialEntry {
    MemorialEntry {
        file: file.map(str::to_string),
        title: Some(title.to_string()),
        message: Some(message.to_string()),
        created_at: None,
    }
}

// ── Structure ────────────────────────────────────────────────────────────────

#[test]
fn page_count_is_entries_plus_two() {
    let dir = public_dir();
    for n in [0usize, 1, 4] {
        let request = DocumentRequest::new(vec![MemorialEntry::default(); n]);
        let out = render_document(&request, &config(dir.path())).unwrap();
        assert_eq!(page_count(&out.pdf), n + 2, "{n} entries");
        assert_eq!(out.pages.first().unwrap().kind, PageKind::Cover);
        assert_eq!(out.pages.last().unwrap().kind, PageKind::Closing);
    }
}

#[test]
fn compressed_output_is_still_a_valid_pdf() {
    let dir = public_dir();
    let config = RenderConfig::builder()
        .assets_root(dir.path())
        .build()
        .unwrap();
    let request = DocumentRequest::new(vec![entry(None, "Uno", "Hola"); 2]);
    let out = render_document(&request, &config).unwrap();
    assert_eq!(page_count(&out.pdf), 4);
}

#[test]
fn entry_pages_carry_footers_and_text() {
    let dir = public_dir();
    let request = DocumentRequest::new(vec![
        entry(None, "Primera", "Gracias por todo"),
        entry(None, "Segunda", "Te recordamos"),
    ])
    .with_title("Familia Torres");
    let out = render_document(&request, &config(dir.path())).unwrap();

    assert!(contains(&out.pdf, "(Familia Torres) Tj"));
    assert!(contains(&out.pdf, "(1 de 2) Tj"));
    assert!(contains(&out.pdf, "(2 de 2) Tj"));
    assert!(contains(&out.pdf, "(Primera) Tj"));
    assert_eq!(out.pages[1].footer.as_deref(), Some("1 de 2"));
    assert_eq!(
        out.pages[2].kind,
        PageKind::Entry { index: 2, total: 2 }
    );
}

#[test]
fn entry_date_is_printed_in_spanish() {
    let dir = public_dir();
    let mut e = entry(None, "Cumple", "Feliz");
    e.created_at = Timestamp::parse("2024-01-15T10:30:00Z");
    let out = render_document(&DocumentRequest::new(vec![e]), &config(dir.path())).unwrap();
    assert!(contains(&out.pdf, "(15 de enero de 2024, 10:30) Tj"));
}

// ── Photos ───────────────────────────────────────────────────────────────────

#[test]
fn existing_photo_is_embedded() {
    let dir = public_dir();
    write_photo(dir.path(), "playa.png", 40, 30);
    let request = DocumentRequest::new(vec![entry(Some("/uploads/playa.png"), "Playa", "Sol")]);
    let out = render_document(&request, &config(dir.path())).unwrap();

    assert_eq!(
        out.pages[1].image,
        Some(ImageOutcome::Embedded {
            width: 40,
            height: 30
        })
    );
    assert_eq!(out.stats.images_embedded, 1);
    assert_eq!(out.stats.placeholders, 0);
    assert!(contains(&out.pdf, "/Subtype /Image"));
}

#[test]
fn large_photo_is_downscaled_before_embedding() {
    let dir = public_dir();
    write_photo(dir.path(), "grande.png", 400, 100);
    let config = RenderConfig::builder()
        .assets_root(dir.path())
        .max_image_pixels(100)
        .build()
        .unwrap();
    let request = DocumentRequest::new(vec![entry(Some("uploads/grande.png"), "G", "M")]);
    let out = render_document(&request, &config).unwrap();
    assert_eq!(
        out.pages[1].image,
        Some(ImageOutcome::Embedded {
            width: 100,
            height: 25
        })
    );
}

#[test]
fn missing_photo_falls_back_to_placeholder() {
    let dir = public_dir();
    let request = DocumentRequest::new(vec![entry(Some("/uploads/nope.jpg"), "Nada", "Aun asi")]);
    let out = render_document(&request, &config(dir.path())).unwrap();

    assert_eq!(out.pages[1].image, Some(ImageOutcome::Fallback));
    assert!(matches!(
        out.pages[1].asset_error,
        Some(AssetError::NotFound { .. })
    ));
    assert_eq!(page_count(&out.pdf), 3);
}

#[test]
fn corrupt_photo_falls_back_to_placeholder() {
    let dir = public_dir();
    std::fs::write(dir.path().join("uploads/roto.jpg"), b"not really a jpeg").unwrap();
    let request = DocumentRequest::new(vec![entry(Some("/uploads/roto.jpg"), "Roto", "x")]);
    let out = render_document(&request, &config(dir.path())).unwrap();
    assert!(matches!(
        out.pages[1].asset_error,
        Some(AssetError::Undecodable { .. })
    ));
}

#[test]
fn traversal_outside_public_dir_is_refused() {
    let dir = public_dir();
    let request = DocumentRequest::new(vec![entry(Some("../../etc/passwd"), "x", "y")]);
    let out = render_document(&request, &config(dir.path())).unwrap();
    assert!(matches!(
        out.pages[1].asset_error,
        Some(AssetError::InvalidPath { .. })
    ));
}

#[test]
fn one_bad_photo_does_not_affect_its_neighbours() {
    let dir = public_dir();
    write_photo(dir.path(), "a.png", 20, 20);
    write_photo(dir.path(), "c.png", 20, 20);
    let request = DocumentRequest::new(vec![
        entry(Some("/uploads/a.png"), "A", "1"),
        entry(Some("/uploads/b.png"), "B", "2"),
        entry(Some("/uploads/c.png"), "C", "3"),
    ]);
    let out = render_document(&request, &config(dir.path())).unwrap();
    assert_eq!(out.stats.images_embedded, 2);
    assert_eq!(out.stats.placeholders, 1);
    assert_eq!(out.pages[2].image, Some(ImageOutcome::Fallback));
}

// ── Messages ─────────────────────────────────────────────────────────────────

#[test]
fn long_message_is_clamped_and_truncated() {
    let dir = public_dir();
    let long = "Recuerdo cada tarde que pasamos juntos en el jardin. ".repeat(80);
    let request = DocumentRequest::new(vec![entry(None, "Largo", &long)]);
    let out = render_document(&request, &config(dir.path())).unwrap();

    let layout = out.pages[1].message.expect("message layout");
    assert!(layout.truncated);
    assert!(layout.natural_height > layout.panel_height);
    assert_eq!(out.stats.truncated_messages, 1);
}

#[test]
fn short_message_keeps_its_natural_height() {
    let dir = public_dir();
    let request = DocumentRequest::new(vec![entry(None, "Corto", "Te queremos.")]);
    let out = render_document(&request, &config(dir.path())).unwrap();

    let layout = out.pages[1].message.expect("message layout");
    assert!(!layout.truncated);
    assert_eq!(layout.panel_height, layout.natural_height);
    assert_eq!(layout.lines, 1);
}

// ── JSON in, file out ────────────────────────────────────────────────────────

#[test]
fn request_json_with_nulls_and_empty_strings_renders() {
    let dir = public_dir();
    let body = json!({
        "data": [
            { "file": "", "title": null, "message": "", "createdAt": "not a date" },
            { "title": "🌸🌸", "message": "Hola 👋 mundo", "createdAt": 1705314600000i64 }
        ]
    });
    let request = DocumentRequest::from_json(body).unwrap();
    let out = render_document(&request, &config(dir.path())).unwrap();

    assert_eq!(page_count(&out.pdf), 4);
    assert_eq!(out.pages[1].image, Some(ImageOutcome::Absent));
    assert!(out.pages[1].message.is_none());
    assert!(contains(&out.pdf, "(Hola mundo) Tj"));
    assert!(contains(&out.pdf, "(Memorial de Recuerdos) Tj"));
}

#[tokio::test]
async fn generate_to_file_writes_atomically() {
    let dir = public_dir();
    let out_path = dir.path().join("out/nested/memorial.pdf");
    let request = DocumentRequest::new(vec![entry(None, "Uno", "Dos")]);

    let stats = generate_to_file(request, &out_path, &config(dir.path()))
        .await
        .unwrap();

    let bytes = std::fs::read(&out_path).unwrap();
    assert_eq!(bytes.len(), stats.pdf_bytes);
    assert_eq!(page_count(&bytes), 3);
    assert!(!out_path.with_extension("pdf.tmp").exists());
}

#[tokio::test]
async fn concurrent_renders_are_independent() {
    let dir = public_dir();
    let config = config(dir.path());
    let a = generate(
        DocumentRequest::new(vec![entry(None, "A", "a"); 1]),
        &config,
    );
    let b = generate(
        DocumentRequest::new(vec![entry(None, "B", "b"); 3]),
        &config,
    );
    let (a, b) = tokio::join!(a, b);
    assert_eq!(page_count(&a.unwrap().pdf), 3);
    assert_eq!(page_count(&b.unwrap().pdf), 5);
}
