//! End-to-end tests for the invoice-forge pipeline.
//!
//! These tests validate:
//! - Every template resolves and renders a well-formed preview
//! - Staging picks natural vs. single-page fit from measured height
//! - Images that fail to load never block an export
//! - PDF and PNG exports carry the derived filename and valid bytes
//! - Drafts, profiles and sign-in survive a reopened store

use std::collections::HashSet;
use std::sync::Arc;

use sha2::{Digest, Sha256};

use invoice_forge::config::ExportConfig;
use invoice_forge::dom::{find_by_id, images, parse_html, DomNode};
use invoice_forge::export::Exporter;
use invoice_forge::fonts::FontManager;
use invoice_forge::layout_config::{LayoutBox, LayoutConfig};
use invoice_forge::model::{InvoiceDocument, InvoiceItem, ProfileKind};
use invoice_forge::pipeline::FitDecision;
use invoice_forge::raster::ExportFormat;
use invoice_forge::renderer::{render_document, render_html, PREVIEW_ID};
use invoice_forge::session::{EditorSession, Field};
use invoice_forge::staging::{DefaultImageSource, Stager, StagingOptions};
use invoice_forge::storage::{self, FileStore};
use invoice_forge::templates::{self, LayoutArchetype, TemplateSelector};

// =====================================================================
// Helpers
// =====================================================================

fn sample_document() -> InvoiceDocument {
    let mut doc = InvoiceDocument {
        date: "2024-05-01".to_string(),
        invoice_number: "INV/001".to_string(),
        ..InvoiceDocument::default()
    };
    doc.recipient.name = "A & B Co.".to_string();
    doc.discount_rate = 10.0;
    doc.tax_rate = 8.0;
    doc.shipping_amount = 15.0;
    doc
}

fn with_items(count: usize) -> InvoiceDocument {
    let mut doc = sample_document();
    doc.items = (0..count)
        .map(|i| InvoiceItem {
            id: format!("item-{i}"),
            description: format!("Consulting block {i}"),
            quantity: 2.0,
            unit_price: 125.0,
        })
        .collect();
    doc
}

fn options() -> StagingOptions {
    StagingOptions {
        settle_delay: std::time::Duration::ZERO,
        ..StagingOptions::default()
    }
}

fn tree(doc: &InvoiceDocument, selector: TemplateSelector) -> Vec<DomNode> {
    vec![DomNode::from(render_document(doc, selector))]
}

fn export_config() -> ExportConfig {
    ExportConfig {
        settle_delay_ms: 0,
        raster_scale: 1.0,
        ..ExportConfig::default()
    }
}

fn all_boxes(layout: &LayoutConfig, f: &mut dyn FnMut(&LayoutBox)) {
    for page in &layout.pages {
        for lbox in &page.boxes {
            f(lbox);
        }
    }
}

// =====================================================================
// Template registry + rendering
// =====================================================================

#[test]
fn registry_covers_every_archetype() {
    let archetypes: HashSet<LayoutArchetype> = TemplateSelector::ALL
        .iter()
        .map(|s| templates::resolve(*s).layout)
        .collect();
    assert_eq!(archetypes.len(), LayoutArchetype::ALL.len());
    for selector in TemplateSelector::FEATURED {
        assert!(TemplateSelector::ALL.contains(&selector));
    }
}

#[test]
fn preview_html_reparses_with_its_wrapper() {
    let mut doc = sample_document();
    doc.signature = Some("sig.png".to_string());
    for selector in TemplateSelector::ALL {
        let html = render_html(&doc, selector);
        let reparsed = parse_html(&html);
        assert!(find_by_id(&reparsed, PREVIEW_ID).is_some(), "{selector}");
        assert_eq!(images(&reparsed).len(), 1, "{selector}");
    }
}

#[test]
fn rendered_html_is_stable_across_runs() {
    let doc = sample_document();
    let digest = |s: TemplateSelector| Sha256::digest(render_html(&doc, s).as_bytes()).to_vec();

    let mut distinct = HashSet::new();
    for selector in TemplateSelector::ALL {
        let first = digest(selector);
        assert_eq!(first, digest(selector), "{selector}");
        distinct.insert(first);
    }
    assert!(distinct.len() > 30, "only {} distinct renders", distinct.len());
}

#[test]
fn totals_appear_in_the_preview() {
    // 1000 - 100 discount, +72 tax on 900, +15 shipping
    let html = render_html(&sample_document(), TemplateSelector::MinimalClean);
    assert!(html.contains("Discount (10%)"));
    assert!(html.contains("-$100.00"));
    assert!(html.contains("Tax (8%)"));
    assert!(html.contains("$987.00"));
}

// =====================================================================
// Staging
// =====================================================================

#[tokio::test]
async fn short_documents_stay_natural_on_one_page() {
    let stager = Stager::new(options());
    let staged = stager.stage(&tree(&with_items(1), TemplateSelector::StandardBlue)).await.unwrap();
    assert_eq!(staged.document.fit, FitDecision::Natural);
    assert_eq!(staged.document.layout.pages.len(), 1);
    assert_eq!(stager.host().attached_count(), 1);
    drop(staged);
    assert_eq!(stager.host().attached_count(), 0);
}

#[tokio::test]
async fn fit_decision_follows_measured_height() {
    let stager = Stager::new(options());
    let page_h = stager.options().pipeline.page_height;
    let threshold = stager.options().pipeline.fit_threshold;
    let mut saw_fit = false;
    let mut saw_overflow = false;

    for count in 0..60 {
        let staged = stager.stage(&tree(&with_items(count), TemplateSelector::StandardSlate)).await.unwrap();
        let doc = &staged.document;
        let h = doc.content_height;
        match doc.fit {
            FitDecision::ScaledToFit { scale } => {
                saw_fit = true;
                assert!(h > page_h && h < threshold, "{count} items, {h}px");
                assert!((scale - page_h / h).abs() < 1e-4);
                assert_eq!(doc.layout.pages.len(), 1);
            }
            FitDecision::Natural if h >= threshold => {
                saw_overflow = true;
                assert!(doc.layout.pages.len() >= 2, "{count} items, {h}px");
            }
            FitDecision::Natural => {
                assert!(h <= page_h, "{count} items, {h}px");
                assert_eq!(doc.layout.pages.len(), 1);
            }
        }
    }
    assert!(saw_fit && saw_overflow);
}

#[tokio::test]
async fn unreachable_logo_does_not_block_export() {
    let dir = tempfile::tempdir().unwrap();
    let stager = Stager::new(options())
        .with_image_source(Arc::new(DefaultImageSource::new().with_base_dir(dir.path())));
    let mut exporter = Exporter::new(&export_config()).with_stager(stager);
    exporter.register(Box::new(invoice_forge::raster::PdfRasterizer::default()));

    let mut doc = sample_document();
    doc.logo = Some("missing-logo.png".to_string());
    assert_eq!(images(&tree(&doc, TemplateSelector::SidebarNavy)).len(), 1);

    let artifact = exporter.export(&doc, TemplateSelector::SidebarNavy, ExportFormat::Pdf).await.unwrap();
    assert!(artifact.bytes.starts_with(b"%PDF-"));
    assert_eq!(exporter.stager().host().attached_count(), 0);
}

#[tokio::test]
async fn staging_leaves_the_live_tree_alone() {
    let mut doc = sample_document();
    doc.logo = Some("data:image/png;base64,not-really-png".to_string());
    let live = tree(&doc, TemplateSelector::GridModern);
    let before = invoice_forge::dom::to_html(&live);

    let staged = Stager::new(options()).stage(&live).await.unwrap();
    assert_eq!(invoice_forge::dom::to_html(&live), before);
    assert_eq!(staged.document.images.len(), 1);
}

// =====================================================================
// Export
// =====================================================================

#[tokio::test]
async fn pdf_and_png_share_the_filename_stem() {
    let exporter = Exporter::with_defaults(&export_config(), FontManager::default());
    let doc = sample_document();
    let pdf = exporter.export(&doc, TemplateSelector::ExecutiveClassic, ExportFormat::Pdf).await.unwrap();
    let png = exporter.export(&doc, TemplateSelector::ExecutiveClassic, ExportFormat::Png).await.unwrap();
    assert_eq!(pdf.filename, "Invoice-INV001_A_B_Co.pdf");
    assert_eq!(png.filename, "Invoice-INV001_A_B_Co.png");
    assert!(png.bytes.starts_with(b"\x89PNG"));
}

#[tokio::test]
async fn long_documents_export_multiple_pdf_pages() {
    let exporter = Exporter::with_defaults(&export_config(), FontManager::default());
    let artifact = exporter
        .export(&with_items(80), TemplateSelector::CompactDense, ExportFormat::Pdf)
        .await
        .unwrap();
    assert_eq!(artifact.fit, FitDecision::Natural);
    assert!(artifact.pages >= 2);
}

#[tokio::test]
async fn artifacts_land_in_the_target_directory() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = Exporter::with_defaults(&export_config(), FontManager::default());
    let artifact = exporter
        .export(&sample_document(), TemplateSelector::CreativeGradient, ExportFormat::Pdf)
        .await
        .unwrap();
    let path = artifact.write_to(&dir.path().join("out")).unwrap();
    assert_eq!(std::fs::read(path).unwrap(), artifact.bytes);
}

#[tokio::test]
async fn laid_out_text_stays_inside_the_page() {
    let stager = Stager::new(options());
    let staged = stager.stage(&tree(&sample_document(), TemplateSelector::BoldHeaderBlue)).await.unwrap();
    let layout = &staged.document.layout;
    let mut text_boxes = 0;
    all_boxes(layout, &mut |b| {
        if b.text.is_some() {
            text_boxes += 1;
            assert!(b.x >= 0.0 && b.x <= layout.page_width_px, "x={}", b.x);
            assert!(b.y >= 0.0 && b.y <= layout.page_height_px, "y={}", b.y);
        }
    });
    assert!(text_boxes > 10);
}

#[tokio::test]
async fn long_terms_flow_onto_following_pages() {
    let mut doc = sample_document();
    doc.terms = (0..150)
        .map(|i| format!("Clause-{i:03}: payment is due within thirty days of the invoice date."))
        .collect::<Vec<_>>()
        .join("\n");

    let stager = Stager::new(options());
    let staged = stager.stage(&tree(&doc, TemplateSelector::StandardBlue)).await.unwrap();
    let layout = &staged.document.layout;
    assert_eq!(staged.document.fit, FitDecision::Natural);
    assert!(layout.pages.len() >= 2);

    let mut clauses = HashSet::new();
    all_boxes(layout, &mut |b| {
        let Some(text) = &b.text else { return };
        for line in &text.lines {
            let y = b.y + line.y_offset;
            assert!(y >= 0.0, "{:?} starts above its page", line.text);
            assert!(
                y + text.line_height <= layout.page_height_px + 0.5,
                "{:?} runs past the page foot",
                line.text
            );
            for word in line.text.split_whitespace().filter(|w| w.starts_with("Clause-")) {
                assert!(clauses.insert(word.to_string()), "{word} painted twice");
            }
        }
    });
    assert_eq!(clauses.len(), 150);
}

// =====================================================================
// Storage + session
// =====================================================================

#[test]
fn editor_state_survives_a_reopened_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");

    {
        let store = Arc::new(FileStore::open(&path).unwrap());
        let mut session = EditorSession::new(store).unwrap();
        session.login("owner@acme.test").unwrap();
        session.set_field(Field::RecipientName, "Globex");
        session.save_profile(ProfileKind::Client).unwrap();
        session.teardown().unwrap();
    }

    let store = Arc::new(FileStore::open(&path).unwrap());
    let clients = storage::load_profiles(store.as_ref(), ProfileKind::Client).unwrap();
    assert_eq!(clients.len(), 1);
    assert_eq!(clients[0].name, "Globex");

    let mut session = EditorSession::new(store).unwrap();
    assert_eq!(session.user(), Some("owner@acme.test"));
    assert!(session.load_draft().unwrap());
    assert_eq!(session.document().recipient.name, "Globex");
}
