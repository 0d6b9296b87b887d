//! Export orchestration: render, stage, name and rasterize one document.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::ExportConfig;
use crate::dom::DomNode;
use crate::error::{Error, Result};
use crate::filename::export_filename;
use crate::fonts::FontManager;
use crate::model::InvoiceDocument;
use crate::pipeline::{FitDecision, PAGE_WIDTH_PX};
use crate::raster::{ExportFormat, PdfRasterizer, PngRasterizer, RasterRequest, Rasterizer};
use crate::renderer::{render_document, render_named};
use crate::staging::{Stager, StagingOptions};
use crate::templates::TemplateSelector;

/// Horizontal room kept free around the on-screen preview.
const PREVIEW_GUTTER_PX: f32 = 32.0;

/// Scale at which a page-wide preview fits a host view; never enlarges.
pub fn preview_scale(container_width: f32) -> f32 {
    ((container_width - PREVIEW_GUTTER_PX) / PAGE_WIDTH_PX).clamp(0.0, 1.0)
}

/// A finished export.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub filename: String,
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
    pub pages: usize,
    pub fit: FitDecision,
}

impl ExportArtifact {
    /// Write into `dir` under the derived filename.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(&self.filename);
        fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

pub struct Exporter {
    stager: Stager,
    rasterizers: HashMap<ExportFormat, Box<dyn Rasterizer>>,
    raster_scale: f32,
}

impl Exporter {
    /// An exporter with no rasterizers registered.
    pub fn new(config: &ExportConfig) -> Self {
        Self {
            stager: Stager::new(StagingOptions::from(config)),
            rasterizers: HashMap::new(),
            raster_scale: config.raster_scale,
        }
    }

    /// PDF and PNG rasterizers sharing `fonts` with staging.
    pub fn with_defaults(config: &ExportConfig, fonts: FontManager) -> Self {
        let mut exporter = Self::new(config).with_stager(
            Stager::new(StagingOptions::from(config)).with_fonts(fonts.clone()),
        );
        exporter.register(Box::new(PdfRasterizer::new(fonts.clone())));
        exporter.register(Box::new(PngRasterizer::new(fonts)));
        exporter
    }

    pub fn with_stager(mut self, stager: Stager) -> Self {
        self.stager = stager;
        self
    }

    pub fn register(&mut self, rasterizer: Box<dyn Rasterizer>) {
        self.rasterizers.insert(rasterizer.format(), rasterizer);
    }

    pub fn supports(&self, format: ExportFormat) -> bool {
        self.rasterizers.contains_key(&format)
    }

    pub fn stager(&self) -> &Stager {
        &self.stager
    }

    /// Render `doc` with `selector` and export it.
    pub async fn export(
        &self,
        doc: &InvoiceDocument,
        selector: TemplateSelector,
        format: ExportFormat,
    ) -> Result<ExportArtifact> {
        let tree = vec![DomNode::from(render_document(doc, selector))];
        self.export_tree(&tree, doc, format).await
    }

    /// Like [`export`](Self::export) with a template name.
    pub async fn export_named(&self, doc: &InvoiceDocument, template: &str, format: ExportFormat) -> Result<ExportArtifact> {
        let tree = vec![DomNode::from(render_named(doc, template))];
        self.export_tree(&tree, doc, format).await
    }

    /// Export an already rendered tree. Nothing is staged when no
    /// rasterizer handles `format`.
    pub async fn export_tree(
        &self,
        tree: &[DomNode],
        doc: &InvoiceDocument,
        format: ExportFormat,
    ) -> Result<ExportArtifact> {
        let rasterizer = self
            .rasterizers
            .get(&format)
            .ok_or_else(|| Error::MissingCapability(format!("{} export", format.extension().to_uppercase())))?;

        let staged = self.stager.stage(tree).await?;
        let filename = export_filename(&doc.invoice_number, &doc.recipient.name, format.extension());
        let request = RasterRequest {
            filename: filename.clone(),
            raster_scale: self.raster_scale,
        };
        // `staged` owns the container guard; it detaches when this scope ends.
        let bytes = rasterizer.rasterize(&staged.document, &request)?;
        log::info!("exported {filename} ({} bytes)", bytes.len());

        Ok(ExportArtifact {
            filename,
            format,
            bytes,
            pages: staged.document.layout.pages.len(),
            fit: staged.document.fit,
        })
    }
}
