//! Pipeline – ties together styling, layout, fitting and pagination into a
//! single function call that turns a document tree into page layouts.

use crate::dom::{body_children, parse_html, DomNode};
use crate::error::{Error, Result};
use crate::fonts::FontManager;
use crate::layout::{compute_layout, content_height, PositionedBox};
use crate::layout_config::LayoutConfig;
use crate::pagination::paginate;
use crate::style::build_styled_tree;

/// A4 at 96 dpi.
pub const PAGE_WIDTH_PX: f32 = 794.0;
pub const PAGE_HEIGHT_PX: f32 = 1123.0;
/// Content up to this height is shrunk onto one page instead of spilling
/// onto a second.
pub const FIT_THRESHOLD_PX: f32 = 1350.0;

/// Page geometry used when staging a document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    pub page_width: f32,
    pub page_height: f32,
    pub fit_threshold: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            page_width: PAGE_WIDTH_PX,
            page_height: PAGE_HEIGHT_PX,
            fit_threshold: FIT_THRESHOLD_PX,
        }
    }
}

/// How measured content is mapped onto pages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FitDecision {
    /// Natural size; the container grows to as many pages as needed.
    Natural,
    /// Uniformly shrunk onto exactly one page. Layout happens at
    /// `page_width / scale` so the shrunk content still spans the page.
    ScaledToFit { scale: f32 },
}

impl FitDecision {
    pub fn scale(self) -> f32 {
        match self {
            FitDecision::Natural => 1.0,
            FitDecision::ScaledToFit { scale } => scale,
        }
    }
}

/// Decide between natural size and single-page fit for a measured height.
pub fn fit_decision(content_height: f32, config: &PipelineConfig) -> FitDecision {
    if content_height > config.page_height && content_height < config.fit_threshold {
        FitDecision::ScaledToFit {
            scale: config.page_height / content_height,
        }
    } else {
        FitDecision::Natural
    }
}

/// Style and lay out a tree at a fixed width.
pub fn layout_nodes(nodes: &[DomNode], width: f32, fonts: &FontManager) -> Result<Vec<PositionedBox>> {
    let styled = build_styled_tree(nodes, None);
    if styled.is_empty() {
        return Err(Error::Staging("nothing to lay out".to_string()));
    }
    compute_layout(&styled, width, fonts)
}

/// Result of laying a tree out onto pages.
#[derive(Debug, Clone)]
pub struct PagedDocument {
    pub layout: LayoutConfig,
    pub decision: FitDecision,
    /// Content height measured at natural width.
    pub content_height: f32,
}

/// Measure at page width, pick a fit, then paginate.
pub fn layout_pages(nodes: &[DomNode], config: &PipelineConfig, fonts: &FontManager) -> Result<PagedDocument> {
    let boxes = layout_nodes(nodes, config.page_width, fonts)?;
    let measured = content_height(&boxes);
    let decision = fit_decision(measured, config);

    let layout = match decision {
        FitDecision::Natural => paginate(&boxes, config.page_width, config.page_height, 1.0, fonts),
        FitDecision::ScaledToFit { scale } => {
            let width = config.page_width / scale;
            let height = config.page_height / scale;
            let wide = layout_nodes(nodes, width, fonts)?;
            paginate(&wide, width, height, scale, fonts)
        }
    };
    log::debug!(
        "content height {measured:.0}px -> {decision:?}, {} page(s)",
        layout.pages.len()
    );

    Ok(PagedDocument {
        layout,
        decision,
        content_height: measured,
    })
}

/// Convenience: lay out an HTML string with the default geometry.
pub fn layout_html(html: &str) -> Result<PagedDocument> {
    let dom = parse_html(html);
    layout_pages(&body_children(&dom), &PipelineConfig::default(), &FontManager::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_threshold_bounds() {
        let cfg = PipelineConfig::default();
        assert_eq!(fit_decision(900.0, &cfg), FitDecision::Natural);
        assert_eq!(fit_decision(1123.0, &cfg), FitDecision::Natural);
        match fit_decision(1200.0, &cfg) {
            FitDecision::ScaledToFit { scale } => assert!((scale - 1123.0 / 1200.0).abs() < 1e-6),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(fit_decision(1350.0, &cfg), FitDecision::Natural);
        assert_eq!(fit_decision(2000.0, &cfg), FitDecision::Natural);
    }

    #[test]
    fn threshold_is_tunable() {
        let cfg = PipelineConfig {
            fit_threshold: 1200.0,
            ..PipelineConfig::default()
        };
        assert_eq!(fit_decision(1250.0, &cfg), FitDecision::Natural);
    }

    #[test]
    fn pipeline_basic() {
        let doc = layout_html("<h1>Hello</h1><p>World</p>").unwrap();
        assert_eq!(doc.layout.pages.len(), 1);
        assert_eq!(doc.decision, FitDecision::Natural);
    }

    #[test]
    fn slightly_tall_content_lands_on_one_page() {
        let html = r#"<div class="h-[1200px]"><p>tall</p></div>"#;
        let doc = layout_html(html).unwrap();
        assert!(matches!(doc.decision, FitDecision::ScaledToFit { .. }));
        assert_eq!(doc.layout.pages.len(), 1);
        let (w, h) = doc.layout.output_size_px();
        assert!((w - PAGE_WIDTH_PX).abs() < 0.01);
        assert!((h - PAGE_HEIGHT_PX).abs() < 0.01);
    }

    #[test]
    fn empty_tree_is_a_staging_error() {
        assert!(matches!(layout_html(""), Err(Error::Staging(_))));
    }
}
