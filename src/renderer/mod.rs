//! Layout renderer – composes the document tree for one invoice.
//!
//! `render` is referentially transparent: the same document, configuration
//! and totals always yield an identical tree. Styling is expressed as
//! utility classes resolved later by [`crate::style`], so the tree doubles
//! as the HTML served to a host preview.

mod archetypes;
mod blocks;

use crate::dom::{el, to_html, DomNode, ElementNode, Tag};
use crate::financials::{format_currency, DerivedFinancials};
use crate::model::{InvoiceDocument, PaperStyle};
use crate::templates::{self, Fill, LayoutArchetype, TemplateConfig, TemplateSelector};

/// `id` of the page wrapper element, used to locate it for export.
pub const PREVIEW_ID: &str = "invoice-preview";

/// The three inputs every builder receives.
pub(crate) struct RenderContext<'a> {
    pub doc: &'a InvoiceDocument,
    pub config: &'a TemplateConfig,
    pub totals: &'a DerivedFinancials,
}

impl RenderContext<'_> {
    fn money(&self, amount: f64) -> String {
        format_currency(amount, &self.doc.currency)
    }

    fn primary(&self) -> String {
        text_class(self.config.colors.primary)
    }

    fn border(&self) -> String {
        border_class(self.config.colors.border)
    }

    fn secondary(&self) -> String {
        bg_class(self.config.colors.secondary)
    }

    /// The logo slot, absent entirely when the document has no logo.
    fn logo(&self, class: &str) -> Option<ElementNode> {
        self.doc
            .logo
            .as_deref()
            .map(|src| el(Tag::Img, class).attr("src", src))
    }
}

/// Build the document tree for one archetype, wrapped in the A4 page element.
pub fn render(
    doc: &InvoiceDocument,
    config: &TemplateConfig,
    totals: &DerivedFinancials,
) -> ElementNode {
    let cx = RenderContext { doc, config, totals };
    let body = match config.layout {
        LayoutArchetype::HeaderBlock => archetypes::header_block(&cx),
        LayoutArchetype::SidebarLeft => archetypes::sidebar(&cx, false),
        LayoutArchetype::SidebarRight => archetypes::sidebar(&cx, true),
        LayoutArchetype::Grid => archetypes::grid(&cx),
        LayoutArchetype::Standard | LayoutArchetype::Minimal => archetypes::standard(&cx),
    };
    wrapper(&cx).child(body)
}

/// Resolve the template, derive fresh totals and render.
pub fn render_document(doc: &InvoiceDocument, selector: TemplateSelector) -> ElementNode {
    let config = templates::resolve(selector);
    let totals = DerivedFinancials::for_document(doc);
    render(doc, &config, &totals)
}

/// Render by template name; unknown names use the neutral fallback.
pub fn render_named(doc: &InvoiceDocument, name: &str) -> ElementNode {
    let config = templates::resolve_name(name);
    render(doc, &config, &DerivedFinancials::for_document(doc))
}

/// Serialised preview markup for a host view.
pub fn render_html(doc: &InvoiceDocument, selector: TemplateSelector) -> String {
    to_html(&[DomNode::from(render_document(doc, selector))])
}

fn wrapper(cx: &RenderContext<'_>) -> ElementNode {
    el(
        Tag::Div,
        format!(
            "bg-white w-[794px] min-h-[1123px] relative {} {} {}",
            paper_class(cx.doc.background),
            cx.doc.font.family().class(),
            text_class(cx.config.colors.text),
        ),
    )
    .attr("id", PREVIEW_ID)
    .attr("style", "margin: 0 auto; box-sizing: border-box")
}

/// Page background and edge decoration for each paper style.
pub fn paper_class(paper: PaperStyle) -> &'static str {
    match paper {
        PaperStyle::White => "bg-white",
        PaperStyle::Ivory => "bg-[#fffff0]",
        PaperStyle::Snow => "bg-slate-50",
        PaperStyle::LeftStrip => "bg-white border-l-[12px] border-blue-600",
        PaperStyle::TopBar => "bg-white border-t-[12px] border-slate-800",
        PaperStyle::Frame => "bg-white border border-slate-300",
        PaperStyle::DoubleLine => "bg-white border-2 border-slate-200",
        PaperStyle::SidebarTint => "bg-[linear-gradient(to_right,#f8fafc_33%,#ffffff_33%)]",
        PaperStyle::SoftFade => "bg-gradient-to-b from-slate-50/80 to-white",
    }
}

pub(crate) fn text_class(token: &str) -> String {
    format!("text-{token}")
}

pub(crate) fn bg_class(token: &str) -> String {
    format!("bg-{token}")
}

pub(crate) fn border_class(token: &str) -> String {
    format!("border-{token}")
}

pub(crate) fn fill_class(fill: Fill) -> String {
    match fill {
        Fill::Solid(token) => bg_class(token),
        Fill::Gradient(from, to) => format!("bg-gradient-to-r from-{from} to-{to}"),
    }
}
