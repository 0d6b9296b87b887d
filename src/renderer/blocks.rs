//! Sub-builders shared by every archetype: items table, totals, signature.

use super::RenderContext;
use crate::dom::{el, ElementNode, Tag};
use crate::financials::format_plain;
use crate::templates::TableStyle;

pub const SIGNATURE_CAPTION: &str = "Authorized Signature";

/// Item rows under a fixed four-column header. An empty item list leaves
/// just the header row.
pub(super) fn items_table(cx: &RenderContext<'_>) -> ElementNode {
    let primary = cx.primary();
    let border = cx.border();
    let secondary = cx.secondary();
    let label = "text-xs font-bold uppercase tracking-wider text-left";

    let (header, row, cell) = match cx.config.styles.table {
        TableStyle::Striped => (
            format!("py-3 px-4 {label} {primary} {secondary}"),
            format!("border-b {border}"),
            "py-3 px-4 text-sm".to_string(),
        ),
        TableStyle::Bordered => (
            format!("py-2 px-3 {label} border {border} bg-gray-50 text-gray-700"),
            format!("border {border}"),
            format!("py-2 px-3 text-sm border-r {border}"),
        ),
        TableStyle::Minimal => (
            format!("py-2 {label} border-b {border} text-gray-500"),
            format!("border-b border-dotted {border}"),
            "py-3 text-sm".to_string(),
        ),
        TableStyle::Simple => (
            format!("py-2 {label} text-gray-400 border-b {border}"),
            format!("border-b {border}"),
            "py-3 text-sm".to_string(),
        ),
    };

    let head = el(Tag::Tr, "")
        .child(el(Tag::Th, format!("{header} w-[50%]")).text("Description"))
        .child(el(Tag::Th, format!("{header} text-right w-[15%]")).text("Qty"))
        .child(el(Tag::Th, format!("{header} text-right w-[17.5%]")).text("Price"))
        .child(el(Tag::Th, format!("{header} text-right w-[17.5%]")).text("Total"));

    let bordered = cx.config.styles.table == TableStyle::Bordered;
    let rows = cx.doc.items.iter().enumerate().map(|(i, item)| {
        let stripe = match cx.config.styles.table {
            TableStyle::Striped if i % 2 == 1 => secondary.as_str(),
            TableStyle::Striped => "bg-white",
            _ => "",
        };
        // The last cell of a bordered row has no right rule.
        let last_cell = if bordered {
            cell.replace(&format!(" border-r {border}"), "")
        } else {
            cell.clone()
        };
        el(Tag::Tr, format!("{row} {stripe}"))
            .child(
                el(
                    Tag::Td,
                    format!("{cell} font-medium text-slate-800 whitespace-pre-line break-words"),
                )
                .text(item.description.clone()),
            )
            .child(el(Tag::Td, format!("{cell} text-right text-slate-600")).text(format_plain(item.quantity)))
            .child(el(Tag::Td, format!("{cell} text-right text-slate-600")).text(cx.money(item.unit_price)))
            .child(
                el(Tag::Td, format!("{last_cell} text-right font-bold text-slate-800"))
                    .text(cx.money(item.line_total())),
            )
    });

    el(Tag::Table, "w-full mb-8 border-collapse table-fixed")
        .child(head)
        .children(rows)
}

/// Subtotal, the non-zero adjustments, then the emphasised total.
pub(super) fn totals(cx: &RenderContext<'_>) -> ElementNode {
    let t = cx.totals;
    let d = cx.doc;
    let boxed = matches!(cx.config.styles.table, TableStyle::Striped | TableStyle::Bordered);
    let class = if boxed {
        format!("space-y-2 p-4 rounded {} break-inside-avoid", cx.secondary())
    } else {
        "space-y-2 break-inside-avoid".to_string()
    };

    let line = |label: String, value: ElementNode| {
        el(Tag::Div, "flex justify-between text-slate-600 text-sm")
            .child(el(Tag::Span, "").text(label))
            .child(value)
    };
    let amount = |v: f64| el(Tag::Span, "").text(cx.money(v));

    el(Tag::Div, class)
        .child(line("Subtotal".to_string(), amount(t.subtotal)))
        .child_opt((t.discount_amount > 0.0).then(|| {
            line(
                format!("Discount ({}%)", format_plain(d.discount_rate)),
                el(Tag::Span, "text-red-500").text(format!("-{}", cx.money(t.discount_amount))),
            )
        }))
        .child_opt((t.tax_amount > 0.0).then(|| {
            line(format!("Tax ({}%)", format_plain(d.tax_rate)), amount(t.tax_amount))
        }))
        .child_opt((t.shipping_amount > 0.0).then(|| line("Shipping".to_string(), amount(t.shipping_amount))))
        .child(
            el(
                Tag::Div,
                format!("flex justify-between text-xl font-bold pt-3 mt-2 border-t {} {}", cx.border(), cx.primary()),
            )
            .child(el(Tag::Span, "").text("Total"))
            .child(amount(t.total)),
        )
}

/// Signature image over a captioned rule; nothing without a signature.
pub(super) fn signature(cx: &RenderContext<'_>) -> Option<ElementNode> {
    let src = cx.doc.signature.as_deref()?;
    Some(
        el(Tag::Div, "mt-8 inline-block text-center")
            .child(el(Tag::Img, "h-16 object-contain mb-2 mx-auto").attr("src", src))
            .child(
                el(Tag::Div, "border-t border-slate-300 w-48 pt-1").child(
                    el(Tag::P, "text-[10px] uppercase font-bold text-slate-400").text(SIGNATURE_CAPTION),
                ),
            ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::DomNode;
    use crate::financials::DerivedFinancials;
    use crate::model::{InvoiceDocument, InvoiceItem};
    use crate::templates::{resolve, TemplateSelector};

    fn with<R>(doc: &InvoiceDocument, selector: TemplateSelector, f: impl FnOnce(&RenderContext<'_>) -> R) -> R {
        let config = resolve(selector);
        let totals = DerivedFinancials::for_document(doc);
        f(&RenderContext {
            doc,
            config: &config,
            totals: &totals,
        })
    }

    fn rows(table: &ElementNode) -> Vec<&ElementNode> {
        table
            .children
            .iter()
            .filter_map(|c| match c {
                DomNode::Element(e) if e.tag == Tag::Tr => Some(e),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn empty_items_leave_only_the_header() {
        let doc = InvoiceDocument {
            items: Vec::new(),
            ..InvoiceDocument::default()
        };
        let table = with(&doc, TemplateSelector::StandardBlue, items_table);
        assert_eq!(rows(&table).len(), 1);
        assert!(table.text_content().contains("Description"));
    }

    #[test]
    fn line_totals_are_quantity_times_price() {
        let doc = InvoiceDocument {
            items: vec![InvoiceItem {
                id: "a".into(),
                description: "Design".into(),
                quantity: 2.5,
                unit_price: 1000.0,
            }],
            ..InvoiceDocument::default()
        };
        let table = with(&doc, TemplateSelector::GridTech, items_table);
        let text = rows(&table)[1].text_content();
        assert!(text.contains("2.5"));
        assert!(text.contains("$1,000.00"));
        assert!(text.contains("$2,500.00"));
    }

    #[test]
    fn striped_rows_alternate_the_secondary_fill() {
        let doc = InvoiceDocument {
            items: (0..4).map(|i| InvoiceItem::blank(i.to_string())).collect(),
            ..InvoiceDocument::default()
        };
        let table = with(&doc, TemplateSelector::StandardEmerald, items_table);
        let body = &rows(&table)[1..];
        assert!(body[0].classes().contains(&"bg-white"));
        assert!(body[1].classes().contains(&"bg-emerald-50"));
        assert!(body[2].classes().contains(&"bg-white"));
    }

    #[test]
    fn bordered_rows_drop_the_last_rule() {
        let doc = InvoiceDocument::default();
        let table = with(&doc, TemplateSelector::GridTech, items_table);
        let row = rows(&table)[1];
        let cells: Vec<&ElementNode> = row
            .children
            .iter()
            .filter_map(|c| match c {
                DomNode::Element(e) => Some(e),
                _ => None,
            })
            .collect();
        assert!(cells[0].classes().contains(&"border-r"));
        assert!(!cells[3].classes().contains(&"border-r"));
    }

    #[test]
    fn zero_adjustments_are_omitted() {
        let doc = InvoiceDocument::default();
        let block = with(&doc, TemplateSelector::StandardBlue, totals);
        let text = block.text_content();
        assert!(text.contains("Subtotal"));
        assert!(!text.contains("Discount"));
        assert!(!text.contains("Tax"));
        assert!(!text.contains("Shipping"));
        assert!(text.ends_with("Total$1,000.00"));
    }

    #[test]
    fn adjustments_show_rates_and_negated_discount() {
        let doc = InvoiceDocument {
            discount_rate: 10.0,
            tax_rate: 8.5,
            shipping_amount: 25.0,
            ..InvoiceDocument::default()
        };
        let text = with(&doc, TemplateSelector::MinimalClean, totals).text_content();
        assert!(text.contains("Discount (10%)-$100.00"));
        assert!(text.contains("Tax (8.5%)$76.50"));
        assert!(text.contains("Shipping$25.00"));
        assert!(text.ends_with("Total$1,001.50"));
    }

    #[test]
    fn signature_is_optional() {
        let mut doc = InvoiceDocument::default();
        assert!(with(&doc, TemplateSelector::StandardBlue, signature).is_none());
        doc.signature = Some("data:image/png;base64,AAAA".into());
        let block = with(&doc, TemplateSelector::StandardBlue, signature).unwrap();
        assert_eq!(block.text_content(), SIGNATURE_CAPTION);
    }
}
