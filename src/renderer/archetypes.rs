//! The four page compositions. `Standard` and `Minimal` share one builder.

use super::blocks::{items_table, signature, totals};
use super::{fill_class, text_class, RenderContext};
use crate::dom::{el, ElementNode, Tag};
use crate::templates::LogoPosition;

/// Full-width coloured band carrying the sender, then a white body.
pub(super) fn header_block(cx: &RenderContext<'_>) -> ElementNode {
    let d = cx.doc;
    let colors = &cx.config.colors;
    let band = format!(
        "{} {} p-10 flex justify-between items-start",
        colors.header_bg.map(fill_class).unwrap_or_default(),
        colors.sidebar_text.map(text_class).unwrap_or_default(),
    );

    let sender = el(Tag::Div, "max-w-[50%]")
        .child_opt(cx.logo("h-20 w-auto mb-4 bg-white p-2 rounded"))
        .child(el(Tag::H1, "text-4xl font-bold uppercase tracking-tight break-words").text(d.sender.name.clone()))
        .child(el(Tag::P, "opacity-80 mt-1 whitespace-pre-line text-sm").text(d.sender.address.clone()))
        .child(el(Tag::P, "opacity-80 text-sm").text(d.sender.email.clone()));
    let heading = el(Tag::Div, "text-right")
        .child(el(Tag::H2, "text-5xl font-black opacity-30 uppercase").text(d.document_title.clone()))
        .child(el(Tag::Div, "mt-2 text-xl font-bold opacity-90").text(format!("#{}", d.invoice_number)))
        .child(el(Tag::Div, "opacity-80").text(d.date.clone()));

    let bill_to = el(Tag::Div, "grid grid-cols-2 gap-10 mb-10").child(
        el(Tag::Div, "")
            .child(el(Tag::H3, format!("text-xs font-bold uppercase tracking-wider mb-2 {}", cx.primary())).text("Bill To"))
            .child(el(Tag::P, "font-bold text-lg text-slate-800 whitespace-pre-line").text(d.recipient.name.clone()))
            .child(el(Tag::P, "text-slate-600 text-sm whitespace-pre-line").text(d.recipient.address.clone()))
            .child(el(Tag::P, "text-slate-600 text-sm").text(d.recipient.email.clone())),
    );

    let remarks = el(Tag::Div, "w-2/3")
        .child_opt((!d.notes.is_empty()).then(|| {
            el(Tag::Div, "mb-4")
                .child(el(Tag::H4, "font-bold text-xs text-slate-400 uppercase mb-1").text("Notes"))
                .child(el(Tag::P, "text-sm text-slate-600 italic").text(d.notes.clone()))
        }))
        .child_opt((!d.terms.is_empty()).then(|| {
            el(Tag::Div, "")
                .child(el(Tag::H4, "font-bold text-xs text-slate-400 uppercase mb-1").text("Terms"))
                .child(el(Tag::P, "text-xs text-slate-500").text(d.terms.clone()))
        }));

    let body = el(Tag::Div, "p-10 flex-1 bg-white flex flex-col")
        .child(bill_to)
        .child(items_table(cx))
        .child(el(Tag::Div, "flex justify-end mt-auto").child(el(Tag::Div, "w-5/12").child(totals(cx))))
        .child(
            el(Tag::Div, "mt-8 pt-6 border-t border-slate-100 flex justify-between items-end break-inside-avoid")
                .child(remarks)
                .child_opt(signature(cx)),
        );

    el(Tag::Div, "flex flex-col h-full min-h-[1123px]")
        .child(el(Tag::Div, band).child(sender).child(heading))
        .child(body)
}

/// A tinted column holding identity and parties beside the items. The
/// column sits on the right when `right` is set.
pub(super) fn sidebar(cx: &RenderContext<'_>, right: bool) -> ElementNode {
    let d = cx.doc;
    let colors = &cx.config.colors;
    let party = |label: &str, name: &str, address: &str, email: &str| {
        el(Tag::Div, "mb-8 space-y-1")
            .child(el(Tag::H4, "text-xs font-bold uppercase tracking-wider opacity-60 mb-2").text(label))
            .child(el(Tag::P, "font-bold whitespace-pre-line break-words").text(name))
            .child(el(Tag::P, "text-sm opacity-80 whitespace-pre-line break-words").text(address))
            .child(el(Tag::P, "text-sm opacity-80 break-all").text(email))
    };

    let column = el(
        Tag::Div,
        format!(
            "w-[32%] p-8 flex flex-col bg-{} text-{}",
            colors.sidebar_bg.unwrap_or("slate-100"),
            colors.sidebar_text.unwrap_or("slate-800"),
        ),
    )
    .child(
        el(Tag::Div, "mb-8")
            .child_opt(cx.logo("h-16 w-auto mb-6 object-contain p-1 bg-white rounded"))
            .child(el(Tag::H2, "text-2xl font-bold uppercase leading-none mb-1").text(d.document_title.clone()))
            .child(el(Tag::P, "opacity-60 font-mono text-sm").text(format!("#{}", d.invoice_number))),
    )
    .child(party("From", &d.sender.name, &d.sender.address, &d.sender.email))
    .child(party("To", &d.recipient.name, &d.recipient.address, &d.recipient.email))
    .child(
        el(Tag::Div, "mt-auto").child(
            el(Tag::Div, "mb-4")
                .child(el(Tag::H4, "text-xs font-bold uppercase tracking-wider opacity-60 mb-1").text("Date"))
                .child(el(Tag::P, "font-medium").text(d.date.clone())),
        ),
    );

    let notes = (!d.notes.is_empty()).then(|| {
        el(Tag::P, "text-sm text-slate-600 mb-2 whitespace-pre-line")
            .child(el(Tag::Span, "font-bold text-slate-800").text("Note:"))
            .text(format!(" {}", d.notes))
    });
    let main = el(Tag::Div, "flex-1 p-8 flex flex-col")
        .child(items_table(cx))
        .child(el(Tag::Div, "flex justify-end mt-4").child(el(Tag::Div, "w-2/3").child(totals(cx))))
        .child(
            el(Tag::Div, "mt-auto pt-8")
                .child_opt(notes)
                .child_opt(
                    (!d.terms.is_empty())
                        .then(|| el(Tag::P, "text-xs text-slate-400 whitespace-pre-line").text(d.terms.clone())),
                )
                .child(el(Tag::Div, "flex justify-end").child_opt(signature(cx))),
        );

    let row = el(Tag::Div, "flex flex-row h-full min-h-[1123px]");
    if right {
        row.child(main).child(column)
    } else {
        row.child(column).child(main)
    }
}

/// Boxed party panels under a heavy rule; totals beside the notes.
pub(super) fn grid(cx: &RenderContext<'_>) -> ElementNode {
    let d = cx.doc;
    let colors = &cx.config.colors;
    let border = cx.border();
    let primary = cx.primary();

    let masthead = el(Tag::Div, "flex justify-between items-center mb-8 border-b-4 border-slate-800 pb-4")
        .child(
            el(Tag::Div, "flex items-center gap-4 max-w-[60%]")
                .child_opt(cx.logo("h-16 w-auto"))
                .child(
                    el(Tag::Div, "")
                        .child(el(Tag::H1, format!("text-2xl font-bold uppercase {primary} break-words")).text(d.sender.name.clone()))
                        .child(el(Tag::P, "text-xs text-slate-500").text(d.sender.email.clone())),
                ),
        )
        .child(
            el(Tag::Div, "text-right")
                .child(el(Tag::H2, "text-4xl font-bold text-slate-200 uppercase").text(d.document_title.clone()))
                .child(el(Tag::P, format!("font-bold text-lg {primary}")).text(format!("#{}", d.invoice_number))),
        );

    let panel = |class: String, label: &str, name: &str, address: &str| {
        el(Tag::Div, class)
            .child(el(Tag::H3, "text-xs font-bold text-slate-400 uppercase mb-2").text(label))
            .child(el(Tag::P, "font-bold text-slate-800 whitespace-pre-line").text(name))
            .child(el(Tag::P, "text-sm text-slate-600 whitespace-pre-line").text(address))
    };
    let parties = el(Tag::Div, "grid grid-cols-2 gap-4 mb-8")
        .child(panel(
            format!(
                "p-4 border {border} rounded-lg {}",
                colors.header_bg.map(fill_class).unwrap_or_default()
            ),
            "Bill From",
            &d.sender.name,
            &d.sender.address,
        ))
        .child(panel(
            format!("p-4 border {border} rounded-lg"),
            "Bill To",
            &d.recipient.name,
            &d.recipient.address,
        ));

    let footer = el(Tag::Div, "grid grid-cols-2 gap-8 mt-auto")
        .child(
            el(Tag::Div, "pt-4")
                .child_opt((!d.notes.is_empty()).then(|| {
                    el(Tag::Div, format!("p-4 border {border} rounded bg-slate-50 text-sm text-slate-600"))
                        .text(d.notes.clone())
                }))
                .child(el(Tag::Div, "mt-8").child_opt(signature(cx))),
        )
        .child(el(Tag::Div, "").child(totals(cx)));

    el(Tag::Div, "p-10 h-full flex flex-col min-h-[1123px]")
        .child(masthead)
        .child(parties)
        .child(el(Tag::Div, "mb-8").child(items_table(cx)))
        .child(footer)
}

/// Sender left, document identity right; a centred-logo variant moves the
/// sender into a ruled band and the identity beside the recipient.
pub(super) fn standard(cx: &RenderContext<'_>) -> ElementNode {
    let d = cx.doc;
    let styles = &cx.config.styles;
    let primary = cx.primary();
    let centered = styles.logo_position == LogoPosition::Center;

    let header = if centered {
        el(Tag::Div, "flex justify-between items-start mb-12 flex-col items-center text-center")
            .child(el(Tag::Div, "flex flex-col items-center w-full").child_opt(cx.logo("h-16 w-auto object-contain mb-4 mx-auto")))
    } else {
        let titles = if styles.uppercase_titles { "uppercase tracking-widest" } else { "" };
        el(Tag::Div, "flex justify-between items-start mb-12")
            .child(
                el(Tag::Div, "flex flex-col max-w-[60%]")
                    .child_opt(cx.logo("h-16 w-auto object-contain mb-4"))
                    .child(el(Tag::H1, format!("text-xl font-bold {primary} break-words")).text(d.sender.name.clone()))
                    .child(el(Tag::P, "text-sm text-slate-500 whitespace-pre-line mt-1").text(d.sender.address.clone()))
                    .child(el(Tag::P, "text-sm text-slate-500").text(d.sender.email.clone())),
            )
            .child(
                el(Tag::Div, "text-right")
                    .child(el(Tag::H2, format!("text-4xl font-light {titles} {primary}")).text(d.document_title.clone()))
                    .child(el(Tag::P, "text-slate-500 font-mono mt-1").text(format!("#{}", d.invoice_number)))
                    .child(el(Tag::P, "text-slate-400 text-sm").text(d.date.clone())),
            )
    };

    let band = centered.then(|| {
        el(Tag::Div, "text-center mb-12 border-y py-6 border-slate-100 w-full")
            .child(el(Tag::H1, format!("text-3xl font-bold uppercase tracking-widest {primary} mb-2")).text(d.sender.name.clone()))
            .child(
                el(Tag::Div, "flex justify-center gap-6 text-sm text-slate-500")
                    .child(el(Tag::Span, "").text(d.sender.address.replace('\n', ", ")))
                    .child(el(Tag::Span, "").text(d.sender.email.clone())),
            )
    });

    let label = "text-xs font-bold text-slate-300 uppercase tracking-wider mb-2 block";
    let recipient = el(Tag::Div, "flex justify-between items-end mb-12")
        .child(
            el(Tag::Div, "max-w-[50%]")
                .child(el(Tag::Span, label).text("Bill To"))
                .child(el(Tag::H3, "text-lg font-bold text-slate-800 whitespace-pre-line break-words").text(d.recipient.name.clone()))
                .child(el(Tag::P, "text-sm text-slate-600 whitespace-pre-line break-words").text(d.recipient.address.clone()))
                .child(el(Tag::P, "text-sm text-slate-600").text(d.recipient.email.clone())),
        )
        .child_opt(centered.then(|| {
            el(Tag::Div, "text-right")
                .child(el(Tag::Span, label).text("Invoice Details"))
                .child(el(Tag::P, "font-bold text-slate-800").text(format!("{} #{}", d.document_title, d.invoice_number)))
                .child(el(Tag::P, "text-sm text-slate-600").text(d.date.clone()))
        }));

    let notes = (!d.notes.is_empty()).then(|| {
        el(Tag::P, "text-sm text-slate-600 mb-2 whitespace-pre-line")
            .child(el(Tag::Span, "font-bold").text("Notes:"))
            .text(format!(" {}", d.notes))
    });
    let footer = el(Tag::Div, "pt-8 border-t border-slate-100 flex justify-between items-end")
        .child(
            el(Tag::Div, "w-2/3 pr-8")
                .child_opt(notes)
                .child_opt(
                    (!d.terms.is_empty())
                        .then(|| el(Tag::P, "text-xs text-slate-400 whitespace-pre-line").text(d.terms.clone())),
                ),
        )
        .child_opt(signature(cx));

    el(Tag::Div, "p-14 h-full flex flex-col min-h-[1123px]")
        .child(header)
        .child_opt(band)
        .child(recipient)
        .child(items_table(cx))
        .child(el(Tag::Div, "flex justify-end mb-12 mt-auto").child(el(Tag::Div, "w-5/12").child(totals(cx))))
        .child(footer)
}

#[cfg(test)]
mod tests {
    use super::super::render_html;
    use crate::model::{InvoiceDocument, Party};
    use crate::templates::TemplateSelector;

    fn doc() -> InvoiceDocument {
        InvoiceDocument {
            date: "2024-05-01".into(),
            recipient: Party::new("Globex", "1 Main St\nSpringfield", "ap@globex.test"),
            ..InvoiceDocument::default()
        }
    }

    #[test]
    fn centered_logo_moves_identity_beside_the_recipient() {
        let out = render_html(&doc(), TemplateSelector::TimelessCentered);
        assert!(out.contains("Invoice Details"));
        assert!(out.contains("INVOICE #INV-001"));
        assert!(out.contains("123 Business Rd, Tech City, TC 90210"));
    }

    #[test]
    fn left_logo_keeps_the_split_header() {
        let out = render_html(&doc(), TemplateSelector::StandardBlue);
        assert!(!out.contains("Invoice Details"));
        assert!(out.contains("uppercase tracking-widest text-blue-600"));
        assert!(out.contains("Notes:"));
    }

    #[test]
    fn sidebar_side_follows_the_archetype() {
        let left = render_html(&doc(), TemplateSelector::SidebarNavy);
        let right = render_html(&doc(), TemplateSelector::SidebarRightGray);
        let at = |html: &str, needle: &str| html.find(needle).unwrap();
        assert!(at(&left, "w-[32%]") < at(&left, "flex-1 p-8"));
        assert!(at(&right, "w-[32%]") > at(&right, "flex-1 p-8"));
        assert!(left.contains("Note:"));
    }

    #[test]
    fn header_band_uses_the_template_fill() {
        let out = render_html(&doc(), TemplateSelector::CreativeGradient);
        assert!(out.contains("bg-gradient-to-r from-blue-600 to-purple-600 text-white"));
        let out = render_html(&doc(), TemplateSelector::BoldHeaderBlue);
        assert!(out.contains("bg-blue-700 text-white p-10"));
    }

    #[test]
    fn grid_tints_only_the_sender_panel() {
        let out = render_html(&doc(), TemplateSelector::GridTech);
        assert!(out.contains("p-4 border border-cyan-200 rounded-lg bg-cyan-50"));
        assert!(out.contains(r#"class="p-4 border border-cyan-200 rounded-lg""#));
    }

    #[test]
    fn empty_notes_and_terms_leave_no_blocks() {
        let mut d = doc();
        d.notes.clear();
        d.terms.clear();
        for selector in TemplateSelector::ALL {
            let out = render_html(&d, selector);
            assert!(!out.contains("Notes"), "{selector}");
            assert!(!out.contains("Terms"), "{selector}");
        }
    }
}
