//! Financial derivation – line items and rates to monetary totals, plus the
//! one currency formatter used everywhere a money value is displayed.

use crate::model::{non_negative, InvoiceDocument, InvoiceItem};

/// Totals derived from a document. Recomputed on every render and never
/// stored alongside the document.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DerivedFinancials {
    pub subtotal: f64,
    pub discount_amount: f64,
    pub taxable_amount: f64,
    pub tax_amount: f64,
    pub shipping_amount: f64,
    pub total: f64,
}

/// Derive totals in a fixed order: discount applies to the subtotal, tax to
/// the post-discount amount, shipping is added last. No rounding happens
/// here.
pub fn derive(
    items: &[InvoiceItem],
    discount_rate: f64,
    tax_rate: f64,
    shipping_amount: f64,
) -> DerivedFinancials {
    let discount_rate = non_negative(discount_rate);
    let tax_rate = non_negative(tax_rate);
    let shipping_amount = non_negative(shipping_amount);

    let subtotal: f64 = items
        .iter()
        .map(|item| finite(item.quantity) * finite(item.unit_price))
        .sum();
    let discount_amount = subtotal * (discount_rate / 100.0);
    let taxable_amount = subtotal - discount_amount;
    let tax_amount = taxable_amount * (tax_rate / 100.0);
    let total = taxable_amount + tax_amount + shipping_amount;

    DerivedFinancials {
        subtotal,
        discount_amount,
        taxable_amount,
        tax_amount,
        shipping_amount,
        total,
    }
}

impl DerivedFinancials {
    pub fn for_document(doc: &InvoiceDocument) -> Self {
        derive(
            &doc.items,
            doc.discount_rate,
            doc.tax_rate,
            doc.shipping_amount,
        )
    }
}

fn finite(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// `symbol` followed by the amount with exactly two fraction digits and
/// comma thousands grouping, e.g. `$1,234.50`. Negative amounts keep the
/// sign after the symbol (`$-5.00`).
pub fn format_currency(amount: f64, symbol: &str) -> String {
    let amount = finite(amount);
    let fixed = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    // "-0.00" is shown as "0.00"
    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{symbol}{sign}{grouped}.{frac_part}")
}

/// Render a quantity or rate without trailing zeros (`2`, `2.5`, `12.75`).
pub fn format_plain(value: f64) -> String {
    let value = finite(value);
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        let s = format!("{value:.4}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
