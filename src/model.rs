//! Invoice data model – the aggregate the editor mutates and the renderer
//! reads.
//!
//! Every field has a default so a document is always renderable, and every
//! numeric field deserialises leniently: numbers, numeric strings, `null`
//! or garbage all become a finite `f64` (garbage → `0.0`).

use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Numeric coercion
// ---------------------------------------------------------------------------

/// Coerce raw user text into a number. Anything that does not parse to a
/// finite value becomes `0.0`.
pub fn coerce_number(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Clamp a rate or amount so negative, NaN or infinite values count as zero.
pub fn non_negative(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        0.0
    }
}

fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0),
        serde_json::Value::String(s) => coerce_number(&s),
        serde_json::Value::Bool(b) => {
            if b {
                1.0
            } else {
                0.0
            }
        }
        _ => 0.0,
    })
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

// ---------------------------------------------------------------------------
// Line items
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvoiceItem {
    pub id: String,
    pub description: String,
    #[serde(deserialize_with = "lenient_number")]
    pub quantity: f64,
    #[serde(alias = "price", deserialize_with = "lenient_number")]
    pub unit_price: f64,
}

impl InvoiceItem {
    /// A blank row as created by "add item": quantity 1, price 0.
    pub fn blank(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            quantity: 1.0,
            unit_price: 0.0,
        }
    }

    pub fn line_total(&self) -> f64 {
        self.quantity * self.unit_price
    }
}

impl Default for InvoiceItem {
    fn default() -> Self {
        Self::blank(String::new())
    }
}

// ---------------------------------------------------------------------------
// Parties
// ---------------------------------------------------------------------------

/// Sender or recipient identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Party {
    pub name: String,
    /// Multi-line postal address.
    pub address: String,
    /// Contact line, usually an e-mail address.
    pub email: String,
}

impl Party {
    pub fn new(name: &str, address: &str, email: &str) -> Self {
        Self {
            name: name.to_string(),
            address: address.to_string(),
            email: email.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Styling selectors
// ---------------------------------------------------------------------------

/// Typography choices offered by the editor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontChoice {
    #[default]
    #[serde(rename = "font-sans")]
    Sans,
    #[serde(rename = "font-serif")]
    Serif,
    #[serde(rename = "font-mono")]
    Mono,
    #[serde(rename = "font-opensans")]
    OpenSans,
    #[serde(rename = "font-lato")]
    Lato,
    #[serde(rename = "font-montserrat")]
    Montserrat,
    #[serde(rename = "font-raleway")]
    Raleway,
    #[serde(rename = "font-poppins")]
    Poppins,
    #[serde(rename = "font-oswald")]
    Oswald,
    #[serde(rename = "font-merriweather")]
    Merriweather,
    #[serde(rename = "font-lora")]
    Lora,
    #[serde(rename = "font-ptserif")]
    PtSerif,
    #[serde(rename = "font-crimson")]
    Crimson,
    #[serde(rename = "font-garamond")]
    Garamond,
    #[serde(rename = "font-inconsolata")]
    Inconsolata,
}

/// The three paint families every typography choice collapses onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFamily {
    Sans,
    Serif,
    Mono,
}

impl FontFamily {
    /// Family name understood by the style resolver and the rasterizers.
    pub fn name(self) -> &'static str {
        match self {
            FontFamily::Sans => "Helvetica",
            FontFamily::Serif => "Times",
            FontFamily::Mono => "Courier",
        }
    }

    /// Utility class selecting this family on a rendered element.
    pub fn class(self) -> &'static str {
        match self {
            FontFamily::Sans => "font-sans",
            FontFamily::Serif => "font-serif",
            FontFamily::Mono => "font-mono",
        }
    }
}

impl FontChoice {
    pub const ALL: [FontChoice; 15] = [
        FontChoice::Sans,
        FontChoice::Serif,
        FontChoice::Mono,
        FontChoice::OpenSans,
        FontChoice::Lato,
        FontChoice::Montserrat,
        FontChoice::Raleway,
        FontChoice::Poppins,
        FontChoice::Oswald,
        FontChoice::Merriweather,
        FontChoice::Lora,
        FontChoice::PtSerif,
        FontChoice::Crimson,
        FontChoice::Garamond,
        FontChoice::Inconsolata,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FontChoice::Sans => "Inter (Standard)",
            FontChoice::Serif => "Playfair (Elegant)",
            FontChoice::Mono => "Roboto (Code)",
            FontChoice::OpenSans => "Open Sans",
            FontChoice::Lato => "Lato",
            FontChoice::Montserrat => "Montserrat",
            FontChoice::Raleway => "Raleway",
            FontChoice::Poppins => "Poppins",
            FontChoice::Oswald => "Oswald (Tall)",
            FontChoice::Merriweather => "Merriweather",
            FontChoice::Lora => "Lora",
            FontChoice::PtSerif => "PT Serif",
            FontChoice::Crimson => "Crimson Text",
            FontChoice::Garamond => "EB Garamond",
            FontChoice::Inconsolata => "Inconsolata",
        }
    }

    pub fn family(self) -> FontFamily {
        match self {
            FontChoice::Serif
            | FontChoice::Merriweather
            | FontChoice::Lora
            | FontChoice::PtSerif
            | FontChoice::Crimson
            | FontChoice::Garamond => FontFamily::Serif,
            FontChoice::Mono | FontChoice::Inconsolata => FontFamily::Mono,
            _ => FontFamily::Sans,
        }
    }
}

/// Paper (page background) styles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaperStyle {
    #[default]
    #[serde(rename = "bg-white")]
    White,
    #[serde(rename = "bg-ivory")]
    Ivory,
    #[serde(rename = "bg-snow")]
    Snow,
    #[serde(rename = "bg-border-left")]
    LeftStrip,
    #[serde(rename = "bg-border-top")]
    TopBar,
    #[serde(rename = "bg-border-frame")]
    Frame,
    #[serde(rename = "bg-border-double")]
    DoubleLine,
    #[serde(rename = "bg-split-v")]
    SidebarTint,
    #[serde(rename = "bg-grad-subtle")]
    SoftFade,
}

impl PaperStyle {
    pub const ALL: [PaperStyle; 9] = [
        PaperStyle::White,
        PaperStyle::Ivory,
        PaperStyle::Snow,
        PaperStyle::LeftStrip,
        PaperStyle::TopBar,
        PaperStyle::Frame,
        PaperStyle::DoubleLine,
        PaperStyle::SidebarTint,
        PaperStyle::SoftFade,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PaperStyle::White => "Pure White",
            PaperStyle::Ivory => "Warm Ivory",
            PaperStyle::Snow => "Soft Snow",
            PaperStyle::LeftStrip => "Blue Left Strip",
            PaperStyle::TopBar => "Dark Top Bar",
            PaperStyle::Frame => "Classic Frame",
            PaperStyle::DoubleLine => "Double Line",
            PaperStyle::SidebarTint => "Sidebar Tint",
            PaperStyle::SoftFade => "Soft Fade",
        }
    }
}

/// Document kinds offered by the editor. The kind itself is free text.
pub const DOCUMENT_KINDS: [&str; 6] = [
    "INVOICE",
    "RECEIPT",
    "QUOTE",
    "ESTIMATE",
    "CREDIT NOTE",
    "PURCHASE ORDER",
];

/// Currency presets as `(label, symbol)`.
pub const CURRENCIES: [(&str, &str); 7] = [
    ("USD ($)", "$"),
    ("EUR (€)", "€"),
    ("GBP (£)", "£"),
    ("MYR (RM)", "RM"),
    ("CNY (¥)", "¥"),
    ("CAD (C$)", "C$"),
    ("AUD (A$)", "A$"),
];

// ---------------------------------------------------------------------------
// The document
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvoiceDocument {
    /// Free-form kind label, e.g. "INVOICE".
    pub document_title: String,
    pub invoice_number: String,
    pub date: String,
    /// Display-only currency symbol.
    pub currency: String,
    pub font: FontChoice,
    pub background: PaperStyle,

    pub sender: Party,
    /// Logo image reference: data URI, file path or URL.
    #[serde(deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    pub recipient: Party,

    /// Display order is insertion order.
    pub items: Vec<InvoiceItem>,
    #[serde(deserialize_with = "lenient_number")]
    pub discount_rate: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub tax_rate: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub shipping_amount: f64,

    pub notes: String,
    pub terms: String,
    #[serde(deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl Default for InvoiceDocument {
    fn default() -> Self {
        Self {
            document_title: "INVOICE".to_string(),
            invoice_number: "INV-001".to_string(),
            date: chrono::Local::now().format("%Y-%m-%d").to_string(),
            currency: "$".to_string(),
            font: FontChoice::Sans,
            background: PaperStyle::White,
            sender: Party::new(
                "Acme Corp",
                "123 Business Rd\nTech City, TC 90210",
                "billing@acmecorp.com",
            ),
            logo: None,
            recipient: Party::default(),
            items: vec![InvoiceItem {
                id: "1".to_string(),
                description: "Professional Services".to_string(),
                quantity: 1.0,
                unit_price: 1000.0,
            }],
            discount_rate: 0.0,
            tax_rate: 0.0,
            shipping_amount: 0.0,
            notes: "Thank you for your business!".to_string(),
            terms: "Payment is due within 30 days.".to_string(),
            signature: None,
        }
    }
}

impl InvoiceDocument {
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn item(&self, id: &str) -> Option<&InvoiceItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// True when every item id is distinct.
    pub fn has_unique_item_ids(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        self.items.iter().all(|i| seen.insert(i.id.as_str()))
    }
}

// ---------------------------------------------------------------------------
// Saved profiles
// ---------------------------------------------------------------------------

/// Address-book entry for a sender or client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub email: String,
    #[serde(
        default,
        alias = "logoUrl",
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub logo: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileKind {
    Sender,
    Client,
}

impl ProfileKind {
    pub fn label(self) -> &'static str {
        match self {
            ProfileKind::Sender => "Sender",
            ProfileKind::Client => "Client",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerce_rejects_garbage() {
        assert_eq!(coerce_number("12.5"), 12.5);
        assert_eq!(coerce_number(" 3 "), 3.0);
        assert_eq!(coerce_number("abc"), 0.0);
        assert_eq!(coerce_number(""), 0.0);
        assert_eq!(coerce_number("inf"), 0.0);
    }

    #[test]
    fn lenient_fields_accept_strings_and_nulls() {
        let json = r#"{
            "items": [{"id": "a", "description": "x", "quantity": "2", "price": "oops"}],
            "taxRate": null,
            "discountRate": "10",
            "shippingAmount": {}
        }"#;
        let doc = InvoiceDocument::from_json(json).unwrap();
        assert_eq!(doc.items[0].quantity, 2.0);
        assert_eq!(doc.items[0].unit_price, 0.0);
        assert_eq!(doc.tax_rate, 0.0);
        assert_eq!(doc.discount_rate, 10.0);
        assert_eq!(doc.shipping_amount, 0.0);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let doc = InvoiceDocument::from_json("{}").unwrap();
        assert_eq!(doc.document_title, "INVOICE");
        assert_eq!(doc.currency, "$");
        assert_eq!(doc.items.len(), 1);
        assert!(doc.logo.is_none());
    }

    #[test]
    fn empty_logo_is_absent() {
        let doc = InvoiceDocument::from_json(r#"{"logo": "  "}"#).unwrap();
        assert!(doc.logo.is_none());
    }

    #[test]
    fn font_families() {
        assert_eq!(FontChoice::Garamond.family(), FontFamily::Serif);
        assert_eq!(FontChoice::Inconsolata.family(), FontFamily::Mono);
        assert_eq!(FontChoice::Poppins.family(), FontFamily::Sans);
    }

    #[test]
    fn duplicate_item_ids_detected() {
        let mut doc = InvoiceDocument::default();
        doc.items.push(InvoiceItem::blank("1"));
        assert!(!doc.has_unique_item_ids());
    }
}
