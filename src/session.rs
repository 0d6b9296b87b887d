//! Editor state container.
//!
//! Holds the document being edited, the chosen template, which editor
//! sections are expanded and who is signed in. Created with defaults,
//! torn down explicitly; pending edits are flushed to the draft slot on
//! teardown.

use std::sync::Arc;

use uuid::Uuid;

use crate::error::Result;
use crate::financials::DerivedFinancials;
use crate::model::{coerce_number, non_negative, FontChoice, InvoiceDocument, InvoiceItem, PaperStyle, ProfileKind, SavedProfile};
use crate::renderer;
use crate::storage::{self, KeyValueStore};
use crate::templates::TemplateSelector;

/// Name used when signing in without an e-mail address.
pub const ANONYMOUS_USER: &str = "User";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Details,
    Design,
    People,
    Items,
    Totals,
    Footer,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Details,
        Section::Design,
        Section::People,
        Section::Items,
        Section::Totals,
        Section::Footer,
    ];

    pub fn open_by_default(self) -> bool {
        matches!(self, Section::Details | Section::Items | Section::Totals)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Editable text and numeric fields of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    DocumentTitle,
    InvoiceNumber,
    Date,
    Currency,
    SenderName,
    SenderAddress,
    SenderEmail,
    RecipientName,
    RecipientAddress,
    RecipientEmail,
    DiscountRate,
    TaxRate,
    ShippingAmount,
    Notes,
    Terms,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemField {
    Description,
    Quantity,
    UnitPrice,
}

pub struct EditorSession {
    store: Arc<dyn KeyValueStore>,
    document: InvoiceDocument,
    template: TemplateSelector,
    sections: [bool; 6],
    user: Option<String>,
    dirty: bool,
}

impl EditorSession {
    /// Default document and sections; the signed-in user is restored.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let user = storage::current_user(store.as_ref())?;
        Ok(Self {
            store,
            document: InvoiceDocument::default(),
            template: TemplateSelector::default(),
            sections: Section::ALL.map(Section::open_by_default),
            user,
            dirty: false,
        })
    }

    pub fn document(&self) -> &InvoiceDocument {
        &self.document
    }

    pub fn replace_document(&mut self, document: InvoiceDocument) {
        self.document = document;
        self.dirty = true;
    }

    pub fn template(&self) -> TemplateSelector {
        self.template
    }

    pub fn set_template(&mut self, template: TemplateSelector) {
        self.template = template;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    // -- sections ------------------------------------------------------------

    pub fn is_open(&self, section: Section) -> bool {
        self.sections[section.index()]
    }

    pub fn toggle(&mut self, section: Section) -> bool {
        let open = &mut self.sections[section.index()];
        *open = !*open;
        *open
    }

    // -- edits ---------------------------------------------------------------

    /// Set a document field from raw input; numeric fields are coerced.
    pub fn set_field(&mut self, field: Field, raw: &str) {
        let d = &mut self.document;
        let text = raw.to_string();
        match field {
            Field::DocumentTitle => d.document_title = text,
            Field::InvoiceNumber => d.invoice_number = text,
            Field::Date => d.date = text,
            Field::Currency => d.currency = text,
            Field::SenderName => d.sender.name = text,
            Field::SenderAddress => d.sender.address = text,
            Field::SenderEmail => d.sender.email = text,
            Field::RecipientName => d.recipient.name = text,
            Field::RecipientAddress => d.recipient.address = text,
            Field::RecipientEmail => d.recipient.email = text,
            Field::DiscountRate => d.discount_rate = coerce_number(raw),
            Field::TaxRate => d.tax_rate = coerce_number(raw),
            Field::ShippingAmount => d.shipping_amount = coerce_number(raw),
            Field::Notes => d.notes = text,
            Field::Terms => d.terms = text,
        }
        self.dirty = true;
    }

    pub fn set_font(&mut self, font: FontChoice) {
        self.document.font = font;
        self.dirty = true;
    }

    pub fn set_background(&mut self, paper: PaperStyle) {
        self.document.background = paper;
        self.dirty = true;
    }

    /// `None` or an empty reference clears the logo.
    pub fn set_logo(&mut self, logo: Option<String>) {
        self.document.logo = logo.filter(|l| !l.trim().is_empty());
        self.dirty = true;
    }

    pub fn set_signature(&mut self, signature: Option<String>) {
        self.document.signature = signature.filter(|s| !s.trim().is_empty());
        self.dirty = true;
    }

    /// Append a blank row (quantity 1, price 0) under a fresh id.
    pub fn add_item(&mut self) -> String {
        let id = Uuid::new_v4().to_string();
        self.document.items.push(InvoiceItem::blank(id.clone()));
        self.dirty = true;
        id
    }

    pub fn remove_item(&mut self, id: &str) -> bool {
        let before = self.document.items.len();
        self.document.items.retain(|item| item.id != id);
        let removed = self.document.items.len() != before;
        self.dirty |= removed;
        removed
    }

    pub fn edit_item(&mut self, id: &str, field: ItemField, raw: &str) -> bool {
        let Some(item) = self.document.items.iter_mut().find(|i| i.id == id) else {
            return false;
        };
        match field {
            ItemField::Description => item.description = raw.to_string(),
            ItemField::Quantity => item.quantity = non_negative(coerce_number(raw)),
            ItemField::UnitPrice => item.unit_price = coerce_number(raw),
        }
        self.dirty = true;
        true
    }

    /// Replace the invoice number with a random `INV-NNNN` (1000-9999).
    pub fn generate_invoice_number(&mut self) -> &str {
        let n = 1000 + (Uuid::new_v4().as_u128() % 9000) as u32;
        self.document.invoice_number = format!("INV-{n}");
        self.dirty = true;
        &self.document.invoice_number
    }

    // -- derived views -------------------------------------------------------

    pub fn financials(&self) -> DerivedFinancials {
        DerivedFinancials::for_document(&self.document)
    }

    pub fn preview_html(&self) -> String {
        renderer::render_html(&self.document, self.template)
    }

    // -- drafts and profiles -------------------------------------------------

    pub fn save_draft(&mut self) -> Result<()> {
        storage::save_draft(self.store.as_ref(), &self.document)?;
        self.dirty = false;
        Ok(())
    }

    /// Replace the document with the stored draft. Returns `false`, leaving
    /// the document untouched, when there is none.
    pub fn load_draft(&mut self) -> Result<bool> {
        match storage::load_draft(self.store.as_ref())? {
            Some(doc) => {
                self.document = doc;
                self.dirty = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Save the current sender (with logo) or recipient as a profile.
    pub fn save_profile(&self, kind: ProfileKind) -> Result<SavedProfile> {
        let d = &self.document;
        let (party, logo) = match kind {
            ProfileKind::Sender => (&d.sender, d.logo.clone()),
            ProfileKind::Client => (&d.recipient, None),
        };
        let profile = SavedProfile {
            id: Uuid::new_v4().to_string(),
            name: party.name.clone(),
            address: party.address.clone(),
            email: party.email.clone(),
            logo,
        };
        storage::save_profile(self.store.as_ref(), kind, profile)
    }

    pub fn profiles(&self, kind: ProfileKind) -> Result<Vec<SavedProfile>> {
        storage::load_profiles(self.store.as_ref(), kind)
    }

    /// Copy a profile into the sender or recipient. A sender profile
    /// without a logo keeps the current one.
    pub fn apply_profile(&mut self, kind: ProfileKind, profile: &SavedProfile) {
        let d = &mut self.document;
        let party = match kind {
            ProfileKind::Sender => {
                if profile.logo.is_some() {
                    d.logo = profile.logo.clone();
                }
                &mut d.sender
            }
            ProfileKind::Client => &mut d.recipient,
        };
        party.name = profile.name.clone();
        party.address = profile.address.clone();
        party.email = profile.email.clone();
        self.dirty = true;
    }

    // -- sign-in -------------------------------------------------------------

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn login(&mut self, email: &str) -> Result<&str> {
        let email = email.trim();
        let user = if email.is_empty() { ANONYMOUS_USER } else { email };
        storage::set_user(self.store.as_ref(), user)?;
        Ok(self.user.insert(user.to_string()).as_str())
    }

    pub fn logout(&mut self) -> Result<()> {
        storage::clear_user(self.store.as_ref())?;
        self.user = None;
        Ok(())
    }

    /// Flush unsaved edits to the draft slot and close the session.
    pub fn teardown(mut self) -> Result<()> {
        if self.dirty {
            self.save_draft()?;
            log::debug!("flushed draft on teardown");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn session() -> (EditorSession, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (EditorSession::new(store.clone()).unwrap(), store)
    }

    #[test]
    fn sections_start_with_defaults() {
        let (mut s, _) = session();
        let open: Vec<bool> = Section::ALL.iter().map(|&sec| s.is_open(sec)).collect();
        assert_eq!(open, vec![true, false, false, true, true, false]);
        assert!(s.toggle(Section::Design));
        assert!(!s.toggle(Section::Design));
    }

    #[test]
    fn items_are_added_edited_and_removed() {
        let (mut s, _) = session();
        let id = s.add_item();
        let item = s.document().item(&id).unwrap();
        assert_eq!((item.quantity, item.unit_price), (1.0, 0.0));

        assert!(s.edit_item(&id, ItemField::Quantity, "3"));
        assert!(s.edit_item(&id, ItemField::UnitPrice, "abc"));
        assert_eq!(s.document().item(&id).unwrap().quantity, 3.0);
        assert_eq!(s.document().item(&id).unwrap().unit_price, 0.0);
        assert!(s.document().has_unique_item_ids());

        assert!(s.edit_item(&id, ItemField::Quantity, "-3"));
        assert_eq!(s.document().item(&id).unwrap().quantity, 0.0);

        assert!(s.remove_item(&id));
        assert!(!s.remove_item(&id));
        assert!(!s.edit_item(&id, ItemField::Description, "x"));
    }

    #[test]
    fn numeric_fields_coerce_garbage_to_zero() {
        let (mut s, _) = session();
        s.set_field(Field::TaxRate, "ten");
        s.set_field(Field::ShippingAmount, " 12.5 ");
        assert_eq!(s.document().tax_rate, 0.0);
        assert_eq!(s.document().shipping_amount, 12.5);
        assert_eq!(s.financials().total, 1012.5);
    }

    #[test]
    fn generated_numbers_are_four_digits() {
        let (mut s, _) = session();
        for _ in 0..50 {
            let n = s.generate_invoice_number().to_string();
            let digits: u32 = n.strip_prefix("INV-").unwrap().parse().unwrap();
            assert!((1000..=9999).contains(&digits), "{n}");
        }
    }

    #[test]
    fn sender_profile_keeps_logo_when_absent() {
        let (mut s, _) = session();
        s.set_logo(Some("data:image/png;base64,AAAA".into()));
        let profile = SavedProfile {
            id: "p".into(),
            name: "Initech".into(),
            address: "4 Loop".into(),
            email: "hi@initech.test".into(),
            logo: None,
        };
        s.apply_profile(ProfileKind::Sender, &profile);
        assert_eq!(s.document().sender.name, "Initech");
        assert!(s.document().logo.is_some());

        s.apply_profile(ProfileKind::Client, &profile);
        assert_eq!(s.document().recipient.email, "hi@initech.test");
    }

    #[test]
    fn saved_profiles_carry_the_logo_for_senders_only() {
        let (mut s, _) = session();
        s.set_logo(Some("logo.png".into()));
        s.set_field(Field::RecipientName, "Globex");
        assert_eq!(s.save_profile(ProfileKind::Sender).unwrap().logo.as_deref(), Some("logo.png"));
        assert_eq!(s.save_profile(ProfileKind::Client).unwrap().logo, None);
        assert!(s.save_profile(ProfileKind::Client).is_ok());
        assert_eq!(s.profiles(ProfileKind::Client).unwrap().len(), 1);
    }

    #[test]
    fn login_defaults_and_persists() {
        let (mut s, store) = session();
        assert_eq!(s.login("  ").unwrap(), ANONYMOUS_USER);
        let again = EditorSession::new(store.clone()).unwrap();
        assert_eq!(again.user(), Some(ANONYMOUS_USER));
        s.logout().unwrap();
        assert_eq!(EditorSession::new(store).unwrap().user(), None);
    }

    #[test]
    fn teardown_flushes_pending_edits() {
        let (mut s, store) = session();
        s.set_field(Field::Notes, "Net 15");
        s.teardown().unwrap();
        let draft = storage::load_draft(store.as_ref()).unwrap().unwrap();
        assert_eq!(draft.notes, "Net 15");

        let mut s = EditorSession::new(store).unwrap();
        assert!(s.load_draft().unwrap());
        assert_eq!(s.document().notes, "Net 15");
        assert!(!s.is_dirty());
    }

    #[test]
    fn design_choices_flow_into_the_preview() {
        let (mut s, _) = session();
        s.set_template(TemplateSelector::GridTech);
        s.set_font(FontChoice::Garamond);
        s.set_background(PaperStyle::Ivory);
        s.set_signature(Some("sig.png".into()));
        assert_eq!(s.template(), TemplateSelector::GridTech);
        let html = s.preview_html();
        assert!(html.contains("font-serif"));
        assert!(html.contains("Authorized Signature"));

        s.set_signature(Some("  ".into()));
        assert_eq!(s.document().signature, None);
    }

    #[test]
    fn replacing_the_document_marks_it_dirty() {
        let (mut s, _) = session();
        assert!(!s.is_dirty());
        let mut doc = InvoiceDocument::default();
        doc.invoice_number = "INV-7".into();
        s.replace_document(doc);
        assert!(s.is_dirty());
        s.save_draft().unwrap();
        assert!(!s.is_dirty());
    }
}
