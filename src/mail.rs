//! Simulated e-mail delivery of an invoice.

use std::time::Duration;

use crate::error::{Error, Result};
use crate::model::InvoiceDocument;

/// Fixed delay standing in for a delivery round trip.
pub const SEND_DELAY: Duration = Duration::from_millis(1500);

pub const BODY: &str = "Please find attached invoice for your recent order.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailDraft {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl EmailDraft {
    pub fn for_document(doc: &InvoiceDocument, to: &str) -> Self {
        Self {
            to: to.trim().to_string(),
            subject: format!("Invoice #{} from My Company", doc.invoice_number),
            body: BODY.to_string(),
        }
    }
}

/// Pretend to send `draft`. Nothing leaves the process.
pub async fn send(draft: &EmailDraft) -> Result<()> {
    if draft.to.is_empty() {
        return Err(Error::Mail("no recipient address".into()));
    }
    tokio::time::sleep(SEND_DELAY).await;
    log::info!("sent \"{}\" to {}", draft.subject, draft.to);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_carries_the_number() {
        let mut doc = InvoiceDocument::default();
        doc.invoice_number = "INV-4821".into();
        let draft = EmailDraft::for_document(&doc, " ap@globex.test ");
        assert_eq!(draft.subject, "Invoice #INV-4821 from My Company");
        assert_eq!(draft.to, "ap@globex.test");
        assert_eq!(draft.body, BODY);
    }

    #[tokio::test(start_paused = true)]
    async fn send_waits_the_fixed_delay() {
        let draft = EmailDraft::for_document(&InvoiceDocument::default(), "a@b.test");
        let start = tokio::time::Instant::now();
        send(&draft).await.unwrap();
        assert!(start.elapsed() >= SEND_DELAY);
    }

    #[tokio::test]
    async fn blank_recipient_is_rejected() {
        let draft = EmailDraft::for_document(&InvoiceDocument::default(), "  ");
        assert!(matches!(send(&draft).await, Err(Error::Mail(_))));
    }
}
