//! # invoice-forge: template-driven invoice rendering and export
//!
//! An invoice document is rendered through one of 35 visual templates into
//! a styled element tree, then exported as a paginated PDF or a PNG image.
//! The pipeline stages are:
//!
//! 1. **Derive** – subtotal, discount, tax, shipping and total ([`financials`])
//! 2. **Resolve** – template name → colour/style configuration ([`templates`])
//! 3. **Render** – document + configuration → element tree ([`renderer`], [`dom`])
//! 4. **Stage** – isolate the tree off-screen, settle images, lay out with
//!    Taffy and decide natural vs. auto-fit scaling ([`staging`], [`style`],
//!    [`layout`], [`pagination`], [`pipeline`])
//! 5. **Rasterize** – paint the laid-out pages as PDF or PNG ([`raster`])
//!
//! [`export`] ties the stages together and names the output file.
//! Around the pipeline sit local persistence ([`storage`]), an editor state
//! container ([`session`]), optional text generation ([`assist`]) and a
//! simulated e-mail step ([`mail`]). A C-compatible surface is exposed via
//! [`ffi`].

pub mod assist;
pub mod config;
pub mod dom;
pub mod error;
pub mod export;
pub mod ffi;
pub mod filename;
pub mod financials;
pub mod fonts;
pub mod layout;
pub mod layout_config;
pub mod mail;
pub mod model;
pub mod pagination;
pub mod pipeline;
pub mod raster;
pub mod renderer;
pub mod session;
pub mod staging;
pub mod storage;
pub mod style;
pub mod templates;

pub use error::{Error, Result};
pub use export::{ExportArtifact, Exporter};
pub use financials::DerivedFinancials;
pub use model::InvoiceDocument;
pub use raster::ExportFormat;
pub use templates::TemplateSelector;
