//! invoice-forge: render, export and manage invoices from the command line.
//!
//! Usage:
//!   invoice-forge [--config PATH] [--store PATH] <command>
//!
//! Documents are read as JSON (`InvoiceDocument`). Set `RUST_LOG=debug` for
//! staging and export diagnostics.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};

use invoice_forge::assist::{AssistContext, GeminiGenerator, TextGenerator};
use invoice_forge::config::AppConfig;
use invoice_forge::dom::{self, DomNode};
use invoice_forge::error::{Error, Result};
use invoice_forge::export::Exporter;
use invoice_forge::financials::{format_currency, DerivedFinancials};
use invoice_forge::fonts::FontManager;
use invoice_forge::mail::{self, EmailDraft};
use invoice_forge::model::{self, FontChoice, InvoiceDocument, PaperStyle, ProfileKind, SavedProfile};
use invoice_forge::raster::ExportFormat;
use invoice_forge::renderer::render_named;
use invoice_forge::session::EditorSession;
use invoice_forge::storage::{self, FileStore};
use invoice_forge::templates::{self, TemplateSelector};

#[derive(Parser)]
#[command(name = "invoice-forge", version, about = "Template-driven invoice renderer")]
struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Key-value store file for drafts, profiles and sign-in
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List templates with their design family and layout
    Templates,
    /// List document kinds, currencies, fonts and paper styles
    Presets,
    /// Render preview HTML
    Render {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value = "STANDARD_BLUE")]
        template: String,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Export a PDF or PNG; prints the written path
    Export {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value = "STANDARD_BLUE")]
        template: String,
        #[arg(long, default_value = "pdf")]
        format: ExportFormat,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        /// TrueType font used to paint PNG text
        #[arg(long)]
        font: Option<PathBuf>,
    },
    /// Print derived financials
    Totals {
        #[arg(long)]
        input: PathBuf,
    },
    /// Save or show the autosaved draft
    Draft {
        #[command(subcommand)]
        action: DraftAction,
    },
    /// Manage saved sender and client profiles
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Sign in; an empty address signs in as "User"
    Login {
        #[arg(default_value = "")]
        email: String,
    },
    Logout,
    Whoami,
    /// Generate notes, terms or a description
    Assist {
        #[arg(long, value_enum, default_value_t = ContextArg::Notes)]
        context: ContextArg,
        prompt: String,
    },
    /// Simulate e-mailing an invoice
    Email {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        to: String,
    },
}

#[derive(Subcommand)]
enum DraftAction {
    Save {
        #[arg(long)]
        input: PathBuf,
    },
    Show,
}

#[derive(Subcommand)]
enum ProfileAction {
    List {
        #[arg(long, value_enum)]
        kind: KindArg,
    },
    Save {
        #[arg(long, value_enum)]
        kind: KindArg,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        address: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long)]
        logo: Option<String>,
    },
    Delete {
        #[arg(long, value_enum)]
        kind: KindArg,
        id: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Sender,
    Client,
}

impl From<KindArg> for ProfileKind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::Sender => ProfileKind::Sender,
            KindArg::Client => ProfileKind::Client,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ContextArg {
    Notes,
    Terms,
    Description,
}

impl From<ContextArg> for AssistContext {
    fn from(c: ContextArg) -> Self {
        match c {
            ContextArg::Notes => AssistContext::Notes,
            ContextArg::Terms => AssistContext::TermsAndConditions,
            ContextArg::Description => AssistContext::InvoiceDescription,
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load(cli.config.as_deref())?;
    let store_path = cli.store.clone().or_else(|| config.store_path());
    let open_store = || -> Result<FileStore> {
        let path = store_path
            .clone()
            .ok_or_else(|| Error::Storage("no store location; pass --store".into()))?;
        FileStore::open(path)
    };

    match cli.command {
        Command::Templates => {
            for selector in TemplateSelector::ALL {
                let layout = templates::resolve(selector).layout;
                println!("{:<22} {:<22} {:<16} {:?}", selector.name(), selector.label(), selector.family().label(), layout);
            }
        }
        Command::Presets => {
            println!("Document kinds: {}", model::DOCUMENT_KINDS.join(", "));
            let currencies: Vec<_> = model::CURRENCIES.iter().map(|(label, _)| *label).collect();
            println!("Currencies:     {}", currencies.join(", "));
            let fonts: Vec<_> = FontChoice::ALL.iter().map(|f| f.label()).collect();
            println!("Fonts:          {}", fonts.join(", "));
            let papers: Vec<_> = PaperStyle::ALL.iter().map(|p| p.label()).collect();
            println!("Paper styles:   {}", papers.join(", "));
        }
        Command::Render { input, template, output } => {
            let doc = read_document(&input)?;
            let html = dom::to_html(&[DomNode::from(render_named(&doc, &template))]);
            match output {
                Some(path) => fs::write(path, html)?,
                None => println!("{html}"),
            }
        }
        Command::Export { input, template, format, out_dir, font } => {
            let doc = read_document(&input)?;
            let mut fonts = FontManager::new();
            if let Some(path) = font {
                fonts.load_fallback_file(&path)?;
            }
            let exporter = Exporter::with_defaults(&config.export, fonts);
            let artifact = runtime()?.block_on(exporter.export_named(&doc, &template, format))?;
            let path = artifact.write_to(&out_dir)?;
            println!("{}", path.display());
        }
        Command::Totals { input } => {
            let doc = read_document(&input)?;
            print_totals(&doc);
        }
        Command::Draft { action } => {
            let store = open_store()?;
            match action {
                DraftAction::Save { input } => {
                    storage::save_draft(&store, &read_document(&input)?)?;
                    println!("Draft saved");
                }
                DraftAction::Show => match storage::load_draft(&store)? {
                    Some(doc) => println!("{}", doc.to_json()?),
                    None => println!("No draft"),
                },
            }
        }
        Command::Profile { action } => {
            let store = open_store()?;
            match action {
                ProfileAction::List { kind } => {
                    for p in storage::load_profiles(&store, kind.into())? {
                        println!("{}\t{}\t{}", p.id, p.name, p.email);
                    }
                }
                ProfileAction::Save { kind, name, address, email, logo } => {
                    let profile = SavedProfile {
                        id: String::new(),
                        name,
                        address,
                        email,
                        logo,
                    };
                    let saved = storage::save_profile(&store, kind.into(), profile)?;
                    println!("{}", saved.id);
                }
                ProfileAction::Delete { kind, id } => {
                    if !storage::delete_profile(&store, kind.into(), &id)? {
                        return Err(Error::Storage(format!("no profile with id {id}")));
                    }
                }
            }
        }
        Command::Login { email } => {
            let mut session = EditorSession::new(Arc::new(open_store()?))?;
            println!("Signed in as {}", session.login(&email)?);
        }
        Command::Logout => EditorSession::new(Arc::new(open_store()?))?.logout()?,
        Command::Whoami => match EditorSession::new(Arc::new(open_store()?))?.user() {
            Some(user) => println!("{user}"),
            None => println!("Not signed in"),
        },
        Command::Assist { context, prompt } => {
            let generator = GeminiGenerator::require(&config.assist)?;
            if let Some(text) = runtime()?.block_on(generator.generate(&prompt, context.into()))? {
                println!("{text}");
            }
        }
        Command::Email { input, to } => {
            let doc = read_document(&input)?;
            let draft = EmailDraft::for_document(&doc, &to);
            runtime()?.block_on(mail::send(&draft))?;
            println!("Sent \"{}\" to {}", draft.subject, draft.to);
        }
    }
    Ok(())
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread().enable_all().build()?)
}

fn read_document(path: &Path) -> Result<InvoiceDocument> {
    InvoiceDocument::from_json(&fs::read_to_string(path)?)
}

fn print_totals(doc: &InvoiceDocument) {
    let t = DerivedFinancials::for_document(doc);
    let money = |v: f64| format_currency(v, &doc.currency);
    println!("Subtotal  {}", money(t.subtotal));
    println!("Discount  -{}", money(t.discount_amount));
    println!("Tax       {}", money(t.tax_amount));
    println!("Shipping  {}", money(t.shipping_amount));
    println!("Total     {}", money(t.total));
}
