//! Export staging: isolates a rendered tree off screen, waits for its
//! images, lets it settle, then lays it out onto pages.
//!
//! The staged copy is attached to an [`OffscreenHost`] for as long as the
//! returned [`StagedContainer`] lives. Dropping the container detaches it,
//! so every exit path tears the copy down, including early returns and
//! panics inside a rasterizer.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64_STD, Engine as _};
use futures::future::join_all;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::config::ExportConfig;
use crate::dom::{find_by_id, for_each_image_mut, images, parse_html, to_html, DomNode};
use crate::error::{Error, Result};
use crate::fonts::FontManager;
use crate::layout::decode_data_uri;
use crate::layout_config::LayoutConfig;
use crate::pipeline::{layout_pages, FitDecision, PipelineConfig};
use crate::renderer::PREVIEW_ID;

// ---------------------------------------------------------------------------
// Image loading
// ---------------------------------------------------------------------------

/// Fetches the bytes behind an image reference.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn load(&self, src: &str) -> Result<Vec<u8>>;
}

/// Data URIs, `http(s)` URLs and local paths (optionally `file://`).
pub struct DefaultImageSource {
    client: reqwest::Client,
    /// Relative paths are resolved against this directory.
    base_dir: Option<PathBuf>,
}

impl DefaultImageSource {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_dir: None,
        }
    }

    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }
}

impl Default for DefaultImageSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageSource for DefaultImageSource {
    async fn load(&self, src: &str) -> Result<Vec<u8>> {
        if src.starts_with("data:") {
            return decode_data_uri(src).ok_or_else(|| Error::Staging("malformed data URI".to_string()));
        }
        if src.starts_with("http://") || src.starts_with("https://") {
            let response = self
                .client
                .get(src)
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(|e| Error::Staging(format!("fetching {src}: {e}")))?;
            let bytes = response
                .bytes()
                .await
                .map_err(|e| Error::Staging(format!("reading {src}: {e}")))?;
            return Ok(bytes.to_vec());
        }

        let path = PathBuf::from(src.strip_prefix("file://").unwrap_or(src));
        let path = match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path,
        };
        Ok(tokio::fs::read(&path).await?)
    }
}

/// Terminal state of one image. A failure is settled, not fatal.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSettlement {
    Loaded { src: String },
    Failed { src: String, reason: String },
}

impl ImageSettlement {
    pub fn is_loaded(&self) -> bool {
        matches!(self, ImageSettlement::Loaded { .. })
    }
}

// ---------------------------------------------------------------------------
// Off-screen host
// ---------------------------------------------------------------------------

/// Registry of staged copies currently attached off screen.
#[derive(Debug, Default)]
pub struct OffscreenHost {
    attached: Mutex<Vec<Uuid>>,
}

impl OffscreenHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn attached_count(&self) -> usize {
        self.attached.lock().len()
    }

    fn attach(self: &Arc<Self>, nodes: Vec<DomNode>) -> StagedContainer {
        let id = Uuid::new_v4();
        self.attached.lock().push(id);
        log::debug!("attached staged container {id}");
        StagedContainer {
            id,
            host: Arc::clone(self),
            nodes,
        }
    }
}

/// An isolated, page-width copy of the rendered tree. Detaches itself from
/// its host when dropped.
#[derive(Debug)]
pub struct StagedContainer {
    id: Uuid,
    host: Arc<OffscreenHost>,
    nodes: Vec<DomNode>,
}

impl StagedContainer {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn nodes(&self) -> &[DomNode] {
        &self.nodes
    }

    pub fn html(&self) -> String {
        to_html(&self.nodes)
    }
}

impl Drop for StagedContainer {
    fn drop(&mut self) {
        self.host.attached.lock().retain(|id| *id != self.id);
        log::debug!("detached staged container {}", self.id);
    }
}

// ---------------------------------------------------------------------------
// Staging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct StagingOptions {
    pub pipeline: PipelineConfig,
    pub settle_delay: Duration,
    pub image_timeout: Duration,
}

impl Default for StagingOptions {
    fn default() -> Self {
        Self::from(&ExportConfig::default())
    }
}

impl From<&ExportConfig> for StagingOptions {
    fn from(cfg: &ExportConfig) -> Self {
        Self {
            pipeline: cfg.pipeline(),
            settle_delay: Duration::from_millis(cfg.settle_delay_ms),
            image_timeout: Duration::from_millis(cfg.image_timeout_ms),
        }
    }
}

/// The laid-out staged copy handed to a rasterizer.
#[derive(Debug, Clone)]
pub struct StagedDocument {
    pub layout: LayoutConfig,
    /// Output page size in CSS px.
    pub page_width: f32,
    pub page_height: f32,
    pub fit: FitDecision,
    pub content_height: f32,
    pub images: Vec<ImageSettlement>,
}

/// Result of [`Stager::stage`]: the guard and the measured document.
#[derive(Debug)]
pub struct Staged {
    pub container: StagedContainer,
    pub document: StagedDocument,
}

pub struct Stager {
    host: Arc<OffscreenHost>,
    images: Arc<dyn ImageSource>,
    fonts: FontManager,
    options: StagingOptions,
}

impl Stager {
    pub fn new(options: StagingOptions) -> Self {
        Self {
            host: OffscreenHost::new(),
            images: Arc::new(DefaultImageSource::new()),
            fonts: FontManager::default(),
            options,
        }
    }

    pub fn with_image_source(mut self, images: Arc<dyn ImageSource>) -> Self {
        self.images = images;
        self
    }

    pub fn with_fonts(mut self, fonts: FontManager) -> Self {
        self.fonts = fonts;
        self
    }

    pub fn with_host(mut self, host: Arc<OffscreenHost>) -> Self {
        self.host = host;
        self
    }

    pub fn host(&self) -> &Arc<OffscreenHost> {
        &self.host
    }

    pub fn fonts(&self) -> &FontManager {
        &self.fonts
    }

    pub fn options(&self) -> &StagingOptions {
        &self.options
    }

    /// Stage the page wrapper found in `tree`.
    pub async fn stage(&self, tree: &[DomNode]) -> Result<Staged> {
        let wrapper = find_by_id(tree, PREVIEW_ID)
            .ok_or_else(|| Error::Staging(format!("element #{PREVIEW_ID} not found")))?;

        // Serialise and re-parse so nothing is shared with the live tree.
        let mut nodes = parse_html(&to_html(&[DomNode::from(wrapper.clone())]));
        if let Some(DomNode::Element(root)) = nodes.first_mut() {
            root.attributes.insert(
                "style".to_string(),
                format!(
                    "margin: 0; width: 100%; min-height: {}px",
                    self.options.pipeline.page_height
                ),
            );
        }

        let mut container = self.host.attach(nodes);
        let settlements = self.settle_images(&mut container.nodes).await;

        if !self.options.settle_delay.is_zero() {
            tokio::time::sleep(self.options.settle_delay).await;
        }

        let paged = layout_pages(&container.nodes, &self.options.pipeline, &self.fonts)?;
        let document = StagedDocument {
            layout: paged.layout,
            page_width: self.options.pipeline.page_width,
            page_height: self.options.pipeline.page_height,
            fit: paged.decision,
            content_height: paged.content_height,
            images: settlements,
        };
        log::info!(
            "staged {} page(s), content {:.0}px, {:?}",
            document.layout.pages.len(),
            document.content_height,
            document.fit
        );
        Ok(Staged { container, document })
    }

    /// Load every image concurrently, each bounded by the image timeout.
    /// Loaded images are inlined as data URIs; failed ones lose their
    /// source but keep their box.
    async fn settle_images(&self, nodes: &mut [DomNode]) -> Vec<ImageSettlement> {
        let sources: Vec<String> = images(nodes)
            .iter()
            .map(|img| img.src().unwrap_or_default().to_string())
            .collect();

        let loads = sources.iter().map(|src| async move {
            if src.is_empty() {
                return Err("no source".to_string());
            }
            match tokio::time::timeout(self.options.image_timeout, self.images.load(src)).await {
                Ok(Ok(bytes)) => inline(&bytes),
                Ok(Err(e)) => Err(e.to_string()),
                Err(_) => Err(format!("timed out after {:?}", self.options.image_timeout)),
            }
        });
        let results = join_all(loads).await;

        let mut settlements = Vec::with_capacity(results.len());
        let mut outcomes = results.into_iter().zip(sources);
        for_each_image_mut(nodes, &mut |img| {
            let Some((result, src)) = outcomes.next() else {
                return;
            };
            match result {
                Ok(data_uri) => {
                    img.attributes.insert("src".to_string(), data_uri);
                    settlements.push(ImageSettlement::Loaded { src });
                }
                Err(reason) => {
                    log::warn!("image {} failed to load: {reason}", abbreviate(&src));
                    img.attributes.remove("src");
                    settlements.push(ImageSettlement::Failed { src, reason });
                }
            }
        });
        log::debug!(
            "{} image(s) settled, {} loaded",
            settlements.len(),
            settlements.iter().filter(|s| s.is_loaded()).count()
        );
        settlements
    }
}

/// Re-encode loaded bytes as a data URI, rejecting non-images.
fn inline(bytes: &[u8]) -> std::result::Result<String, String> {
    let format = image::guess_format(bytes).map_err(|e| format!("not an image: {e}"))?;
    let mime = format.to_mime_type();
    Ok(format!("data:{mime};base64,{}", BASE64_STD.encode(bytes)))
}

fn abbreviate(src: &str) -> &str {
    match src.char_indices().nth(48) {
        Some((i, _)) => &src[..i],
        None => src,
    }
}
