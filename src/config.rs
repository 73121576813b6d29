//! Configuration types for memorial rendering and the HTTP service.
//!
//! Rendering behaviour is controlled through [`RenderConfig`], built via its
//! [`RenderConfigBuilder`]. The service adds listener and body-size settings
//! on top in [`ServerConfig`].
//!
//! # Design choice: builder over constructor
//! Most callers only change the assets root; the builder lets them set that
//! and rely on documented defaults for the rest, and `build()` is the single
//! place where constraints are checked.

use crate::error::MemorialError;
use crate::progress::ProgressCallback;
use chrono::FixedOffset;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

/// Default listening port when neither `--port` nor `PORT` is given.
pub const DEFAULT_PORT: u16 = 5000;

/// Default JSON body limit: 10 MiB.
pub const DEFAULT_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Configuration for rendering one memorial document.
///
/// Built via [`RenderConfig::builder()`] or using [`RenderConfig::default()`].
///
/// # Example
/// ```rust
/// use memorial_pdf::RenderConfig;
///
/// let config = RenderConfig::builder()
///     .assets_root("public")
///     .max_image_pixels(1600)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct RenderConfig {
    /// Directory that entry `file` references are resolved against.
    /// Default: `public`.
    pub assets_root: PathBuf,

    /// Page margin in points. Default: 40. Range: 10–120.
    pub page_margin: f32,

    /// Longest edge, in pixels, of an embedded photo. Default: 2000.
    ///
    /// Phone cameras produce 4000+ px images; at A4 landscape the image
    /// region is under 500 pt wide, so anything above ~2000 px only inflates
    /// the PDF. Larger photos are downscaled before embedding.
    pub max_image_pixels: u32,

    /// Deflate page content streams. Default: true.
    pub compress: bool,

    /// Time zone used when printing dates. `None` uses the host's local zone.
    pub utc_offset: Option<FixedOffset>,

    /// Optional progress callback.
    pub progress_callback: Option<ProgressCallback>,

    /// Checked before each page; a cancelled token aborts the render with
    /// [`MemorialError::Cancelled`].
    pub cancellation: Option<CancellationToken>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            assets_root: PathBuf::from("public"),
            page_margin: 40.0,
            max_image_pixels: 2000,
            compress: true,
            utc_offset: None,
            progress_callback: None,
            cancellation: None,
        }
    }
}

impl fmt::Debug for RenderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderConfig")
            .field("assets_root", &self.assets_root)
            .field("page_margin", &self.page_margin)
            .field("max_image_pixels", &self.max_image_pixels)
            .field("compress", &self.compress)
            .field("utc_offset", &self.utc_offset)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn RenderProgressCallback>"),
            )
            .field("cancellation", &self.cancellation.is_some())
            .finish()
    }
}

impl RenderConfig {
    /// Create a new builder for `RenderConfig`.
    pub fn builder() -> RenderConfigBuilder {
        RenderConfigBuilder {
            config: Self::default(),
        }
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}

/// Builder for [`RenderConfig`].
#[derive(Debug)]
pub struct RenderConfigBuilder {
    config: RenderConfig,
}

impl RenderConfigBuilder {
    pub fn assets_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.assets_root = root.into();
        self
    }

    pub fn page_margin(mut self, margin: f32) -> Self {
        self.config.page_margin = margin;
        self
    }

    pub fn max_image_pixels(mut self, px: u32) -> Self {
        self.config.max_image_pixels = px.max(64);
        self
    }

    pub fn compress(mut self, v: bool) -> Self {
        self.config.compress = v;
        self
    }

    pub fn utc_offset(mut self, offset: FixedOffset) -> Self {
        self.config.utc_offset = Some(offset);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.config.cancellation = Some(token);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<RenderConfig, MemorialError> {
        let c = &self.config;
        if !c.page_margin.is_finite() || !(10.0..=120.0).contains(&c.page_margin) {
            return Err(MemorialError::InvalidConfig(format!(
                "page margin must be 10–120 pt, got {}",
                c.page_margin
            )));
        }
        if c.assets_root.as_os_str().is_empty() {
            return Err(MemorialError::InvalidConfig(
                "assets root must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

/// Configuration for the HTTP service.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Static root; `/uploads/*` is served from `<public_dir>/uploads`.
    pub public_dir: PathBuf,
    /// Maximum accepted request body in bytes.
    pub body_limit: usize,
    pub render: RenderConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            public_dir: PathBuf::from("public"),
            body_limit: DEFAULT_BODY_LIMIT,
            render: RenderConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Defaults, with the port taken from `PORT` when it is set and valid.
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(DEFAULT_PORT);
        Self {
            port,
            ..Self::default()
        }
    }

    /// Point both the static file root and photo resolution at `dir`.
    pub fn with_public_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        self.render.assets_root = dir.clone();
        self.public_dir = dir;
        self
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_service() {
        let c = RenderConfig::default();
        assert_eq!(c.assets_root, PathBuf::from("public"));
        assert_eq!(c.page_margin, 40.0);
        assert_eq!(c.max_image_pixels, 2000);
        assert!(c.compress);
        assert!(!c.is_cancelled());
    }

    #[test]
    fn builder_rejects_out_of_range_margin() {
        let err = RenderConfig::builder().page_margin(400.0).build().unwrap_err();
        assert!(matches!(err, MemorialError::InvalidConfig(_)));
        assert!(RenderConfig::builder()
            .page_margin(f32::NAN)
            .build()
            .is_err());
    }

    #[test]
    fn builder_clamps_image_pixels() {
        let c = RenderConfig::builder().max_image_pixels(1).build().unwrap();
        assert_eq!(c.max_image_pixels, 64);
    }

    #[test]
    fn cancellation_token_is_observed() {
        let token = CancellationToken::new();
        let c = RenderConfig::builder()
            .cancellation(token.clone())
            .build()
            .unwrap();
        assert!(!c.is_cancelled());
        token.cancel();
        assert!(c.is_cancelled());
    }

    #[test]
    fn public_dir_drives_asset_root() {
        let c = ServerConfig::default().with_public_dir("/srv/memorial");
        assert_eq!(c.public_dir, PathBuf::from("/srv/memorial"));
        assert_eq!(c.render.assets_root, PathBuf::from("/srv/memorial"));
        assert_eq!(c.bind_addr().port(), DEFAULT_PORT);
        assert_eq!(c.body_limit, 10 * 1024 * 1024);
    }
}
