//! Output types returned by the render entry points.

use crate::error::AssetError;
use serde::{Deserialize, Serialize};

/// A finished memorial document plus a per-page account of what was drawn.
#[derive(Debug, Clone)]
pub struct MemorialOutput {
    /// The complete PDF file.
    pub pdf: Vec<u8>,
    /// One report per page, in page order (cover first, closing last).
    pub pages: Vec<PageReport>,
    pub stats: RenderStats,
}

/// Which renderer produced a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageKind {
    Cover,
    /// `index` is 1-based within the entries; `total` is the entry count.
    Entry { index: usize, total: usize },
    Closing,
}

/// What ended up in an entry page's image region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageOutcome {
    /// The photo was decoded and drawn.
    Embedded { width: u32, height: u32 },
    /// The entry named no photo; the placeholder was drawn.
    Absent,
    /// The photo could not be used; the placeholder was drawn.
    Fallback,
}

/// How an entry message was fitted into its panel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MessageLayout {
    /// Height the message would need with no clamp, in points.
    pub natural_height: f32,
    /// Height of the drawn panel's text area after clamping.
    pub panel_height: f32,
    /// True when the text was cut and ended with an ellipsis.
    pub truncated: bool,
    /// Lines actually drawn.
    pub lines: usize,
}

/// Per-page record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageReport {
    /// 1-indexed page number in the document.
    pub page_num: usize,
    #[serde(flatten)]
    pub kind: PageKind,
    /// `"{n} de {total}"` footer label (entry pages only).
    pub footer: Option<String>,
    /// Image outcome (entry pages only).
    pub image: Option<ImageOutcome>,
    /// Message fitting (entry pages with a message only).
    pub message: Option<MessageLayout>,
    /// Why the photo was replaced by the placeholder, if it was.
    pub asset_error: Option<AssetError>,
}

impl PageReport {
    pub(crate) fn new(page_num: usize, kind: PageKind) -> Self {
        Self {
            page_num,
            kind,
            footer: None,
            image: None,
            message: None,
            asset_error: None,
        }
    }
}

/// Aggregate numbers for one render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderStats {
    pub total_pages: usize,
    pub entry_pages: usize,
    pub images_embedded: usize,
    pub placeholders: usize,
    pub truncated_messages: usize,
    pub pdf_bytes: usize,
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_report_serialises_flat_kind() {
        let mut report = PageReport::new(2, PageKind::Entry { index: 1, total: 3 });
        report.footer = Some("1 de 3".into());
        report.image = Some(ImageOutcome::Fallback);
        report.asset_error = Some(AssetError::NotFound {
            file: "uploads/x.jpg".into(),
        });

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["kind"], "entry");
        assert_eq!(json["index"], 1);
        assert_eq!(json["footer"], "1 de 3");
        assert_eq!(json["image"], "fallback");
        assert!(json["asset_error"]["NotFound"].is_object());
    }
}
