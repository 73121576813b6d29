//! Page geometry shared by every renderer.
//!
//! All positions on every page are derived arithmetically from the page
//! size and margin held in [`RenderContext`]; renderers never hard-code an
//! absolute coordinate.

use pdf_canvas::{PageSize, Rect};

/// Read-only page geometry, computed once per document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderContext {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    pub content_width: f32,
    pub content_height: f32,
}

impl RenderContext {
    pub fn new(size: PageSize, margin: f32) -> Self {
        Self {
            page_width: size.width,
            page_height: size.height,
            margin,
            content_width: size.width - 2.0 * margin,
            content_height: size.height - 2.0 * margin,
        }
    }

    /// A4 landscape with the given margin.
    pub fn a4_landscape(margin: f32) -> Self {
        Self::new(PageSize::A4.landscape(), margin)
    }

    pub fn page_size(&self) -> PageSize {
        PageSize {
            width: self.page_width,
            height: self.page_height,
        }
    }

    pub fn center_x(&self) -> f32 {
        self.page_width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.page_height / 2.0
    }

    /// The area inside the margins.
    pub fn content(&self) -> Rect {
        Rect::new(self.margin, self.margin, self.content_width, self.content_height)
    }

    /// Regions of an entry page.
    pub fn entry_regions(&self) -> EntryRegions {
        let image = Rect::new(
            self.margin + 25.0,
            self.margin + 50.0,
            self.content_width * 0.58,
            self.content_height - 120.0,
        );
        let text = Rect::new(
            image.right() + 50.0,
            image.y,
            self.content_width * 0.28,
            image.height,
        );
        EntryRegions { image, text }
    }
}

/// Image and text regions of an entry page. Both share top edge and height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntryRegions {
    pub image: Rect,
    pub text: Rect,
}

impl EntryRegions {
    /// Top offset, relative to the text region, of the message panel's text.
    pub const MESSAGE_TOP: f32 = 75.0;

    /// Tallest the message text may be: the region minus the space reserved
    /// for the title above and the date below.
    pub fn message_max_height(&self) -> f32 {
        (self.text.height - 160.0).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landscape_content_box() {
        let ctx = RenderContext::a4_landscape(40.0);
        assert!(ctx.page_width > ctx.page_height);
        assert!((ctx.content_width - (841.89 - 80.0)).abs() < 1e-3);
        assert!((ctx.content_height - (595.28 - 80.0)).abs() < 1e-3);
    }

    #[test]
    fn entry_regions_fit_inside_the_content_box() {
        let ctx = RenderContext::a4_landscape(40.0);
        let regions = ctx.entry_regions();
        assert_eq!(regions.image.x, 65.0);
        assert_eq!(regions.image.y, 90.0);
        assert!((regions.text.x - (regions.image.right() + 50.0)).abs() < 1e-3);
        assert!(regions.text.right() < ctx.page_width - ctx.margin);
        assert!(regions.image.bottom() < ctx.page_height - ctx.margin);
        assert!(regions.message_max_height() > 0.0);
    }
}
