//! Source frame to page-local frame conversion
//!
//! The source frame has its origin at the top-left with y growing downward.
//! Page-local frames have their origin at the bottom-left with y growing
//! upward; the right page is additionally shifted so its left edge is x = 0.

use crate::classify::{Classified, ClassifiedSegment};
use crate::Axis;

/// Parameters of the source to page-local conversion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFrame {
    /// Height of the source page
    pub page_height: f64,
    /// Horizontal shift subtracted from every x (0 for the left page)
    pub x_shift: f64,
}

impl PageFrame {
    /// Frame of the left page
    pub fn left(page_height: f64) -> Self {
        Self {
            page_height,
            x_shift: 0.0,
        }
    }

    /// Frame of the right page of a source split at `split_x`
    pub fn right(page_height: f64, split_x: f64) -> Self {
        Self {
            page_height,
            x_shift: split_x,
        }
    }

    /// Convert a classified segment to page-local coordinates
    ///
    /// The interval stays ordered (`start <= end`) after the vertical flip.
    pub fn segment(&self, segment: &ClassifiedSegment) -> ClassifiedSegment {
        let (fixed, start, end) = match segment.axis {
            Axis::Horizontal => (
                self.page_height - segment.fixed,
                segment.start - self.x_shift,
                segment.end - self.x_shift,
            ),
            Axis::Vertical => (
                segment.fixed - self.x_shift,
                self.page_height - segment.end,
                self.page_height - segment.start,
            ),
        };

        ClassifiedSegment {
            axis: segment.axis,
            fixed,
            start,
            end,
            style: segment.style.clone(),
        }
    }

    /// Convert both families of a page
    pub fn apply(&self, classified: &Classified) -> Classified {
        Classified {
            horizontal: classified.horizontal.iter().map(|s| self.segment(s)).collect(),
            vertical: classified.vertical.iter().map(|s| self.segment(s)).collect(),
        }
    }
}
