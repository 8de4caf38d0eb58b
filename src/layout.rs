//! 2x2 viewport geometry.

/// Columns in the feed grid.
pub const GRID_COLUMNS: u32 = 2;
/// Rows in the feed grid.
pub const GRID_ROWS: u32 = 2;
/// Number of feeds the grid can host.
pub const MAX_FEEDS: usize = (GRID_COLUMNS * GRID_ROWS) as usize;

/// Screen rectangle occupied by one camera feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quadrant {
    /// Left edge in surface pixels.
    pub x: u32,
    /// Top edge in surface pixels.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Quadrant {
    /// Whether the quadrant covers no pixels (surface smaller than 2x2).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Quadrant geometry for a given surface size.
///
/// Recomputed on every render pass so a resize takes effect on the next
/// frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportLayout {
    feed_width: u32,
    feed_height: u32,
    count: usize,
}

impl ViewportLayout {
    /// Lay out `count` feeds (at most [`MAX_FEEDS`]) on a `width`x`height`
    /// surface.
    #[must_use]
    pub fn new(count: usize, width: u32, height: u32) -> Self {
        Self {
            feed_width: width / GRID_COLUMNS,
            feed_height: height / GRID_ROWS,
            count: count.min(MAX_FEEDS),
        }
    }

    /// Width of every quadrant.
    #[must_use]
    pub const fn feed_width(&self) -> u32 {
        self.feed_width
    }

    /// Height of every quadrant.
    #[must_use]
    pub const fn feed_height(&self) -> u32 {
        self.feed_height
    }

    /// Quadrant for feed `index`, or `None` past the configured count.
    #[must_use]
    pub fn quadrant(&self, index: usize) -> Option<Quadrant> {
        if index >= self.count {
            return None;
        }
        let slot = u32::try_from(index).ok()?;
        Some(Quadrant {
            x: (slot % GRID_COLUMNS) * self.feed_width,
            y: (slot / GRID_COLUMNS) * self.feed_height,
            width: self.feed_width,
            height: self.feed_height,
        })
    }

    /// All quadrants in feed order.
    pub fn quadrants(&self) -> impl Iterator<Item = Quadrant> + '_ {
        (0..self.count).filter_map(|index| self.quadrant(index))
    }
}
