use crate::error::BoundsError;
use crate::io::{ImageHandle, ImageSize, RenderSink};
use crate::math::Point2d;
use cgmath::EuclideanSpace;

/// The most sessions that can be shown at once.
pub const MAX_REGIONS: usize = 4;

/// A request to draw an image at a position.
#[derive(Clone, Debug, PartialEq)]
pub struct Blit {
    pub image: ImageHandle,
    pub position: Point2d,
}

/// Everything one session draws in one tick, in drawing order.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// The size of the session's play area.
    size: ImageSize,
    blits: Vec<Blit>,
}

impl Frame {
    /// Creates an empty frame of the given size.
    pub fn new(size: ImageSize) -> Self {
        Self {
            size,
            blits: vec![],
        }
    }

    pub fn size(&self) -> ImageSize {
        self.size
    }

    pub fn blits(&self) -> &[Blit] {
        &self.blits
    }

    /// Discards everything drawn so far.
    pub fn clear(&mut self) {
        self.blits.clear();
    }

    /// Queues an image to be drawn.
    pub fn push(&mut self, image: &str, position: Point2d) {
        self.blits.push(Blit {
            image: image.to_owned(),
            position,
        });
    }
}

/// Lays out the frames of several sessions side by side on one screen.
///
/// Regions are filled left to right, two per row.
#[derive(Clone, Debug)]
pub struct DisplayRouter {
    /// The number of regions.
    capacity: usize,
    /// The size of each region.
    region: ImageSize,
}

impl DisplayRouter {
    /// Creates a router for `capacity` regions of the given size.
    pub fn new(capacity: usize, region: ImageSize) -> Result<Self, BoundsError> {
        if capacity > MAX_REGIONS {
            return Err(BoundsError::Index {
                index: capacity - 1,
                capacity: MAX_REGIONS,
            });
        }
        Ok(Self { capacity, region })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of regions in each row of the screen.
    fn columns(&self) -> usize {
        self.capacity.clamp(1, 2)
    }

    /// The size of the screen needed to show every region.
    pub fn screen_size(&self) -> ImageSize {
        let columns = self.columns() as u32;
        let rows = ((self.capacity + 1) / 2).max(1) as u32;
        ImageSize::new(self.region.width * columns, self.region.height * rows)
    }

    /// The top-left corner of the region for `index`.
    pub fn origin(&self, index: usize) -> Result<Point2d, BoundsError> {
        if index >= self.capacity {
            return Err(BoundsError::Index {
                index,
                capacity: self.capacity,
            });
        }
        let col = index % self.columns();
        let row = index / self.columns();
        Ok(Point2d::new(
            (col as u32 * self.region.width) as f64,
            (row as u32 * self.region.height) as f64,
        ))
    }

    /// Draws `frame` into the region for `index`.
    pub fn place(&self, frame: &Frame, index: usize, sink: &mut dyn RenderSink) -> Result<(), BoundsError> {
        let origin = self.origin(index)?;
        let size = frame.size();
        if size.width > self.region.width || size.height > self.region.height {
            return Err(BoundsError::FrameTooLarge {
                width: size.width,
                height: size.height,
                region_width: self.region.width,
                region_height: self.region.height,
            });
        }
        let offset = origin.to_vec();
        for blit in frame.blits() {
            sink.blit(&blit.image, blit.position + offset);
        }
        Ok(())
    }
}
