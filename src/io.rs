//! Interfaces to the outside world: image assets, keyboard input and drawing.
//!
//! The simulation never decodes or draws pixels itself. It only needs to
//! know how large an image is, where to draw it, and which keys were pressed.

use crate::error::AssetError;
use crate::math::Point2d;
use std::collections::HashMap;

/// Identifies an image resource, e.g. a sprite file name.
pub type ImageHandle = String;

/// The pixel dimensions of an image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Loads image resources.
pub trait AssetLoader {
    /// Loads the image with the given id and reports its pixel dimensions.
    fn dimensions(&mut self, id: &str) -> Result<ImageSize, AssetError>;
}

/// An asset loader backed by a fixed table of image sizes.
///
/// Useful for headless simulation, where nothing is ever drawn.
#[derive(Clone, Debug, Default)]
pub struct FixedAssets {
    sizes: HashMap<String, ImageSize>,
}

impl FixedAssets {
    /// The sprite sizes the default configuration expects.
    pub fn reference() -> Self {
        Self::default()
            .with("street_sprite.png", ImageSize::new(100, 600))
            .with("car_sprite.png", ImageSize::new(60, 100))
            .with("car_sprite_enemy.png", ImageSize::new(60, 100))
    }

    /// Registers an image.
    pub fn with(mut self, id: &str, size: ImageSize) -> Self {
        self.sizes.insert(id.to_owned(), size);
        self
    }
}

impl AssetLoader for FixedAssets {
    fn dimensions(&mut self, id: &str) -> Result<ImageSize, AssetError> {
        self.sizes
            .get(id)
            .copied()
            .ok_or_else(|| AssetError::Unknown(id.to_owned()))
    }
}

/// A discrete input event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    /// The user asked to quit.
    Quit,
    /// The left key was pressed.
    Left,
    /// The right key was pressed.
    Right,
    /// Any other event, which the simulation ignores.
    Other,
}

/// A source of input events.
pub trait InputSource {
    /// Returns the events received since the previous poll.
    fn poll(&mut self) -> Vec<InputEvent>;
}

/// Replays a scripted list of per-frame events, then reports nothing.
#[derive(Clone, Debug, Default)]
pub struct ScriptedInput {
    frames: std::collections::VecDeque<Vec<InputEvent>>,
}

impl ScriptedInput {
    pub fn new(frames: impl IntoIterator<Item = Vec<InputEvent>>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> Vec<InputEvent> {
        self.frames.pop_front().unwrap_or_default()
    }
}

/// A surface that images can be drawn onto.
pub trait RenderSink {
    /// Draws the image with its top-left corner at `position`.
    fn blit(&mut self, image: &ImageHandle, position: Point2d);

    /// Presents everything drawn since the last call.
    fn present(&mut self) {}
}

/// A render sink which discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl RenderSink for NullSink {
    fn blit(&mut self, _image: &ImageHandle, _position: Point2d) {}
}
