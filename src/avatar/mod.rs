mod drag;
mod position;

use std::io::Cursor;
use std::time::Instant;

use image::{ImageFormat, ImageReader};
use thiserror::Error;

use crate::geometry::PointerPoint;

pub use drag::{
    ClickTarget, DragController, DragPhase, GestureOutcome, CLICK_SUPPRESSION_COOLDOWN,
    DRAG_THRESHOLD, QUICK_CLICK_THRESHOLD,
};
pub use position::{
    clamp, PositionModel, PositionOffset, MAX_OFFSET, OFFSET_X_FIELD, OFFSET_Y_FIELD,
};

#[derive(Debug, Error)]
pub enum AvatarError {
    #[error("avatar source is not a recognised image format")]
    UnsupportedFormat,
    #[error("failed to read avatar image: {message}")]
    Decode { message: String },
}

pub type AvatarResult<T> = std::result::Result<T, AvatarError>;

/// A locally selected avatar image, before the profile form is submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarSource {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

impl AvatarSource {
    pub fn from_bytes(bytes: &[u8]) -> AvatarResult<Self> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|err| AvatarError::Decode {
                message: err.to_string(),
            })?;
        let format = reader.format().ok_or(AvatarError::UnsupportedFormat)?;
        let (width, height) = reader.into_dimensions().map_err(|err| AvatarError::Decode {
            message: err.to_string(),
        })?;
        Ok(Self {
            format,
            width,
            height,
        })
    }
}

/// Profile-form avatar state: the current image, its drag offset, and the
/// gesture in progress.
#[derive(Debug, Default)]
pub struct AvatarEditor {
    has_image: bool,
    source: Option<AvatarSource>,
    position: PositionModel,
    drag: DragController,
}

impl AvatarEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Editor for a profile that already has a stored avatar, with the offset
    /// values the server rendered into the form.
    pub fn with_existing_image(offset_x: &str, offset_y: &str) -> Self {
        Self {
            has_image: true,
            position: PositionModel::from_form_values(offset_x, offset_y),
            ..Self::default()
        }
    }

    /// Replaces the source image. The offset is reset even when decoding fails,
    /// since the previous offset no longer describes what the user picked.
    pub fn load_source(&mut self, bytes: &[u8]) -> AvatarResult<&AvatarSource> {
        self.position.reset();
        self.drag.cancel();
        self.source = None;
        self.has_image = false;

        let source = AvatarSource::from_bytes(bytes)?;
        tracing::debug!(
            format = ?source.format,
            width = source.width,
            height = source.height,
            "avatar source loaded"
        );
        self.has_image = true;
        Ok(&*self.source.insert(source))
    }

    pub fn source(&self) -> Option<&AvatarSource> {
        self.source.as_ref()
    }

    pub fn has_image(&self) -> bool {
        self.has_image
    }

    pub fn offset(&self) -> PositionOffset {
        self.position.offset()
    }

    pub fn phase(&self) -> DragPhase {
        self.drag.phase()
    }

    pub fn pointer_down(&mut self, point: PointerPoint, now: Instant) {
        if !self.has_image {
            return;
        }
        self.drag.press(point, now, &self.position);
    }

    pub fn pointer_move(&mut self, point: PointerPoint) -> Option<PositionOffset> {
        self.drag.motion(point, &mut self.position)
    }

    pub fn pointer_up(&mut self, now: Instant) -> Option<GestureOutcome> {
        self.drag.release(now)
    }

    pub fn should_suppress_click(&self, target: ClickTarget, now: Instant) -> bool {
        self.drag.suppresses_click(target, now)
    }

    pub fn form_fields(&self) -> [(&'static str, String); 2] {
        self.position.form_fields()
    }
}
