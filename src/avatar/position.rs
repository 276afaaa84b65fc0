/// Largest offset, in preview pixels, the avatar may be moved along either axis.
/// The server rescales it against the stored image.
pub const MAX_OFFSET: i32 = 90;

pub const OFFSET_X_FIELD: &str = "avatar_offset_x";
pub const OFFSET_Y_FIELD: &str = "avatar_offset_y";

pub fn clamp(value: i32, max: i32) -> i32 {
    let max = max.saturating_abs();
    value.clamp(-max, max)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PositionOffset {
    pub x: i32,
    pub y: i32,
}

impl PositionOffset {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub fn clamped(x: i32, y: i32) -> Self {
        Self {
            x: clamp(x, MAX_OFFSET),
            y: clamp(y, MAX_OFFSET),
        }
    }
}

/// Persisted avatar offset. Every write goes through [`clamp`], so readers
/// never observe a value outside `[-MAX_OFFSET, MAX_OFFSET]`.
#[derive(Debug, Clone, Default)]
pub struct PositionModel {
    offset: PositionOffset,
}

impl PositionModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a model from the two hidden form values rendered by the server.
    /// Unparseable values count as zero, matching what an untouched form submits.
    pub fn from_form_values(x: &str, y: &str) -> Self {
        let mut model = Self::new();
        model.apply(parse_form_offset(x), parse_form_offset(y));
        model
    }

    pub fn offset(&self) -> PositionOffset {
        self.offset
    }

    pub fn apply(&mut self, x: i32, y: i32) -> PositionOffset {
        self.offset = PositionOffset::clamped(x, y);
        self.offset
    }

    pub fn reset(&mut self) {
        self.offset = PositionOffset::ORIGIN;
    }

    pub fn form_fields(&self) -> [(&'static str, String); 2] {
        [
            (OFFSET_X_FIELD, self.offset.x.to_string()),
            (OFFSET_Y_FIELD, self.offset.y.to_string()),
        ]
    }
}

fn parse_form_offset(raw: &str) -> i32 {
    let Ok(value) = raw.trim().parse::<f64>() else {
        return 0;
    };
    if !value.is_finite() {
        return 0;
    }
    // `as` saturates, so huge inputs land on the clamp bounds.
    value.round() as i32
}
