use std::fmt;

/// Identity the editing surface assigns to a rendered dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DialogHandle(pub u64);

/// Tracker-assigned identity of one open-to-close dialog lifecycle.
/// Surfaces may recycle handles; session ids are never reused within a mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    ImageInsert,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlRole {
    /// Form submit control.
    Submit,
    /// Styled as the dialog's primary action.
    Primary,
    #[default]
    Plain,
}

/// A button rendered inside a dialog, as described by the editing surface.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DialogControl {
    pub id: u32,
    pub role: ControlRole,
    pub text: String,
    pub aria_label: Option<String>,
    pub title: Option<String>,
}

impl DialogControl {
    pub fn new(id: u32, role: ControlRole, text: impl Into<String>) -> Self {
        Self {
            id,
            role,
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_aria_label(mut self, label: impl Into<String>) -> Self {
        self.aria_label = Some(label.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn control_id(&self) -> ControlId {
        ControlId(self.id)
    }
}

/// What the editing surface reports when a dialog appears.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogSnapshot {
    pub handle: DialogHandle,
    pub kind: DialogKind,
    /// Value the image source field already holds when the dialog appears.
    pub field_value: Option<String>,
    pub controls: Vec<DialogControl>,
}

impl DialogSnapshot {
    pub fn image_insert(handle: DialogHandle) -> Self {
        Self {
            handle,
            kind: DialogKind::ImageInsert,
            field_value: None,
            controls: Vec::new(),
        }
    }

    pub fn with_field_value(mut self, value: impl Into<String>) -> Self {
        self.field_value = Some(value.into());
        self
    }

    pub fn with_controls(mut self, controls: Vec<DialogControl>) -> Self {
        self.controls = controls;
        self
    }
}
