use super::surface::{ControlId, ControlRole, DialogControl};

const AFFIRMATIVE_TERMS: [&str; 3] = ["ok", "save", "insert"];

/// Decides which control activations count as confirming the dialog.
///
/// The surface's explicit primary-action signal always confirms. This matcher
/// covers surfaces that only report generic control activations: the first
/// control that looks like the primary action wins, otherwise every control
/// with an affirmative label confirms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationMatcher {
    Primary(ControlId),
    Affirmative(Vec<ControlId>),
    Unmatched,
}

impl ConfirmationMatcher {
    pub fn from_controls(controls: &[DialogControl]) -> Self {
        if let Some(primary) = controls.iter().find(|control| looks_primary(control)) {
            return Self::Primary(primary.control_id());
        }

        let affirmative: Vec<ControlId> = controls
            .iter()
            .filter(|control| has_affirmative_label(control))
            .map(DialogControl::control_id)
            .collect();
        if affirmative.is_empty() {
            Self::Unmatched
        } else {
            Self::Affirmative(affirmative)
        }
    }

    pub fn confirms(&self, control: ControlId) -> bool {
        match self {
            Self::Primary(id) => *id == control,
            Self::Affirmative(ids) => ids.contains(&control),
            Self::Unmatched => false,
        }
    }
}

fn looks_primary(control: &DialogControl) -> bool {
    if matches!(control.role, ControlRole::Submit | ControlRole::Primary) {
        return true;
    }
    [control.aria_label.as_deref(), control.title.as_deref()]
        .into_iter()
        .flatten()
        .any(|label| label.contains("OK") || label.contains("ok"))
}

fn has_affirmative_label(control: &DialogControl) -> bool {
    [
        Some(control.text.as_str()),
        control.aria_label.as_deref(),
        control.title.as_deref(),
    ]
    .into_iter()
    .flatten()
    .map(str::to_lowercase)
    .any(|label| AFFIRMATIVE_TERMS.iter().any(|term| label.contains(term)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_primary_looking_control_wins() {
        let controls = vec![
            DialogControl::new(1, ControlRole::Plain, "Cancel"),
            DialogControl::new(2, ControlRole::Primary, "Save"),
            DialogControl::new(3, ControlRole::Submit, "Submit"),
        ];
        let matcher = ConfirmationMatcher::from_controls(&controls);

        assert_eq!(matcher, ConfirmationMatcher::Primary(ControlId(2)));
        assert!(matcher.confirms(ControlId(2)));
        assert!(!matcher.confirms(ControlId(3)));
        assert!(!matcher.confirms(ControlId(1)));
    }

    #[test]
    fn aria_label_or_title_with_ok_counts_as_primary() {
        let controls = vec![
            DialogControl::new(1, ControlRole::Plain, "Close"),
            DialogControl::new(2, ControlRole::Plain, "✓").with_title("Press OK to insert"),
        ];
        assert_eq!(
            ConfirmationMatcher::from_controls(&controls),
            ConfirmationMatcher::Primary(ControlId(2))
        );
    }

    #[test]
    fn falls_back_to_affirmative_labels_when_no_primary() {
        let controls = vec![
            DialogControl::new(1, ControlRole::Plain, "Cancel"),
            DialogControl::new(2, ControlRole::Plain, "Insert image"),
            DialogControl::new(3, ControlRole::Plain, "").with_aria_label("Save changes"),
        ];
        let matcher = ConfirmationMatcher::from_controls(&controls);

        assert_eq!(
            matcher,
            ConfirmationMatcher::Affirmative(vec![ControlId(2), ControlId(3)])
        );
        assert!(!matcher.confirms(ControlId(1)));
    }

    #[test]
    fn dialog_without_recognisable_confirm_is_unmatched() {
        let controls = vec![
            DialogControl::new(1, ControlRole::Plain, "Cancel"),
            DialogControl::new(2, ControlRole::Plain, "Browse"),
        ];
        let matcher = ConfirmationMatcher::from_controls(&controls);
        assert_eq!(matcher, ConfirmationMatcher::Unmatched);
        assert!(!matcher.confirms(ControlId(2)));
    }
}
