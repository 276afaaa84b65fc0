use std::time::{Duration, Instant};

use crate::geometry::PointerPoint;

use super::position::{PositionModel, PositionOffset};

/// Movement, in pointer units, a press must exceed on either axis to become a drag.
pub const DRAG_THRESHOLD: i32 = 5;
/// Drags released faster than this do not hold click suppression.
pub const QUICK_CLICK_THRESHOLD: Duration = Duration::from_millis(200);
/// How long clicks stay suppressed after a deliberate drag is released.
pub const CLICK_SUPPRESSION_COOLDOWN: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragPhase {
    #[default]
    Idle,
    Pressed,
    Dragging,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    /// The draggable avatar image itself.
    Image,
    /// The separate "change avatar" control next to it.
    Control,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    Click,
    Drag { quick: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ClickSuppression {
    #[default]
    Clear,
    Active,
    Until(Instant),
}

#[derive(Debug, Clone, Copy)]
struct Press {
    point: PointerPoint,
    origin: PointerPoint,
    at: Instant,
}

#[derive(Debug, Default)]
pub struct DragController {
    phase: DragPhase,
    press: Option<Press>,
    suppression: ClickSuppression,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    pub fn press(&mut self, point: PointerPoint, now: Instant, model: &PositionModel) {
        if self.phase != DragPhase::Idle {
            tracing::debug!(phase = ?self.phase, "pointer pressed mid-gesture; restarting");
        }
        // A drag whose release was never seen still holds suppression open.
        if self.suppression == ClickSuppression::Active {
            self.suppression = ClickSuppression::Until(now + CLICK_SUPPRESSION_COOLDOWN);
        }
        let current = model.offset();
        let origin = PointerPoint::new(
            point.x.saturating_sub(current.x),
            point.y.saturating_sub(current.y),
        );
        self.press = Some(Press {
            point,
            origin,
            at: now,
        });
        self.phase = DragPhase::Pressed;
    }

    /// Feeds a pointer move. Returns the stored offset when the move was written through.
    pub fn motion(
        &mut self,
        point: PointerPoint,
        model: &mut PositionModel,
    ) -> Option<PositionOffset> {
        let press = self.press?;
        match self.phase {
            DragPhase::Idle => return None,
            DragPhase::Pressed => {
                if !point.exceeds_displacement(press.point, DRAG_THRESHOLD) {
                    return None;
                }
                self.phase = DragPhase::Dragging;
                self.suppression = ClickSuppression::Active;
                tracing::debug!(x = point.x, y = point.y, "avatar drag started");
            }
            DragPhase::Dragging => {}
        }

        let (x, y) = point.offset_from(press.origin);
        Some(model.apply(x, y))
    }

    /// Ends the gesture on pointer-up or touch-end.
    pub fn release(&mut self, now: Instant) -> Option<GestureOutcome> {
        let press = self.press.take()?;
        let phase = std::mem::take(&mut self.phase);

        let outcome = match phase {
            DragPhase::Idle => return None,
            DragPhase::Pressed => GestureOutcome::Click,
            DragPhase::Dragging => {
                let quick = now.saturating_duration_since(press.at) < QUICK_CLICK_THRESHOLD;
                self.suppression = if quick {
                    ClickSuppression::Clear
                } else {
                    ClickSuppression::Until(now + CLICK_SUPPRESSION_COOLDOWN)
                };
                GestureOutcome::Drag { quick }
            }
        };
        tracing::debug!(?outcome, "avatar gesture finished");
        Some(outcome)
    }

    /// Drops any gesture in flight, e.g. when the source image is replaced.
    pub fn cancel(&mut self) {
        self.press = None;
        self.phase = DragPhase::Idle;
        self.suppression = ClickSuppression::Clear;
    }

    pub fn suppresses_click(&self, target: ClickTarget, now: Instant) -> bool {
        if target == ClickTarget::Image {
            return true;
        }
        match self.suppression {
            ClickSuppression::Clear => false,
            ClickSuppression::Active => true,
            ClickSuppression::Until(deadline) => now < deadline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::avatar::position::MAX_OFFSET;

    fn pressed_at(x: i32, y: i32, now: Instant, model: &PositionModel) -> DragController {
        let mut controller = DragController::new();
        controller.press(PointerPoint::new(x, y), now, model);
        controller
    }

    #[test]
    fn small_wiggle_is_a_click_and_never_moves_the_avatar() {
        let start = Instant::now();
        let mut model = PositionModel::new();
        model.apply(10, -10);
        let mut controller = pressed_at(100, 100, start, &model);

        assert_eq!(controller.motion(PointerPoint::new(105, 95), &mut model), None);
        assert_eq!(controller.motion(PointerPoint::new(97, 104), &mut model), None);
        let outcome = controller.release(start + Duration::from_millis(800));

        assert_eq!(outcome, Some(GestureOutcome::Click));
        assert_eq!(model.offset(), PositionOffset { x: 10, y: -10 });
        assert!(!controller.suppresses_click(
            ClickTarget::Control,
            start + Duration::from_millis(801)
        ));
    }

    #[test]
    fn drag_moves_relative_to_the_press_origin() {
        let start = Instant::now();
        let mut model = PositionModel::new();
        model.apply(20, 0);
        let mut controller = pressed_at(50, 50, start, &model);

        let written = controller.motion(PointerPoint::new(60, 40), &mut model);

        assert_eq!(controller.phase(), DragPhase::Dragging);
        assert_eq!(written, Some(PositionOffset { x: 30, y: -10 }));
        assert_eq!(model.offset(), PositionOffset { x: 30, y: -10 });
    }

    #[test]
    fn dragging_continues_below_threshold_once_started() {
        let start = Instant::now();
        let mut model = PositionModel::new();
        let mut controller = pressed_at(0, 0, start, &model);

        controller.motion(PointerPoint::new(10, 0), &mut model);
        let written = controller.motion(PointerPoint::new(2, 1), &mut model);

        assert_eq!(written, Some(PositionOffset { x: 2, y: 1 }));
    }

    #[test]
    fn every_drag_offset_stays_within_bounds() {
        let start = Instant::now();
        let mut model = PositionModel::new();
        let mut controller = pressed_at(0, 0, start, &model);

        for step in -40..=40 {
            let point = PointerPoint::new(step * 13, -step * 29);
            if let Some(offset) = controller.motion(point, &mut model) {
                assert!((-MAX_OFFSET..=MAX_OFFSET).contains(&offset.x));
                assert!((-MAX_OFFSET..=MAX_OFFSET).contains(&offset.y));
            }
        }
        let offset = model.offset();
        assert!((-MAX_OFFSET..=MAX_OFFSET).contains(&offset.x));
        assert!((-MAX_OFFSET..=MAX_OFFSET).contains(&offset.y));
    }

    #[test]
    fn press_after_a_lost_release_does_not_leave_clicks_suppressed() {
        let start = Instant::now();
        let mut model = PositionModel::new();
        let mut controller = pressed_at(0, 0, start, &model);
        controller.motion(PointerPoint::new(30, 0), &mut model);

        let repress_at = start + Duration::from_secs(5);
        controller.press(PointerPoint::new(30, 0), repress_at, &model);
        let outcome = controller.release(repress_at + Duration::from_millis(50));

        assert_eq!(outcome, Some(GestureOutcome::Click));
        assert!(controller.suppresses_click(ClickTarget::Control, repress_at));
        assert!(!controller.suppresses_click(
            ClickTarget::Control,
            repress_at + Duration::from_secs(60)
        ));
    }

    #[test]
    fn quick_drag_release_clears_suppression_immediately() {
        let start = Instant::now();
        let mut model = PositionModel::new();
        let mut controller = pressed_at(0, 0, start, &model);
        controller.motion(PointerPoint::new(20, 0), &mut model);
        assert!(controller.suppresses_click(ClickTarget::Control, start));

        let release_at = start + Duration::from_millis(120);
        assert_eq!(
            controller.release(release_at),
            Some(GestureOutcome::Drag { quick: true })
        );
        assert!(!controller.suppresses_click(ClickTarget::Control, release_at));
    }

    #[test]
    fn slow_drag_release_suppresses_clicks_for_cooldown() {
        let start = Instant::now();
        let mut model = PositionModel::new();
        let mut controller = pressed_at(0, 0, start, &model);
        controller.motion(PointerPoint::new(0, 30), &mut model);

        let release_at = start + Duration::from_millis(900);
        assert_eq!(
            controller.release(release_at),
            Some(GestureOutcome::Drag { quick: false })
        );
        assert!(controller
            .suppresses_click(ClickTarget::Control, release_at + Duration::from_millis(499)));
        assert!(!controller
            .suppresses_click(ClickTarget::Control, release_at + CLICK_SUPPRESSION_COOLDOWN));
    }

    #[test]
    fn image_clicks_are_always_suppressed() {
        let controller = DragController::new();
        assert!(controller.suppresses_click(ClickTarget::Image, Instant::now()));
    }

    #[test]
    fn release_without_press_is_ignored() {
        let mut controller = DragController::new();
        assert_eq!(controller.release(Instant::now()), None);
    }

    #[test]
    fn cancel_drops_gesture_and_suppression() {
        let start = Instant::now();
        let mut model = PositionModel::new();
        let mut controller = pressed_at(0, 0, start, &model);
        controller.motion(PointerPoint::new(40, 40), &mut model);

        controller.cancel();

        assert_eq!(controller.phase(), DragPhase::Idle);
        assert_eq!(controller.motion(PointerPoint::new(80, 80), &mut model), None);
        assert!(!controller.suppresses_click(ClickTarget::Control, start));
    }
}
