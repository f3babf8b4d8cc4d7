//! Positioning strategies and boundary math for pointer drags.

use crate::model::{
    DragMode, DragSession, PanelPoint, PointerPosition, ResizeSession, Viewport,
    MIN_PANEL_HEIGHT, MIN_PANEL_WIDTH, NAV_CHROME_HEIGHT_PX, TASKBAR_HEIGHT_PX,
};

/// Clamps a candidate top edge into the band between navigation chrome and
/// taskbar.
///
/// The bottom edge may not sink under the taskbar line; the top edge may
/// not rise above the chrome. For windows taller than the band the top
/// clamp is applied last so the titlebar always stays reachable.
/// Horizontal movement is deliberately unclamped.
pub fn clamp_top_edge(candidate_top: i32, window_height: i32, viewport: Viewport) -> i32 {
    let lowest_top = viewport.height - TASKBAR_HEIGHT_PX - window_height;
    candidate_top.min(lowest_top).max(NAV_CHROME_HEIGHT_PX)
}

/// Computes a window's position from a live drag session.
///
/// One strategy per positioning mode, fixed at window creation. The
/// strategies reason about different reference geometry (transform mode
/// asks where the *target* top edge would land, absolute mode clamps the
/// new top directly) but express the same visible boundary.
pub trait DragStrategy {
    /// Candidate position for the current pointer location.
    fn position_for(
        &self,
        session: &DragSession,
        pointer: PointerPosition,
        viewport: Viewport,
    ) -> PanelPoint;
}

/// Plain absolute positioning: `position` is desk coordinates.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbsoluteDrag;

impl DragStrategy for AbsoluteDrag {
    fn position_for(
        &self,
        session: &DragSession,
        pointer: PointerPosition,
        viewport: Viewport,
    ) -> PanelPoint {
        let dx = pointer.x - session.pointer_start.x;
        let dy = pointer.y - session.pointer_start.y;
        let x = session.position_start.x + dx;
        let y = clamp_top_edge(
            session.position_start.y + dy,
            session.anchor.height,
            viewport,
        );
        PanelPoint::new(x, y)
    }
}

/// Offset positioning for stylesheet-centered windows: `position` is the
/// translate delta, so clamping works through the measured anchor.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransformOffsetDrag;

impl DragStrategy for TransformOffsetDrag {
    fn position_for(
        &self,
        session: &DragSession,
        pointer: PointerPosition,
        viewport: Viewport,
    ) -> PanelPoint {
        let dx = pointer.x - session.pointer_start.x;
        let dy = pointer.y - session.pointer_start.y;
        // Where would the window's top edge land if the offset moved by dy?
        let target_top = session.anchor.y + dy;
        let clamped_top = clamp_top_edge(target_top, session.anchor.height, viewport);
        PanelPoint::new(
            session.position_start.x + dx,
            session.position_start.y + (clamped_top - session.anchor.y),
        )
    }
}

/// Strategy for a window's positioning mode. Latch-mode windows latch at
/// pointer-down and then behave as absolutely positioned.
pub fn strategy_for(mode: DragMode) -> &'static dyn DragStrategy {
    match mode {
        DragMode::Absolute | DragMode::AbsoluteLatch => &AbsoluteDrag,
        DragMode::TransformOffset => &TransformOffsetDrag,
    }
}

/// Applies the corner-handle delta with minimum-size clamping.
pub fn resized_dimensions(session: &ResizeSession, pointer: PointerPosition) -> (i32, i32) {
    let width = (session.width_start + (pointer.x - session.pointer_start.x)).max(MIN_PANEL_WIDTH);
    let height =
        (session.height_start + (pointer.y - session.pointer_start.y)).max(MIN_PANEL_HEIGHT);
    (width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PanelRect, WindowId};
    use pretty_assertions::assert_eq;

    const VIEWPORT: Viewport = Viewport::new(1280, 800);

    fn absolute_session(position: PanelPoint, anchor: PanelRect) -> DragSession {
        DragSession {
            window_id: WindowId(1),
            mode: DragMode::Absolute,
            pointer_start: PointerPosition::new(400, 300),
            anchor,
            position_start: position,
        }
    }

    #[test]
    fn overshooting_the_chrome_clamps_y_to_exactly_chrome_height() {
        let session = absolute_session(
            PanelPoint::new(200, 160),
            PanelRect::new(200, 160, 600, 400),
        );
        // Pointer flies 500px up; however far past the boundary, the
        // reported top is exactly the chrome height.
        let pos = strategy_for(session.mode).position_for(
            &session,
            PointerPosition::new(400, -200),
            VIEWPORT,
        );
        assert_eq!(pos.y, NAV_CHROME_HEIGHT_PX);
        assert_eq!(pos.x, 200);
    }

    #[test]
    fn bottom_edge_stops_at_the_taskbar_line() {
        let session = absolute_session(
            PanelPoint::new(200, 160),
            PanelRect::new(200, 160, 600, 400),
        );
        let pos = strategy_for(session.mode).position_for(
            &session,
            PointerPosition::new(400, 3000),
            VIEWPORT,
        );
        assert_eq!(pos.y, VIEWPORT.height - TASKBAR_HEIGHT_PX - 400);
    }

    #[test]
    fn horizontal_movement_is_unclamped() {
        let session = absolute_session(
            PanelPoint::new(200, 160),
            PanelRect::new(200, 160, 600, 400),
        );
        let pos = strategy_for(session.mode).position_for(
            &session,
            PointerPosition::new(-900, 300),
            VIEWPORT,
        );
        assert_eq!(pos.x, 200 - 1300);
        assert_eq!(pos.y, 160);
    }

    #[test]
    fn transform_mode_expresses_the_same_visible_boundary() {
        // A centered window whose measured top sits at 250 while its
        // offset is (0, 0). Dragging 400px up must leave the *visible*
        // top at the chrome height, i.e. offset y = chrome - 250.
        let session = DragSession {
            window_id: WindowId(2),
            mode: DragMode::TransformOffset,
            pointer_start: PointerPosition::new(640, 400),
            anchor: PanelRect::new(440, 250, 400, 300),
            position_start: PanelPoint::default(),
        };
        let pos = strategy_for(session.mode).position_for(
            &session,
            PointerPosition::new(640, 0),
            VIEWPORT,
        );
        assert_eq!(session.anchor.y + pos.y, NAV_CHROME_HEIGHT_PX);
    }

    #[test]
    fn transform_mode_moves_freely_inside_the_band() {
        let session = DragSession {
            window_id: WindowId(2),
            mode: DragMode::TransformOffset,
            pointer_start: PointerPosition::new(640, 400),
            anchor: PanelRect::new(440, 250, 400, 300),
            position_start: PanelPoint::new(10, -20),
        };
        let pos = strategy_for(session.mode).position_for(
            &session,
            PointerPosition::new(660, 430),
            VIEWPORT,
        );
        assert_eq!(pos, PanelPoint::new(30, 10));
    }

    #[test]
    fn tall_windows_keep_the_titlebar_reachable() {
        // Window taller than the band: the top clamp wins over the bottom.
        let session = absolute_session(
            PanelPoint::new(0, 100),
            PanelRect::new(0, 100, 500, 2000),
        );
        let pos = strategy_for(session.mode).position_for(
            &session,
            PointerPosition::new(400, 600),
            VIEWPORT,
        );
        assert_eq!(pos.y, NAV_CHROME_HEIGHT_PX);
    }

    #[test]
    fn resize_clamps_to_the_minimum_size() {
        let session = ResizeSession {
            window_id: WindowId(3),
            pointer_start: PointerPosition::new(800, 600),
            width_start: 600,
            height_start: 400,
        };
        let (w, h) = resized_dimensions(&session, PointerPosition::new(0, 0));
        assert_eq!((w, h), (MIN_PANEL_WIDTH, MIN_PANEL_HEIGHT));

        let (w, h) = resized_dimensions(&session, PointerPosition::new(850, 630));
        assert_eq!((w, h), (650, 430));
    }
}
