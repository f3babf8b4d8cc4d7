//! Registry data model: window records, desk state, interaction sessions,
//! and the persisted layout snapshot.

use std::collections::BTreeMap;

use panel_contract::AppKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::adjustments::AdjustmentLedger;

/// Schema version embedded in persisted layout snapshots.
pub const LAYOUT_SCHEMA_VERSION: u32 = 1;

/// Height of the navigation chrome above the desk area, in px.
pub const NAV_CHROME_HEIGHT_PX: i32 = 48;
/// Height of the taskbar pinned to the bottom edge, in px.
pub const TASKBAR_HEIGHT_PX: i32 = 38;
/// Horizontal gap between an origin window and its sidecar, in px.
pub const SIDECAR_GAP_PX: i32 = 12;
/// Viewport width at or below which the shell runs single-window.
pub const COMPACT_VIEWPORT_MAX_PX: i32 = 768;

/// Fallback width when the catalog leaves the axis unspecified.
pub const DEFAULT_PANEL_WIDTH: i32 = 560;
/// Fallback height when the catalog leaves the axis unspecified.
pub const DEFAULT_PANEL_HEIGHT: i32 = 420;
/// Smallest width a resize may produce.
pub const MIN_PANEL_WIDTH: i32 = 280;
/// Smallest height a resize may produce.
pub const MIN_PANEL_HEIGHT: i32 = 180;

/// First cascade slot, left edge.
pub const CASCADE_BASE_X: i32 = 32;
/// First cascade slot, below the navigation chrome.
pub const CASCADE_BASE_Y: i32 = NAV_CHROME_HEIGHT_PX + 16;
/// Diagonal step between consecutive cascade slots.
pub const CASCADE_STEP_PX: i32 = 26;
/// Cascade slots before the stagger wraps around.
pub const CASCADE_SLOTS: usize = 8;

/// Stable identity of one managed window. Never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WindowId(pub u64);

/// Viewport dimensions measured at dispatch time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Inner width in px.
    pub width: i32,
    /// Inner height in px.
    pub height: i32,
}

impl Viewport {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Whether the shell should run in single-window compact mode.
    pub const fn is_compact(self) -> bool {
        self.width <= COMPACT_VIEWPORT_MAX_PX
    }

    /// Height of the band between navigation chrome and taskbar.
    pub const fn desk_height(self) -> i32 {
        self.height - NAV_CHROME_HEIGHT_PX - TASKBAR_HEIGHT_PX
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 800)
    }
}

/// Top-left position in desk coordinates; for transform-mode windows this
/// is the translate offset from the stylesheet-centered default instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PanelPoint {
    pub x: i32,
    pub y: i32,
}

impl PanelPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Window dimensions; a `None` axis means "auto" (content sizes itself).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PanelSize {
    #[serde(default)]
    pub width: Option<i32>,
    #[serde(default)]
    pub height: Option<i32>,
}

impl PanelSize {
    /// Fully concrete size.
    pub const fn px(width: i32, height: i32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
        }
    }

    /// Both axes auto.
    pub const fn auto() -> Self {
        Self {
            width: None,
            height: None,
        }
    }

    pub fn width_or_default(self) -> i32 {
        self.width.unwrap_or(DEFAULT_PANEL_WIDTH)
    }

    pub fn height_or_default(self) -> i32 {
        self.height.unwrap_or(DEFAULT_PANEL_HEIGHT)
    }
}

/// Measured on-screen rectangle in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PanelRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PanelRect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Persistable position/size pair for one app kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelGeometry {
    pub position: PanelPoint,
    #[serde(default)]
    pub size: PanelSize,
}

/// How a window derives its on-screen coordinates. Fixed at creation from
/// the catalog descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DragMode {
    /// Ordinary absolutely positioned window; `position` is desk coords.
    #[default]
    Absolute,
    /// Stylesheet-centered window dragged via a translate offset.
    TransformOffset,
    /// Starts stylesheet-centered; the first drag latches the measured
    /// on-screen coordinates as an absolute baseline.
    AbsoluteLatch,
}

/// Session-level reuse policy for kinds without an always-single flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstancePolicy {
    #[default]
    Multi,
    Single,
}

/// One managed window. `dirty` is advisory and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowRecord {
    pub id: WindowId,
    pub app: AppKind,
    pub z_index: u32,
    pub position: PanelPoint,
    #[serde(default)]
    pub size: PanelSize,
    pub title: String,
    pub icon: String,
    #[serde(default)]
    pub minimized: bool,
    #[serde(skip)]
    pub dirty: bool,
    #[serde(default)]
    pub drag_mode: DragMode,
    #[serde(default)]
    pub latched: bool,
    #[serde(default)]
    pub props: Value,
}

impl WindowRecord {
    /// Current geometry pair, as stored in the per-app override map.
    pub fn geometry(&self) -> PanelGeometry {
        PanelGeometry {
            position: self.position,
            size: self.size,
        }
    }

    /// Whether the window is currently positioned by the stylesheet
    /// (centered) rather than by explicit coordinates.
    pub fn is_stylesheet_positioned(&self) -> bool {
        matches!(self.drag_mode, DragMode::AbsoluteLatch) && !self.latched
    }
}

/// Persisted layout document, per user scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    pub schema_version: u32,
    #[serde(default)]
    pub windows: Vec<WindowRecord>,
    #[serde(default)]
    pub active_window_id: Option<WindowId>,
    #[serde(default)]
    pub instance_policy: InstancePolicy,
}

impl Default for LayoutSnapshot {
    fn default() -> Self {
        Self {
            schema_version: LAYOUT_SCHEMA_VERSION,
            windows: Vec::new(),
            active_window_id: None,
            instance_policy: InstancePolicy::default(),
        }
    }
}

/// Live registry state: the single source of truth the shell renders.
#[derive(Debug, Clone, PartialEq)]
pub struct DeskState {
    /// Next window id to hand out; ids only ever grow.
    pub next_window_id: u64,
    /// Next z-order value; shared monotonic counter for all focus events.
    pub next_z_index: u32,
    /// Open windows in creation order. Stacking comes from `z_index`.
    pub windows: Vec<WindowRecord>,
    pub active_window_id: Option<WindowId>,
    pub instance_policy: InstancePolicy,
    /// Persisted geometry overrides, hydrated at boot and updated on
    /// drag-stop/resize-stop.
    pub per_app_geometry: BTreeMap<AppKind, PanelGeometry>,
    /// Uncommitted cross-window inventory adjustments.
    pub adjustments: AdjustmentLedger,
    /// Set once the boot snapshot load finished; layout writes are
    /// suppressed before that.
    pub hydrated: bool,
}

impl Default for DeskState {
    fn default() -> Self {
        Self {
            next_window_id: 1,
            next_z_index: 1,
            windows: Vec::new(),
            active_window_id: None,
            instance_policy: InstancePolicy::default(),
            per_app_geometry: BTreeMap::new(),
            adjustments: AdjustmentLedger::default(),
            hydrated: false,
        }
    }
}

impl DeskState {
    pub fn window(&self, id: WindowId) -> Option<&WindowRecord> {
        self.windows.iter().find(|w| w.id == id)
    }

    pub fn window_mut(&mut self, id: WindowId) -> Option<&mut WindowRecord> {
        self.windows.iter_mut().find(|w| w.id == id)
    }

    /// First open window of the given kind, if any.
    pub fn window_of_app(&self, app: AppKind) -> Option<&WindowRecord> {
        self.windows.iter().find(|w| w.app == app)
    }

    /// Highest z-order among open windows; 0 with none open.
    pub fn max_z_index(&self) -> u32 {
        self.windows.iter().map(|w| w.z_index).max().unwrap_or(0)
    }

    pub(crate) fn alloc_window_id(&mut self) -> WindowId {
        let id = WindowId(self.next_window_id);
        self.next_window_id += 1;
        id
    }

    pub(crate) fn alloc_z_index(&mut self) -> u32 {
        let z = self.next_z_index;
        self.next_z_index += 1;
        z
    }

    /// Serializable view of the registry, volatile flags excluded.
    pub fn snapshot(&self) -> LayoutSnapshot {
        LayoutSnapshot {
            schema_version: LAYOUT_SCHEMA_VERSION,
            windows: self.windows.clone(),
            active_window_id: self.active_window_id,
            instance_policy: self.instance_policy,
        }
    }

    /// Replaces registry contents from a boot snapshot.
    ///
    /// Id and z counters restart past the highest restored values so
    /// nothing handed out later can collide. A persisted active id that no
    /// longer resolves, or points at a minimized window, reads as "no
    /// active window".
    pub fn apply_snapshot(
        &mut self,
        snapshot: LayoutSnapshot,
        per_app_geometry: BTreeMap<AppKind, PanelGeometry>,
    ) {
        let mut windows = snapshot.windows;
        windows.retain(|w| !w.app.is_home());
        for window in &mut windows {
            window.dirty = false;
        }

        self.next_window_id = windows
            .iter()
            .map(|w| w.id.0)
            .max()
            .unwrap_or(0)
            .saturating_add(1);
        self.next_z_index = windows
            .iter()
            .map(|w| w.z_index)
            .max()
            .unwrap_or(0)
            .saturating_add(1);

        self.active_window_id = snapshot.active_window_id.filter(|id| {
            windows
                .iter()
                .any(|w| w.id == *id && !w.minimized)
        });
        self.instance_policy = snapshot.instance_policy;
        self.windows = windows;
        self.per_app_geometry = per_app_geometry;
    }
}

/// Pointer coordinates in client space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerPosition {
    pub x: i32,
    pub y: i32,
}

impl PointerPosition {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Live move session between pointer-down and pointer-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    pub window_id: WindowId,
    pub mode: DragMode,
    pub pointer_start: PointerPosition,
    /// Measured on-screen rect of the window at pointer-down.
    pub anchor: PanelRect,
    /// Record position at pointer-down; offset or desk coords per mode.
    pub position_start: PanelPoint,
}

/// Live corner-handle resize session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeSession {
    pub window_id: WindowId,
    pub pointer_start: PointerPosition,
    /// Concrete width at pointer-down; auto resolved by measurement.
    pub width_start: i32,
    /// Concrete height at pointer-down; auto resolved by measurement.
    pub height_start: i32,
}

/// Transient pointer-interaction state. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InteractionState {
    pub drag: Option<DragSession>,
    pub resize: Option<ResizeSession>,
}

impl InteractionState {
    /// Whether any pointer tracking is in progress.
    pub fn is_tracking(&self) -> bool {
        self.drag.is_some() || self.resize.is_some()
    }
}

/// Launch request handed to the reducer; the dispatch layer fills in the
/// measured viewport so launch geometry stays a pure computation.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchRequest {
    pub app: AppKind,
    /// Opaque props for the hosted panel; `Null` reads as an empty object.
    pub props: Value,
    /// Window to place the new one beside (sidecar), when given.
    pub origin: Option<WindowId>,
    pub viewport: Viewport,
}

impl LaunchRequest {
    pub fn new(app: AppKind, viewport: Viewport) -> Self {
        Self {
            app,
            props: Value::Null,
            origin: None,
            viewport,
        }
    }

    pub fn with_props(mut self, props: Value) -> Self {
        self.props = props;
        self
    }

    pub fn with_origin(mut self, origin: WindowId) -> Self {
        self.origin = Some(origin);
        self
    }
}
