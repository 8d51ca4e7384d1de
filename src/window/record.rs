//! [`WindowRecord`]: the per-window data record (§3).

use x11rb::protocol::xproto::Window as XWindow;

use crate::backend::ImageHandle;
use crate::region::SharedRegion;
use crate::utils::Rectangle;
use crate::window::{PaintMode, WindowClass, WindowState, WindowType};

bitflags::bitflags! {
    /// Per-window flags that don't warrant their own field (§3 `flags`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct WindowFlags: u8 {
        /// The bound image is stale (e.g. after a resize) and must be
        /// rebound before the window can be painted again.
        const STALE_IMAGE = 0b0000_0001;
        /// The last rebind attempt failed; skip painting until a later
        /// rebind succeeds.
        const IMAGE_ERROR = 0b0000_0010;
    }
}

/// A D-Bus-settable per-window override: force a property on, off, or defer
/// to the computed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForceOverride {
    /// Force the property on.
    On,
    /// Force the property off.
    Off,
    /// No override; use the computed value.
    #[default]
    Unset,
}

impl ForceOverride {
    /// Resolves this override against a computed value.
    pub fn resolve(self, computed: bool) -> bool {
        match self {
            ForceOverride::On => true,
            ForceOverride::Off => false,
            ForceOverride::Unset => computed,
        }
    }
}

/// One entry in the window registry: everything the engine knows and
/// tracks about a single X window.
#[derive(Debug)]
pub struct WindowRecord {
    /// X window id; the registry's hash key.
    pub id: XWindow,
    /// Current on-screen geometry (root-relative position, size, border).
    pub geometry: Rectangle,
    /// Border width, in pixels, kept separately since it pads the bounding
    /// shape but is not part of `geometry`'s size.
    pub border_width: i32,
    /// X id of the WM-client child window, or `id` itself if none is known.
    pub client_id: XWindow,

    /// Whether the window is currently viewable at the X level.
    pub viewable: bool,
    /// `InputOutput` or `InputOnly`.
    pub class: WindowClass,
    /// Whether the window set `override-redirect`.
    pub override_redirect: bool,

    /// EWMH window type classification.
    pub window_type: WindowType,
    /// Window-local bounding shape; equals the geometry rectangle unless
    /// the window set an X Shape bounding region.
    pub bounding_shape: crate::region::Region,
    /// True if no rectangle of `bounding_shape` is large enough to rule out
    /// rounded corners (§4.4 rounded-corner detection).
    pub rounded_corners: bool,
    /// WM frame extents: (left, right, top, bottom), in pixels.
    pub frame_extents: (i32, i32, i32, i32),

    /// Lifecycle state.
    pub state: WindowState,
    /// Current opacity, in `[0, 1]`.
    pub opacity: f64,
    /// Opacity this window is fading toward.
    pub opacity_tgt: f64,
    /// Value of `_NET_WM_WINDOW_OPACITY`, if the client set one.
    pub opacity_prop: Option<f64>,
    /// Opacity forced by a matching opacity rule, if any.
    pub opacity_set: Option<f64>,

    /// Effective focus state (after group resolution).
    pub focused: bool,
    /// Resolved window-group leader (via `WM_TRANSIENT_FOR` or
    /// `WM_CLIENT_LEADER`), if any.
    pub leader: Option<XWindow>,

    /// Whether a shadow should currently be drawn for this window.
    pub shadow: bool,
    /// Precomputed shadow geometry: (dx, dy, width, height).
    pub shadow_geometry: (i32, i32, i32, i32),

    /// Invert the window's colors when painting.
    pub invert_color: bool,
    /// Dim the window (inactive-window dimming).
    pub dim: bool,
    /// Blur everything underneath this window's translucent parts.
    pub blur_background: bool,
    /// Opacity applied to the WM frame specifically.
    pub frame_opacity: f64,

    /// Cached "occluded by strictly-higher opaque windows" region, shared
    /// with windows below that inherited it unchanged (§4.5).
    pub reg_ignore: Option<SharedRegion>,
    /// False whenever the stack or a higher window's geometry/opacity/mode
    /// changed since last preprocess; repaired top-down during preprocess.
    pub reg_ignore_valid: bool,

    /// Whether at least one `DamageNotify` has arrived since this window
    /// was mapped.
    pub ever_damaged: bool,
    /// Paint classification from the last preprocess pass.
    pub paint_mode: PaintMode,
    /// Whether this window was selected for painting in the last pipeline
    /// pass (used to detect transitions in/out of the paint set).
    pub to_paint: bool,

    /// Scratch link used only within a single preprocess/pipeline cycle:
    /// the next window up in the sub-stack actually selected for painting.
    pub prev_trans: Option<XWindow>,

    /// Backend-owned window body image, if bound.
    pub win_image: Option<ImageHandle>,
    /// Backend-owned shadow image, if rendered.
    pub shadow_image: Option<ImageHandle>,
    /// Bookkeeping flags (`STALE_IMAGE`, `IMAGE_ERROR`).
    pub flags: WindowFlags,

    /// Force shadow on/off, overriding the computed value.
    pub force_shadow: ForceOverride,
    /// Force fading on/off, overriding the computed value.
    pub force_fade: ForceOverride,
    /// Force this window to be treated as focused.
    pub force_focused: ForceOverride,
    /// Force color inversion on/off.
    pub force_invert_color: ForceOverride,
}

impl WindowRecord {
    /// Creates a fresh record for a window that was just added to the
    /// registry, in state [`WindowState::Unmapped`] (§4.4 `add_window`).
    pub fn new(id: XWindow, geometry: Rectangle) -> Self {
        WindowRecord {
            id,
            geometry,
            border_width: 0,
            client_id: id,

            viewable: false,
            class: WindowClass::InputOutput,
            override_redirect: false,

            window_type: WindowType::Unknown,
            bounding_shape: crate::region::Region::from_rect(geometry),
            rounded_corners: false,
            frame_extents: (0, 0, 0, 0),

            state: WindowState::Unmapped,
            opacity: 1.0,
            opacity_tgt: 1.0,
            opacity_prop: None,
            opacity_set: None,

            focused: false,
            leader: None,

            shadow: false,
            shadow_geometry: (0, 0, 0, 0),

            invert_color: false,
            dim: false,
            blur_background: false,
            frame_opacity: 1.0,

            reg_ignore: None,
            reg_ignore_valid: false,

            ever_damaged: false,
            paint_mode: PaintMode::Solid,
            to_paint: false,

            prev_trans: None,

            win_image: None,
            shadow_image: None,
            flags: WindowFlags::empty(),

            force_shadow: ForceOverride::Unset,
            force_fade: ForceOverride::Unset,
            force_focused: ForceOverride::Unset,
            force_invert_color: ForceOverride::Unset,
        }
    }

    /// True if this window's effective alpha (opacity × frame_opacity) is
    /// below the 1/255 threshold below which it is not worth painting.
    pub fn is_effectively_transparent(&self) -> bool {
        self.opacity * self.frame_opacity < 1.0 / 255.0
    }

    /// Window geometry including the border, as used for the bounding
    /// shape of an unshaped window (§3: `(0, 0, w+2b, h+2b)`).
    pub fn bordered_size(&self) -> (i32, i32) {
        (
            self.geometry.width() + 2 * self.border_width,
            self.geometry.height() + 2 * self.border_width,
        )
    }
}
