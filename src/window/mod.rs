//! Window records and the per-window state machine (§3, §4.4).

mod record;
mod state;

pub use record::{ForceOverride, WindowFlags, WindowRecord};
pub use state::{FadeOutcome, WindowState};

/// EWMH `_NET_WM_WINDOW_TYPE` classification used for per-type defaults
/// (`config::WindowTypeOptions`) and painting decisions.
///
/// Order is used to index [`crate::config::WindowTypeOptions`]; do not
/// reorder without updating that table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum WindowType {
    /// `_NET_WM_WINDOW_TYPE_DESKTOP`
    Desktop = 0,
    /// `_NET_WM_WINDOW_TYPE_DOCK`
    Dock,
    /// `_NET_WM_WINDOW_TYPE_TOOLBAR`
    Toolbar,
    /// `_NET_WM_WINDOW_TYPE_MENU`
    Menu,
    /// `_NET_WM_WINDOW_TYPE_UTILITY`
    Utility,
    /// `_NET_WM_WINDOW_TYPE_SPLASH`
    Splash,
    /// `_NET_WM_WINDOW_TYPE_DIALOG`
    Dialog,
    /// `_NET_WM_WINDOW_TYPE_NORMAL`
    Normal,
    /// `_NET_WM_WINDOW_TYPE_DROPDOWN_MENU`
    Dropdown,
    /// `_NET_WM_WINDOW_TYPE_POPUP_MENU`
    Popup,
    /// `_NET_WM_WINDOW_TYPE_TOOLTIP`
    Tooltip,
    /// `_NET_WM_WINDOW_TYPE_NOTIFICATION`
    Notify,
    /// `_NET_WM_WINDOW_TYPE_COMBO`
    Combo,
    /// `_NET_WM_WINDOW_TYPE_DND`
    Dnd,
    /// No recognized type atom was present.
    Unknown,
}

/// X11 `class` attribute: whether the window can receive output at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowClass {
    /// Ordinary, paintable window.
    InputOutput,
    /// Event-only window; never painted.
    InputOnly,
}

/// Paint classification derived each preprocess pass from opacity and
/// frame opacity (§4.7 step 2e).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaintMode {
    /// Fully opaque: `opacity == 1` and (no frame or `frame_opacity == 1`).
    Solid,
    /// Body opaque but the WM frame is translucent.
    FrameTrans,
    /// Body itself is translucent.
    Trans,
}
