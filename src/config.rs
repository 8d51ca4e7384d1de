//! Resolved engine configuration.
//!
//! The engine never parses a configuration file or command line itself
//! (that remains an external collaborator); it only consumes an already
//! resolved [`CompositorConfig`]. Defaults mirror the values documented by
//! the window manager this engine's behavior is modeled on.

use crate::utils::Point;

/// Per-window-type behavioral toggles.
///
/// One entry exists per [`crate::window::WindowType`] variant; indexed via
/// [`WindowTypeOptions::get`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowTypeOption {
    /// Whether windows of this type may have a shadow.
    pub shadow: bool,
    /// Whether windows of this type fade in/out.
    pub fade: bool,
    /// Whether windows of this type participate in focus tracking.
    pub focus: bool,
    /// Fixed opacity override for this type, if any.
    pub opacity: Option<f64>,
    /// Whether windows of this type are excluded from painting entirely.
    pub redir_ignore: bool,
}

impl Default for WindowTypeOption {
    fn default() -> Self {
        WindowTypeOption {
            shadow: true,
            fade: true,
            focus: false,
            opacity: None,
            redir_ignore: false,
        }
    }
}

/// Table of [`WindowTypeOption`], one per window type tag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowTypeOptions([WindowTypeOption; 15]);

impl WindowTypeOptions {
    /// Looks up the options for `ty`.
    pub fn get(&self, ty: crate::window::WindowType) -> WindowTypeOption {
        self.0[ty as usize]
    }
}

impl Default for WindowTypeOptions {
    fn default() -> Self {
        use crate::window::WindowType::*;
        let mut table = [WindowTypeOption::default(); 15];
        table[Desktop as usize] = WindowTypeOption {
            shadow: false,
            fade: false,
            focus: true,
            redir_ignore: true,
            ..Default::default()
        };
        table[Dock as usize].shadow = false;
        table[Dropdown as usize].fade = false;
        table[Popup as usize].fade = false;
        table[Tooltip as usize] = WindowTypeOption {
            shadow: false,
            fade: true,
            ..Default::default()
        };
        table[Notify as usize].shadow = true;
        WindowTypeOptions(table)
    }
}

/// Resolved engine configuration, handed to the engine once at startup (and
/// again on a SIGUSR1-triggered reset).
///
/// Field defaults reproduce the documented defaults of the system this
/// engine's behavior is modeled on, so unit tests and any future CLI layer
/// share one source of truth.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositorConfig {
    /// Interval, in milliseconds, between fade steps.
    pub fade_delta_ms: u64,
    /// Opacity increment applied per fade step while fading in.
    pub fade_in_step: f64,
    /// Opacity decrement applied per fade step while fading out.
    pub fade_out_step: f64,

    /// Gaussian shadow blur radius, in pixels.
    pub shadow_radius: i32,
    /// Shadow opacity multiplier in `[0, 1]`.
    pub shadow_opacity: f64,
    /// Shadow offset relative to the window's top-left corner.
    pub shadow_offset: Point,
    /// Shadow color components in `[0, 1]`.
    pub shadow_color: (f64, f64, f64),

    /// Opacity dim applied to inactive windows, in `[0, 1]`.
    pub inactive_dim: f64,
    /// Opacity of the active window, in `[0, 1]`.
    pub active_opacity: f64,
    /// Opacity applied to a window's WM frame, in `[0, 1]`.
    pub frame_opacity: f64,

    /// Whether to stop redirecting when a fullscreen opaque window covers
    /// the whole screen.
    pub unredir_if_possible: bool,
    /// Delay, in milliseconds, before acting on `unredir_if_possible`.
    pub unredir_if_possible_delay_ms: u64,

    /// Whether to track the EWMH active window.
    pub track_focus: bool,
    /// Whether to prefer `_NET_ACTIVE_WINDOW` over a local focus heuristic.
    pub use_ewmh_active_win: bool,

    /// Detect rounded window corners and skip their shadow.
    pub detect_rounded_corners: bool,
    /// Trust the client-set `_NET_WM_WINDOW_OPACITY` property.
    pub detect_client_opacity: bool,
    /// Resolve `WM_TRANSIENT_FOR` into a window group leader.
    pub detect_transient: bool,
    /// Resolve `WM_CLIENT_LEADER` into a window group leader.
    pub detect_client_leader: bool,

    /// Crop shadows to Xinerama screen boundaries.
    pub xinerama_shadow_crop: bool,

    /// Per-window-type behavior toggles.
    pub window_type_options: WindowTypeOptions,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        CompositorConfig {
            fade_delta_ms: 10,
            fade_in_step: 0.028,
            fade_out_step: 0.03,

            shadow_radius: 12,
            shadow_opacity: 0.75,
            shadow_offset: Point::new(-15, -15),
            shadow_color: (0.0, 0.0, 0.0),

            inactive_dim: 0.0,
            active_opacity: 1.0,
            frame_opacity: 1.0,

            unredir_if_possible: false,
            unredir_if_possible_delay_ms: 0,

            track_focus: false,
            use_ewmh_active_win: false,

            detect_rounded_corners: true,
            detect_client_opacity: true,
            detect_transient: true,
            detect_client_leader: false,

            xinerama_shadow_crop: false,

            window_type_options: WindowTypeOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = CompositorConfig::default();
        assert_eq!(cfg.fade_delta_ms, 10);
        assert_eq!(cfg.fade_in_step, 0.028);
        assert_eq!(cfg.fade_out_step, 0.03);
        assert_eq!(cfg.shadow_radius, 12);
        assert_eq!(cfg.shadow_opacity, 0.75);
        assert_eq!(cfg.shadow_offset, Point::new(-15, -15));
        assert_eq!(cfg.inactive_dim, 0.0);
        assert_eq!(cfg.frame_opacity, 1.0);
        assert!(!cfg.unredir_if_possible);
    }

    #[test]
    fn desktop_windows_are_redir_ignored_and_unfaded() {
        let table = WindowTypeOptions::default();
        let desktop = table.get(crate::window::WindowType::Desktop);
        assert!(desktop.redir_ignore);
        assert!(!desktop.fade);
        assert!(!desktop.shadow);
    }
}
