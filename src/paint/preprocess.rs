//! Paint preprocess (§4.7): walks the stack top-to-bottom, advances fades,
//! maintains ignore-regions, and decides the sub-stack to paint.

use smallvec::SmallVec;
use x11rb::protocol::xproto::Window as XWindow;

use crate::ignore::IgnoreScan;
use crate::region::Region;
use crate::session::Session;
use crate::window::{step_opacity, FadeOutcome, PaintMode, WindowState};

/// Result of one preprocess pass.
#[derive(Debug, Default)]
pub struct PreprocessOutcome {
    /// Windows selected for painting, in bottom-to-top stack order.
    pub paint_chain: Vec<XWindow>,
    /// True if, after this pass, the screen should be (or remain)
    /// redirected; false if it should be (or remain) unredirected because
    /// a fullscreen opaque window covers the whole screen and
    /// `unredir_if_possible` is set (§4.7 step 4).
    pub should_redirect: bool,
    /// Window ids whose state converged to a terminal state this pass
    /// (`Unmapped` from `Unmapping`, or freed from `Destroying`) and must
    /// be finalized by the caller (image release, registry cleanup). Rarely
    /// more than one or two windows converge in the same pass.
    pub finished: SmallVec<[(XWindow, WindowState); 4]>,
}

/// Runs one preprocess pass.
///
/// `elapsed_fade_steps` is the number of `fade_delta` intervals that have
/// elapsed since the last call, computed by the main loop's fade timer
/// (§4.11); it may be `0` if preprocess is being run for a reason other
/// than the fade timer firing (e.g. a configure event).
pub fn preprocess(session: &mut Session, elapsed_fade_steps: u32) -> PreprocessOutcome {
    let mut outcome = PreprocessOutcome::default();
    let ids: Vec<XWindow> = session.registry.iter_top_down().map(|w| w.id).collect();

    // Pass 1: fade + mode recomputation, top to bottom.
    for &id in &ids {
        let Some(w) = session.registry.find_any_mut(id) else {
            continue;
        };

        if w.state.is_transient() && elapsed_fade_steps > 0 {
            let in_step = session.config.fade_in_step;
            let out_step = session.config.fade_out_step;
            let step = if w.opacity_tgt >= w.opacity { in_step } else { out_step } * elapsed_fade_steps as f64;
            let prev_opacity = w.opacity;
            if step_opacity(&mut w.opacity, w.opacity_tgt, step) == FadeOutcome::Converged {
                let prev_state = w.state;
                let new_state = match prev_state {
                    WindowState::Mapping | WindowState::Fading => WindowState::Mapped,
                    WindowState::Unmapping => WindowState::Unmapped,
                    WindowState::Destroying => WindowState::Destroying, // finalized by caller below
                    other => other,
                };
                if w.state != new_state {
                    w.state = new_state;
                }
                if prev_state == WindowState::Unmapping || prev_state == WindowState::Destroying {
                    outcome.finished.push((id, new_state));
                }
            }
            if (w.opacity - prev_opacity).abs() > f64::EPSILON && w.to_paint {
                w.reg_ignore_valid = false;
            }
        }

        w.frame_opacity = if w.frame_extents == (0, 0, 0, 0) {
            1.0
        } else {
            session.config.frame_opacity
        };
        let new_mode = if w.opacity >= 1.0 && w.frame_opacity >= 1.0 {
            PaintMode::Solid
        } else if w.opacity >= 1.0 {
            PaintMode::FrameTrans
        } else {
            PaintMode::Trans
        };
        if new_mode != w.paint_mode && w.to_paint {
            w.reg_ignore_valid = false;
        }
        w.paint_mode = new_mode;
    }

    // Pass 2: ignore-region maintenance and to_paint decision, top to bottom.
    let mut scan = IgnoreScan::new();
    let mut unredir_possible = false;
    let mut first_paintable_seen = false;
    for &id in &ids {
        let Some(w) = session.registry.find_any_mut(id) else {
            continue;
        };

        let was_painted = w.to_paint;
        let to_paint = w.ever_damaged
            && w.state != WindowState::Unmapped
            && !w.is_effectively_transparent()
            && !w.geometry.is_empty()
            && !w.flags.contains(crate::window::WindowFlags::IMAGE_ERROR);
        if to_paint != was_painted {
            w.reg_ignore_valid = false;
        }
        w.to_paint = to_paint;

        if !to_paint {
            scan.visit(w);
            continue;
        }

        if session.config.unredir_if_possible && !first_paintable_seen {
            first_paintable_seen = true;
            unredir_possible = w.paint_mode == PaintMode::Solid && w.geometry == session.root_geometry;
        }

        scan.visit(w);
        outcome.paint_chain.push(id);
    }
    outcome.paint_chain.reverse();

    outcome.should_redirect = !unredir_possible;
    outcome
}

/// The region a window's shadow occupies this frame, clipped against the
/// damage region, its own reg_ignore, and the configured shadow-exclude
/// region (§4.8 step 3 "Shadow").
pub fn shadow_region(
    session: &Session,
    window: &crate::window::WindowRecord,
    damage: &Region,
) -> Region {
    if !window.shadow {
        return Region::empty();
    }
    let (dx, dy, sw, sh) = window.shadow_geometry;
    let shadow_rect =
        crate::utils::Rectangle::from_loc_and_size((window.geometry.x() + dx, window.geometry.y() + dy), (sw, sh));
    let mut region = damage.intersect(&Region::from_rect(shadow_rect));
    if let Some(ignore) = &window.reg_ignore {
        region = region.subtract(ignore);
    }
    region = region.subtract(&session.shadow_exclude_region);
    if window.paint_mode != PaintMode::Solid {
        region = region.subtract(&window.bounding_shape.translated(window.geometry.loc));
    }
    region
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::Atoms;
    use crate::config::CompositorConfig;
    use crate::utils::Rectangle;
    use crate::window::WindowRecord;

    fn test_session(root: Rectangle) -> Session {
        Session::new(
            CompositorConfig::default(),
            test_atoms(),
            1,
            root,
        )
    }

    fn test_atoms() -> Atoms {
        Atoms {
            _NET_WM_WINDOW_OPACITY: 1,
            _NET_FRAME_EXTENTS: 2,
            _NET_WM_WINDOW_TYPE: 3,
            _NET_WM_WINDOW_TYPE_DESKTOP: 4,
            _NET_WM_WINDOW_TYPE_DOCK: 5,
            _NET_WM_WINDOW_TYPE_TOOLBAR: 6,
            _NET_WM_WINDOW_TYPE_MENU: 7,
            _NET_WM_WINDOW_TYPE_UTILITY: 8,
            _NET_WM_WINDOW_TYPE_SPLASH: 9,
            _NET_WM_WINDOW_TYPE_DIALOG: 10,
            _NET_WM_WINDOW_TYPE_NORMAL: 11,
            _NET_WM_WINDOW_TYPE_DROPDOWN_MENU: 12,
            _NET_WM_WINDOW_TYPE_POPUP_MENU: 13,
            _NET_WM_WINDOW_TYPE_TOOLTIP: 14,
            _NET_WM_WINDOW_TYPE_NOTIFICATION: 15,
            _NET_WM_WINDOW_TYPE_COMBO: 16,
            _NET_WM_WINDOW_TYPE_DND: 17,
            _NET_ACTIVE_WINDOW: 18,
            _NET_WM_PID: 19,
            _NET_WM_NAME: 20,
            WM_STATE: 21,
            WM_NAME: 22,
            WM_CLASS: 23,
            WM_WINDOW_ROLE: 24,
            WM_TRANSIENT_FOR: 25,
            WM_CLIENT_LEADER: 26,
            _COMPTON_SHADOW: 27,
            COMPTON_VERSION: 28,
            UTF8_STRING: 29,
        }
    }

    fn mapped_window(id: XWindow, rect: Rectangle) -> WindowRecord {
        let mut w = WindowRecord::new(id, rect);
        w.state = WindowState::Mapped;
        w.ever_damaged = true;
        w
    }

    #[test]
    fn two_preprocess_calls_with_no_event_produce_identical_chains() {
        let mut session = test_session(Rectangle::from_loc_and_size((0, 0), (1920, 1080)));
        session
            .registry
            .add_window(1, 0, mapped_window(1, Rectangle::from_loc_and_size((0, 0), (100, 100))));

        let first = preprocess(&mut session, 0);
        let second = preprocess(&mut session, 0);
        assert_eq!(first.paint_chain, second.paint_chain);
    }

    #[test]
    fn unmapped_window_is_never_selected_for_painting() {
        let mut session = test_session(Rectangle::from_loc_and_size((0, 0), (1920, 1080)));
        session
            .registry
            .add_window(1, 0, WindowRecord::new(1, Rectangle::from_loc_and_size((0, 0), (100, 100))));

        let outcome = preprocess(&mut session, 0);
        assert!(outcome.paint_chain.is_empty());
    }

    #[test]
    fn unmap_convergence_is_reported_in_finished() {
        let mut session = test_session(Rectangle::from_loc_and_size((0, 0), (1920, 1080)));
        let mut w = mapped_window(1, Rectangle::from_loc_and_size((0, 0), (100, 100)));
        w.state = WindowState::Unmapping;
        w.opacity = 1.0;
        w.opacity_tgt = 0.0;
        session.registry.add_window(1, 0, w);
        session.config.fade_out_step = 1.0;

        let outcome = preprocess(&mut session, 1);
        assert_eq!(outcome.finished.as_slice(), &[(1, WindowState::Unmapped)]);
        assert_eq!(session.registry.find_window(1).unwrap().state, WindowState::Unmapped);
    }

    #[test]
    fn zero_size_window_is_not_painted() {
        let mut session = test_session(Rectangle::from_loc_and_size((0, 0), (1920, 1080)));
        session
            .registry
            .add_window(1, 0, mapped_window(1, Rectangle::from_loc_and_size((0, 0), (0, 100))));

        let outcome = preprocess(&mut session, 0);
        assert!(outcome.paint_chain.is_empty());
    }

    #[test]
    fn fullscreen_opaque_window_triggers_unredir_when_enabled() {
        let root = Rectangle::from_loc_and_size((0, 0), (800, 600));
        let mut session = test_session(root);
        session.config.unredir_if_possible = true;
        session.registry.add_window(1, 0, mapped_window(1, root));

        let outcome = preprocess(&mut session, 0);
        assert!(!outcome.should_redirect);
    }
}
