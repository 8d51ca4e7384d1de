//! The X event dispatcher (§4.10): translates raw X11 protocol events into
//! mutations of the [`Session`].

use x11rb::protocol::xproto::Window as XWindow;
use x11rb::protocol::Event;

use crate::region::Region;
use crate::session::Session;
use crate::utils::Rectangle;
use crate::window::{WindowRecord, WindowState};

/// Dispatches one X11 event against `session`.
///
/// Every handler first discards ignore-sequence entries at or below the
/// event's own sequence number (§4.10 "Each handler discards..."), since an
/// error for a suppressed request can never arrive after the event that
/// logically follows it.
pub fn dispatch(session: &mut Session, event: Event) {
    purge_for(session, &event);

    match event {
        Event::CreateNotify(e) => {
            if e.parent == session.root {
                session
                    .registry
                    .add_window(e.window, 0, WindowRecord::new(e.window, geometry_of(&e)));
            }
        }
        Event::DestroyNotify(e) => {
            if let Some(w) = session.registry.begin_destroy(e.window) {
                w.opacity_tgt = 0.0;
            }
        }
        Event::MapNotify(e) => map_window(session, e.window),
        Event::UnmapNotify(e) => unmap_window(session, e.window),
        Event::ReparentNotify(e) => {
            if e.parent == session.root {
                session
                    .registry
                    .add_window(e.window, 0, WindowRecord::new(e.window, Rectangle::zero()));
            } else if session.registry.find_window(e.window).is_some() {
                if let Some(w) = session.registry.begin_destroy(e.window) {
                    w.opacity_tgt = 0.0;
                }
            }
        }
        Event::ConfigureNotify(e) if e.window == session.root => {
            session.root_geometry = Rectangle::from_loc_and_size(
                (0, 0),
                (e.width as i32, e.height as i32),
            );
            session.rebuild_screen_region();
        }
        Event::ConfigureNotify(e) => {
            if let Some(w) = session.registry.find_window_mut(e.window) {
                let old = w.geometry;
                w.geometry = Rectangle::from_loc_and_size(
                    (e.x as i32, e.y as i32),
                    (e.width as i32, e.height as i32),
                );
                w.border_width = e.border_width as i32;
                if old.size != w.geometry.size {
                    w.flags.insert(crate::window::WindowFlags::STALE_IMAGE);
                    w.bounding_shape = Region::from_rect(Rectangle::from_loc_and_size((0, 0), w.geometry.size));
                }
                w.reg_ignore_valid = false;
            }
        }
        Event::CirculateNotify(e) => {
            let target = if e.place == x11rb::protocol::xproto::Circulate::TOP {
                0
            } else {
                // Bottom: there is no "below everything" sentinel id, so the
                // caller resolves it to the current bottom-most window.
                session.registry.iter_bottom_up().next().map(|w| w.id).unwrap_or(0)
            };
            session.registry.restack(e.window, target);
        }
        Event::Expose(e) => {
            let rect = Rectangle::from_loc_and_size((e.x as i32, e.y as i32), (e.width as i32, e.height as i32));
            if let Some(ring) = session.damage_ring.as_mut() {
                ring.add_damage(&Region::from_rect(rect));
            }
        }
        Event::PropertyNotify(e) => {
            if let Some(w) = session.registry.find_window_mut(e.window) {
                w.reg_ignore_valid = false;
            }
        }
        Event::DamageNotify(e) => {
            let rect = Rectangle::from_loc_and_size(
                (e.area.x as i32, e.area.y as i32),
                (e.area.width as i32, e.area.height as i32),
            );
            let mut region = Region::from_rect(rect);
            if let Some(w) = session.registry.find_window_mut(e.drawable as XWindow) {
                w.ever_damaged = true;
                if let Some(ignore) = &w.reg_ignore {
                    region = region.subtract(ignore);
                }
            }
            if let Some(ring) = session.damage_ring.as_mut() {
                ring.add_damage(&region);
            }
        }
        Event::ShapeNotify(e) => {
            if let Some(w) = session.registry.find_window_mut(e.affected_window) {
                w.reg_ignore_valid = false;
            }
        }
        Event::SelectionClear(_) => {
            tracing::warn!("compositing manager selection lost, another compositor took over");
            session.quit = Some(1);
        }
        _ => {}
    }
}

fn geometry_of(e: &x11rb::protocol::xproto::CreateNotifyEvent) -> Rectangle {
    Rectangle::from_loc_and_size((e.x as i32, e.y as i32), (e.width as i32, e.height as i32))
}

fn map_window(session: &mut Session, id: XWindow) {
    let Some(w) = session.registry.find_window_mut(id) else {
        return;
    };
    w.viewable = true;
    w.opacity = 0.0;
    w.opacity_tgt = 1.0;
    w.ever_damaged = false;
    if !session.redirected {
        w.opacity = 1.0;
        w.state = WindowState::Mapped;
    } else {
        // A re-map that races an in-flight unmap fade (state == Unmapping)
        // restarts the fade from opacity 0 rather than resuming from
        // wherever the unmap fade had gotten to; this is simpler than
        // skipping to Mapped and is never observably wrong since the next
        // preprocess pass repaints from the new opacity either way.
        w.state = WindowState::Mapping;
    }
}

fn unmap_window(session: &mut Session, id: XWindow) {
    let Some(w) = session.registry.find_window_mut(id) else {
        return;
    };
    w.viewable = false;
    w.opacity_tgt = 0.0;
    w.state = WindowState::Unmapping;
}

/// Discards every ignore-sequence entry at or below `event`'s sequence
/// number, as required before acting on any event (§4.10).
fn purge_for(session: &mut Session, event: &Event) {
    if let Some(seq) = sequence_of(event) {
        session.purge_ignored_sequences(seq);
    }
}

/// Extracts the wire sequence number carried by `event`, if any.
fn sequence_of(event: &Event) -> Option<u16> {
    match event {
        Event::CreateNotify(e) => Some(e.sequence),
        Event::DestroyNotify(e) => Some(e.sequence),
        Event::MapNotify(e) => Some(e.sequence),
        Event::UnmapNotify(e) => Some(e.sequence),
        Event::ReparentNotify(e) => Some(e.sequence),
        Event::ConfigureNotify(e) => Some(e.sequence),
        Event::CirculateNotify(e) => Some(e.sequence),
        Event::Expose(e) => Some(e.sequence),
        Event::PropertyNotify(e) => Some(e.sequence),
        Event::DamageNotify(e) => Some(e.sequence),
        Event::ShapeNotify(e) => Some(e.sequence),
        Event::SelectionClear(e) => Some(e.sequence),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::Atoms;
    use crate::config::CompositorConfig;
    use x11rb::protocol::xproto::{MapNotifyEvent, UnmapNotifyEvent};

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

    fn test_session() -> Session {
        Session::new(
            CompositorConfig::default(),
            test_atoms(),
            1,
            Rectangle::from_loc_and_size((0, 0), (1920, 1080)),
        )
    }

    #[test]
    fn map_on_unredirected_session_skip_fades_to_mapped() {
        let mut session = test_session();
        session
            .registry
            .add_window(2, 0, WindowRecord::new(2, Rectangle::from_loc_and_size((0, 0), (100, 100))));

        dispatch(
            &mut session,
            Event::MapNotify(MapNotifyEvent {
                response_type: 0,
                sequence: 1,
                event: 1,
                window: 2,
                override_redirect: false,
            }),
        );

        let w = session.registry.find_window(2).unwrap();
        assert_eq!(w.state, WindowState::Mapped);
        assert_eq!(w.opacity, 1.0);
    }

    #[test]
    fn unmap_sets_target_opacity_to_zero() {
        let mut session = test_session();
        session
            .registry
            .add_window(2, 0, WindowRecord::new(2, Rectangle::from_loc_and_size((0, 0), (100, 100))));

        dispatch(
            &mut session,
            Event::UnmapNotify(UnmapNotifyEvent {
                response_type: 0,
                sequence: 1,
                event: 1,
                window: 2,
                from_configure: false,
            }),
        );

        let w = session.registry.find_window(2).unwrap();
        assert_eq!(w.state, WindowState::Unmapping);
        assert_eq!(w.opacity_tgt, 0.0);
    }
}
