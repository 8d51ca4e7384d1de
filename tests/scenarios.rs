//! End-to-end scenarios exercising the engine's public API together,
//! without a live X server: a constructed [`Session`] plus
//! [`TestBackend`] standing in for a real connection and renderer.

use xcompositor_core::atoms::Atoms;
use xcompositor_core::backend::test::TestBackend;
use xcompositor_core::backend::Backend;
use xcompositor_core::config::CompositorConfig;
use xcompositor_core::events;
use xcompositor_core::paint::{paint_frame, preprocess};
use xcompositor_core::redirect::start_redirection;
use xcompositor_core::region::Region;
use xcompositor_core::session::Session;
use xcompositor_core::utils::Rectangle;
use xcompositor_core::window::{WindowRecord, WindowState};

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

fn test_session(root: Rectangle) -> Session {
    Session::new(CompositorConfig::default(), test_atoms(), 1, root)
}

fn mapped_window(id: u32, rect: Rectangle) -> WindowRecord {
    let mut w = WindowRecord::new(id, rect);
    w.state = WindowState::Mapped;
    w.ever_damaged = true;
    w
}

/// Scenario 1: map-then-destroy fade-out converges in exactly the
/// documented step counts for the default fade steps.
#[test]
fn map_then_destroy_fade_out() {
    let root = Rectangle::from_loc_and_size((0, 0), (1920, 1080));
    let mut session = test_session(root);
    session.config.fade_in_step = 0.028;
    session.config.fade_out_step = 0.03;
    session.redirected = true;

    session
        .registry
        .add_window(1, 0, WindowRecord::new(1, Rectangle::from_loc_and_size((0, 0), (100, 100))));
    events::dispatch(
        &mut session,
        x11rb::protocol::Event::MapNotify(x11rb::protocol::xproto::MapNotifyEvent {
            response_type: 0,
            sequence: 0,
            event: session.root,
            window: 1,
            override_redirect: false,
        }),
    );
    assert_eq!(session.registry.find_window(1).unwrap().state, WindowState::Mapping);

    let mut steps = 0;
    loop {
        preprocess(&mut session, 1);
        steps += 1;
        if session.registry.find_window(1).unwrap().state == WindowState::Mapped {
            break;
        }
        assert!(steps <= 100, "fade-in never converged");
    }
    assert_eq!(steps, 36);
    assert_eq!(session.registry.find_window(1).unwrap().opacity, 1.0);

    events::dispatch(
        &mut session,
        x11rb::protocol::Event::DestroyNotify(x11rb::protocol::xproto::DestroyNotifyEvent {
            response_type: 0,
            sequence: 1,
            event: session.root,
            window: 1,
        }),
    );

    let mut steps = 0;
    loop {
        let outcome = preprocess(&mut session, 1);
        steps += 1;
        if outcome.finished.iter().any(|&(id, _)| id == 1) {
            session.registry.finish_destroy(1);
            break;
        }
        assert!(steps <= 100, "fade-out never converged");
    }
    assert_eq!(steps, 34);
    assert_eq!(session.registry.iter_bottom_up().count(), 0);
}

/// Scenario 2: shadow composed before body, with the documented 140x140
/// shadow image for a 100x100 window and shadow_radius=20.
#[test]
fn shadow_on_opaque_window_composes_before_body() {
    let root = Rectangle::from_loc_and_size((0, 0), (800, 600));
    let mut session = test_session(root);
    session.damage_ring = Some(xcompositor_core::damage::DamageRing::new(1));
    session.damage_ring.as_mut().unwrap().set_redirected(true);
    session.damage_ring.as_mut().unwrap().add_damage(&Region::from_rect(root));

    let mut backend = TestBackend::new(1);
    let root_image = backend.bind_pixmap(1, 0, false).unwrap();
    let win_image = backend.bind_pixmap(2, 0, false).unwrap();
    let shadow_image = backend.render_shadow(100, 100, 20, (0.0, 0.0, 0.0, 0.75)).unwrap();
    assert_eq!(
        backend.calls.last(),
        Some(&xcompositor_core::backend::test::RecordedCall::RenderShadow {
            width: 100,
            height: 100,
            radius: 20,
        })
    );
    backend.calls.clear();

    let mut w = mapped_window(10, Rectangle::from_loc_and_size((50, 50), (100, 100)));
    w.win_image = Some(win_image);
    w.shadow = true;
    w.shadow_image = Some(shadow_image);
    w.shadow_geometry = (-15, -15, 140, 140);
    w.to_paint = true;
    session.registry.add_window(10, 0, w);

    paint_frame(&mut session, &mut backend, &[10], root_image).unwrap();

    let shadow_idx = backend
        .calls
        .iter()
        .position(|c| matches!(c, xcompositor_core::backend::test::RecordedCall::Compose { image, .. } if *image == shadow_image));
    let body_idx = backend
        .calls
        .iter()
        .position(|c| matches!(c, xcompositor_core::backend::test::RecordedCall::Compose { image, .. } if *image == win_image));
    assert!(shadow_idx.unwrap() < body_idx.unwrap());
    assert_eq!(
        backend.calls[shadow_idx.unwrap()],
        xcompositor_core::backend::test::RecordedCall::Compose {
            image: shadow_image,
            x: 35,
            y: 35,
        }
    );
}

/// Scenario 3: the lower of two opaque overlapping windows has its
/// ignore-region set to the intersection of the upper window's bounding
/// shape with the screen, after one preprocess pass.
#[test]
fn ignore_region_of_lower_window_matches_upper_overlap() {
    let root = Rectangle::from_loc_and_size((0, 0), (800, 600));
    let mut session = test_session(root);

    session
        .registry
        .add_window(1, 0, mapped_window(1, Rectangle::from_loc_and_size((0, 0), (100, 100))));
    session
        .registry
        .add_window(2, 1, mapped_window(2, Rectangle::from_loc_and_size((20, 20), (100, 100))));

    preprocess(&mut session, 0);

    let lower = session.registry.find_window(1).unwrap();
    let expected = Region::from_rect(Rectangle::from_loc_and_size((20, 20), (100, 100)));
    assert_eq!(lower.reg_ignore.as_deref(), Some(&expected));
    assert!(lower.reg_ignore_valid);
}

/// Scenario 4: a fullscreen opaque window with `unredir_if_possible` set
/// stops redirection; `add_damage` then becomes a no-op and `buffer_age`
/// reports -1 again.
#[test]
fn unredir_on_fullscreen_stops_redirection() {
    let root = Rectangle::from_loc_and_size((0, 0), (1024, 768));
    let mut session = test_session(root);
    session.config.unredir_if_possible = true;

    let backend = TestBackend::new(2);
    start_redirection(&mut session, &backend).unwrap();
    assert!(session.redirected);

    session.registry.add_window(1, 0, mapped_window(1, root));
    let outcome = preprocess(&mut session, 0);
    assert!(!outcome.should_redirect);

    xcompositor_core::redirect::stop_redirection(&mut session, |_| {});
    assert!(!session.redirected);

    session.damage_ring = None;
    assert_eq!(backend.buffer_age(), -1);
}

/// Scenario 5: restacking A<B<C to A<C<B invalidates and recomputes A's
/// ignore-region to the union of B and C's (now-moved) footprints.
#[test]
fn restack_invalidation_recomputes_lowest_windows_ignore_region() {
    let root = Rectangle::from_loc_and_size((0, 0), (800, 600));
    let mut session = test_session(root);

    session
        .registry
        .add_window(1, 0, mapped_window(1, Rectangle::from_loc_and_size((0, 0), (200, 200))));
    session
        .registry
        .add_window(2, 1, mapped_window(2, Rectangle::from_loc_and_size((0, 0), (100, 100))));
    session
        .registry
        .add_window(3, 2, mapped_window(3, Rectangle::from_loc_and_size((100, 100), (100, 100))));

    preprocess(&mut session, 0);
    // Reorder stack from A<B<C to A<C<B: move C to sit directly above A.
    session.registry.restack(3, 1);
    preprocess(&mut session, 0);

    let a = session.registry.find_window(1).unwrap();
    assert!(a.reg_ignore_valid);
    let expected = Region::from_rect(Rectangle::from_loc_and_size((0, 0), (100, 100)))
        .union(&Region::from_rect(Rectangle::from_loc_and_size((100, 100), (100, 100))));
    assert_eq!(a.reg_ignore.as_deref(), Some(&expected));
}

/// Scenario 6: a `SelectionClear` for the manager selection requests exit
/// with status 1.
#[test]
fn selection_loss_requests_exit_code_one() {
    let root = Rectangle::from_loc_and_size((0, 0), (800, 600));
    let mut session = test_session(root);
    assert_eq!(session.quit, None);

    events::dispatch(
        &mut session,
        x11rb::protocol::Event::SelectionClear(x11rb::protocol::xproto::SelectionClearEvent {
            response_type: 0,
            sequence: 0,
            time: 0,
            owner: session.root,
            selection: 0,
        }),
    );

    assert_eq!(session.quit, Some(1));
}
