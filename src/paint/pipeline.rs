//! Paint pipeline (§4.8): walks the selected sub-stack bottom-to-top,
//! issuing backend ops.

use crate::backend::{Backend, ImageOp};
use crate::error::BackendError;
use crate::paint::preprocess::shadow_region;
use crate::region::Region;
use crate::session::Session;
use crate::window::PaintMode;

/// Paints one frame: root tile, then each window bottom-to-top
/// (shadow, then body, then dim overlay), then presents.
///
/// `paint_chain` must be in bottom-to-top order, as returned by
/// [`super::preprocess::preprocess`]. `root_image` is the backend image
/// bound to the root window's tile/pixmap.
pub fn paint_frame(
    session: &mut Session,
    backend: &mut dyn Backend,
    paint_chain: &[x11rb::protocol::xproto::Window],
    root_image: crate::backend::ImageHandle,
) -> Result<(), BackendError> {
    let buffer_age = backend.buffer_age();
    let damage = session
        .damage_ring
        .as_ref()
        .map(|ring| ring.repaint_region(buffer_age))
        .unwrap_or_else(Region::empty);
    let damage = damage.clipped_to(session.root_geometry);

    backend.prepare(&damage);

    let root_ignore = paint_chain
        .first()
        .and_then(|id| session.registry.find_any(*id))
        .and_then(|w| w.reg_ignore.clone());
    let reg_paint_root = match &root_ignore {
        Some(ignore) => damage.subtract(ignore),
        None => damage.clone(),
    };
    if !reg_paint_root.is_empty() {
        backend.compose(root_image, 0, 0, &reg_paint_root, &reg_paint_root)?;
    }

    for (i, &id) in paint_chain.iter().enumerate() {
        let Some(window) = session.registry.find_any(id) else {
            continue;
        };

        if window.shadow {
            let reg_shadow = shadow_region(session, window, &damage);
            if !reg_shadow.is_empty() {
                if let Some(shadow_image) = window.shadow_image {
                    let (dx, dy, _, _) = window.shadow_geometry;
                    backend.compose(
                        shadow_image,
                        window.geometry.x() + dx,
                        window.geometry.y() + dy,
                        &reg_shadow,
                        &reg_shadow,
                    )?;
                }
            }
        }

        // reg_body = D - (next window up's reg_ignore), intersected with
        // this window's bounding shape (§4.8 step 3 "Body").
        let next_ignore = paint_chain
            .get(i + 1)
            .and_then(|next_id| session.registry.find_any(*next_id))
            .and_then(|w| w.reg_ignore.clone());
        let mut reg_body = match &next_ignore {
            Some(ignore) => damage.subtract(ignore),
            None => damage.clone(),
        };
        reg_body = reg_body.intersect(&window.bounding_shape.translated(window.geometry.loc));
        if reg_body.is_empty() {
            continue;
        }

        if window.blur_background && window.paint_mode != PaintMode::Solid {
            backend.blur(window.opacity, &reg_body, &reg_body)?;
        }

        if window.dim {
            let amount = session.config.inactive_dim * if window.opacity < 1.0 { window.opacity } else { 1.0 };
            if amount > 0.0 {
                if let Some(image) = window.win_image {
                    backend.image_op(image, ImageOp::DimAll { amount }, &reg_body, &reg_body)?;
                }
            }
        }

        if let Some(image) = window.win_image {
            if window.invert_color {
                backend.image_op(image, ImageOp::ApplyAlphaAll { factor: window.opacity }, &reg_body, &reg_body)?;
                backend.image_op(image, ImageOp::InvertColorAll, &reg_body, &reg_body)?;
                backend.compose(image, window.geometry.x(), window.geometry.y(), &reg_body, &reg_body)?;
            } else if window.frame_opacity < 1.0 && window.frame_extents != (0, 0, 0, 0) {
                let (left, right, top, bottom) = window.frame_extents;
                let g = window.geometry;
                let frame_region = reg_body.subtract(&Region::from_rect(crate::utils::Rectangle::from_loc_and_size(
                    (g.x() + left, g.y() + top),
                    ((g.width() - left - right).max(0), (g.height() - top - bottom).max(0)),
                )));
                let body_region = reg_body.subtract(&frame_region);
                if !frame_region.is_empty() {
                    backend.compose(image, g.x(), g.y(), &frame_region, &frame_region)?;
                }
                if !body_region.is_empty() {
                    backend.compose(image, g.x(), g.y(), &body_region, &body_region)?;
                }
            } else {
                backend.compose(image, window.geometry.x(), window.geometry.y(), &reg_body, &reg_body)?;
            }
        }
    }

    backend.present()?;
    if let Some(ring) = session.damage_ring.as_mut() {
        ring.advance();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::Atoms;
    use crate::backend::test::{RecordedCall, TestBackend};
    use crate::config::CompositorConfig;
    use crate::damage::DamageRing;
    use crate::utils::Rectangle;
    use crate::window::{WindowRecord, WindowState};

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

    #[test]
    fn body_is_composed_after_shadow_within_same_frame() {
        let root = Rectangle::from_loc_and_size((0, 0), (200, 200));
        let mut session = Session::new(CompositorConfig::default(), test_atoms(), 1, root);
        session.damage_ring = Some(DamageRing::new(1));
        session.damage_ring.as_mut().unwrap().set_redirected(true);
        session
            .damage_ring
            .as_mut()
            .unwrap()
            .add_damage(&Region::from_rect(root));

        let mut backend = TestBackend::new(1);
        let root_image = backend.bind_pixmap(1, 0, false).unwrap();
        let win_image = backend.bind_pixmap(2, 0, false).unwrap();
        let shadow_image = backend.render_shadow(100, 100, 20, (0.0, 0.0, 0.0, 0.75)).unwrap();
        backend.calls.clear();

        let mut w = WindowRecord::new(10, Rectangle::from_loc_and_size((50, 50), (100, 100)));
        w.state = WindowState::Mapped;
        w.ever_damaged = true;
        w.to_paint = true;
        w.win_image = Some(win_image);
        w.shadow = true;
        w.shadow_image = Some(shadow_image);
        w.shadow_geometry = (-15, -15, 140, 140);
        session.registry.add_window(10, 0, w);

        paint_frame(&mut session, &mut backend, &[10], root_image).unwrap();

        let shadow_idx = backend.calls.iter().position(|c| matches!(c, RecordedCall::Compose { image, .. } if *image == shadow_image));
        let body_idx = backend.calls.iter().position(|c| matches!(c, RecordedCall::Compose { image, .. } if *image == win_image));
        assert!(shadow_idx.unwrap() < body_idx.unwrap());
    }

    #[test]
    fn dimmed_window_is_dimmed_before_its_body_is_composed() {
        let root = Rectangle::from_loc_and_size((0, 0), (200, 200));
        let mut session = Session::new(CompositorConfig::default(), test_atoms(), 1, root);
        session.config.inactive_dim = 0.5;
        session.damage_ring = Some(DamageRing::new(1));
        session.damage_ring.as_mut().unwrap().set_redirected(true);
        session.damage_ring.as_mut().unwrap().add_damage(&Region::from_rect(root));

        let mut backend = TestBackend::new(1);
        let root_image = backend.bind_pixmap(1, 0, false).unwrap();
        let win_image = backend.bind_pixmap(2, 0, false).unwrap();
        backend.calls.clear();

        let mut w = WindowRecord::new(10, Rectangle::from_loc_and_size((50, 50), (100, 100)));
        w.state = WindowState::Mapped;
        w.ever_damaged = true;
        w.to_paint = true;
        w.win_image = Some(win_image);
        w.dim = true;
        session.registry.add_window(10, 0, w);

        paint_frame(&mut session, &mut backend, &[10], root_image).unwrap();

        let dim_idx = backend
            .calls
            .iter()
            .position(|c| matches!(c, RecordedCall::ImageOp { image, op: ImageOp::DimAll { .. } } if *image == win_image));
        let body_idx = backend
            .calls
            .iter()
            .position(|c| matches!(c, RecordedCall::Compose { image, .. } if *image == win_image));
        assert!(dim_idx.unwrap() < body_idx.unwrap(), "dim must land before the body is composed");
    }
}
