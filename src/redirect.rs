//! The redirection controller (§4.9): starts and stops Composite
//! redirection of the root, and the damage ring / backend lifecycle that
//! go with it.

use crate::backend::Backend;
use crate::damage::DamageRing;
use crate::error::BackendError;
use crate::session::Session;

/// Starts redirection: allocates the damage ring, marks the session
/// redirected, and forces a full-screen repaint by damaging the whole
/// screen region.
///
/// Binding images for already-mapped windows and requesting the root tile
/// are the caller's responsibility (they require a live X connection to
/// fetch pixmaps), performed after this returns successfully.
pub fn start_redirection(session: &mut Session, backend: &dyn Backend) -> Result<(), BackendError> {
    if session.redirected {
        return Ok(());
    }
    let mut ring = DamageRing::new(backend.max_buffer_age());
    ring.set_redirected(true);
    ring.add_damage(&session.screen_region);
    session.damage_ring = Some(ring);
    session.redirected = true;
    tracing::debug!("redirection started");
    Ok(())
}

/// Stops redirection: releases every live window's backend images (the
/// caller supplies `release` since it owns the backend), drops the damage
/// ring, and marks the session unredirected.
pub fn stop_redirection(session: &mut Session, mut release: impl FnMut(crate::backend::ImageHandle)) {
    if !session.redirected {
        return;
    }
    let handles: Vec<_> = session
        .registry
        .iter_bottom_up()
        .flat_map(|w| [w.win_image, w.shadow_image])
        .flatten()
        .collect();
    for handle in handles {
        release(handle);
    }
    let ids: Vec<_> = session.registry.iter_bottom_up().map(|w| w.id).collect();
    for id in ids {
        if let Some(record) = session.registry.find_window_mut(id) {
            record.win_image = None;
            record.shadow_image = None;
        }
    }
    session.damage_ring = None;
    session.redirected = false;
    tracing::debug!("redirection stopped");
}
