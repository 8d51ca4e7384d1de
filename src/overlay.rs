//! Overlay and registration (§4.12): opening the display, acquiring the
//! compositing manager selection, and obtaining the Composite overlay
//! window.
//!
//! Creates a small registration window and calls `set_selection_owner`
//! before touching anything else, so a second instance racing to start up
//! fails fast instead of fighting over the root window.

use x11rb::connection::Connection;
use x11rb::protocol::composite::ConnectionExt as _;
use x11rb::protocol::shape::{self, ConnectionExt as _};
use x11rb::protocol::xproto::{
    ChangeWindowAttributesAux, ConnectionExt as _, CreateWindowAux, EventMask, PropMode, Window, WindowClass,
};

use crate::atoms::Atoms;
use crate::error::{EngineError, RegistrationError};

/// Result of [`register`]: the ids the engine must remember for the
/// lifetime of the run.
#[derive(Debug, Clone, Copy)]
pub struct Registration {
    /// The Composite overlay window, already made click-through.
    pub overlay: Window,
    /// The 1x1 window holding the `_NET_WM_CM_S<n>` selection.
    pub registration_window: Window,
}

/// Selects root events, creates the registration window, acquires
/// `_NET_WM_CM_S<screen>`, and obtains the Composite overlay window with
/// its bounding and input shapes cleared so it is click-through (§4.12).
///
/// Returns [`EngineError::AlreadyRunning`] if another process already owns
/// the selection.
pub fn register(
    conn: &impl Connection,
    atoms: &Atoms,
    screen_num: usize,
    root: Window,
    cm_selection_atom: u32,
    pid: u32,
) -> Result<Registration, EngineError> {
    let owner = conn
        .get_selection_owner(cm_selection_atom)
        .map_err(EngineError::Connection)?
        .reply()
        .map_err(EngineError::Request)?
        .owner;
    if owner != x11rb::NONE {
        tracing::warn!(%owner, "compositing manager selection already owned");
        return Err(EngineError::AlreadyRunning { screen: screen_num });
    }

    conn.change_window_attributes(
        root,
        &ChangeWindowAttributesAux::default().event_mask(
            EventMask::SUBSTRUCTURE_NOTIFY | EventMask::PROPERTY_CHANGE | EventMask::STRUCTURE_NOTIFY | EventMask::EXPOSURE,
        ),
    )
    .map_err(EngineError::Connection)?;

    let registration_window = conn.generate_id().map_err(EngineError::Connection)?;
    let screen = &conn.setup().roots[screen_num];
    conn.create_window(
        screen.root_depth,
        registration_window,
        root,
        -1,
        -1,
        1,
        1,
        0,
        WindowClass::INPUT_OUTPUT,
        x11rb::COPY_FROM_PARENT,
        &CreateWindowAux::default(),
    )
    .map_err(EngineError::Connection)?;

    conn.set_selection_owner(registration_window, cm_selection_atom, x11rb::CURRENT_TIME)
        .map_err(EngineError::Connection)?;

    conn.change_property32(
        PropMode::REPLACE,
        registration_window,
        atoms._NET_WM_PID,
        x11rb::protocol::xproto::AtomEnum::CARDINAL,
        &[pid],
    )
    .map_err(EngineError::Connection)?;
    conn.change_property8(
        PropMode::REPLACE,
        registration_window,
        atoms.COMPTON_VERSION,
        atoms.UTF8_STRING,
        env!("CARGO_PKG_VERSION").as_bytes(),
    )
    .map_err(EngineError::Connection)?;

    conn.composite_redirect_subwindows(root, x11rb::protocol::composite::Redirect::MANUAL)
        .map_err(EngineError::Connection)?;

    let overlay = conn
        .composite_get_overlay_window(root)
        .map_err(EngineError::Connection)?
        .reply()
        .map_err(EngineError::Request)?
        .overlay_win;

    make_click_through(conn, overlay)?;

    Ok(Registration {
        overlay,
        registration_window,
    })
}

/// Sets both the bounding and input shape of `window` to empty, so it
/// never receives input and is never itself drawn (the overlay should
/// only ever show whatever the engine composites into it).
fn make_click_through(conn: &impl Connection, window: Window) -> Result<(), RegistrationError> {
    conn.shape_rectangles(
        shape::SO::SET,
        shape::SK::BOUNDING,
        x11rb::protocol::xproto::ClipOrdering::UNSORTED,
        window,
        0,
        0,
        &[],
    )
    .map_err(|_| RegistrationError::OverlayShapeFailed)?;
    conn.shape_rectangles(
        shape::SO::SET,
        shape::SK::INPUT,
        x11rb::protocol::xproto::ClipOrdering::UNSORTED,
        window,
        0,
        0,
        &[],
    )
    .map_err(|_| RegistrationError::OverlayShapeFailed)?;
    Ok(())
}
