//! Interned X11 atoms the engine reads or writes.
//!
//! Building this table costs one round-trip at startup (`x11rb`'s
//! `atom_manager!` batches all the `InternAtom` requests and waits for the
//! replies together), after which every atom is a plain `u32` copy.

x11rb::atom_manager! {
    /// Atom cache for every property and selection name the engine touches.
    pub Atoms: AtomsCookie {
        _NET_WM_WINDOW_OPACITY,
        _NET_FRAME_EXTENTS,
        _NET_WM_WINDOW_TYPE,
        _NET_WM_WINDOW_TYPE_DESKTOP,
        _NET_WM_WINDOW_TYPE_DOCK,
        _NET_WM_WINDOW_TYPE_TOOLBAR,
        _NET_WM_WINDOW_TYPE_MENU,
        _NET_WM_WINDOW_TYPE_UTILITY,
        _NET_WM_WINDOW_TYPE_SPLASH,
        _NET_WM_WINDOW_TYPE_DIALOG,
        _NET_WM_WINDOW_TYPE_NORMAL,
        _NET_WM_WINDOW_TYPE_DROPDOWN_MENU,
        _NET_WM_WINDOW_TYPE_POPUP_MENU,
        _NET_WM_WINDOW_TYPE_TOOLTIP,
        _NET_WM_WINDOW_TYPE_NOTIFICATION,
        _NET_WM_WINDOW_TYPE_COMBO,
        _NET_WM_WINDOW_TYPE_DND,
        _NET_ACTIVE_WINDOW,
        _NET_WM_PID,
        _NET_WM_NAME,
        WM_STATE,
        WM_NAME,
        WM_CLASS,
        WM_WINDOW_ROLE,
        WM_TRANSIENT_FOR,
        WM_CLIENT_LEADER,
        _COMPTON_SHADOW,
        COMPTON_VERSION,
        UTF8_STRING,
    }
}

impl Atoms {
    /// Maps a `_NET_WM_WINDOW_TYPE` atom to the engine's internal
    /// [`crate::window::WindowType`] tag, falling back to `Normal` for
    /// anything unrecognized (matching the EWMH-recommended default).
    pub fn window_type_from_atom(&self, atom: u32) -> crate::window::WindowType {
        use crate::window::WindowType::*;
        match atom {
            a if a == self._NET_WM_WINDOW_TYPE_DESKTOP => Desktop,
            a if a == self._NET_WM_WINDOW_TYPE_DOCK => Dock,
            a if a == self._NET_WM_WINDOW_TYPE_TOOLBAR => Toolbar,
            a if a == self._NET_WM_WINDOW_TYPE_MENU => Menu,
            a if a == self._NET_WM_WINDOW_TYPE_UTILITY => Utility,
            a if a == self._NET_WM_WINDOW_TYPE_SPLASH => Splash,
            a if a == self._NET_WM_WINDOW_TYPE_DIALOG => Dialog,
            a if a == self._NET_WM_WINDOW_TYPE_NORMAL => Normal,
            a if a == self._NET_WM_WINDOW_TYPE_DROPDOWN_MENU => Dropdown,
            a if a == self._NET_WM_WINDOW_TYPE_POPUP_MENU => Popup,
            a if a == self._NET_WM_WINDOW_TYPE_TOOLTIP => Tooltip,
            a if a == self._NET_WM_WINDOW_TYPE_NOTIFICATION => Notify,
            a if a == self._NET_WM_WINDOW_TYPE_COMBO => Combo,
            a if a == self._NET_WM_WINDOW_TYPE_DND => Dnd,
            _ => Unknown,
        }
    }
}
