//! Error types for the engine's fallible entry points.

use x11rb::protocol::xproto::Window;

/// Top-level error returned by engine entry points that can fail fatally.
///
/// Per-window and per-request failures (image bind errors, suppressed X
/// errors) do not flow through this type: they become state flags on the
/// affected [`crate::window::WindowRecord`] instead, as specified for the
/// engine's propagation policy.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    /// The X display could not be opened, or the connection was lost.
    #[error("X11 connection error: {0}")]
    Connection(#[from] x11rb::errors::ConnectionError),

    /// A required extension is missing or too old.
    #[error("required X11 extension unavailable: {0}")]
    MissingExtension(&'static str),

    /// Another process already owns `_NET_WM_CM_S<n>`.
    #[error("another compositing manager is already running on screen {screen}")]
    AlreadyRunning {
        /// Screen number whose manager selection is already owned.
        screen: usize,
    },

    /// The compositing manager selection was lost at runtime.
    #[error("compositing manager selection lost, another compositor took over")]
    SelectionLost,

    /// A backend failed to initialize.
    #[error("backend initialization failed: {0}")]
    BackendInit(#[source] BackendError),

    /// Redirecting (or unredirecting) the root window failed.
    #[error("failed to redirect screen: {0}")]
    Redirect(#[source] x11rb::errors::ReplyError),

    /// A request sent to the server was rejected.
    #[error("X11 request failed: {0}")]
    Request(#[from] x11rb::errors::ReplyError),

    /// Acquiring the compositing manager selection or overlay window failed.
    #[error("registration failed: {0}")]
    Registration(#[from] RegistrationError),
}

/// Error reported by a [`crate::backend::Backend`] operation.
///
/// Per the backend failure policy (§4.6), a backend op failing does not
/// necessarily abort the engine: only [`Backend::init`](crate::backend::Backend::init)
/// failures propagate as [`EngineError::BackendInit`]; everything else is
/// handled by the caller by marking the window's `IMAGE_ERROR` flag.
#[derive(thiserror::Error, Debug)]
pub enum BackendError {
    /// The backend could not bind to its render target.
    #[error("failed to initialize render target")]
    InitFailed,

    /// Binding a pixmap to an image failed.
    #[error("failed to bind pixmap {pixmap} to an image")]
    BindFailed {
        /// X pixmap id that failed to bind.
        pixmap: u32,
    },

    /// An image operation could not be completed (e.g. out of memory).
    #[error("image operation failed")]
    OpFailed,

    /// The backend does not support resizing in place and must be
    /// recreated by the caller.
    #[error("backend cannot adapt to the new root geometry and must be reinitialized")]
    RootChangeUnsupported,
}

/// Error produced while resolving the compositor manager selection or
/// overlay setup (§4.12). These are fatal at startup but become
/// [`EngineError::SelectionLost`] if they occur while already running.
#[derive(thiserror::Error, Debug)]
pub enum RegistrationError {
    /// `_NET_WM_CM_S<n>` is already owned by `owner`.
    #[error("selection already owned by window {owner}")]
    AlreadyOwned {
        /// The window currently owning the manager selection.
        owner: Window,
    },

    /// Setting the overlay window's bounding/input shape to empty failed.
    #[error("failed to make the composite overlay window click-through")]
    OverlayShapeFailed,
}
