//! [`Session`]: the aggregate state threaded through every engine
//! operation (§3 "Session state").

use std::time::Duration;

use x11rb::protocol::xproto::Window as XWindow;

use crate::atoms::Atoms;
use crate::config::CompositorConfig;
use crate::damage::DamageRing;
use crate::region::Region;
use crate::registry::Registry;
use crate::utils::Rectangle;

/// One X request sequence number whose error should be suppressed, along
/// with a tag for diagnostics (§4.10, §9).
#[derive(Debug, Clone, Copy)]
pub struct IgnoredSequence {
    /// The sequence number to suppress errors for.
    pub sequence: u16,
    /// What the request was, for logging if an error for it is seen before
    /// being purged.
    pub kind: &'static str,
}

/// All per-run state: root geometry, the registry, the damage ring,
/// redirection status, and bookkeeping for X error suppression.
///
/// A `Session` is created fresh on startup and again on every SIGUSR1
/// reset (§4.11); nothing about it is global, per the redesign note
/// retiring the original's single mutable session pointer (§9).
#[derive(Debug)]
pub struct Session {
    /// Resolved configuration for this run.
    pub config: CompositorConfig,
    /// Interned atom table.
    pub atoms: Atoms,
    /// Root window id.
    pub root: XWindow,
    /// Composite overlay window id, once acquired.
    pub overlay: Option<XWindow>,
    /// 1x1 registration window used to hold the manager selection.
    pub registration_window: Option<XWindow>,

    /// Current root geometry.
    pub root_geometry: Rectangle,
    /// Full-screen region, recomputed whenever root geometry changes.
    pub screen_region: Region,
    /// Region shadows are never drawn into (e.g. panel strips), if any.
    pub shadow_exclude_region: Region,
    /// Per-screen regions from Xinerama, used to crop shadows when enabled.
    pub xinerama_screens: Vec<Rectangle>,

    /// The window registry and stack.
    pub registry: Registry,
    /// Damage accumulator; `None` until redirection starts.
    pub damage_ring: Option<DamageRing>,

    /// Whether the root is currently Composite-redirected.
    pub redirected: bool,

    /// EWMH active window, if tracked.
    pub active_window: Option<XWindow>,
    /// Resolved leader of the active window's group, if any.
    pub active_leader: Option<XWindow>,

    /// X request sequence numbers whose errors are suppressed.
    pub ignored_sequences: Vec<IgnoredSequence>,

    /// Set when a fatal condition (selection loss, connection loss) should
    /// end the main loop.
    pub quit: Option<i32>,
    /// Set by SIGUSR1 to request a full reset between frames.
    pub reset_requested: bool,
}

impl Session {
    /// Creates a fresh session for `root`, with the given configuration and
    /// atom table, before any window has been registered.
    pub fn new(config: CompositorConfig, atoms: Atoms, root: XWindow, root_geometry: Rectangle) -> Self {
        let screen_region = Region::from_rect(root_geometry);
        Session {
            config,
            atoms,
            root,
            overlay: None,
            registration_window: None,
            root_geometry,
            screen_region,
            shadow_exclude_region: Region::empty(),
            xinerama_screens: Vec::new(),
            registry: Registry::new(),
            damage_ring: None,
            redirected: false,
            active_window: None,
            active_leader: None,
            ignored_sequences: Vec::new(),
            quit: None,
            reset_requested: false,
        }
    }

    /// Recomputes `screen_region` from `root_geometry` (§4.10
    /// `ConfigureNotify(root)`).
    pub fn rebuild_screen_region(&mut self) {
        self.screen_region = Region::from_rect(self.root_geometry);
    }

    /// Appends a sequence number to suppress, tagged with `kind` for
    /// diagnostics if it's ever logged before being purged.
    pub fn ignore_sequence(&mut self, sequence: u16, kind: &'static str) {
        self.ignored_sequences.push(IgnoredSequence { sequence, kind });
    }

    /// Discards every ignored sequence number `<= upto`, called at the top
    /// of every event handler (§4.10).
    pub fn purge_ignored_sequences(&mut self, upto: u16) {
        self.ignored_sequences.retain(|s| s.sequence > upto);
    }

    /// True if `sequence` should be suppressed; also purges it once
    /// matched, since each ignore entry applies to exactly one error.
    pub fn take_ignored(&mut self, sequence: u16) -> bool {
        if let Some(pos) = self.ignored_sequences.iter().position(|s| s.sequence == sequence) {
            self.ignored_sequences.remove(pos);
            true
        } else {
            false
        }
    }

    /// Unredirect delay as a [`Duration`], from the resolved config.
    pub fn unredir_delay(&self) -> Duration {
        Duration::from_millis(self.config.unredir_if_possible_delay_ms)
    }

    /// Fade step interval as a [`Duration`], from the resolved config.
    pub fn fade_delta(&self) -> Duration {
        Duration::from_millis(self.config.fade_delta_ms)
    }
}
