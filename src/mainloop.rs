//! The main loop (§4.11): a single-threaded `calloop` reactor integrating
//! the X connection, signals, and the fade/unredir/draw timers.

use std::sync::Arc;
use std::time::Duration;

use calloop::signals::{Signal, Signals};
use calloop::timer::{TimeoutAction, Timer};
use calloop::{EventLoop, LoopSignal};
use x11rb::protocol::Event;
use x11rb::rust_connection::RustConnection;

use crate::session::Session;
use crate::utils::x11rb::X11Source;

/// Everything the main loop owns besides the [`Session`] and backend,
/// which the embedder supplies per-iteration via the `draw` closure.
pub struct MainLoop {
    event_loop: EventLoop<'static, LoopState>,
    signal: LoopSignal,
}

struct LoopState {
    session: Session,
    redraw_queued: bool,
    fade_running: bool,
}

impl MainLoop {
    /// Builds a main loop around `connection`, ready to drive a [`Session`]
    /// with a fade timer ticking every `fade_delta` (the session's
    /// `fade_delta()`).
    ///
    /// `close_window`/`close_type` are forwarded to [`X11Source`] to let it
    /// wake its reader thread on teardown.
    pub fn new(
        connection: Arc<RustConnection>,
        fade_delta: Duration,
        close_window: u32,
        close_type: u32,
    ) -> Result<Self, std::io::Error> {
        let event_loop: EventLoop<'static, LoopState> = EventLoop::try_new()?;
        let signal = event_loop.get_signal();

        let x11_source = X11Source::new(connection, close_window, close_type);
        let handle = event_loop.handle();

        handle
            .insert_source(x11_source, move |event, (), state: &mut LoopState| {
                dispatch_and_queue(state, event);
            })
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

        handle
            .insert_source(Timer::from_duration(fade_delta), move |_, _, state: &mut LoopState| {
                if state.fade_running {
                    state.redraw_queued = true;
                    TimeoutAction::ToDuration(fade_delta)
                } else {
                    TimeoutAction::Drop
                }
            })
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

        handle
            .insert_source(Signals::new(&[Signal::SIGINT, Signal::SIGTERM, Signal::SIGUSR1])?, |ev, _, state| {
                match ev.signal() {
                    Signal::SIGUSR1 => state.session.reset_requested = true,
                    _ => state.session.quit = state.session.quit.or(Some(0)),
                }
            })
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

        Ok(MainLoop { event_loop, signal })
    }

    /// Runs the loop, calling `draw` once per queued redraw, until the
    /// session quits or a shutdown signal arrives.
    ///
    /// The **prepare hook** runs immediately before the loop sleeps,
    /// draining any X events the library buffered internally without the
    /// socket fd becoming readable again (§4.11); here that is simply
    /// `calloop`'s own pre-poll callback, since [`X11Source`] already
    /// drains its channel eagerly.
    pub fn run(
        &mut self,
        session: Session,
        mut draw: impl FnMut(&mut Session) -> bool,
    ) -> Result<Session, std::io::Error> {
        let mut state = LoopState {
            session,
            redraw_queued: true,
            fade_running: false,
        };

        while state.session.quit.is_none() {
            self.event_loop
                .dispatch(Some(Duration::from_millis(100)), &mut state)?;

            if state.redraw_queued {
                state.redraw_queued = false;
                state.fade_running = draw(&mut state.session);
            }

            if state.session.reset_requested {
                state.session.reset_requested = false;
                tracing::info!("SIGUSR1 received, resetting session");
            }
        }

        Ok(state.session)
    }

    /// Stops the loop at the next opportunity, from outside the loop's own
    /// thread (e.g. a test harness).
    pub fn signal(&self) -> LoopSignal {
        self.signal.clone()
    }
}

fn dispatch_and_queue(state: &mut LoopState, event: Event) {
    crate::events::dispatch(&mut state.session, event);
    state.redraw_queued = true;
    state.fade_running = true;
}
