//! Integration of an `x11rb` X11 connection with `calloop`.
//!
//! This is the one piece of unavoidable thread use in an otherwise
//! single-threaded engine (see SPEC_FULL.md §5): reading X11 events requires
//! an extra thread, because readability of the connection's socket is not
//! sufficient to guarantee we don't miss a wakeup — `wait_for_event` and
//! friends can stash further events in `RustConnection`'s internal buffer as
//! a side effect of sending a request or waiting for a reply. Calloop only
//! tells us "the fd became readable", so the thread-based workaround
//! documented by x11rb is used instead.

use std::{
    io::Result as IoResult,
    sync::Arc,
    thread::{spawn, JoinHandle},
};

use calloop::{
    channel::{sync_channel, Channel, Event as ChannelEvent, SyncSender},
    EventSource, Poll, PostAction, Readiness, Token, TokenFactory,
};
use x11rb::{
    connection::Connection as _,
    protocol::{
        xproto::{Atom, ClientMessageEvent, ConnectionExt as _, EventMask, Window, CLIENT_MESSAGE_EVENT},
        Event,
    },
    rust_connection::RustConnection,
};

/// A calloop event source backed by a background thread reading from an
/// `x11rb` connection.
#[derive(Debug)]
pub struct X11Source {
    connection: Arc<RustConnection>,
    channel: Option<Channel<Event>>,
    event_thread: Option<JoinHandle<()>>,
    close_window: Window,
    close_type: Atom,
}

impl X11Source {
    /// Creates a new source reading from `connection`.
    ///
    /// `close_window`/`close_type` identify a `ClientMessageEvent` the
    /// source sends to itself on drop, to wake the reader thread out of its
    /// blocking `wait_for_event` call so it notices the channel was closed.
    pub fn new(connection: Arc<RustConnection>, close_window: Window, close_type: Atom) -> Self {
        let (sender, channel) = sync_channel(16);
        let reader_conn = Arc::clone(&connection);
        let event_thread = Some(spawn(move || run_event_thread(reader_conn, sender)));

        Self {
            connection,
            channel: Some(channel),
            event_thread,
            close_window,
            close_type,
        }
    }
}

impl Drop for X11Source {
    fn drop(&mut self) {
        // Signal the worker thread to exit by dropping the read end of the channel...
        self.channel.take();

        // ...then wake it up, since it is blocked in wait_for_event().
        let event = ClientMessageEvent {
            response_type: CLIENT_MESSAGE_EVENT,
            format: 8,
            sequence: 0,
            window: self.close_window,
            type_: self.close_type,
            data: [0; 20].into(),
        };
        let _ = self
            .connection
            .send_event(false, self.close_window, EventMask::NO_EVENT, event);
        let _ = self.connection.flush();

        if let Some(handle) = self.event_thread.take() {
            let _ = handle.join();
        }
    }
}

impl EventSource for X11Source {
    type Event = Event;
    type Metadata = ();
    type Ret = ();

    fn process_events<C>(&mut self, readiness: Readiness, token: Token, mut callback: C) -> IoResult<PostAction>
    where
        C: FnMut(Self::Event, &mut Self::Metadata) -> Self::Ret,
    {
        if let Some(channel) = &mut self.channel {
            channel.process_events(readiness, token, move |event, meta| match event {
                ChannelEvent::Closed => tracing::warn!("X11 event thread exited"),
                ChannelEvent::Msg(event) => callback(event, meta),
            })
        } else {
            Ok(PostAction::Remove)
        }
    }

    fn register(&mut self, poll: &mut Poll, factory: &mut TokenFactory) -> IoResult<()> {
        if let Some(channel) = &mut self.channel {
            channel.register(poll, factory)?;
        }
        Ok(())
    }

    fn reregister(&mut self, poll: &mut Poll, factory: &mut TokenFactory) -> IoResult<()> {
        if let Some(channel) = &mut self.channel {
            channel.reregister(poll, factory)?;
        }
        Ok(())
    }

    fn unregister(&mut self, poll: &mut Poll) -> IoResult<()> {
        if let Some(channel) = &mut self.channel {
            channel.unregister(poll)?;
        }
        Ok(())
    }
}

/// Reads events off `connection` and forwards them on `sender` until the
/// connection is lost or the other end of the channel is dropped.
fn run_event_thread(connection: Arc<RustConnection>, sender: SyncSender<Event>) {
    loop {
        let event = match connection.wait_for_event() {
            Ok(event) => event,
            Err(err) => {
                tracing::error!("X11 event thread exiting: connection error: {err}");
                break;
            }
        };
        if sender.send(event).is_err() {
            // The other end was dropped in X11Source::drop.
            break;
        }
    }
}
