//! Readiness wait set over epoll, plus a cross-thread wake channel.
//!
//! Device descriptors are registered with their device number as token. A
//! dedicated eventfd is always registered under [`Token::Wake`]: any thread
//! holding a [`Waker`] can interrupt a blocked [`Poller::wait`] so that the
//! loop re-evaluates its timeout after an activation or rate change.

use crate::table::DeviceId;
use iio_common::error::HalError;
use nix::errno::Errno;
use nix::poll::PollTimeout;
use nix::sys::epoll::{Epoll, EpollCreateFlags, EpollEvent, EpollFlags};
use nix::sys::eventfd::{EfdFlags, EventFd};
use std::os::fd::AsFd;
use std::sync::Arc;
use std::time::Duration;
use tracing::{trace, warn};

const WAKE_TOKEN: u64 = u64::MAX;

/// Origin of a readiness event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// The wake channel was signalled
    Wake,
    /// A device file became ready
    Device(DeviceId),
}

/// Decoded readiness event.
#[derive(Debug, Clone, Copy)]
pub struct Readiness {
    /// Event origin
    pub token: Token,
    /// Data can be read
    pub readable: bool,
    /// Error or hang-up reported on the descriptor
    pub failed: bool,
}

impl Readiness {
    fn from_event(event: &EpollEvent) -> Self {
        let token = match event.data() {
            WAKE_TOKEN => Token::Wake,
            dev => Token::Device(dev as DeviceId),
        };
        let flags = event.events();
        Self {
            token,
            readable: flags.contains(EpollFlags::EPOLLIN),
            failed: flags.intersects(EpollFlags::EPOLLERR | EpollFlags::EPOLLHUP),
        }
    }
}

/// Handle interrupting a blocked wait from any thread.
#[derive(Debug, Clone)]
pub struct Waker {
    fd: Arc<EventFd>,
}

impl Waker {
    /// Interrupt the current or next wait.
    pub fn wake(&self) {
        match self.fd.write(1) {
            Ok(_) => trace!("Wake signalled"),
            // Counter saturated: a wake is already pending.
            Err(Errno::EAGAIN) => {}
            Err(e) => warn!("Failed to signal wake channel: {}", e),
        }
    }
}

/// Wait set for device descriptors and the wake channel.
#[derive(Debug)]
pub struct Poller {
    epoll: Epoll,
    waker: Waker,
}

impl Poller {
    /// Create the wait set and register the wake channel.
    pub fn new() -> Result<Self, HalError> {
        let epoll = Epoll::new(EpollCreateFlags::EPOLL_CLOEXEC)
            .map_err(|e| HalError::InitFailed(format!("epoll_create: {e}")))?;

        let fd = EventFd::from_value_and_flags(0, EfdFlags::EFD_CLOEXEC | EfdFlags::EFD_NONBLOCK)
            .map_err(|e| HalError::InitFailed(format!("eventfd: {e}")))?;

        epoll
            .add(&fd, EpollEvent::new(EpollFlags::EPOLLIN, WAKE_TOKEN))
            .map_err(|e| HalError::InitFailed(format!("epoll_ctl(wake): {e}")))?;

        Ok(Self {
            epoll,
            waker: Waker { fd: Arc::new(fd) },
        })
    }

    /// Clonable wake handle.
    pub fn waker(&self) -> Waker {
        self.waker.clone()
    }

    /// Interrupt the current or next wait from the driving thread.
    pub fn wake(&self) {
        self.waker.wake();
    }

    /// Add a device descriptor to the wait set.
    pub fn register(&self, fd: impl AsFd, dev: DeviceId) -> nix::Result<()> {
        self.epoll
            .add(fd, EpollEvent::new(EpollFlags::EPOLLIN, dev as u64))
    }

    /// Remove a device descriptor from the wait set.
    pub fn unregister(&self, fd: impl AsFd) -> nix::Result<()> {
        self.epoll.delete(fd)
    }

    /// Block until readiness or timeout; `None` waits indefinitely.
    ///
    /// Fills `events` and returns the decoded readiness of the first `n`.
    pub fn wait<'a>(
        &self,
        events: &'a mut [EpollEvent],
        timeout: Option<Duration>,
    ) -> nix::Result<impl Iterator<Item = Readiness> + use<'a>> {
        let n = self.epoll.wait(events, to_poll_timeout(timeout))?;
        Ok(events[..n].iter().map(Readiness::from_event))
    }

    /// Consume pending wake signals.
    pub fn acknowledge(&self) {
        match self.waker.fd.read() {
            Ok(count) => trace!("Acknowledged {} wake signal(s)", count),
            Err(Errno::EAGAIN) => {}
            Err(e) => warn!("Failed to read wake channel: {}", e),
        }
    }
}

/// Millisecond timeout, rounded up so a sample is never taken early.
fn to_poll_timeout(timeout: Option<Duration>) -> PollTimeout {
    let Some(timeout) = timeout else {
        return PollTimeout::NONE;
    };
    let mut ms = timeout.as_millis();
    if Duration::from_millis(ms as u64) < timeout {
        ms += 1;
    }
    PollTimeout::from(ms.min(u128::from(u16::MAX)) as u16)
}
