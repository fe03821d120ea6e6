//! Counting semaphore whose pending state is a readable descriptor.
//!
//! Each `post` writes one byte into a non-blocking socket pair and each
//! `acknowledge` reads one back, so the read end is readable exactly while
//! signals are pending and can sit in a poll set.

use crate::error::{SyncError, SyncResult};
use rtpoll::PollableSemaphore;
use std::io::{self, Read, Write};
use std::os::fd::AsRawFd;
use std::os::unix::io::RawFd;
use std::os::unix::net::UnixStream;

/// Descriptor-backed counting semaphore.
///
/// `post` may be called from any thread. When the kernel buffer is full the
/// semaphore is already signalled and further posts are dropped.
#[derive(Debug)]
pub struct FdSem {
    read_end: UnixStream,
    write_end: UnixStream,
}

impl FdSem {
    /// Create an unsignalled semaphore.
    ///
    /// # Errors
    ///
    /// [`SyncError::Create`] if the socket pair cannot be set up.
    pub fn new() -> SyncResult<Self> {
        let (read_end, write_end) = UnixStream::pair().map_err(SyncError::Create)?;
        read_end.set_nonblocking(true).map_err(SyncError::Create)?;
        write_end.set_nonblocking(true).map_err(SyncError::Create)?;

        tracing::debug!(fd = read_end.as_raw_fd(), "FdSem created");
        Ok(Self {
            read_end,
            write_end,
        })
    }

    /// Add one pending signal.
    ///
    /// # Errors
    ///
    /// [`SyncError::Post`] if the write fails for any reason other than a
    /// full buffer.
    pub fn post(&self) -> SyncResult {
        loop {
            match (&self.write_end).write(&[1]) {
                Ok(_) => return Ok(()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    tracing::trace!("FdSem saturated, dropping post");
                    return Ok(());
                }
                Err(e) => return Err(SyncError::Post(e)),
            }
        }
    }

    /// Consume one pending signal. Returns `false` if none was pending.
    pub fn acknowledge(&self) -> bool {
        let mut byte = [0u8; 1];
        loop {
            match (&self.read_end).read(&mut byte) {
                Ok(n) => return n == 1,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(_) => return false,
            }
        }
    }

    /// Consume every pending signal, returning how many there were.
    pub fn drain(&self) -> usize {
        let mut buf = [0u8; 64];
        let mut total = 0usize;
        loop {
            match (&self.read_end).read(&mut buf) {
                Ok(0) => return total,
                Ok(n) => total = total.saturating_add(n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(_) => return total,
            }
        }
    }

    /// The descriptor to poll for `POLLIN`.
    pub fn descriptor(&self) -> RawFd {
        self.read_end.as_raw_fd()
    }
}

impl PollableSemaphore for FdSem {
    fn descriptor(&self) -> RawFd {
        FdSem::descriptor(self)
    }

    fn acknowledge(&self) -> bool {
        FdSem::acknowledge(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_then_acknowledge() -> Result<(), Box<dyn std::error::Error>> {
        let sem = FdSem::new()?;
        assert!(!sem.acknowledge());

        sem.post()?;
        sem.post()?;
        assert!(sem.acknowledge());
        assert!(sem.acknowledge());
        assert!(!sem.acknowledge());
        Ok(())
    }

    #[test]
    fn test_drain_counts_pending() -> Result<(), Box<dyn std::error::Error>> {
        let sem = FdSem::new()?;
        for _ in 0..100 {
            sem.post()?;
        }
        assert_eq!(sem.drain(), 100);
        assert_eq!(sem.drain(), 0);
        Ok(())
    }

    #[test]
    fn test_post_from_other_thread() -> Result<(), Box<dyn std::error::Error>> {
        let sem = std::sync::Arc::new(FdSem::new()?);
        let poster = std::sync::Arc::clone(&sem);
        std::thread::spawn(move || poster.post())
            .join()
            .map_err(|_panic| "poster thread panicked")??;

        assert!(sem.acknowledge());
        Ok(())
    }

    #[test]
    fn test_descriptor_is_stable() -> Result<(), Box<dyn std::error::Error>> {
        let sem = FdSem::new()?;
        assert!(sem.descriptor() >= 0);
        assert_eq!(sem.descriptor(), PollableSemaphore::descriptor(&sem));
        Ok(())
    }
}
