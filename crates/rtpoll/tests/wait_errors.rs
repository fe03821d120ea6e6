//! Interrupted and failing waits.

#![cfg(target_os = "linux")]
#![expect(unsafe_code, reason = "signal handlers and resource limits are set up through libc")]

use rtpoll::prelude::*;
use std::io;
use std::time::Duration;

type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Soft descriptor limits above this are lowered before building an oversized slot.
const MAX_SLOT_WIDTH: libc::rlim_t = 4_000_000;

extern "C" fn ignore_signal(_signal: libc::c_int) {}

/// Install a no-op SIGUSR1 handler without `SA_RESTART`, so a blocked
/// `poll(2)` returns `EINTR` when the signal arrives.
fn install_interrupting_handler() -> io::Result<()> {
    // SAFETY: `sigaction` is plain old data and all-zero is a valid value.
    let mut action: libc::sigaction = unsafe { std::mem::zeroed() };
    action.sa_sigaction = ignore_signal as *const () as libc::sighandler_t;
    action.sa_flags = 0;

    // SAFETY: `sa_mask` is a valid, writable sigset_t.
    if unsafe { libc::sigemptyset(&mut action.sa_mask) } != 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: `action` is initialised and outlives the call; the old action is not requested.
    if unsafe { libc::sigaction(libc::SIGUSR1, &action, std::ptr::null_mut()) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// Soft `RLIMIT_NOFILE`, lowered first when it is too large to exceed in a test.
fn descriptor_limit() -> io::Result<usize> {
    let mut limit = libc::rlimit {
        rlim_cur: 0,
        rlim_max: 0,
    };
    // SAFETY: `limit` is a valid, writable rlimit.
    if unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, &mut limit) } != 0 {
        return Err(io::Error::last_os_error());
    }

    if limit.rlim_cur > MAX_SLOT_WIDTH {
        limit.rlim_cur = 1_024;
        // SAFETY: `limit` is valid; lowering the soft limit needs no privilege.
        if unsafe { libc::setrlimit(libc::RLIMIT_NOFILE, &limit) } != 0 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(usize::try_from(limit.rlim_cur).unwrap_or(usize::MAX))
}

#[test]
fn test_interrupted_wait_is_retried() -> TestResult {
    install_interrupting_handler()?;

    let mut rtpoll = RtPoll::with_config(RtPollConfig::testing());
    rtpoll.install()?;
    rtpoll.set_timer_relative(Duration::from_millis(100))?;
    let deadline = rtpoll.next_deadline().ok_or("relative timer has no deadline")?;

    // SAFETY: pthread_self always succeeds and names the calling thread.
    let target = unsafe { libc::pthread_self() };
    let sender = std::thread::spawn(move || -> io::Result<()> {
        for _ in 0..5 {
            std::thread::sleep(Duration::from_millis(10));
            // SAFETY: the target thread stays alive until this thread is joined.
            let rc = unsafe { libc::pthread_kill(target, libc::SIGUSR1) };
            if rc != 0 {
                return Err(io::Error::from_raw_os_error(rc));
            }
        }
        Ok(())
    });

    let outcome = rtpoll.run(true);
    sender.join().map_err(|_panic| "signal thread panicked")??;

    assert_eq!(
        outcome?,
        RunOutcome::Continue {
            skip_next_wait: false
        }
    );
    assert!(rtpoll.timer_elapsed());
    assert!(Timestamp::now() >= deadline);
    Ok(())
}

#[test]
fn test_poll_failure_is_reported() -> TestResult {
    let width = descriptor_limit()?.saturating_add(1);

    let mut rtpoll = RtPoll::with_config(RtPollConfig::testing());
    rtpoll.item_new(Priority::Normal, width)?;

    let result = rtpoll.run(true);

    assert_eq!(
        result,
        Err(RtPollError::PollSyscall {
            errno: libc::EINVAL
        })
    );
    assert!(result.err().is_some_and(|err| err.is_fatal()));
    Ok(())
}
