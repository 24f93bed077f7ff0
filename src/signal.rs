//! Signal bridge between the kernel and the job table.
//!
//! The handlers run at arbitrary points of the main thread, so all they do is
//! raise a flag. `dispatch_pending` turns raised flags into job-table updates
//! and is called from the read loop and from the foreground wait, which are
//! the only places that mutate shell state.

use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

use crate::error::{Result, ShellError};
use crate::shell::ShellContext;

static STOP_PENDING: AtomicBool = AtomicBool::new(false);
static CHILD_PENDING: AtomicBool = AtomicBool::new(false);
static INTERRUPT_PENDING: AtomicBool = AtomicBool::new(false);

extern "C" fn handle_sigtstp(_signal: libc::c_int) {
    STOP_PENDING.store(true, Ordering::SeqCst);
}

extern "C" fn handle_sigchld(_signal: libc::c_int) {
    CHILD_PENDING.store(true, Ordering::SeqCst);
}

extern "C" fn handle_sigint(
    _signal: libc::c_int,
    info: *mut libc::siginfo_t,
    _context: *mut libc::c_void,
) {
    if info.is_null() {
        return;
    }
    let code = unsafe { (*info).si_code };
    if interrupt_needs_forwarding(code) {
        INTERRUPT_PENDING.store(true, Ordering::SeqCst);
    }
}

/// A ctrl-C typed at the terminal already reaches the foreground command,
/// which shares the shell's process group. Only an interrupt sent to the
/// shell alone with kill(2) is passed on.
fn interrupt_needs_forwarding(si_code: libc::c_int) -> bool {
    si_code == libc::SI_USER
}

/// Installs the handlers for the lifetime of the process. No `SA_RESTART`:
/// a blocked `waitpid` has to come back with `EINTR` so the event gets
/// applied while the foreground process is still being waited on.
pub fn install() -> Result<()> {
    let actions = [
        (
            Signal::SIGTSTP,
            SigHandler::Handler(handle_sigtstp),
            SaFlags::empty(),
        ),
        (
            Signal::SIGCHLD,
            SigHandler::Handler(handle_sigchld),
            SaFlags::empty(),
        ),
        (
            Signal::SIGINT,
            SigHandler::SigAction(handle_sigint),
            SaFlags::SA_SIGINFO,
        ),
    ];
    for (sig, handler, flags) in actions.iter() {
        let action = SigAction::new(*handler, *flags, SigSet::empty());
        unsafe { signal::sigaction(*sig, &action) }
            .map_err(|e| ShellError::sys("sigaction", e))?;
    }
    Ok(())
}

/// Applies every event raised since the last call.
pub fn dispatch_pending(ctx: &mut ShellContext) {
    if STOP_PENDING.swap(false, Ordering::SeqCst) {
        on_stop(ctx);
    }
    if INTERRUPT_PENDING.swap(false, Ordering::SeqCst) {
        on_interrupt(ctx);
    }
    if CHILD_PENDING.swap(false, Ordering::SeqCst) {
        on_child_status_change(ctx);
    }
}

/// Ctrl-Z: suspend the foreground command and file it as a stopped job.
pub fn on_stop(ctx: &mut ShellContext) {
    let command = match ctx.take_foreground() {
        Some(command) => command,
        None => return,
    };
    if let Some(pid) = command.pid() {
        if let Err(e) = signal::kill(pid, Signal::SIGTSTP) {
            warn!(%pid, error = %e, "failed to stop foreground process");
        }
    }
    let jid = ctx.jobs_mut().add_job(command, true);
    debug!(jid, "foreground process stopped");
}

/// An interrupt sent to the shell: pass it on to the foreground command.
pub fn on_interrupt(ctx: &mut ShellContext) {
    if let Some(pid) = ctx.foreground().and_then(|command| command.pid()) {
        if let Err(e) = signal::kill(pid, Signal::SIGINT) {
            warn!(%pid, error = %e, "failed to interrupt foreground process");
        }
    }
}

pub fn on_child_status_change(ctx: &mut ShellContext) {
    ctx.jobs_mut().remove_finished_jobs();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::test_util::{kill_and_reap, spawn_sleep, wait_until};
    use nix::sys::wait::{self, WaitPidFlag, WaitStatus};

    #[test]
    fn stop_without_foreground_is_a_no_op() {
        let mut ctx = ShellContext::default();
        on_stop(&mut ctx);
        assert!(ctx.jobs().is_empty());
        on_interrupt(&mut ctx);
    }

    #[test]
    fn stop_files_the_foreground_command() {
        let mut ctx = ShellContext::default();
        ctx.jobs_mut().add_job(Command::external("older"), false);
        let command = spawn_sleep("sleep 100");
        let pid = command.pid().unwrap();
        ctx.set_foreground(command);

        on_stop(&mut ctx);

        assert!(ctx.foreground().is_none());
        assert_eq!(ctx.jobs().len(), 2);
        let job = ctx.jobs().iter().last().unwrap();
        assert!(job.is_stopped());
        assert_eq!(job.pid(), Some(pid));

        // SIGTSTP is discarded for orphaned process groups, so the OS-side
        // stop is not asserted; the process must still be alive though.
        let status = wait::waitpid(pid, Some(WaitPidFlag::WNOHANG | WaitPidFlag::WUNTRACED));
        assert!(!matches!(status, Ok(WaitStatus::Exited(..))));
        kill_and_reap(pid);
    }

    #[test]
    fn interrupt_reaches_the_foreground_command() {
        let mut ctx = ShellContext::default();
        let command = spawn_sleep("sleep 100");
        let pid = command.pid().unwrap();
        ctx.set_foreground(command);

        on_interrupt(&mut ctx);

        let status = wait::waitpid(pid, None).unwrap();
        assert_eq!(status, WaitStatus::Signaled(pid, Signal::SIGINT, false));
        assert!(ctx.foreground().is_some());
    }

    #[test]
    fn only_kill_sent_interrupts_are_forwarded() {
        assert!(interrupt_needs_forwarding(libc::SI_USER));
        // SI_KERNEL: generated by the terminal driver
        assert!(!interrupt_needs_forwarding(0x80));
        assert!(!interrupt_needs_forwarding(libc::SI_QUEUE));
    }

    #[test]
    fn child_status_change_reaps_only_exited_jobs() {
        let mut ctx = ShellContext::default();
        let done = spawn_sleep("sleep 0");
        let alive = spawn_sleep("sleep 100");
        let alive_pid = alive.pid().unwrap();
        ctx.jobs_mut().add_job(done, false);
        ctx.jobs_mut().add_job(alive, true);

        assert!(wait_until(|| {
            on_child_status_change(&mut ctx);
            ctx.jobs().len() == 1
        }));
        assert_eq!(ctx.jobs().iter().next().unwrap().pid(), Some(alive_pid));
        kill_and_reap(alive_pid);
    }
}
