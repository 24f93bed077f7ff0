use nix::errno::Errno;
use nix::sys::wait::{self, WaitPidFlag, WaitStatus};
use nix::unistd::{self, ForkResult, Pid};
use std::ffi::{CStr, CString};
use std::io::{self, Write};
use tracing::{debug, warn};

use crate::command::Command;
use crate::error::{Result, ShellError};
use crate::shell::ShellContext;
use crate::signal;

/// Forks and execs `command`, recording the child's pid on it. The caller
/// decides whether to wait.
pub fn spawn(command: &mut Command) -> Result<Pid> {
    // Everything the child needs is built before fork.
    let array = command
        .argv()?
        .iter()
        .map(|x| CString::new(x.as_bytes()))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| ShellError::sys("execvp", Errno::EINVAL))?;
    if array.is_empty() {
        return Err(ShellError::sys("execvp", Errno::ENOENT));
    }
    let argv: Vec<&CStr> = array.iter().map(|x| x.as_c_str()).collect();

    let _ = io::stdout().flush();
    match unsafe { unistd::fork() } {
        Ok(ForkResult::Child) => exec(argv[0], &argv),
        Ok(ForkResult::Parent { child }) => {
            debug!(pid = %child, cmdline = command.cmd_line(), "spawned");
            command.record_pid(child);
            Ok(child)
        }
        Err(e) => Err(ShellError::sys("fork", e)),
    }
}

fn exec(file: &CStr, argv: &[&CStr]) -> ! {
    let e = match unistd::execvp(file, argv) {
        Ok(never) => match never {},
        Err(e) => e,
    };
    {
        let stderr = io::stderr();
        let mut err = stderr.lock();
        let _ = writeln!(err, "smash error: execvp failed: {}", e.desc());
        let _ = err.flush();
    }
    // Skip the parent's atexit handlers and buffered output.
    unsafe { libc::_exit(1) }
}

/// Spawns `command` and waits for it as the foreground process.
pub fn run_foreground(ctx: &mut ShellContext, mut command: Command) -> Result<()> {
    let pid = spawn(&mut command)?;
    ctx.set_foreground(command);
    wait_foreground(ctx, pid)
}

/// Blocks until the foreground process `pid` stops or exits. The foreground
/// slot is empty when this returns; a stopped process ends up in the job
/// table.
pub fn wait_foreground(ctx: &mut ShellContext, pid: Pid) -> Result<()> {
    let res = loop {
        match wait::waitpid(pid, Some(WaitPidFlag::WUNTRACED)) {
            Ok(WaitStatus::Stopped(..)) => {
                signal::dispatch_pending(ctx);
                // stopped by something other than our own ctrl-Z handling
                if let Some(command) = ctx.take_foreground() {
                    ctx.jobs_mut().add_job(command, true);
                }
                break Ok(());
            }
            Ok(status) => {
                debug!(%pid, ?status, "foreground process done");
                break Ok(());
            }
            Err(Errno::EINTR) => {
                signal::dispatch_pending(ctx);
                if ctx.foreground().is_none() {
                    break Ok(());
                }
            }
            Err(e) => {
                warn!(%pid, error = %e, "waitpid failed");
                break Err(ShellError::sys("waitpid", e));
            }
        }
    };
    ctx.take_foreground();
    res
}
