//! `jobs`, `fg`, `bg` and `quit`.

use nix::sys::signal::{self, Signal};
use std::io::{self, Write};
use tracing::info;

use crate::error::{Result, ShellError};
use crate::jobs::{Job, JobError, JobId, JobState};
use crate::launcher;
use crate::shell::ShellContext;

pub fn jobs(ctx: &ShellContext) {
    ctx.jobs().print_jobs_list();
}

/// Moves a job back into the foreground and waits for it. Without `jid` the
/// most recently added job is taken.
pub fn fg(ctx: &mut ShellContext, jid: Option<JobId>) -> Result<()> {
    let job: Job = match jid {
        Some(jid) => ctx
            .jobs_mut()
            .remove_job_by_id(jid)
            .ok_or_else(|| ShellError::no_such_job("fg", jid))?,
        None => ctx
            .jobs_mut()
            .get_last_job()
            .map_err(|e| ShellError::job("fg", e))?,
    };
    let command = job.into_command();
    let pid = match command.pid() {
        Some(pid) => pid,
        None => return Ok(()),
    };

    announce(command.cmd_line(), pid);
    signal::kill(pid, Signal::SIGCONT).map_err(|e| ShellError::sys("kill", e))?;
    info!(%pid, "resumed in foreground");
    ctx.set_foreground(command);
    launcher::wait_foreground(ctx, pid)
}

/// Resumes a stopped job without waiting for it. Without `jid` the most
/// recently added stopped job is taken.
pub fn bg(ctx: &mut ShellContext, jid: Option<JobId>) -> Result<()> {
    let jobs = ctx.jobs_mut();
    let job = match jid {
        Some(jid) => {
            let job = jobs
                .get_job_by_id_mut(jid)
                .map_err(|e| ShellError::job("bg", e))?;
            if !job.is_stopped() {
                return Err(ShellError::job("bg", JobError::AlreadyRunning(jid)));
            }
            job
        }
        None => jobs
            .get_last_stopped_job()
            .map_err(|e| ShellError::job("bg", e))?,
    };
    if let Some(pid) = job.pid() {
        announce(job.command().cmd_line(), pid);
        signal::kill(pid, Signal::SIGCONT).map_err(|e| ShellError::sys("kill", e))?;
        info!(jid = job.jid(), %pid, "resumed in background");
    }
    job.set_state(JobState::Running);
    Ok(())
}

pub fn quit(ctx: &ShellContext, kill: bool) {
    if kill {
        ctx.jobs().kill_all_jobs();
    }
}

fn announce(cmd_line: &str, pid: nix::unistd::Pid) {
    println!("{} : {}", cmd_line, pid);
    let _ = io::stdout().flush();
}
