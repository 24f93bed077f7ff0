use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::sys::wait::{self, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;
use std::io::{self, Write};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::command::Command;
use crate::error::{Result, ShellError};
use crate::launcher;

pub type JobId = i32;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum JobError {
    #[error("job-id {0} does not exist")]
    NoSuchJob(JobId),

    #[error("jobs list is empty")]
    Empty,

    #[error("there is no stopped jobs to resume")]
    NoStoppedJobs,

    #[error("job-id {0} is already running in the background")]
    AlreadyRunning(JobId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Running,
    Stopped,
}

#[derive(Debug)]
pub struct Job {
    jid: JobId,
    state: JobState,
    started: Instant,
    command: Command,
}

impl Job {
    pub fn jid(&self) -> JobId {
        self.jid
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn is_stopped(&self) -> bool {
        self.state == JobState::Stopped
    }

    pub fn set_state(&mut self, state: JobState) {
        self.state = state;
    }

    pub fn command(&self) -> &Command {
        &self.command
    }

    pub fn pid(&self) -> Option<Pid> {
        self.command.pid()
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }

    pub fn into_command(self) -> Command {
        self.command
    }
}

/// The shell's job table. Jobs are kept in insertion order, which is what
/// "most recent" means everywhere below. Ids come from a counter that never
/// goes backwards, so an id is never handed out twice.
#[derive(Debug)]
pub struct JobList {
    jobs: Vec<Job>,
    next_jid: JobId,
}

impl Default for JobList {
    fn default() -> Self {
        JobList {
            jobs: Vec::new(),
            next_jid: 1,
        }
    }
}

impl JobList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter()
    }

    pub fn add_job(&mut self, command: Command, stopped: bool) -> JobId {
        let jid = self.next_jid;
        self.next_jid += 1;
        let state = if stopped {
            JobState::Stopped
        } else {
            JobState::Running
        };
        debug!(jid, pid = ?command.pid(), ?state, cmdline = command.cmd_line(), "added job");
        self.jobs.push(Job {
            jid,
            state,
            started: Instant::now(),
            command,
        });
        jid
    }

    /// Spawns the command of a job registered before it ran. A job whose
    /// spawn fails is dropped again.
    pub fn launch(&mut self, jid: JobId) -> Result<Pid> {
        let job = self
            .get_job_by_id_mut(jid)
            .map_err(|e| ShellError::job("launch", e))?;
        match launcher::spawn(&mut job.command) {
            Ok(pid) => Ok(pid),
            Err(e) => {
                self.remove_job_by_id(jid);
                Err(e)
            }
        }
    }

    pub fn get_job_by_id(&self, jid: JobId) -> std::result::Result<&Job, JobError> {
        self.jobs
            .iter()
            .find(|job| job.jid == jid)
            .ok_or(JobError::NoSuchJob(jid))
    }

    pub fn get_job_by_id_mut(&mut self, jid: JobId) -> std::result::Result<&mut Job, JobError> {
        self.jobs
            .iter_mut()
            .find(|job| job.jid == jid)
            .ok_or(JobError::NoSuchJob(jid))
    }

    /// Takes the most recently added job out of the table.
    pub fn get_last_job(&mut self) -> std::result::Result<Job, JobError> {
        self.jobs.pop().ok_or(JobError::Empty)
    }

    pub fn get_last_stopped_job(&mut self) -> std::result::Result<&mut Job, JobError> {
        self.jobs
            .iter_mut()
            .rev()
            .find(|job| job.is_stopped())
            .ok_or(JobError::NoStoppedJobs)
    }

    pub fn is_stopped(&self, jid: JobId) -> bool {
        self.get_job_by_id(jid)
            .map(|job| job.is_stopped())
            .unwrap_or(false)
    }

    pub fn remove_job_by_id(&mut self, jid: JobId) -> Option<Job> {
        let idx = self.jobs.iter().position(|job| job.jid == jid)?;
        debug!(jid, "removed job");
        Some(self.jobs.remove(idx))
    }

    pub fn print_jobs_list(&self) {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        if let Err(e) = self.write_jobs_list(&mut out).and_then(|_| out.flush()) {
            warn!(error = %e, "failed to write jobs list");
        }
    }

    pub fn write_jobs_list<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for job in self.jobs.iter() {
            write!(
                out,
                "[{}] {} : {} {} secs",
                job.jid,
                job.command.cmd_line(),
                display_pid(job.pid()),
                job.elapsed_secs()
            )?;
            if job.is_stopped() {
                write!(out, " (stopped)")?;
            }
            writeln!(out)?;
        }
        Ok(())
    }

    pub fn kill_all_jobs(&self) {
        println!("smash: sending SIGKILL signal to {} jobs:", self.jobs.len());
        for job in self.jobs.iter() {
            println!("{}: {}", display_pid(job.pid()), job.command.cmd_line());
            if let Some(pid) = job.pid() {
                if let Err(e) = signal::kill(pid, Signal::SIGKILL) {
                    warn!(jid = job.jid, %pid, error = %e, "kill failed");
                }
            }
        }
        let _ = io::stdout().flush();
    }

    /// Polls every tracked process without blocking. Exited processes are
    /// dropped, stop/continue reports update the job state.
    pub fn remove_finished_jobs(&mut self) {
        let flags = WaitPidFlag::WNOHANG | WaitPidFlag::WUNTRACED | WaitPidFlag::WCONTINUED;
        self.jobs.retain_mut(|job| {
            let pid = match job.pid() {
                Some(pid) => pid,
                None => return true,
            };
            match wait::waitpid(pid, Some(flags)) {
                Ok(WaitStatus::Exited(_, code)) => {
                    info!(jid = job.jid, %pid, code, "job exited");
                    false
                }
                Ok(WaitStatus::Signaled(_, sig, _)) => {
                    info!(jid = job.jid, %pid, ?sig, "job terminated by signal");
                    false
                }
                Ok(WaitStatus::Stopped(..)) => {
                    job.state = JobState::Stopped;
                    true
                }
                Ok(WaitStatus::Continued(_)) => {
                    job.state = JobState::Running;
                    true
                }
                Ok(_) => true,
                Err(Errno::ECHILD) => {
                    debug!(jid = job.jid, %pid, "job already reaped");
                    false
                }
                Err(e) => {
                    warn!(jid = job.jid, %pid, error = %e, "waitpid failed");
                    true
                }
            }
        });
    }
}

fn display_pid(pid: Option<Pid>) -> String {
    match pid {
        Some(pid) => pid.to_string(),
        None => "-".to_owned(),
    }
}
