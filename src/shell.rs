use std::path::{Path, PathBuf};
use tracing::debug;

use crate::command::{Command, Control};
use crate::config::Config;
use crate::error::Result;
use crate::jobs::JobList;
use crate::parse;

/// State shared by every command: prompt, directory history, the job table
/// and the command currently running in the foreground.
#[derive(Debug)]
pub struct ShellContext {
    prompt: String,
    previous_dir: Option<PathBuf>,
    foreground: Option<Command>,
    jobs: JobList,
}

impl Default for ShellContext {
    fn default() -> Self {
        ShellContext::new(&Config::default())
    }
}

impl ShellContext {
    pub fn new(config: &Config) -> Self {
        ShellContext {
            prompt: config.prompt.clone(),
            previous_dir: None,
            foreground: None,
            jobs: JobList::new(),
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn set_prompt(&mut self, prompt: String) {
        self.prompt = prompt;
    }

    pub fn previous_dir(&self) -> Option<&Path> {
        self.previous_dir.as_deref()
    }

    pub fn set_previous_dir(&mut self, dir: PathBuf) {
        self.previous_dir = Some(dir);
    }

    pub fn foreground(&self) -> Option<&Command> {
        self.foreground.as_ref()
    }

    pub fn set_foreground(&mut self, command: Command) {
        debug!(pid = ?command.pid(), cmdline = command.cmd_line(), "foreground");
        self.foreground = Some(command);
    }

    pub fn take_foreground(&mut self) -> Option<Command> {
        self.foreground.take()
    }

    pub fn jobs(&self) -> &JobList {
        &self.jobs
    }

    pub fn jobs_mut(&mut self) -> &mut JobList {
        &mut self.jobs
    }

    /// Builds and runs the command for one input line. An external command
    /// with a trailing `&` is filed in the job table before it is spawned.
    pub fn execute_line(&mut self, line: &str) -> Result<Control> {
        let command = match Command::create(line)? {
            Some(command) => command,
            None => return Ok(Control::Continue),
        };
        if command.is_external() && parse::is_background(line) {
            let jid = self.jobs.add_job(command, false);
            self.jobs.launch(jid)?;
            return Ok(Control::Continue);
        }
        command.execute(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{kill_and_reap, wait_until};

    #[test]
    fn background_line_becomes_a_running_job() {
        let mut ctx = ShellContext::default();
        assert_eq!(ctx.execute_line("sleep 100 &").unwrap(), Control::Continue);

        assert_eq!(ctx.jobs().len(), 1);
        let job = ctx.jobs().iter().next().unwrap();
        assert_eq!(job.jid(), 1);
        assert!(!job.is_stopped());
        assert_eq!(job.command().cmd_line(), "sleep 100 &");
        assert!(ctx.foreground().is_none());

        kill_and_reap(job.pid().unwrap());
    }

    #[test]
    fn foreground_line_leaves_no_trace() {
        let mut ctx = ShellContext::default();
        ctx.execute_line("true").unwrap();
        assert!(ctx.jobs().is_empty());
        assert!(ctx.foreground().is_none());
    }

    #[test]
    fn unknown_program_is_not_fatal() {
        let mut ctx = ShellContext::default();
        ctx.execute_line("definitely-not-a-program-smash").unwrap();
        assert!(ctx.foreground().is_none());

        ctx.execute_line("definitely-not-a-program-smash &").unwrap();
        assert!(wait_until(|| {
            ctx.jobs_mut().remove_finished_jobs();
            ctx.jobs().is_empty()
        }));
    }

    #[test]
    fn builtins_ignore_the_background_sign() {
        let mut ctx = ShellContext::default();
        ctx.execute_line("chprompt bg &").unwrap();
        assert_eq!(ctx.prompt(), "bg> ");
        assert!(ctx.jobs().is_empty());
    }

    #[test]
    fn quit_stops_the_loop() {
        let mut ctx = ShellContext::default();
        assert_eq!(ctx.execute_line("quit").unwrap(), Control::Quit);
        assert_eq!(ctx.execute_line("   ").unwrap(), Control::Continue);
    }
}
