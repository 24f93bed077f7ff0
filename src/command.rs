use nix::unistd::{self, Pid};

use crate::builtins;
use crate::error::{Result, ShellError};
use crate::job_control;
use crate::jobs::JobId;
use crate::launcher;
use crate::parse;
use crate::shell::ShellContext;

/// What the dispatch loop should do after a command ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Builtin {
    Chprompt(String),
    ShowPid,
    Pwd,
    Cd(CdTarget),
    Jobs,
    Fg(Option<JobId>),
    Bg(Option<JobId>),
    Quit { kill: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CdTarget {
    Home,
    Previous,
    Path(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    Builtin(Builtin),
    External,
}

/// One parsed input line. Built-ins carry the shell's own pid from the
/// start; an external command gets its pid exactly once, when it is spawned.
#[derive(Debug)]
pub struct Command {
    cmd_line: String,
    pid: Option<Pid>,
    kind: CommandKind,
}

impl Command {
    /// Builds the command for `line`, or `None` when there is nothing to run.
    pub fn create(line: &str) -> Result<Option<Command>> {
        let line = line.trim();
        let args = parse::split_args(parse::strip_background_sign(line))?;
        let name = match args.first() {
            Some(name) => *name,
            None => return Ok(None),
        };
        let args = &args[1..];
        let builtin = match name {
            "chprompt" => Builtin::Chprompt(prompt_for(args.first().copied())),
            "showpid" => Builtin::ShowPid,
            "pwd" => Builtin::Pwd,
            "cd" => Builtin::Cd(cd_target(args)?),
            "jobs" => Builtin::Jobs,
            "fg" => Builtin::Fg(job_id_arg("fg", args)?),
            "bg" => Builtin::Bg(job_id_arg("bg", args)?),
            "quit" => Builtin::Quit {
                kill: quit_kill_arg(args)?,
            },
            _ => return Ok(Some(Command::external(line))),
        };
        Ok(Some(Command {
            cmd_line: line.to_owned(),
            pid: Some(unistd::getpid()),
            kind: CommandKind::Builtin(builtin),
        }))
    }

    pub fn external(line: &str) -> Command {
        Command {
            cmd_line: line.trim().to_owned(),
            pid: None,
            kind: CommandKind::External,
        }
    }

    pub fn cmd_line(&self) -> &str {
        &self.cmd_line
    }

    pub fn pid(&self) -> Option<Pid> {
        self.pid
    }

    pub fn is_external(&self) -> bool {
        self.kind == CommandKind::External
    }

    /// The words that get exec'd, without the background marker.
    pub fn argv(&self) -> Result<Vec<&str>> {
        parse::split_args(parse::strip_background_sign(&self.cmd_line))
    }

    pub(crate) fn record_pid(&mut self, pid: Pid) {
        debug_assert!(self.pid.is_none(), "pid is assigned once");
        if self.pid.is_none() {
            self.pid = Some(pid);
        }
    }

    /// Runs the command in the foreground. Background external commands go
    /// through `ShellContext::execute_line`, which files them as jobs first.
    pub fn execute(self, ctx: &mut ShellContext) -> Result<Control> {
        let builtin = match self.kind.clone() {
            CommandKind::External => {
                launcher::run_foreground(ctx, self)?;
                return Ok(Control::Continue);
            }
            CommandKind::Builtin(builtin) => builtin,
        };
        match builtin {
            Builtin::Chprompt(prompt) => builtins::chprompt(ctx, prompt),
            Builtin::ShowPid => builtins::showpid(&self),
            Builtin::Pwd => builtins::pwd()?,
            Builtin::Cd(target) => builtins::cd(ctx, &target)?,
            Builtin::Jobs => job_control::jobs(ctx),
            Builtin::Fg(jid) => job_control::fg(ctx, jid)?,
            Builtin::Bg(jid) => job_control::bg(ctx, jid)?,
            Builtin::Quit { kill } => {
                job_control::quit(ctx, kill);
                return Ok(Control::Quit);
            }
        }
        Ok(Control::Continue)
    }
}

fn prompt_for(name: Option<&str>) -> String {
    format!("{}> ", name.unwrap_or("smash"))
}

fn cd_target(args: &[&str]) -> Result<CdTarget> {
    match args {
        [] => Ok(CdTarget::Home),
        ["-"] => Ok(CdTarget::Previous),
        [dir] => Ok(CdTarget::Path((*dir).to_owned())),
        _ => Err(ShellError::TooManyArguments("cd")),
    }
}

fn job_id_arg(builtin: &'static str, args: &[&str]) -> Result<Option<JobId>> {
    match args {
        [] => Ok(None),
        [jid] => jid
            .parse::<JobId>()
            .map(Some)
            .map_err(|_| ShellError::InvalidArguments(builtin)),
        _ => Err(ShellError::InvalidArguments(builtin)),
    }
}

fn quit_kill_arg(args: &[&str]) -> Result<bool> {
    match args {
        [] => Ok(false),
        ["kill", ..] => Ok(true),
        _ => Err(ShellError::InvalidArguments("quit")),
    }
}
