//! Built-ins that only touch the shell's own state.

use nix::unistd;
use std::path::PathBuf;
use tracing::debug;

use crate::command::{CdTarget, Command};
use crate::error::{Result, ShellError};
use crate::shell::ShellContext;

pub fn chprompt(ctx: &mut ShellContext, prompt: String) {
    ctx.set_prompt(prompt);
}

pub fn showpid(command: &Command) {
    if let Some(pid) = command.pid() {
        println!("smash pid is {}", pid);
    }
}

pub fn pwd() -> Result<()> {
    let cwd = unistd::getcwd().map_err(|e| ShellError::sys("getcwd", e))?;
    println!("{}", cwd.display());
    Ok(())
}

pub fn cd(ctx: &mut ShellContext, target: &CdTarget) -> Result<()> {
    let dir: PathBuf = match target {
        CdTarget::Path(dir) => dir.into(),
        CdTarget::Previous => ctx
            .previous_dir()
            .ok_or(ShellError::OldPwdNotSet)?
            .to_path_buf(),
        CdTarget::Home => dirs::home_dir().ok_or(ShellError::HomeNotSet)?,
    };
    let cwd = unistd::getcwd().map_err(|e| ShellError::sys("getcwd", e))?;
    unistd::chdir(dir.as_path()).map_err(|e| ShellError::sys("chdir", e))?;
    debug!(from = %cwd.display(), to = %dir.display(), "changed directory");
    ctx.set_previous_dir(cwd);
    Ok(())
}
