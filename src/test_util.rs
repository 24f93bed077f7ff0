use nix::sys::signal::{self, Signal};
use nix::sys::wait;
use nix::unistd::Pid;
use std::thread;
use std::time::{Duration, Instant};

use crate::command::Command;
use crate::launcher;

pub fn spawn_sleep(line: &str) -> Command {
    let mut command = Command::external(line);
    launcher::spawn(&mut command).unwrap();
    command
}

pub fn kill_and_reap(pid: Pid) {
    let _ = signal::kill(pid, Signal::SIGKILL);
    let _ = wait::waitpid(pid, None);
}

/// Polls `cond` for up to five seconds.
pub fn wait_until<F: FnMut() -> bool>(mut cond: F) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(20));
    }
    cond()
}
