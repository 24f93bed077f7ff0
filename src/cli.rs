use std::io::{self, BufRead, Write};
use tracing::warn;

use crate::command::Control;
use crate::config::Config;
use crate::error::Result;
use crate::shell::ShellContext;
use crate::signal;

pub struct Cli {
    config: Config,
    ctx: ShellContext,
}

impl Cli {
    pub fn new(config: Config) -> Result<Cli> {
        signal::install()?;
        let ctx = ShellContext::new(&config);
        Ok(Cli { config, ctx })
    }

    /// Runs one line. Errors are reported here and never end the loop;
    /// returns false once the shell should exit.
    pub fn dispatch(&mut self, line: &str) -> bool {
        signal::dispatch_pending(&mut self.ctx);
        let res = self.ctx.execute_line(line);
        signal::dispatch_pending(&mut self.ctx);
        match res {
            Ok(Control::Continue) => true,
            Ok(Control::Quit) => false,
            Err(e) => {
                eprintln!("smash error: {}", e);
                true
            }
        }
    }

    fn prompt(&self) {
        if self.config.emit_prompt {
            print!("{}", self.ctx.prompt());
            let _ = io::stdout().flush();
        }
    }

    pub fn go(&mut self) {
        let stdin = io::stdin();
        let mut buf = Vec::new();
        loop {
            signal::dispatch_pending(&mut self.ctx);
            self.prompt();
            buf.clear();
            // Raw bytes: a line that is not UTF-8 must not end the shell.
            match stdin.lock().read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "failed to read input");
                    break;
                }
            }
            let line = String::from_utf8_lossy(&buf);
            if !self.dispatch(&line) {
                break;
            }
            let _ = io::stdout().flush();
        }
    }
}
