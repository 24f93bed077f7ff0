pub const DEFAULT_PROMPT: &str = "smash> ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub prompt: String,
    pub emit_prompt: bool,
    pub verbose: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Run(Config),
    Help,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            prompt: DEFAULT_PROMPT.to_owned(),
            emit_prompt: true,
            verbose: false,
        }
    }
}

impl Config {
    /// Reads the command-line flags (program name already skipped).
    pub fn from_args<I, S>(args: I) -> Result<Invocation, String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut config = Config::default();
        for arg in args {
            match arg.as_ref() {
                "-h" | "--help" => return Ok(Invocation::Help),
                "-p" => config.emit_prompt = false,
                "-v" => config.verbose = true,
                other => return Err(format!("unknown option '{}'", other)),
            }
        }
        Ok(Invocation::Run(config))
    }

    /// Log filter used when `RUST_LOG` is not set.
    pub fn default_log_filter(&self) -> &'static str {
        if self.verbose {
            "smash=debug"
        } else {
            "warn"
        }
    }
}

pub const USAGE: &str = "\
usage: smash [-hvp]
   -h   print this message
   -v   print additional diagnostic information
   -p   do not emit a command prompt
";
