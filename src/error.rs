use nix::errno::Errno;

use crate::jobs::{JobError, JobId};
use crate::parse::{COMMAND_MAX_ARGS, COMMAND_MAX_LENGTH};

pub type Result<T> = std::result::Result<T, ShellError>;

/// Everything a command can fail with. The read loop prints these as
/// `smash error: <message>` and keeps going.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("{0}: invalid arguments")]
    InvalidArguments(&'static str),

    #[error("{0}: too many arguments")]
    TooManyArguments(&'static str),

    #[error("cd: OLDPWD not set")]
    OldPwdNotSet,

    #[error("cd: HOME not set")]
    HomeNotSet,

    #[error("command line too long (max {} characters)", COMMAND_MAX_LENGTH)]
    LineTooLong,

    #[error("too many arguments (max {})", COMMAND_MAX_ARGS)]
    TooManyWords,

    #[error("{builtin}: {source}")]
    Job {
        builtin: &'static str,
        #[source]
        source: JobError,
    },

    #[error("{call} failed: {}", .source.desc())]
    Sys {
        call: &'static str,
        #[source]
        source: Errno,
    },
}

impl ShellError {
    pub fn sys(call: &'static str, source: Errno) -> Self {
        ShellError::Sys { call, source }
    }

    pub fn job(builtin: &'static str, source: JobError) -> Self {
        ShellError::Job { builtin, source }
    }

    pub fn no_such_job(builtin: &'static str, jid: JobId) -> Self {
        ShellError::job(builtin, JobError::NoSuchJob(jid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sys_errors_read_like_perror() {
        let e = ShellError::sys("fork", Errno::EAGAIN);
        assert_eq!(
            e.to_string(),
            format!("fork failed: {}", Errno::EAGAIN.desc())
        );
    }

    #[test]
    fn job_errors_carry_the_builtin_name() {
        assert_eq!(
            ShellError::no_such_job("fg", 7).to_string(),
            "fg: job-id 7 does not exist"
        );
        assert_eq!(
            ShellError::job("bg", JobError::NoStoppedJobs).to_string(),
            "bg: there is no stopped jobs to resume"
        );
    }
}
