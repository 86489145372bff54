//! Launching the target command with a prepared environment.
//!
//! The child gets exactly the merged environment (the parent environment is
//! cleared), inherits stdin/stdout/stderr, and on unix receives the signals
//! this process gets for as long as it runs.

use std::ffi::OsString;
use std::process::{Command, ExitStatus};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, error, instrument};

use crate::core::env::Env;
use crate::exit_codes;

/// Build the command for `argv` with a cleared environment holding only `env`.
fn build_command(argv: &[OsString], env: &Env) -> Result<Command> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| anyhow!("no command given"))?;
    let mut cmd = Command::new(program);
    cmd.args(args).env_clear().envs(env.to_process_vars());
    Ok(cmd)
}

fn program_name(argv: &[OsString]) -> String {
    argv.first()
        .map(|program| program.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Spawn `argv` with `env`, relay signals to it, and wait for it to exit.
///
/// On unix the relayed signals are blocked on the calling thread, so call this
/// before other threads exist. Once the child has been reaped they stay
/// blocked, and the caller is expected to exit with the child's status.
#[instrument(skip_all, fields(program = %program_name(argv), vars = env.len()))]
pub fn spawn_and_wait(argv: &[OsString], env: &Env) -> Result<ExitStatus> {
    let mut cmd = build_command(argv, env)?;

    #[cfg(unix)]
    let blocked = relay::BlockedSignals::block().context("block relayed signals")?;
    #[cfg(unix)]
    relay::reset_child_disposition()?;

    debug!("spawning child process");
    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(err) => {
            error!(err = %err, "failed to spawn command");
            return Err(err)
                .with_context(|| format!("failed to run command {}", program_name(argv)));
        }
    };

    #[cfg(unix)]
    let status = {
        let status = relay::wait_relaying(&mut child, &blocked)?;
        blocked.hold();
        status
    };
    #[cfg(not(unix))]
    let status = child.wait().context("wait for command")?;

    debug!(exit_code = ?status.code(), "command finished");
    Ok(status)
}

/// Replace the current process with `argv`, running with `env`.
///
/// Only returns if the replacement failed.
#[cfg(unix)]
#[instrument(skip_all, fields(program = %program_name(argv), vars = env.len()))]
pub fn exec_replace(argv: &[OsString], env: &Env) -> Result<()> {
    use std::os::unix::process::CommandExt;

    let mut cmd = build_command(argv, env)?;
    debug!("replacing process image");
    let err = cmd.exec();
    Err(err).with_context(|| format!("failed to exec command {}", program_name(argv)))
}

/// Exit code this process should report for the child's `status`.
///
/// A normal exit passes the child's code through. Death by signal maps to
/// `128 + signal`, the shell convention.
pub fn exit_code_for(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return exit_codes::SIGNAL_BASE + signal;
        }
    }

    exit_codes::FAILURE
}

#[cfg(unix)]
mod relay {
    //! Signal relay: while the calling thread waits on the child, signals
    //! aimed at this process are consumed with `sigwait` on a dedicated thread
    //! and re-sent to the child.

    use std::process::{Child, ExitStatus};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;

    use anyhow::{Context, Result, anyhow};
    use nix::sys::signal::{SigHandler, SigSet, SigmaskHow, Signal, kill, signal};
    use nix::unistd::{Pid, getpid};
    use tracing::{debug, warn};

    /// Signals relayed to the child.
    ///
    /// Job-control signals (`SIGTSTP`, `SIGTTIN`, `SIGTTOU`, `SIGCONT`) reach
    /// the child through its process group. `SIGPIPE` concerns this process's
    /// own writes.
    pub const FORWARDED: [Signal; 8] = [
        Signal::SIGHUP,
        Signal::SIGINT,
        Signal::SIGQUIT,
        Signal::SIGTERM,
        Signal::SIGUSR1,
        Signal::SIGUSR2,
        Signal::SIGWINCH,
        Signal::SIGALRM,
    ];

    /// Wakes the relay thread once the child has been reaped.
    const WAKE: Signal = Signal::SIGCHLD;

    fn relay_set() -> SigSet {
        let mut set = SigSet::empty();
        for signal in FORWARDED {
            set.add(signal);
        }
        set.add(WAKE);
        set
    }

    /// Relayed signals (and `SIGCHLD`) blocked on the calling thread.
    ///
    /// Threads spawned while this is alive inherit the mask; the child process
    /// starts with an empty one. The previous mask is restored on drop unless
    /// [`BlockedSignals::hold`] was called.
    pub struct BlockedSignals {
        set: SigSet,
        previous: SigSet,
        restore: bool,
    }

    impl BlockedSignals {
        pub fn block() -> Result<Self> {
            let set = relay_set();
            let previous = set.thread_swap_mask(SigmaskHow::SIG_BLOCK)?;
            Ok(Self {
                set,
                previous,
                restore: true,
            })
        }

        /// Keep the signals blocked after this is dropped.
        ///
        /// A relayed signal that arrives after the child was reaped then stays
        /// pending instead of killing this process before it reports the
        /// child's status.
        pub fn hold(mut self) {
            self.restore = false;
        }
    }

    impl Drop for BlockedSignals {
        fn drop(&mut self) {
            if !self.restore {
                return;
            }
            if let Err(err) = self.previous.thread_set_mask() {
                warn!(err = %err, "failed to restore signal mask");
            }
        }
    }

    /// Put `SIGCHLD` back to its default disposition.
    ///
    /// An ignored `SIGCHLD` survives exec and makes the kernel reap children
    /// itself, discarding their exit status.
    #[allow(unsafe_code)]
    pub fn reset_child_disposition() -> Result<()> {
        // SAFETY: SIG_DFL installs no handler, so no async-signal-safety
        // requirements apply.
        let previous = unsafe { signal(Signal::SIGCHLD, SigHandler::SigDfl) }
            .context("reset SIGCHLD disposition")?;
        if previous == SigHandler::SigIgn {
            debug!("SIGCHLD was ignored; default disposition restored");
        }
        Ok(())
    }

    /// Wait for `child` while relaying signals to it.
    pub fn wait_relaying(child: &mut Child, blocked: &BlockedSignals) -> Result<ExitStatus> {
        let pid = Pid::from_raw(child.id() as i32);
        let set = blocked.set;
        let reaped = Arc::new(AtomicBool::new(false));
        let relay = thread::Builder::new()
            .name("signal-relay".to_string())
            .spawn({
                let reaped = Arc::clone(&reaped);
                move || relay_until_reaped(pid, &set, &reaped)
            })
            .context("spawn signal relay thread")?;

        let status = child.wait().context("wait for command");
        reaped.store(true, Ordering::SeqCst);

        // Every thread blocks WAKE, so it stays pending until the relay takes it.
        if let Err(err) = kill(getpid(), WAKE) {
            warn!(err = %err, "failed to wake signal relay; leaving it detached");
            return status;
        }
        match relay.join() {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!(err = %err, "signal relay stopped early"),
            Err(_) => return Err(anyhow!("signal relay thread panicked")),
        }
        status
    }

    fn relay_until_reaped(pid: Pid, set: &SigSet, reaped: &AtomicBool) -> Result<()> {
        loop {
            let signal = set.wait().context("wait for signal")?;
            if reaped.load(Ordering::SeqCst) {
                debug!("child reaped; signal relay stopping");
                return Ok(());
            }
            if signal == WAKE {
                continue;
            }
            debug!(signal = %signal, pid = pid.as_raw(), "forwarding signal");
            if let Err(err) = kill(pid, signal) {
                warn!(signal = %signal, err = %err, "failed to forward signal");
            }
        }
    }

}
