// Copyright (C) 2026 The logpipe developers
//
// This file is part of logpipe.
//
// logpipe is free software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// logpipe is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even
// the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General
// Public License for more details.
//
// You should have received a copy of the GNU General Public License along with logpipe.  If not,
// see <http://www.gnu.org/licenses/>.

//! Running one worker per pipe.
//!
//! Every [`PipeSpec`] gets its own thread (reading a FIFO is blocking I/O through & through).
//! Each thread reports its result over a channel; the [`Supervisor`] collects them. What happens
//! when one worker fails is governed by [`Policy`]:
//!
//! - [`Policy::Isolate`]: log it & let the others carry on
//! - [`Policy::FailFast`]: give up on the spot, returning the error
//!
//! Workers are never restarted. With no pipes at all, [`Supervisor::run`] parks the calling
//! thread for good, so the process stays resident doing nothing.

use crate::{
    config::PipeSpec,
    error::{Error, Result},
    worker,
};

use backtrace::Backtrace;
use tracing::{error, info, info_span};

use std::{
    path::{Path, PathBuf},
    sync::{mpsc, Arc},
    thread,
};

/// What to do when a worker fails
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Policy {
    /// Log the failure; leave the other workers running
    #[default]
    Isolate,
    /// Return the first failure immediately
    FailFast,
}

/// How one worker ended
#[derive(Debug)]
pub struct Outcome {
    pub path: PathBuf,
    pub result: Result<()>,
}

/// The outcomes of every worker, in configuration order
#[derive(Debug, Default)]
pub struct Report {
    outcomes: Vec<Outcome>,
}

impl Report {
    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }
    pub fn failures(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }
    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }
}

type WorkerFn = fn(PipeSpec) -> Result<()>;

/// Run a task per [`PipeSpec`] concurrently, and wait on them
pub struct Supervisor<F> {
    specs: Vec<PipeSpec>,
    policy: Policy,
    task: Arc<F>,
}

impl Supervisor<WorkerFn> {
    /// A [`Supervisor`] that will run a forwarding [`worker`] for each of `specs`
    pub fn new(specs: Vec<PipeSpec>) -> Self {
        Supervisor::with_task(specs, worker::run as WorkerFn)
    }
}

impl<F> Supervisor<F>
where
    F: Fn(PipeSpec) -> Result<()> + Send + Sync + 'static,
{
    pub fn with_task(specs: Vec<PipeSpec>, task: F) -> Self {
        Supervisor {
            specs,
            policy: Policy::default(),
            task: Arc::new(task),
        }
    }
    pub fn policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }
    /// Start the workers & wait on them; with no workers to start, never return.
    pub fn run(self) -> Result<Report> {
        if self.specs.is_empty() {
            idle();
        }
        self.wait()
    }
    /// Start the workers & wait until they have all finished (or, under [`Policy::FailFast`],
    /// until the first one fails).
    pub fn wait(self) -> Result<Report> {
        let (tx, rx) = mpsc::channel::<(usize, Result<()>)>();
        let mut paths = Vec::with_capacity(self.specs.len());
        let mut handles = Vec::with_capacity(self.specs.len());

        for (idx, spec) in self.specs.into_iter().enumerate() {
            let path = spec.path().to_path_buf();
            let tx = tx.clone();
            let task = Arc::clone(&self.task);
            let handle = thread::Builder::new()
                .name(format!("logpipe:{}", path.display()))
                .spawn(move || {
                    let span = info_span!("worker", pipe = %spec.path().display());
                    let _enter = span.enter();
                    let result = task(spec);
                    // Under `FailFast` the receiver may already be gone
                    let _ = tx.send((idx, result));
                })
                .map_err(|err| Error::Spawn {
                    path: path.clone(),
                    source: err,
                    back: Backtrace::new(),
                })?;
            info!(pipe = %path.display(), "worker started");
            paths.push(path);
            handles.push(handle);
        }
        // Once every worker has exited, `rx` will see the channel close.
        drop(tx);

        let mut results: Vec<Option<Result<()>>> = paths.iter().map(|_| None).collect();
        for (idx, result) in rx.iter() {
            match &result {
                Ok(()) => info!(pipe = %paths[idx].display(), "worker finished"),
                Err(err) => error!(pipe = %paths[idx].display(), "worker failed: {}", err),
            }
            match result {
                Err(err) if self.policy == Policy::FailFast => return Err(err),
                result => results[idx] = Some(result),
            }
        }

        let outcomes = handles
            .into_iter()
            .zip(paths)
            .zip(results)
            .map(|((handle, path), result)| {
                // A worker that panicked never sent a result
                let _ = handle.join();
                let result = result.unwrap_or_else(|| Err(panicked(&path)));
                Outcome { path, result }
            })
            .collect();
        Ok(Report { outcomes })
    }
}

fn panicked(path: &Path) -> Error {
    error!(pipe = %path.display(), "worker exited without a result");
    Error::WorkerPanicked {
        path: path.to_path_buf(),
        back: Backtrace::new(),
    }
}

fn idle() -> ! {
    info!("no pipes configured; idling");
    loop {
        thread::park();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::{Duration, Instant},
    };

    fn spec(path: &str) -> PipeSpec {
        PipeSpec::new(path, "local6", "info", "test").unwrap()
    }

    fn conflict(spec: &PipeSpec) -> Result<()> {
        Err(Error::PathConflict {
            path: spec.path().to_path_buf(),
            back: Backtrace::new(),
        })
    }

    #[test]
    fn test_isolation() {
        let finished = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&finished);
        let report = Supervisor::with_task(
            vec![spec("/tmp/a"), spec("/tmp/bad"), spec("/tmp/c")],
            move |spec: PipeSpec| {
                if spec.path() == Path::new("/tmp/bad") {
                    return conflict(&spec);
                }
                thread::sleep(Duration::from_millis(100));
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
        )
        .wait()
        .unwrap();

        // The siblings ran to completion despite the failure
        assert_eq!(finished.load(Ordering::SeqCst), 2);
        assert!(!report.is_success());
        let paths: Vec<&Path> = report.outcomes().iter().map(|o| o.path.as_path()).collect();
        assert_eq!(
            paths,
            vec![Path::new("/tmp/a"), Path::new("/tmp/bad"), Path::new("/tmp/c")]
        );
        let failures: Vec<&Outcome> = report.failures().collect();
        assert_eq!(failures.len(), 1);
        assert!(matches!(
            failures[0].result,
            Err(Error::PathConflict { .. })
        ));
    }

    #[test]
    fn test_fail_fast() {
        let start = Instant::now();
        let result = Supervisor::with_task(
            vec![spec("/tmp/slow"), spec("/tmp/bad")],
            |spec: PipeSpec| {
                if spec.path() == Path::new("/tmp/bad") {
                    return conflict(&spec);
                }
                thread::sleep(Duration::from_secs(3));
                Ok(())
            },
        )
        .policy(Policy::FailFast)
        .run();
        assert!(matches!(result, Err(Error::PathConflict { .. })));
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[test]
    fn test_all_succeed() {
        let report = Supervisor::with_task(vec![spec("/tmp/a"), spec("/tmp/b")], |_| Ok(()))
            .policy(Policy::FailFast)
            .run()
            .unwrap();
        assert!(report.is_success());
        assert_eq!(report.outcomes().len(), 2);
    }

    #[test]
    fn test_panicking_worker() {
        let report = Supervisor::with_task(vec![spec("/tmp/a"), spec("/tmp/b")], |spec| {
            if spec.path() == Path::new("/tmp/b") {
                panic!("worker blew up");
            }
            Ok(())
        })
        .wait()
        .unwrap();
        assert!(report.outcomes()[0].result.is_ok());
        assert!(matches!(
            report.outcomes()[1].result,
            Err(Error::WorkerPanicked { .. })
        ));
    }

    #[test]
    fn test_empty_wait() {
        let report = Supervisor::new(Vec::new()).wait().unwrap();
        assert!(report.outcomes().is_empty());
        assert!(report.is_success());
    }
}
