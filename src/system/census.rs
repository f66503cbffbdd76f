use super::platform::{ExitState, SchedState, TaskSource, TaskState};
use super::snapshot::{ProcessClass, ProcessCensus};

/// Maps one task to exactly one bucket. An exited task is a zombie whatever
/// its scheduling state; unrecognised scheduling states count as sleeping.
pub fn classify(task: TaskState) -> ProcessClass {
    if task.exit != ExitState::Alive {
        return ProcessClass::Zombie;
    }
    match task.sched {
        SchedState::Runnable => ProcessClass::Running,
        SchedState::InterruptibleSleep | SchedState::UninterruptibleSleep => {
            ProcessClass::Sleeping
        }
        SchedState::Stopped | SchedState::Traced => ProcessClass::Stopped,
        SchedState::Other => ProcessClass::Sleeping,
    }
}

impl ProcessCensus {
    pub fn record(&mut self, class: ProcessClass) {
        self.total += 1;
        match class {
            ProcessClass::Running => self.running += 1,
            ProcessClass::Sleeping => self.sleeping += 1,
            ProcessClass::Zombie => self.zombie += 1,
            ProcessClass::Stopped => self.stopped += 1,
        }
    }

    pub fn tally<I>(tasks: I) -> Self
    where
        I: IntoIterator<Item = TaskState>,
    {
        let mut census = ProcessCensus::default();
        for task in tasks {
            census.record(classify(task));
        }
        census
    }

    pub fn is_consistent(&self) -> bool {
        self.running + self.sleeping + self.zombie + self.stopped == self.total
    }
}

pub struct CensusProbe<S> {
    source: S,
}

impl<S: TaskSource> CensusProbe<S> {
    pub fn new(source: S) -> Self {
        CensusProbe { source }
    }

    pub fn sample(&self) -> ProcessCensus {
        let tasks = self.source.tasks();
        if tasks.is_empty() {
            tracing::warn!("process table enumeration returned no tasks");
        }
        let census = ProcessCensus::tally(tasks);
        tracing::debug!(
            total = census.total,
            running = census.running,
            sleeping = census.sleeping,
            zombie = census.zombie,
            stopped = census.stopped,
            "process census"
        );
        census
    }
}

impl<S: TaskSource + Default> Default for CensusProbe<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}
