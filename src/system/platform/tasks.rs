use sysinfo::{ProcessRefreshKind, ProcessStatus, ProcessesToUpdate, System, ThreadKind};

use super::{ExitState, SchedState, TaskSource, TaskState};

/// Upper bound of PIDs on 64-bit Linux (`PID_MAX_LIMIT`).
pub const DEFAULT_MAX_TASKS: usize = 4_194_304;

/// Process table read through `sysinfo`. Every call refreshes into a fresh
/// `System`, whose PID-keyed map is the point-in-time copy we classify from.
#[derive(Clone, Debug)]
pub struct SysinfoTaskSource {
    max_tasks: usize,
}

impl SysinfoTaskSource {
    pub fn new(max_tasks: usize) -> Self {
        Self { max_tasks }
    }
}

impl Default for SysinfoTaskSource {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TASKS)
    }
}

pub(crate) fn task_state(status: ProcessStatus) -> TaskState {
    match status {
        ProcessStatus::Zombie => TaskState::exited(ExitState::Zombie),
        ProcessStatus::Dead => TaskState::exited(ExitState::Dead),
        ProcessStatus::Run => TaskState::alive(SchedState::Runnable),
        ProcessStatus::Sleep => TaskState::alive(SchedState::InterruptibleSleep),
        ProcessStatus::UninterruptibleDiskSleep => {
            TaskState::alive(SchedState::UninterruptibleSleep)
        }
        ProcessStatus::Stop => TaskState::alive(SchedState::Stopped),
        ProcessStatus::Tracing => TaskState::alive(SchedState::Traced),
        _ => TaskState::alive(SchedState::Other),
    }
}

impl TaskSource for SysinfoTaskSource {
    fn tasks(&self) -> Vec<TaskState> {
        let mut sys = System::new();
        sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing(),
        );

        let mut out = Vec::with_capacity(sys.processes().len().min(self.max_tasks));
        for process in sys.processes().values() {
            // Userland threads show up as tasks on Linux; kernel threads are
            // processes in their own right and stay in.
            if matches!(process.thread_kind(), Some(ThreadKind::Userland)) {
                continue;
            }
            if out.len() == self.max_tasks {
                tracing::warn!(
                    max_tasks = self.max_tasks,
                    "process table exceeds task cap, census truncated"
                );
                break;
            }
            out.push(task_state(process.status()));
        }
        out
    }
}
