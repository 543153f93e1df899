//! Sequential prefix planning
//!
//! Walking a task's commands in order against the recorded checksums gives
//! one of three outcomes per command: it was done before (cached), it must
//! run, or it must run and every checksum still recorded at that point is
//! stale. Once the sequence diverges, everything recorded after the
//! divergence is invalidated, even checksums that would match again later.

use groundwork_core::Checksum;
use std::collections::BTreeSet;

/// Recorded checksums not yet matched in the current task
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkingSet(BTreeSet<Checksum>);

impl WorkingSet {
    pub fn new(recorded: BTreeSet<Checksum>) -> Self {
        Self(recorded)
    }

    /// Match `checksum`; on a hit it is removed from the returned set
    #[must_use]
    pub fn consume(mut self, checksum: &Checksum) -> (bool, Self) {
        let hit = self.0.remove(checksum);
        (hit, self)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Remaining checksums in ascending order
    pub fn into_vec(self) -> Vec<Checksum> {
        self.0.into_iter().collect()
    }
}

/// One action of a task plan, in execution order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Command `index` completed before
    Cached { index: usize, checksum: Checksum },
    /// Remove these markers before the next execution
    Invalidate(Vec<Checksum>),
    /// Run command `index` and mark it done
    Execute { index: usize, checksum: Checksum },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPlan {
    /// The task has no cache directory on the target yet
    pub create_dir: bool,
    pub steps: Vec<Step>,
    /// Recorded checksums left unmatched after the last command. Their
    /// markers stay on the target.
    pub orphaned: Vec<Checksum>,
}

impl TaskPlan {
    pub fn cached(&self) -> usize {
        self.count(|s| matches!(s, Step::Cached { .. }))
    }

    pub fn executed(&self) -> usize {
        self.count(|s| matches!(s, Step::Execute { .. }))
    }

    pub fn invalidated(&self) -> usize {
        self.steps
            .iter()
            .map(|s| match s {
                Step::Invalidate(stale) => stale.len(),
                _ => 0,
            })
            .sum()
    }

    /// Nothing to do on the target
    pub fn is_noop(&self) -> bool {
        !self.create_dir && self.executed() == 0 && self.invalidated() == 0
    }

    fn count(&self, pred: impl Fn(&Step) -> bool) -> usize {
        self.steps.iter().filter(|s| pred(*s)).count()
    }
}

/// Plan a task whose commands have the given checksums.
///
/// `recorded` is the task's entry in the checksum tree, `None` if the task
/// has never run on the target.
pub fn plan_task(commands: &[Checksum], recorded: Option<&BTreeSet<Checksum>>) -> TaskPlan {
    let mut plan = TaskPlan {
        create_dir: recorded.is_none(),
        ..TaskPlan::default()
    };
    let mut working = WorkingSet::new(recorded.cloned().unwrap_or_default());

    for (index, checksum) in commands.iter().enumerate() {
        let (hit, rest) = working.consume(checksum);
        if hit {
            plan.steps.push(Step::Cached {
                index,
                checksum: checksum.clone(),
            });
            working = rest;
            continue;
        }

        if !rest.is_empty() {
            plan.steps.push(Step::Invalidate(rest.into_vec()));
            working = WorkingSet::default();
        } else {
            working = rest;
        }

        plan.steps.push(Step::Execute {
            index,
            checksum: checksum.clone(),
        });
    }

    plan.orphaned = working.into_vec();
    plan
}
