//! Process coordination capability.

/// Rank, world size and a synchronization point across cooperating processes.
pub trait Communicator {
    fn rank(&self) -> usize;
    fn size(&self) -> usize;
    /// Blocks until every process in the world has reached the barrier.
    fn barrier(&self);
}

/// The trivial world of one process.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleProcess;

impl Communicator for SingleProcess {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn barrier(&self) {}
}
