use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

/// Run lifecycle (§4.7): `Pending → Running → {Finished, Stopped, Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Pending,
    Running,
    Finished,
    Stopped,
    Failed,
}

impl Phase {
    fn tag(self) -> u8 {
        match self {
            Phase::Pending => 0,
            Phase::Running => 1,
            Phase::Finished => 2,
            Phase::Stopped => 3,
            Phase::Failed => 4,
        }
    }

    fn from_tag(tag: u8) -> Self {
        match tag {
            0 => Phase::Pending,
            1 => Phase::Running,
            2 => Phase::Finished,
            3 => Phase::Stopped,
            _ => Phase::Failed,
        }
    }
}

/// `(finishedUnits, totalUnits, finishedImages, totalImages)` (§4.7),
/// updated at WorkUnit and image completion from any worker thread.
#[derive(Debug, Default)]
pub struct Progress {
    phase: AtomicU8,
    finished_units: AtomicU64,
    total_units: AtomicU64,
    finished_images: AtomicU64,
    total_images: AtomicU64,
}

#[derive(Debug, Clone, Copy)]
pub struct ProgressSnapshot {
    pub phase: Phase,
    pub finished_units: u64,
    pub total_units: u64,
    pub finished_images: u64,
    pub total_images: u64,
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_phase(&self, phase: Phase) {
        self.phase.store(phase.tag(), Ordering::SeqCst);
    }

    pub fn phase(&self) -> Phase {
        Phase::from_tag(self.phase.load(Ordering::SeqCst))
    }

    pub fn set_total_images(&self, total: u64) {
        self.total_images.store(total, Ordering::SeqCst);
    }

    pub fn add_total_units(&self, count: u64) {
        self.total_units.fetch_add(count, Ordering::SeqCst);
    }

    pub fn increment_finished_units(&self) {
        self.finished_units.fetch_add(1, Ordering::SeqCst);
    }

    pub fn increment_finished_images(&self) {
        self.finished_images.fetch_add(1, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            phase: self.phase(),
            finished_units: self.finished_units.load(Ordering::SeqCst),
            total_units: self.total_units.load(Ordering::SeqCst),
            finished_images: self.finished_images.load(Ordering::SeqCst),
            total_images: self.total_images.load(Ordering::SeqCst),
        }
    }
}
