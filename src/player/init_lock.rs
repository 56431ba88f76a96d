/// Single-slot lock guarding runtime construction for one attachment point.
///
/// Acquired before constructing, released when the instance is destroyed or
/// construction fails. While held, further initialization attempts are no-ops.
#[derive(Debug, Default)]
pub struct InitLock {
    holder: Option<u64>,
}

impl InitLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the slot for `generation`; returns false if it is already held.
    pub fn try_acquire(&mut self, generation: u64) -> bool {
        if self.holder.is_some() {
            return false;
        }
        self.holder = Some(generation);
        true
    }

    pub fn release(&mut self) {
        self.holder = None;
    }

    pub fn is_held(&self) -> bool {
        self.holder.is_some()
    }

    pub fn holder(&self) -> Option<u64> {
        self.holder
    }
}
