//! Shared, serialized access to a unit.
//!
//! Calls through any clone of a [`SharedUnit`] are totally ordered by one
//! lock. The lock is reentrant, so a collaborator that calls back into the
//! unit from inside an operation (a ledger hook, say) does not deadlock:
//! it finds the unit already borrowed and gets [`UnitError::Reentrancy`].

use std::cell::RefCell;
use std::sync::Arc;

use parking_lot::ReentrantMutex;
use tracing::warn;

use lode_core::error::UnitError;

use crate::state::UnitState;
use crate::unit::MiningUnit;

/// Cloneable handle to one [`MiningUnit`].
#[derive(Clone)]
pub struct SharedUnit {
    inner: Arc<ReentrantMutex<RefCell<MiningUnit>>>,
}

impl SharedUnit {
    pub fn new(unit: MiningUnit) -> Self {
        Self {
            inner: Arc::new(ReentrantMutex::new(RefCell::new(unit))),
        }
    }

    /// Run `f` with exclusive access to the unit.
    ///
    /// Fails with [`UnitError::Reentrancy`] when called from inside another
    /// call on the same unit.
    pub fn with<T>(
        &self,
        f: impl FnOnce(&mut MiningUnit) -> Result<T, UnitError>,
    ) -> Result<T, UnitError> {
        let guard = self.inner.lock();
        let Ok(mut unit) = guard.try_borrow_mut() else {
            warn!("re-entrant call on unit rejected");
            return Err(UnitError::Reentrancy);
        };
        f(&mut unit)
    }

    /// Run `f` with shared access to the unit.
    pub fn read<T>(&self, f: impl FnOnce(&MiningUnit) -> T) -> Result<T, UnitError> {
        let guard = self.inner.lock();
        let Ok(unit) = guard.try_borrow() else {
            warn!("read during a unit operation rejected");
            return Err(UnitError::Reentrancy);
        };
        Ok(f(&unit))
    }

    pub fn snapshot(&self) -> Result<UnitState, UnitError> {
        self.read(MiningUnit::snapshot)
    }
}

impl std::fmt::Debug for SharedUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedUnit").finish_non_exhaustive()
    }
}
