//! Safe capability interface
//!
//! The safe is an external multi-party wallet; the will module only needs
//! three capabilities from it: module enablement, owner membership, and the
//! owner-swap primitive. Any wallet type satisfying [`SafeCapability`] is
//! acceptable — the module never assumes a concrete implementation.
//!
//! Owner swapping follows the linked-list convention of multi-party safes:
//! the caller names the predecessor of the owner being replaced, with
//! [`SENTINEL_OWNER`] standing in for the head of the list.

use styx_core::Address;
use thiserror::Error;

/// Predecessor marker for the first owner in a safe's owner list.
pub const SENTINEL_OWNER: Address = Address::new([
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x01,
]);

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SafeError {
    #[error("Module {0} is not enabled on this safe")]
    ModuleNotEnabled(Address),

    #[error("{0} is not an owner of this safe")]
    NotAnOwner(Address),

    #[error("{0} is already an owner of this safe")]
    AlreadyAnOwner(Address),

    #[error("Invalid owner address: {0}")]
    InvalidOwner(Address),

    #[error("{prev} is not the predecessor of {old}")]
    BadPredecessor { prev: Address, old: Address },
}

/// The capabilities the will module requires from a safe.
pub trait SafeCapability {
    /// Whether `module` has been granted a capability link by this safe.
    fn is_module_enabled(&self, module: &Address) -> bool;

    /// Whether `address` is currently an owner of this safe.
    fn is_owner(&self, address: &Address) -> bool;

    /// Current owner list, in linked-list order.
    fn owners(&self) -> Vec<Address>;

    /// Replace `old` with `new` in the owner list. `prev` must be `old`'s
    /// predecessor ([`SENTINEL_OWNER`] for the head). Callable only by an
    /// enabled module.
    fn swap_owner(
        &mut self,
        module: &Address,
        prev: &Address,
        old: &Address,
        new: &Address,
    ) -> Result<(), SafeError>;
}

/// In-memory safe used by tests and the reference deployment.
#[derive(Debug, Clone, Default)]
pub struct LocalSafe {
    owners: Vec<Address>,
    enabled_modules: Vec<Address>,
}

impl LocalSafe {
    pub fn new(owners: Vec<Address>) -> Self {
        Self {
            owners,
            enabled_modules: Vec::new(),
        }
    }

    /// Grant a capability link to `module`.
    pub fn enable_module(&mut self, module: Address) {
        if !self.enabled_modules.contains(&module) {
            self.enabled_modules.push(module);
        }
    }

    /// Revoke a module's capability link.
    pub fn disable_module(&mut self, module: &Address) {
        self.enabled_modules.retain(|m| m != module);
    }
}

impl SafeCapability for LocalSafe {
    fn is_module_enabled(&self, module: &Address) -> bool {
        self.enabled_modules.contains(module)
    }

    fn is_owner(&self, address: &Address) -> bool {
        self.owners.contains(address)
    }

    fn owners(&self) -> Vec<Address> {
        self.owners.clone()
    }

    fn swap_owner(
        &mut self,
        module: &Address,
        prev: &Address,
        old: &Address,
        new: &Address,
    ) -> Result<(), SafeError> {
        if !self.is_module_enabled(module) {
            return Err(SafeError::ModuleNotEnabled(*module));
        }
        if new.is_zero() || *new == SENTINEL_OWNER {
            return Err(SafeError::InvalidOwner(*new));
        }
        if self.is_owner(new) {
            return Err(SafeError::AlreadyAnOwner(*new));
        }

        let position = self
            .owners
            .iter()
            .position(|o| o == old)
            .ok_or(SafeError::NotAnOwner(*old))?;

        let expected_prev = if position == 0 {
            SENTINEL_OWNER
        } else {
            self.owners[position - 1]
        };
        if *prev != expected_prev {
            return Err(SafeError::BadPredecessor {
                prev: *prev,
                old: *old,
            });
        }

        self.owners[position] = *new;
        Ok(())
    }
}
