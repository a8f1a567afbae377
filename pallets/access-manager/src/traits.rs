//! Seams between the access manager and the components it governs.

use frame::deps::sp_runtime::{DispatchError, DispatchResult};
use frame::deps::frame_support::traits::GetCallName;
use primitives::{Delay, Selector};

/// Permission queries used by managed components to authorise their own calls.
pub trait AuthorityInterface<AccountId> {
  /// `(immediate, delay)` for `caller` invoking `selector` on `target`.
  ///
  /// `(true, 0)` allows the call now, `(false, d)` with `d > 0` requires a
  /// scheduled operation that is consumed on the call, `(false, 0)` denies it.
  fn can_call(caller: &AccountId, target: &AccountId, selector: Selector) -> (bool, Delay);

  /// Consumes the ready operation `(caller, target, data)` and returns its nonce.
  fn consume_scheduled_op(
    caller: &AccountId,
    target: &AccountId,
    data: &[u8],
  ) -> Result<u32, DispatchError>;
}

/// Components the access manager can route scheduled operations into.
pub trait ManagedTarget<AccountId> {
  fn manages(target: &AccountId) -> bool;

  /// Selector of the call encoded in `data`, `None` when it does not decode.
  fn selector(target: &AccountId, data: &[u8]) -> Option<Selector>;

  /// Applies the encoded call. Authorisation already happened in the manager.
  fn dispatch(target: &AccountId, caller: &AccountId, data: &[u8]) -> DispatchResult;
}

impl<AccountId> ManagedTarget<AccountId> for () {
  fn manages(_target: &AccountId) -> bool {
    false
  }

  fn selector(_target: &AccountId, _data: &[u8]) -> Option<Selector> {
    None
  }

  fn dispatch(_target: &AccountId, _caller: &AccountId, _data: &[u8]) -> DispatchResult {
    Err(DispatchError::Other("no managed targets"))
  }
}

/// Denies everything. Useful for components wired without a manager.
impl<AccountId> AuthorityInterface<AccountId> for () {
  fn can_call(_caller: &AccountId, _target: &AccountId, _selector: Selector) -> (bool, Delay) {
    (false, 0)
  }

  fn consume_scheduled_op(
    _caller: &AccountId,
    _target: &AccountId,
    _data: &[u8],
  ) -> Result<u32, DispatchError> {
    Err(DispatchError::Other("no authority"))
  }
}

/// Selector of a call name: the first four bytes of its blake2-256 hash.
pub fn function_selector(name: &str) -> Selector {
  let hash = frame::hashing::blake2_256(name.as_bytes());
  [hash[0], hash[1], hash[2], hash[3]]
}

pub fn call_selector<C: GetCallName>(call: &C) -> Selector {
  function_selector(call.get_call_name())
}
