extern crate alloc;

use crate as pallet_access_manager;
use polkadot_sdk::frame_support::{
  PalletId, construct_runtime, derive_impl,
  traits::{ConstU32, UnixTime},
};
use polkadot_sdk::frame_system;
use polkadot_sdk::sp_runtime::{
  BuildStorage, DispatchError, DispatchResult,
  testing::H256,
  traits::{BlakeTwo256, IdentityLookup},
};
use primitives::pallet_ids::ACCESS_MANAGER_PALLET_ID;
use primitives::roles::{
  ADMIN_ROLE, ATOMIST_ROLE, DEFAULT_HIERARCHY, FUSE_MANAGER_ROLE, GUARDIAN_ROLE, OWNER_ROLE,
};
use primitives::{Delay, Selector};
use std::cell::{Cell, RefCell};

pub const ADMIN: u64 = 1;
pub const OWNER: u64 = 2;
pub const ATOMIST: u64 = 3;
pub const GUARDIAN: u64 = 4;
pub const ALICE: u64 = 10;
pub const BOB: u64 = 11;
pub const MALLORY: u64 = 66;

/// Managed component standing in for a vault.
pub const TARGET: u64 = 100;
pub const UNMANAGED: u64 = 200;

pub const GENESIS_TIME: u64 = 1_700_000_000;
pub const HOUR: u64 = 3_600;
pub const DAY: Delay = 86_400;

pub const PING: Selector = *b"ping";
pub const PONG: Selector = *b"pong";

/// Byte at this offset set to [`REVERT`] makes the mock target fail.
pub const REVERT: u8 = 0xFF;

thread_local! {
    pub static NOW: Cell<u64> = const { Cell::new(GENESIS_TIME) };
    pub static DISPATCHED: RefCell<Vec<(u64, Vec<u8>)>> = const { RefCell::new(Vec::new()) };
}

pub fn now() -> u64 {
  NOW.with(|n| n.get())
}

pub fn advance(seconds: u64) {
  NOW.with(|n| n.set(n.get() + seconds));
}

pub fn dispatched() -> Vec<(u64, Vec<u8>)> {
  DISPATCHED.with(|d| d.borrow().clone())
}

type Block = frame_system::mocking::MockBlock<Test>;

construct_runtime!(
  pub struct Test {
    System: frame_system,
    AccessManager: pallet_access_manager,
  }
);

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Test {
  type Block = Block;
  type AccountId = u64;
  type Lookup = IdentityLookup<Self::AccountId>;
  type Hash = H256;
  type Hashing = BlakeTwo256;
}

pub struct MockTime;
impl UnixTime for MockTime {
  fn now() -> core::time::Duration {
    core::time::Duration::from_secs(now())
  }
}

/// Calls are `selector ++ payload`; a payload starting with [`REVERT`] fails.
pub struct MockTarget;
impl pallet_access_manager::ManagedTarget<u64> for MockTarget {
  fn manages(target: &u64) -> bool {
    *target == TARGET
  }

  fn selector(target: &u64, data: &[u8]) -> Option<Selector> {
    if !Self::manages(target) || data.len() < 4 {
      return None;
    }
    Some([data[0], data[1], data[2], data[3]])
  }

  fn dispatch(_target: &u64, caller: &u64, data: &[u8]) -> DispatchResult {
    if data.get(4) == Some(&REVERT) {
      return Err(DispatchError::Other("target reverted"));
    }
    DISPATCHED.with(|d| d.borrow_mut().push((*caller, data.to_vec())));
    Ok(())
  }
}

polkadot_sdk::frame_support::parameter_types! {
  pub const AccessManagerPalletId: PalletId = PalletId(*ACCESS_MANAGER_PALLET_ID);
}

impl pallet_access_manager::Config for Test {
  type TimeProvider = MockTime;
  type Targets = MockTarget;
  type PalletId = AccessManagerPalletId;
  type MaxCallDataLen = ConstU32<1024>;
  type MaxBatchLen = ConstU32<16>;
  type MaxLabelLen = ConstU32<32>;
  type MaxRoleDepth = ConstU32<8>;
  type WeightInfo = ();
}

pub fn call_data(selector: Selector, payload: &[u8]) -> crate::CallDataOf<Test> {
  let mut data = selector.to_vec();
  data.extend_from_slice(payload);
  data.try_into().unwrap()
}

/// Encoded admin call addressed to the manager itself.
pub fn admin_call(call: crate::Call<Test>) -> crate::CallDataOf<Test> {
  use codec::Encode;
  call.encode().try_into().unwrap()
}

pub fn new_test_ext() -> polkadot_sdk::sp_io::TestExternalities {
  let mut t = frame_system::GenesisConfig::<Test>::default()
    .build_storage()
    .unwrap();

  pallet_access_manager::GenesisConfig::<Test> {
    roles: DEFAULT_HIERARCHY.to_vec(),
    minimal_execution_delays: alloc::vec![],
    members: alloc::vec![
      (ADMIN_ROLE, ADMIN, 0),
      (OWNER_ROLE, OWNER, 0),
      (ATOMIST_ROLE, ATOMIST, 0),
      (GUARDIAN_ROLE, GUARDIAN, 0),
    ],
    function_roles: alloc::vec![(TARGET, PING, FUSE_MANAGER_ROLE)],
  }
  .assimilate_storage(&mut t)
  .unwrap();

  NOW.with(|n| n.set(GENESIS_TIME));
  DISPATCHED.with(|d| d.borrow_mut().clear());

  t.into()
}
