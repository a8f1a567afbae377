#![cfg_attr(rustfmt, rustfmt_skip)]
#![allow(unused_parens)]
#![allow(unused_imports)]
#![allow(missing_docs)]

use core::marker::PhantomData;
use polkadot_sdk::frame_support::{
  traits::Get,
  weights::{constants::RocksDbWeight, Weight},
};

pub trait WeightInfo {
  fn grant_role() -> Weight;
  fn revoke_role() -> Weight;
  fn renounce_role() -> Weight;
  fn set_role_admin() -> Weight;
  fn set_role_guardian() -> Weight;
  fn set_grant_delay() -> Weight;
  fn label_role() -> Weight;
  fn set_minimal_execution_delays(n: u32) -> Weight;
  fn set_target_function_role(n: u32) -> Weight;
  fn set_target_closed() -> Weight;
  fn set_target_admin_delay() -> Weight;
  fn schedule() -> Weight;
  fn execute() -> Weight;
  fn cancel() -> Weight;
}

pub struct SubstrateWeight<T>(PhantomData<T>);
impl<T: polkadot_sdk::frame_system::Config + crate::Config> WeightInfo for SubstrateWeight<T> {
  // Admin restriction lookup, membership read, optional schedule consumption.
  fn grant_role() -> Weight {
    Weight::from_parts(22_000_000, 3600)
      .saturating_add(T::DbWeight::get().reads(5))
      .saturating_add(T::DbWeight::get().writes(2))
  }

  fn revoke_role() -> Weight {
    Weight::from_parts(18_000_000, 3600)
      .saturating_add(T::DbWeight::get().reads(4))
      .saturating_add(T::DbWeight::get().writes(2))
  }

  fn renounce_role() -> Weight {
    Weight::from_parts(12_000_000, 2500)
      .saturating_add(T::DbWeight::get().writes(1))
  }

  fn set_role_admin() -> Weight {
    let chain_reads = u64::from(T::MaxRoleDepth::get());
    Weight::from_parts(20_000_000, 3000)
      .saturating_add(T::DbWeight::get().reads(chain_reads.saturating_add(3)))
      .saturating_add(T::DbWeight::get().writes(2))
  }

  fn set_role_guardian() -> Weight {
    Weight::from_parts(15_000_000, 3000)
      .saturating_add(T::DbWeight::get().reads(3))
      .saturating_add(T::DbWeight::get().writes(2))
  }

  fn set_grant_delay() -> Weight {
    Weight::from_parts(15_000_000, 3000)
      .saturating_add(T::DbWeight::get().reads(3))
      .saturating_add(T::DbWeight::get().writes(2))
  }

  fn label_role() -> Weight {
    Weight::from_parts(12_000_000, 2500)
      .saturating_add(T::DbWeight::get().reads(2))
  }

  fn set_minimal_execution_delays(n: u32) -> Weight {
    let entries = u64::from(n);
    Weight::from_parts(
      14_000_000u64.saturating_add(entries.saturating_mul(1_500_000)),
      2500,
    )
    .saturating_add(T::DbWeight::get().reads(3))
    .saturating_add(T::DbWeight::get().writes(entries.saturating_add(1)))
  }

  fn set_target_function_role(n: u32) -> Weight {
    let entries = u64::from(n);
    Weight::from_parts(
      15_000_000u64.saturating_add(entries.saturating_mul(1_800_000)),
      2800,
    )
    .saturating_add(T::DbWeight::get().reads(4))
    .saturating_add(T::DbWeight::get().writes(entries.saturating_add(1)))
  }

  fn set_target_closed() -> Weight {
    Weight::from_parts(15_000_000, 2800)
      .saturating_add(T::DbWeight::get().reads(4))
      .saturating_add(T::DbWeight::get().writes(2))
  }

  fn set_target_admin_delay() -> Weight {
    Weight::from_parts(15_000_000, 2800)
      .saturating_add(T::DbWeight::get().reads(4))
      .saturating_add(T::DbWeight::get().writes(2))
  }

  fn schedule() -> Weight {
    Weight::from_parts(30_000_000, 4500)
      .saturating_add(T::DbWeight::get().reads(5))
      .saturating_add(T::DbWeight::get().writes(2))
  }

  // Excludes the dispatched call; managed targets charge their own work.
  fn execute() -> Weight {
    Weight::from_parts(35_000_000, 4500)
      .saturating_add(T::DbWeight::get().reads(5))
      .saturating_add(T::DbWeight::get().writes(1))
  }

  fn cancel() -> Weight {
    Weight::from_parts(25_000_000, 4000)
      .saturating_add(T::DbWeight::get().reads(5))
      .saturating_add(T::DbWeight::get().writes(1))
  }
}

impl WeightInfo for () {
  fn grant_role() -> Weight { Weight::from_parts(22_000_000, 3600) }
  fn revoke_role() -> Weight { Weight::from_parts(18_000_000, 3600) }
  fn renounce_role() -> Weight { Weight::from_parts(12_000_000, 2500) }
  fn set_role_admin() -> Weight { Weight::from_parts(20_000_000, 3000) }
  fn set_role_guardian() -> Weight { Weight::from_parts(15_000_000, 3000) }
  fn set_grant_delay() -> Weight { Weight::from_parts(15_000_000, 3000) }
  fn label_role() -> Weight { Weight::from_parts(12_000_000, 2500) }
  fn set_minimal_execution_delays(n: u32) -> Weight {
    Weight::from_parts(14_000_000u64.saturating_add(u64::from(n).saturating_mul(1_500_000)), 2500)
  }
  fn set_target_function_role(n: u32) -> Weight {
    Weight::from_parts(15_000_000u64.saturating_add(u64::from(n).saturating_mul(1_800_000)), 2800)
  }
  fn set_target_closed() -> Weight { Weight::from_parts(15_000_000, 2800) }
  fn set_target_admin_delay() -> Weight { Weight::from_parts(15_000_000, 2800) }
  fn schedule() -> Weight { Weight::from_parts(30_000_000, 4500) }
  fn execute() -> Weight { Weight::from_parts(35_000_000, 4500) }
  fn cancel() -> Weight { Weight::from_parts(25_000_000, 4000) }
}
