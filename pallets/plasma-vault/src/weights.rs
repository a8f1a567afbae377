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
  fn execute(n: u32) -> Weight;
  fn add_fuses(n: u32) -> Weight;
  fn remove_fuses(n: u32) -> Weight;
  fn add_balance_fuse() -> Weight;
  fn remove_balance_fuse() -> Weight;
  fn grant_market_substrates(n: u32) -> Weight;
  fn update_dependency_balance_graphs(n: u32) -> Weight;
  fn update_markets_balances(n: u32) -> Weight;
}

pub struct SubstrateWeight<T>(PhantomData<T>);
impl<T: polkadot_sdk::frame_system::Config + crate::Config> WeightInfo for SubstrateWeight<T> {
  // Excludes fuse work; runtimes bind fuses whose cost is bounded by MaxActions.
  fn execute(n: u32) -> Weight {
    let actions = u64::from(n);
    let markets = u64::from(T::MaxMarkets::get());
    Weight::from_parts(
      40_000_000u64.saturating_add(actions.saturating_mul(25_000_000)),
      6000,
    )
    .saturating_add(T::DbWeight::get().reads(actions.saturating_mul(4).saturating_add(markets.saturating_mul(3))))
    .saturating_add(T::DbWeight::get().writes(actions.saturating_mul(2)))
  }

  fn add_fuses(n: u32) -> Weight {
    let fuses = u64::from(n);
    Weight::from_parts(
      18_000_000u64.saturating_add(fuses.saturating_mul(2_500_000)),
      2600,
    )
    .saturating_add(T::DbWeight::get().reads(fuses.saturating_mul(2).saturating_add(3)))
    .saturating_add(T::DbWeight::get().writes(fuses.saturating_mul(2)))
  }

  fn remove_fuses(n: u32) -> Weight {
    let fuses = u64::from(n);
    Weight::from_parts(
      18_000_000u64.saturating_add(fuses.saturating_mul(2_200_000)),
      2600,
    )
    .saturating_add(T::DbWeight::get().reads(fuses.saturating_add(3)))
    .saturating_add(T::DbWeight::get().writes(fuses.saturating_mul(2)))
  }

  fn add_balance_fuse() -> Weight {
    Weight::from_parts(20_000_000, 3200)
      .saturating_add(T::DbWeight::get().reads(5))
      .saturating_add(T::DbWeight::get().writes(2))
  }

  // Includes one balance read through the market's balance fuse.
  fn remove_balance_fuse() -> Weight {
    Weight::from_parts(35_000_000, 4500)
      .saturating_add(T::DbWeight::get().reads(6))
      .saturating_add(T::DbWeight::get().writes(2))
  }

  fn grant_market_substrates(n: u32) -> Weight {
    let substrates = u64::from(n);
    let previous = u64::from(T::MaxSubstratesPerMarket::get());
    Weight::from_parts(
      20_000_000u64.saturating_add(substrates.saturating_mul(2_000_000)),
      3500,
    )
    .saturating_add(T::DbWeight::get().reads(4))
    .saturating_add(T::DbWeight::get().writes(substrates.saturating_add(previous).saturating_add(1)))
  }

  fn update_dependency_balance_graphs(n: u32) -> Weight {
    let markets = u64::from(n);
    Weight::from_parts(
      16_000_000u64.saturating_add(markets.saturating_mul(2_000_000)),
      2800,
    )
    .saturating_add(T::DbWeight::get().reads(3))
    .saturating_add(T::DbWeight::get().writes(markets))
  }

  fn update_markets_balances(n: u32) -> Weight {
    let markets = u64::from(n).max(u64::from(T::MaxMarkets::get()));
    Weight::from_parts(
      20_000_000u64.saturating_add(markets.saturating_mul(15_000_000)),
      4500,
    )
    .saturating_add(T::DbWeight::get().reads(markets.saturating_mul(3).saturating_add(3)))
  }
}

impl WeightInfo for () {
  fn execute(n: u32) -> Weight {
    Weight::from_parts(40_000_000u64.saturating_add(u64::from(n).saturating_mul(25_000_000)), 6000)
  }
  fn add_fuses(n: u32) -> Weight {
    Weight::from_parts(18_000_000u64.saturating_add(u64::from(n).saturating_mul(2_500_000)), 2600)
  }
  fn remove_fuses(n: u32) -> Weight {
    Weight::from_parts(18_000_000u64.saturating_add(u64::from(n).saturating_mul(2_200_000)), 2600)
  }
  fn add_balance_fuse() -> Weight { Weight::from_parts(20_000_000, 3200) }
  fn remove_balance_fuse() -> Weight { Weight::from_parts(35_000_000, 4500) }
  fn grant_market_substrates(n: u32) -> Weight {
    Weight::from_parts(20_000_000u64.saturating_add(u64::from(n).saturating_mul(2_000_000)), 3500)
  }
  fn update_dependency_balance_graphs(n: u32) -> Weight {
    Weight::from_parts(16_000_000u64.saturating_add(u64::from(n).saturating_mul(2_000_000)), 2800)
  }
  fn update_markets_balances(n: u32) -> Weight {
    Weight::from_parts(20_000_000u64.saturating_add(u64::from(n).saturating_mul(15_000_000)), 4500)
  }
}
