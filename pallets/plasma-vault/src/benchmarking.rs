#![cfg(feature = "runtime-benchmarks")]

extern crate alloc;

use crate::*;
use alloc::vec::Vec;
use frame::prelude::*;
use polkadot_sdk::frame_benchmarking::v2::*;
use polkadot_sdk::frame_system::RawOrigin;
use primitives::{MarketId, Substrate};

const FIRST_MARKET: MarketId = 10_000;

#[benchmarks]
mod benches {
  use super::*;

  fn authorized_caller<T: Config>() -> T::AccountId {
    let caller: T::AccountId = whitelisted_caller();
    T::BenchmarkHelper::authorize(&caller, &Pallet::<T>::account_id());
    caller
  }

  fn fuses<T: Config>(n: u32) -> BoundedVec<T::AccountId, T::MaxFuses> {
    let fuses: Vec<T::AccountId> = (0..n).map(|i| account("fuse", i, 0)).collect();
    BoundedVec::truncate_from(fuses)
  }

  fn substrates<T: Config>(n: u32, tag: u8) -> SubstratesOf<T> {
    let substrates: Vec<Substrate> = (0..n)
      .map(|i| {
        let mut substrate = [0u8; 32];
        substrate[..4].copy_from_slice(&i.to_be_bytes());
        substrate[31] = tag;
        substrate
      })
      .collect();
    BoundedVec::truncate_from(substrates)
  }

  /// Drops every balance fuse so fresh markets fit under `MaxMarkets`.
  fn clear_markets<T: Config>() {
    for market_id in ActiveMarkets::<T>::take() {
      BalanceFuses::<T>::remove(market_id);
    }
  }

  #[benchmark]
  fn execute(n: Linear<1, { T::MaxActions::get() }>) {
    let caller = authorized_caller::<T>();
    let vault = Pallet::<T>::account_id();
    let mut actions = Vec::new();
    for i in 0..n {
      let (market_id, needed, action) = T::BenchmarkHelper::fuse_action(&vault, i);
      Pallet::<T>::do_add_fuses(&[action.fuse.clone()]).expect("fuse registers");
      let mut granted = Pallet::<T>::market_substrates(market_id);
      granted.extend(needed);
      Pallet::<T>::do_grant_market_substrates(market_id, &granted).expect("substrates grant");
      actions.push(action);
    }
    let actions = BoundedVec::truncate_from(actions);

    #[extrinsic_call]
    execute(RawOrigin::Signed(caller), actions);
  }

  #[benchmark]
  fn add_fuses(n: Linear<1, { T::MaxFuses::get() }>) {
    let caller = authorized_caller::<T>();
    let _ = Pallet::<T>::do_remove_fuses(&Pallet::<T>::get_fuses());
    let fuses = fuses::<T>(n);

    #[extrinsic_call]
    add_fuses(RawOrigin::Signed(caller), fuses.clone());

    assert!(fuses.iter().all(|fuse| Pallet::<T>::is_fuse_supported(fuse)));
  }

  #[benchmark]
  fn remove_fuses(n: Linear<1, { T::MaxFuses::get() }>) {
    let caller = authorized_caller::<T>();
    let _ = Pallet::<T>::do_remove_fuses(&Pallet::<T>::get_fuses());
    let fuses = fuses::<T>(n);
    Pallet::<T>::do_add_fuses(&fuses).expect("fuses register");

    #[extrinsic_call]
    remove_fuses(RawOrigin::Signed(caller), fuses.clone());

    assert!(fuses.iter().all(|fuse| !Pallet::<T>::is_fuse_supported(fuse)));
  }

  #[benchmark]
  fn add_balance_fuse() {
    let caller = authorized_caller::<T>();
    clear_markets::<T>();
    let fuse = T::BenchmarkHelper::empty_balance_fuse();

    #[extrinsic_call]
    add_balance_fuse(RawOrigin::Signed(caller), FIRST_MARKET, fuse.clone());

    assert_eq!(Pallet::<T>::balance_fuse(FIRST_MARKET), Some(fuse));
  }

  #[benchmark]
  fn remove_balance_fuse() {
    let caller = authorized_caller::<T>();
    clear_markets::<T>();
    let fuse = T::BenchmarkHelper::empty_balance_fuse();
    Pallet::<T>::do_add_balance_fuse(FIRST_MARKET, &fuse).expect("balance fuse registers");

    #[extrinsic_call]
    remove_balance_fuse(RawOrigin::Signed(caller), FIRST_MARKET, fuse);

    assert_eq!(Pallet::<T>::balance_fuse(FIRST_MARKET), None);
  }

  // Worst case replaces a full previous set.
  #[benchmark]
  fn grant_market_substrates(n: Linear<1, { T::MaxSubstratesPerMarket::get() }>) {
    let caller = authorized_caller::<T>();
    let previous = substrates::<T>(T::MaxSubstratesPerMarket::get(), 0);
    Pallet::<T>::do_grant_market_substrates(FIRST_MARKET, &previous).expect("substrates grant");
    let next = substrates::<T>(n, 1);

    #[extrinsic_call]
    grant_market_substrates(RawOrigin::Signed(caller), FIRST_MARKET, next);

    assert_eq!(Pallet::<T>::market_substrates(FIRST_MARKET).len(), n as usize);
  }

  #[benchmark]
  fn update_dependency_balance_graphs(n: Linear<1, { T::MaxMarkets::get() }>) {
    let caller = authorized_caller::<T>();
    let market_ids: Vec<MarketId> = (0..n).map(|i| FIRST_MARKET + i).collect();
    let dependencies: Vec<DependenciesOf<T>> = market_ids
      .iter()
      .map(|market_id| {
        let deps: Vec<MarketId> = (1..=T::MaxDependencies::get()).map(|d| market_id + 1_000 * d).collect();
        BoundedVec::truncate_from(deps)
      })
      .collect();

    #[extrinsic_call]
    update_dependency_balance_graphs(
      RawOrigin::Signed(caller),
      BoundedVec::truncate_from(market_ids),
      BoundedVec::truncate_from(dependencies),
    );

    assert!(!Pallet::<T>::dependency_balance_graph(FIRST_MARKET).is_empty());
  }

  #[benchmark]
  fn update_markets_balances(n: Linear<1, { T::MaxMarkets::get() }>) {
    let caller = authorized_caller::<T>();
    clear_markets::<T>();
    let fuse = T::BenchmarkHelper::empty_balance_fuse();
    let market_ids: Vec<MarketId> = (0..n).map(|i| FIRST_MARKET + i).collect();
    for market_id in &market_ids {
      Pallet::<T>::do_add_balance_fuse(*market_id, &fuse).expect("balance fuse registers");
    }

    #[extrinsic_call]
    update_markets_balances(RawOrigin::Signed(caller), BoundedVec::truncate_from(market_ids));
  }

  #[cfg(test)]
  use crate::mock::{Test, new_test_ext};
  #[cfg(test)]
  impl_benchmark_test_suite!(Pallet, new_test_ext(), Test);
}
