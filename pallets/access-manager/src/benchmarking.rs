#![cfg(feature = "runtime-benchmarks")]

extern crate alloc;

use crate::*;
use alloc::vec::Vec;
use codec::Encode;
use frame::prelude::*;
use polkadot_sdk::frame_benchmarking::v2::*;
use polkadot_sdk::frame_system::RawOrigin;
use primitives::roles::{ADMIN_ROLE, ATOMIST_ROLE, FUSE_MANAGER_ROLE, OWNER_ROLE};

#[benchmarks]
mod benches {
  use super::*;

  fn make_member<T: Config>(role: primitives::RoleId, who: &T::AccountId, delay: primitives::Delay) {
    RoleMembers::<T>::insert(role, who, RoleAccess { since: 0, delay });
  }

  fn admin_caller<T: Config>() -> T::AccountId {
    let caller: T::AccountId = whitelisted_caller();
    make_member::<T>(ADMIN_ROLE, &caller, 0);
    caller
  }

  fn grant_call_data<T: Config>(account: T::AccountId) -> CallDataOf<T> {
    let call = Call::<T>::grant_role {
      role: FUSE_MANAGER_ROLE,
      account,
      execution_delay: 0,
    };
    BoundedVec::try_from(call.encode()).unwrap_or_default()
  }

  #[benchmark]
  fn grant_role() {
    let caller = admin_caller::<T>();
    let account: T::AccountId = account("member", 0, 0);

    #[extrinsic_call]
    grant_role(RawOrigin::Signed(caller), OWNER_ROLE, account.clone(), 0);

    assert!(Pallet::<T>::has_role(OWNER_ROLE, &account).0);
  }

  #[benchmark]
  fn revoke_role() {
    let caller = admin_caller::<T>();
    let account: T::AccountId = account("member", 0, 0);
    make_member::<T>(OWNER_ROLE, &account, 0);

    #[extrinsic_call]
    revoke_role(RawOrigin::Signed(caller), OWNER_ROLE, account.clone());

    assert!(!Pallet::<T>::has_role(OWNER_ROLE, &account).0);
  }

  #[benchmark]
  fn renounce_role() {
    let caller: T::AccountId = whitelisted_caller();
    make_member::<T>(FUSE_MANAGER_ROLE, &caller, 0);

    #[extrinsic_call]
    renounce_role(RawOrigin::Signed(caller.clone()), FUSE_MANAGER_ROLE, caller.clone());

    assert!(!Pallet::<T>::has_role(FUSE_MANAGER_ROLE, &caller).0);
  }

  // Worst case walks a full admin chain of MaxRoleDepth - 1 links.
  #[benchmark]
  fn set_role_admin() {
    let caller = admin_caller::<T>();
    let depth = T::MaxRoleDepth::get().saturating_sub(1) as u64;
    for link in 1..depth {
      Roles::<T>::mutate(10_000 + link, |config| config.admin = 10_000 + link - 1);
    }
    let admin = 10_000 + depth.saturating_sub(1);

    #[extrinsic_call]
    set_role_admin(RawOrigin::Signed(caller), FUSE_MANAGER_ROLE, admin);

    assert_eq!(Pallet::<T>::role_admin(FUSE_MANAGER_ROLE), admin);
  }

  #[benchmark]
  fn set_role_guardian() {
    let caller = admin_caller::<T>();

    #[extrinsic_call]
    set_role_guardian(RawOrigin::Signed(caller), FUSE_MANAGER_ROLE, OWNER_ROLE);

    assert_eq!(Pallet::<T>::role_guardian(FUSE_MANAGER_ROLE), OWNER_ROLE);
  }

  #[benchmark]
  fn set_grant_delay() {
    let caller = admin_caller::<T>();

    #[extrinsic_call]
    set_grant_delay(RawOrigin::Signed(caller), FUSE_MANAGER_ROLE, 3_600);

    assert_eq!(Pallet::<T>::role_grant_delay(FUSE_MANAGER_ROLE), 3_600);
  }

  #[benchmark]
  fn label_role() {
    let caller = admin_caller::<T>();
    let label: LabelOf<T> =
      BoundedVec::try_from(alloc::vec![b'x'; T::MaxLabelLen::get() as usize]).unwrap_or_default();

    #[extrinsic_call]
    label_role(RawOrigin::Signed(caller), FUSE_MANAGER_ROLE, label);
  }

  #[benchmark]
  fn set_minimal_execution_delays(n: Linear<1, { T::MaxBatchLen::get() }>) {
    let caller = admin_caller::<T>();
    let roles: Vec<primitives::RoleId> = (0..n).map(|i| 20_000 + u64::from(i)).collect();
    let delays: Vec<primitives::Delay> = (0..n).map(|_| 3_600).collect();
    let roles = BoundedVec::try_from(roles).unwrap_or_default();
    let delays = BoundedVec::try_from(delays).unwrap_or_default();

    #[extrinsic_call]
    set_minimal_execution_delays(RawOrigin::Signed(caller), roles, delays);

    assert_eq!(Pallet::<T>::minimal_execution_delay(20_000), 3_600);
  }

  #[benchmark]
  fn set_target_function_role(n: Linear<1, { T::MaxBatchLen::get() }>) {
    let caller = admin_caller::<T>();
    let target: T::AccountId = account("target", 0, 0);
    let selectors: Vec<primitives::Selector> = (0..n).map(|i| i.to_be_bytes()).collect();
    let selectors = BoundedVec::try_from(selectors).unwrap_or_default();

    #[extrinsic_call]
    set_target_function_role(RawOrigin::Signed(caller), target.clone(), selectors, ATOMIST_ROLE);

    assert_eq!(
      Pallet::<T>::target_function_role(target, 0u32.to_be_bytes()),
      ATOMIST_ROLE
    );
  }

  #[benchmark]
  fn set_target_closed() {
    let caller = admin_caller::<T>();
    let target: T::AccountId = account("target", 0, 0);

    #[extrinsic_call]
    set_target_closed(RawOrigin::Signed(caller), target.clone(), true);

    assert!(Pallet::<T>::is_target_closed(&target));
  }

  #[benchmark]
  fn set_target_admin_delay() {
    let caller = admin_caller::<T>();
    let target: T::AccountId = account("target", 0, 0);

    #[extrinsic_call]
    set_target_admin_delay(RawOrigin::Signed(caller), target.clone(), 600);

    assert_eq!(Pallet::<T>::target_admin_delay(&target), 600);
  }

  #[benchmark]
  fn schedule() {
    let caller: T::AccountId = whitelisted_caller();
    make_member::<T>(ATOMIST_ROLE, &caller, 3_600);
    Roles::<T>::mutate(FUSE_MANAGER_ROLE, |config| config.admin = ATOMIST_ROLE);
    let data = grant_call_data::<T>(account("member", 0, 0));
    let operation_id = Pallet::<T>::hash_operation(&caller, &Pallet::<T>::account_id(), &data);

    #[extrinsic_call]
    schedule(RawOrigin::Signed(caller), Pallet::<T>::account_id(), data, 0);

    assert!(Pallet::<T>::get_schedule(operation_id).is_some());
  }

  #[benchmark]
  fn execute() {
    let caller: T::AccountId = whitelisted_caller();
    make_member::<T>(ATOMIST_ROLE, &caller, 0);
    Roles::<T>::mutate(FUSE_MANAGER_ROLE, |config| config.admin = ATOMIST_ROLE);
    let member: T::AccountId = account("member", 0, 0);
    let data = grant_call_data::<T>(member.clone());
    Pallet::<T>::do_schedule(&caller, &Pallet::<T>::account_id(), &data, 0)
      .expect("immediate member can schedule");

    #[extrinsic_call]
    execute(RawOrigin::Signed(caller), Pallet::<T>::account_id(), data);

    assert!(Pallet::<T>::has_role(FUSE_MANAGER_ROLE, &member).0);
  }

  #[benchmark]
  fn cancel() {
    let caller: T::AccountId = whitelisted_caller();
    make_member::<T>(ATOMIST_ROLE, &caller, 3_600);
    Roles::<T>::mutate(FUSE_MANAGER_ROLE, |config| config.admin = ATOMIST_ROLE);
    let guardian: T::AccountId = account("guardian", 0, 0);
    make_member::<T>(ADMIN_ROLE, &guardian, 0);
    let data = grant_call_data::<T>(account("member", 0, 0));
    let (operation_id, _) = Pallet::<T>::do_schedule(&caller, &Pallet::<T>::account_id(), &data, 0)
      .expect("delayed member can schedule");

    #[extrinsic_call]
    cancel(RawOrigin::Signed(guardian), caller, Pallet::<T>::account_id(), data);

    assert!(Pallet::<T>::get_schedule(operation_id).is_none());
  }

  #[cfg(test)]
  use crate::mock::{Test, new_test_ext};
  #[cfg(test)]
  impl_benchmark_test_suite!(Pallet, new_test_ext(), Test);
}
