//! Access Manager Pallet
//!
//! Role-based authority for the vault governance surface. Every role member carries an
//! execution delay: a zero delay lets the member call immediately, a non-zero delay forces
//! the call through the timelock, which stores content-addressed operations keyed by
//! `blake2_256(caller, target, data)`.
//!
//! Managed components ask [`AuthorityInterface::can_call`] before running a governance call
//! and consume the matching scheduled operation when a delay applies. The manager governs
//! itself the same way: its own admin functions are addressed through the pallet account.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use pallet::*;

pub mod traits;
pub use traits::{AuthorityInterface, ManagedTarget, call_selector, function_selector};

pub mod weights;
pub use weights::WeightInfo;

#[cfg(test)]
mod mock;

#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;

pub const LOG_TARGET: &str = "runtime::access-manager";

#[frame::pallet]
pub mod pallet {
  use super::{LOG_TARGET, ManagedTarget, WeightInfo};
  use alloc::vec::Vec;
  use codec::DecodeAll;
  use frame::deps::{
    frame_support::{PalletId, traits::UnixTime},
    sp_runtime::{DispatchError, traits::AccountIdConversion},
  };
  use frame::prelude::*;
  use primitives::roles::{ADMIN_ROLE, PUBLIC_ROLE};
  use primitives::{Delay, RoleId, Selector};

  /// Seconds since the Unix epoch.
  pub type Moment = u64;
  pub type OperationId = [u8; 32];
  pub type CallDataOf<T> = BoundedVec<u8, <T as Config>::MaxCallDataLen>;
  pub type LabelOf<T> = BoundedVec<u8, <T as Config>::MaxLabelLen>;

  #[derive(
    Clone,
    Copy,
    Debug,
    Decode,
    DecodeWithMemTracking,
    Default,
    Encode,
    Eq,
    MaxEncodedLen,
    PartialEq,
    TypeInfo,
  )]
  pub struct RoleConfig {
    /// Role allowed to grant and revoke this role
    pub admin: RoleId,
    /// Role allowed to cancel operations scheduled under this role
    pub guardian: RoleId,
    /// Seconds before a fresh grant takes effect
    pub grant_delay: Delay,
  }

  #[derive(
    Clone, Copy, Debug, Decode, DecodeWithMemTracking, Encode, Eq, MaxEncodedLen, PartialEq, TypeInfo,
  )]
  pub struct RoleAccess {
    /// Timepoint from which the membership is effective
    pub since: Moment,
    /// Execution delay imposed on the member
    pub delay: Delay,
  }

  #[derive(
    Clone,
    Copy,
    Debug,
    Decode,
    DecodeWithMemTracking,
    Default,
    Encode,
    Eq,
    MaxEncodedLen,
    PartialEq,
    TypeInfo,
  )]
  pub struct TargetConfig {
    pub closed: bool,
    /// Delay applied to ADMIN calls that reconfigure this target
    pub admin_delay: Delay,
  }

  #[derive(
    Clone, Debug, Decode, DecodeWithMemTracking, Encode, Eq, MaxEncodedLen, PartialEq, TypeInfo,
  )]
  pub struct ScheduledOperation<AccountId> {
    pub caller: AccountId,
    pub scheduled_at: Moment,
    pub ready_at: Moment,
    pub nonce: u32,
  }

  #[pallet::pallet]
  pub struct Pallet<T>(_);

  #[pallet::config]
  pub trait Config: frame_system::Config {
    /// Wall clock used for schedules and grant delays
    type TimeProvider: UnixTime;
    /// Components scheduled operations can be dispatched into
    type Targets: ManagedTarget<Self::AccountId>;
    /// Pallet ID; its account is the target of the manager's own admin functions
    #[pallet::constant]
    type PalletId: Get<PalletId>;
    /// Maximum encoded call length accepted by the timelock
    #[pallet::constant]
    type MaxCallDataLen: Get<u32>;
    /// Maximum number of selectors or roles updated by one batch call
    #[pallet::constant]
    type MaxBatchLen: Get<u32>;
    /// Maximum length of a role label
    #[pallet::constant]
    type MaxLabelLen: Get<u32>;
    /// Maximum admin chain length walked by the cycle check
    #[pallet::constant]
    type MaxRoleDepth: Get<u32>;
    /// Weight information for extrinsics
    type WeightInfo: WeightInfo;
  }

  #[pallet::storage]
  pub type Roles<T: Config> = StorageMap<_, Blake2_128Concat, RoleId, RoleConfig, ValueQuery>;

  #[pallet::storage]
  pub type RoleMembers<T: Config> = StorageDoubleMap<
    _,
    Blake2_128Concat,
    RoleId,
    Blake2_128Concat,
    T::AccountId,
    RoleAccess,
    OptionQuery,
  >;

  #[pallet::storage]
  #[pallet::getter(fn minimal_execution_delay)]
  pub type MinimalExecutionDelays<T: Config> =
    StorageMap<_, Blake2_128Concat, RoleId, Delay, ValueQuery>;

  #[pallet::storage]
  pub type TargetConfigs<T: Config> =
    StorageMap<_, Blake2_128Concat, T::AccountId, TargetConfig, ValueQuery>;

  /// Role required to call `(target, selector)`, `ADMIN_ROLE` when unset
  #[pallet::storage]
  #[pallet::getter(fn target_function_role)]
  pub type TargetFunctionRoles<T: Config> = StorageDoubleMap<
    _,
    Blake2_128Concat,
    T::AccountId,
    Blake2_128Concat,
    Selector,
    RoleId,
    ValueQuery,
  >;

  #[pallet::storage]
  pub type Schedules<T: Config> =
    StorageMap<_, Identity, OperationId, ScheduledOperation<T::AccountId>, OptionQuery>;

  /// Survives execution and cancellation so rescheduling never reuses a nonce
  #[pallet::storage]
  #[pallet::getter(fn get_nonce)]
  pub type OperationNonces<T: Config> = StorageMap<_, Identity, OperationId, u32, ValueQuery>;

  #[pallet::event]
  #[pallet::generate_deposit(pub(super) fn deposit_event)]
  pub enum Event<T: Config> {
    RoleGranted {
      role: RoleId,
      account: T::AccountId,
      delay: Delay,
      since: Moment,
      new_member: bool,
    },
    RoleRevoked {
      role: RoleId,
      account: T::AccountId,
    },
    RoleAdminChanged {
      role: RoleId,
      admin: RoleId,
    },
    RoleGuardianChanged {
      role: RoleId,
      guardian: RoleId,
    },
    RoleGrantDelayChanged {
      role: RoleId,
      delay: Delay,
    },
    RoleLabel {
      role: RoleId,
      label: LabelOf<T>,
    },
    MinimalExecutionDelaySet {
      role: RoleId,
      delay: Delay,
    },
    TargetFunctionRoleUpdated {
      target: T::AccountId,
      selector: Selector,
      role: RoleId,
    },
    TargetClosed {
      target: T::AccountId,
      closed: bool,
    },
    TargetAdminDelayUpdated {
      target: T::AccountId,
      delay: Delay,
    },
    OperationScheduled {
      operation_id: OperationId,
      nonce: u32,
      schedule: Moment,
      caller: T::AccountId,
      target: T::AccountId,
      data: CallDataOf<T>,
    },
    OperationExecuted {
      operation_id: OperationId,
      nonce: u32,
    },
    OperationCanceled {
      operation_id: OperationId,
      nonce: u32,
    },
  }

  #[pallet::error]
  pub enum Error<T> {
    /// Caller holds no role permitting the call
    Unauthorized,
    /// `renounce_role` confirmation differs from the sender
    BadConfirmation,
    /// ADMIN and PUBLIC roles cannot be reconfigured this way
    LockedRole,
    /// No pending operation matches `(caller, target, data)`
    NotScheduled,
    /// The operation's delay has not elapsed yet
    NotReady,
    /// Requested timepoint is earlier than the required delay allows
    InvalidSchedule,
    /// Target is neither the manager nor a managed component
    InvalidTarget,
    /// Call data does not decode for the target
    InvalidCallData,
    /// New admin would create an admin chain that never reaches ADMIN
    RoleAdminCycle,
    /// Execution delay below the role's minimal execution delay
    TooShortExecutionDelayForRole,
    /// Paired input vectors differ in length
    LengthMismatch,
  }

  #[pallet::genesis_config]
  #[derive(DefaultNoBound)]
  pub struct GenesisConfig<T: Config> {
    /// `(role, admin, guardian)`
    pub roles: Vec<(RoleId, RoleId, RoleId)>,
    /// `(role, minimal execution delay)`
    pub minimal_execution_delays: Vec<(RoleId, Delay)>,
    /// `(role, account, execution delay)`, effective immediately
    pub members: Vec<(RoleId, T::AccountId, Delay)>,
    /// `(target, selector, role)`
    pub function_roles: Vec<(T::AccountId, Selector, RoleId)>,
  }

  #[pallet::genesis_build]
  impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
    fn build(&self) {
      for (role, admin, guardian) in &self.roles {
        assert!(
          *role != ADMIN_ROLE && *role != PUBLIC_ROLE,
          "ADMIN_ROLE and PUBLIC_ROLE are not configurable"
        );
        Roles::<T>::mutate(role, |config| {
          config.admin = *admin;
          config.guardian = *guardian;
        });
      }
      for (role, admin, _) in &self.roles {
        Pallet::<T>::ensure_admin_chain(*role, *admin).expect("role admin chain reaches ADMIN_ROLE");
      }
      for (role, delay) in &self.minimal_execution_delays {
        MinimalExecutionDelays::<T>::insert(role, delay);
      }
      for (role, account, delay) in &self.members {
        assert!(*role != PUBLIC_ROLE, "PUBLIC_ROLE cannot be granted");
        assert!(
          *delay >= MinimalExecutionDelays::<T>::get(role),
          "member delay below the role's minimal execution delay"
        );
        RoleMembers::<T>::insert(
          role,
          account,
          RoleAccess {
            since: 0,
            delay: *delay,
          },
        );
      }
      for (target, selector, role) in &self.function_roles {
        TargetFunctionRoles::<T>::insert(target, selector, role);
      }
    }
  }

  #[pallet::call]
  impl<T: Config> Pallet<T> {
    /// Grant `role` to `account` with the given execution delay.
    ///
    /// A new member becomes effective after the role's grant delay. Granting to an existing
    /// member only replaces its execution delay.
    #[pallet::call_index(0)]
    #[pallet::weight(T::WeightInfo::grant_role())]
    pub fn grant_role(
      origin: OriginFor<T>,
      role: RoleId,
      account: T::AccountId,
      execution_delay: Delay,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::ensure_admin_call(
        &who,
        &Call::<T>::grant_role {
          role,
          account: account.clone(),
          execution_delay,
        },
      )?;
      Self::do_grant_role(role, &account, execution_delay)
    }

    #[pallet::call_index(1)]
    #[pallet::weight(T::WeightInfo::revoke_role())]
    pub fn revoke_role(origin: OriginFor<T>, role: RoleId, account: T::AccountId) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::ensure_admin_call(
        &who,
        &Call::<T>::revoke_role {
          role,
          account: account.clone(),
        },
      )?;
      Self::do_revoke_role(role, &account)
    }

    /// Give up `role`. `caller_confirmation` must repeat the sender's account.
    #[pallet::call_index(2)]
    #[pallet::weight(T::WeightInfo::renounce_role())]
    pub fn renounce_role(
      origin: OriginFor<T>,
      role: RoleId,
      caller_confirmation: T::AccountId,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      ensure!(who == caller_confirmation, Error::<T>::BadConfirmation);
      Self::do_revoke_role(role, &who)
    }

    #[pallet::call_index(3)]
    #[pallet::weight(T::WeightInfo::set_role_admin())]
    pub fn set_role_admin(origin: OriginFor<T>, role: RoleId, admin: RoleId) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::ensure_admin_call(&who, &Call::<T>::set_role_admin { role, admin })?;
      Self::do_set_role_admin(role, admin)
    }

    #[pallet::call_index(4)]
    #[pallet::weight(T::WeightInfo::set_role_guardian())]
    pub fn set_role_guardian(origin: OriginFor<T>, role: RoleId, guardian: RoleId) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::ensure_admin_call(&who, &Call::<T>::set_role_guardian { role, guardian })?;
      Self::do_set_role_guardian(role, guardian)
    }

    #[pallet::call_index(5)]
    #[pallet::weight(T::WeightInfo::set_grant_delay())]
    pub fn set_grant_delay(origin: OriginFor<T>, role: RoleId, grant_delay: Delay) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::ensure_admin_call(&who, &Call::<T>::set_grant_delay { role, grant_delay })?;
      Self::do_set_grant_delay(role, grant_delay)
    }

    #[pallet::call_index(6)]
    #[pallet::weight(T::WeightInfo::label_role())]
    pub fn label_role(origin: OriginFor<T>, role: RoleId, label: LabelOf<T>) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::ensure_admin_call(
        &who,
        &Call::<T>::label_role {
          role,
          label: label.clone(),
        },
      )?;
      Self::do_label_role(role, label)
    }

    #[pallet::call_index(7)]
    #[pallet::weight(T::WeightInfo::set_minimal_execution_delays(roles.len() as u32))]
    pub fn set_minimal_execution_delays(
      origin: OriginFor<T>,
      roles: BoundedVec<RoleId, T::MaxBatchLen>,
      delays: BoundedVec<Delay, T::MaxBatchLen>,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::ensure_admin_call(
        &who,
        &Call::<T>::set_minimal_execution_delays {
          roles: roles.clone(),
          delays: delays.clone(),
        },
      )?;
      Self::do_set_minimal_execution_delays(&roles, &delays)
    }

    #[pallet::call_index(8)]
    #[pallet::weight(T::WeightInfo::set_target_function_role(selectors.len() as u32))]
    pub fn set_target_function_role(
      origin: OriginFor<T>,
      target: T::AccountId,
      selectors: BoundedVec<Selector, T::MaxBatchLen>,
      role: RoleId,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::ensure_admin_call(
        &who,
        &Call::<T>::set_target_function_role {
          target: target.clone(),
          selectors: selectors.clone(),
          role,
        },
      )?;
      Self::do_set_target_function_role(&target, &selectors, role)
    }

    #[pallet::call_index(9)]
    #[pallet::weight(T::WeightInfo::set_target_closed())]
    pub fn set_target_closed(origin: OriginFor<T>, target: T::AccountId, closed: bool) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::ensure_admin_call(
        &who,
        &Call::<T>::set_target_closed {
          target: target.clone(),
          closed,
        },
      )?;
      Self::do_set_target_closed(&target, closed)
    }

    #[pallet::call_index(10)]
    #[pallet::weight(T::WeightInfo::set_target_admin_delay())]
    pub fn set_target_admin_delay(
      origin: OriginFor<T>,
      target: T::AccountId,
      delay: Delay,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::ensure_admin_call(
        &who,
        &Call::<T>::set_target_admin_delay {
          target: target.clone(),
          delay,
        },
      )?;
      Self::do_set_target_admin_delay(&target, delay)
    }

    /// Schedule `data` on `target` for execution at `when`.
    ///
    /// `when == 0` schedules for the earliest moment the sender's delay allows. Scheduling
    /// an identical operation again replaces the pending one under a new nonce.
    #[pallet::call_index(11)]
    #[pallet::weight(T::WeightInfo::schedule())]
    pub fn schedule(
      origin: OriginFor<T>,
      target: T::AccountId,
      data: CallDataOf<T>,
      when: Moment,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::do_schedule(&who, &target, &data, when).map(|_| ())
    }

    /// Execute `data` on `target`, consuming the sender's scheduled operation when a delay
    /// applies.
    #[pallet::call_index(12)]
    #[pallet::weight(T::WeightInfo::execute())]
    pub fn execute(origin: OriginFor<T>, target: T::AccountId, data: CallDataOf<T>) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::do_execute(&who, &target, &data).map(|_| ())
    }

    /// Cancel the operation `caller` scheduled on `target`.
    ///
    /// Allowed for the original caller, ADMIN members and guardians of the operation's role.
    #[pallet::call_index(13)]
    #[pallet::weight(T::WeightInfo::cancel())]
    pub fn cancel(
      origin: OriginFor<T>,
      caller: T::AccountId,
      target: T::AccountId,
      data: CallDataOf<T>,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::do_cancel(&who, &caller, &target, &data).map(|_| ())
    }
  }

  impl<T: Config> Pallet<T> {
    /// Account addressing the manager's own admin functions.
    pub fn account_id() -> T::AccountId {
      T::PalletId::get().into_account_truncating()
    }

    pub fn now() -> Moment {
      T::TimeProvider::now().as_secs()
    }

    /// Membership and execution delay of `account` in `role`.
    ///
    /// A grant whose effect time lies in the future does not count yet.
    pub fn has_role(role: RoleId, account: &T::AccountId) -> (bool, Delay) {
      if role == PUBLIC_ROLE {
        return (true, 0);
      }
      match RoleMembers::<T>::get(role, account) {
        Some(access) if access.since <= Self::now() => (true, access.delay),
        _ => (false, 0),
      }
    }

    pub fn role_admin(role: RoleId) -> RoleId {
      Roles::<T>::get(role).admin
    }

    pub fn role_guardian(role: RoleId) -> RoleId {
      Roles::<T>::get(role).guardian
    }

    pub fn role_grant_delay(role: RoleId) -> Delay {
      Roles::<T>::get(role).grant_delay
    }

    pub fn is_target_closed(target: &T::AccountId) -> bool {
      TargetConfigs::<T>::get(target).closed
    }

    pub fn target_admin_delay(target: &T::AccountId) -> Delay {
      TargetConfigs::<T>::get(target).admin_delay
    }

    /// Ready timepoint of a pending operation.
    pub fn get_schedule(operation_id: OperationId) -> Option<Moment> {
      Schedules::<T>::get(operation_id).map(|op| op.ready_at)
    }

    pub fn hash_operation(caller: &T::AccountId, target: &T::AccountId, data: &[u8]) -> OperationId {
      (caller, target, data).using_encoded(frame::hashing::blake2_256)
    }

    /// Permission of `caller` for a selector on a managed component.
    ///
    /// The manager's own functions need the full call data and are resolved by
    /// [`Self::can_call_data`] instead.
    pub fn can_call(caller: &T::AccountId, target: &T::AccountId, selector: Selector) -> (bool, Delay) {
      if *target == Self::account_id() || Self::is_target_closed(target) {
        return (false, 0);
      }
      let role = TargetFunctionRoles::<T>::get(target, selector);
      match Self::has_role(role, caller) {
        (true, delay) => (delay == 0, delay),
        (false, _) => (false, 0),
      }
    }

    /// Permission of `caller` for the concrete call `data` on `target`.
    pub fn can_call_data(
      caller: &T::AccountId,
      target: &T::AccountId,
      data: &[u8],
    ) -> Result<(bool, Delay), DispatchError> {
      if *target == Self::account_id() {
        let call = Self::decode_admin_call(data)?;
        return Ok(Self::can_call_self(caller, &call));
      }
      ensure!(T::Targets::manages(target), Error::<T>::InvalidTarget);
      let selector = T::Targets::selector(target, data).ok_or(Error::<T>::InvalidCallData)?;
      Ok(Self::can_call(caller, target, selector))
    }

    fn decode_admin_call(data: &[u8]) -> Result<Call<T>, DispatchError> {
      Call::<T>::decode_all(&mut &data[..]).map_err(|_| Error::<T>::InvalidCallData.into())
    }

    fn can_call_self(caller: &T::AccountId, call: &Call<T>) -> (bool, Delay) {
      let Some((role, restriction_delay)) = Self::admin_restrictions(call) else {
        return (false, 0);
      };
      match Self::has_role(role, caller) {
        (true, member_delay) => {
          let delay = member_delay.max(restriction_delay);
          (delay == 0, delay)
        },
        (false, _) => (false, 0),
      }
    }

    /// Role and minimum delay guarding an admin function, `None` for calls that cannot be
    /// routed through the manager itself.
    fn admin_restrictions(call: &Call<T>) -> Option<(RoleId, Delay)> {
      match call {
        Call::set_role_admin { .. } |
        Call::set_role_guardian { .. } |
        Call::set_grant_delay { .. } |
        Call::label_role { .. } |
        Call::set_minimal_execution_delays { .. } => Some((ADMIN_ROLE, 0)),
        Call::set_target_function_role { target, .. } |
        Call::set_target_closed { target, .. } |
        Call::set_target_admin_delay { target, .. } => {
          Some((ADMIN_ROLE, Self::target_admin_delay(target)))
        },
        Call::grant_role { role, .. } | Call::revoke_role { role, .. } => {
          Some((Self::role_admin(*role), 0))
        },
        _ => None,
      }
    }

    /// Role whose guardian may cancel an operation carrying `data`.
    fn operation_role(target: &T::AccountId, data: &[u8]) -> RoleId {
      if *target == Self::account_id() {
        return Self::decode_admin_call(data)
          .ok()
          .and_then(|call| Self::admin_restrictions(&call))
          .map(|(role, _)| role)
          .unwrap_or(ADMIN_ROLE);
      }
      T::Targets::selector(target, data)
        .map(|selector| TargetFunctionRoles::<T>::get(target, selector))
        .unwrap_or(ADMIN_ROLE)
    }

    fn ensure_admin_call(who: &T::AccountId, call: &Call<T>) -> DispatchResult {
      let (immediate, delay) = Self::can_call_self(who, call);
      if immediate {
        return Ok(());
      }
      ensure!(delay > 0, Error::<T>::Unauthorized);
      Self::do_consume_scheduled_op(who, &Self::account_id(), &call.encode()).map(|_| ())
    }

    pub fn do_schedule(
      caller: &T::AccountId,
      target: &T::AccountId,
      data: &CallDataOf<T>,
      when: Moment,
    ) -> Result<(OperationId, u32), DispatchError> {
      let (immediate, set_back) = Self::can_call_data(caller, target, data)?;
      ensure!(immediate || set_back > 0, Error::<T>::Unauthorized);

      let now = Self::now();
      let earliest = now.saturating_add(Moment::from(set_back));
      ensure!(when == 0 || when >= earliest, Error::<T>::InvalidSchedule);
      let ready_at = when.max(earliest);

      let operation_id = Self::hash_operation(caller, target, data);
      let nonce = OperationNonces::<T>::mutate(operation_id, |nonce| {
        *nonce = nonce.wrapping_add(1);
        *nonce
      });
      if Schedules::<T>::contains_key(operation_id) {
        log::debug!(
          target: LOG_TARGET,
          "operation {:?} rescheduled, pending record superseded",
          operation_id
        );
      }
      Schedules::<T>::insert(
        operation_id,
        ScheduledOperation {
          caller: caller.clone(),
          scheduled_at: now,
          ready_at,
          nonce,
        },
      );

      log::debug!(
        target: LOG_TARGET,
        "operation {:?} scheduled by {:?} for {} (nonce {})",
        operation_id,
        caller,
        ready_at,
        nonce
      );
      Self::deposit_event(Event::OperationScheduled {
        operation_id,
        nonce,
        schedule: ready_at,
        caller: caller.clone(),
        target: target.clone(),
        data: data.clone(),
      });
      Ok((operation_id, nonce))
    }

    /// Runs `data` on `target` on behalf of `caller`. Returns the consumed nonce, zero when
    /// the call ran without a schedule.
    pub fn do_execute(
      caller: &T::AccountId,
      target: &T::AccountId,
      data: &[u8],
    ) -> Result<u32, DispatchError> {
      let (immediate, set_back) = Self::can_call_data(caller, target, data)?;
      ensure!(immediate || set_back > 0, Error::<T>::Unauthorized);

      let operation_id = Self::hash_operation(caller, target, data);
      let nonce = if set_back > 0 || Schedules::<T>::contains_key(operation_id) {
        Self::do_consume_scheduled_op(caller, target, data)?
      } else {
        0
      };

      if *target == Self::account_id() {
        Self::apply_admin_call(Self::decode_admin_call(data)?)?;
      } else {
        T::Targets::dispatch(target, caller, data)?;
      }
      Ok(nonce)
    }

    pub fn do_consume_scheduled_op(
      caller: &T::AccountId,
      target: &T::AccountId,
      data: &[u8],
    ) -> Result<u32, DispatchError> {
      let operation_id = Self::hash_operation(caller, target, data);
      let operation = Schedules::<T>::get(operation_id).ok_or(Error::<T>::NotScheduled)?;
      ensure!(Self::now() >= operation.ready_at, Error::<T>::NotReady);
      Schedules::<T>::remove(operation_id);

      log::debug!(target: LOG_TARGET, "operation {:?} executed", operation_id);
      Self::deposit_event(Event::OperationExecuted {
        operation_id,
        nonce: operation.nonce,
      });
      Ok(operation.nonce)
    }

    pub fn do_cancel(
      sender: &T::AccountId,
      caller: &T::AccountId,
      target: &T::AccountId,
      data: &[u8],
    ) -> Result<u32, DispatchError> {
      let operation_id = Self::hash_operation(caller, target, data);
      let operation = Schedules::<T>::get(operation_id).ok_or(Error::<T>::NotScheduled)?;
      if sender != caller {
        let (is_admin, _) = Self::has_role(ADMIN_ROLE, sender);
        let guardian = Self::role_guardian(Self::operation_role(target, data));
        let (is_guardian, _) = Self::has_role(guardian, sender);
        ensure!(is_admin || is_guardian, Error::<T>::Unauthorized);
      }
      Schedules::<T>::remove(operation_id);

      log::debug!(
        target: LOG_TARGET,
        "operation {:?} canceled by {:?}",
        operation_id,
        sender
      );
      Self::deposit_event(Event::OperationCanceled {
        operation_id,
        nonce: operation.nonce,
      });
      Ok(operation.nonce)
    }

    /// Applies an admin function reached through [`Self::do_execute`]; permission was
    /// checked against the scheduling caller.
    fn apply_admin_call(call: Call<T>) -> DispatchResult {
      match call {
        Call::grant_role {
          role,
          account,
          execution_delay,
        } => Self::do_grant_role(role, &account, execution_delay),
        Call::revoke_role { role, account } => Self::do_revoke_role(role, &account),
        Call::set_role_admin { role, admin } => Self::do_set_role_admin(role, admin),
        Call::set_role_guardian { role, guardian } => Self::do_set_role_guardian(role, guardian),
        Call::set_grant_delay { role, grant_delay } => Self::do_set_grant_delay(role, grant_delay),
        Call::label_role { role, label } => Self::do_label_role(role, label),
        Call::set_minimal_execution_delays { roles, delays } => {
          Self::do_set_minimal_execution_delays(&roles, &delays)
        },
        Call::set_target_function_role {
          target,
          selectors,
          role,
        } => Self::do_set_target_function_role(&target, &selectors, role),
        Call::set_target_closed { target, closed } => Self::do_set_target_closed(&target, closed),
        Call::set_target_admin_delay { target, delay } => {
          Self::do_set_target_admin_delay(&target, delay)
        },
        _ => Err(Error::<T>::Unauthorized.into()),
      }
    }

    pub(crate) fn do_grant_role(
      role: RoleId,
      account: &T::AccountId,
      execution_delay: Delay,
    ) -> DispatchResult {
      ensure!(role != PUBLIC_ROLE, Error::<T>::LockedRole);
      ensure!(
        execution_delay >= MinimalExecutionDelays::<T>::get(role),
        Error::<T>::TooShortExecutionDelayForRole
      );

      let grant_delay = Self::role_grant_delay(role);
      let now = Self::now();
      let (since, new_member) = RoleMembers::<T>::mutate(role, account, |maybe_access| {
        if let Some(access) = maybe_access.as_mut() {
          access.delay = execution_delay;
          return (access.since, false);
        }
        let since = now.saturating_add(Moment::from(grant_delay));
        *maybe_access = Some(RoleAccess {
          since,
          delay: execution_delay,
        });
        (since, true)
      });

      log::debug!(
        target: LOG_TARGET,
        "role {} granted to {:?}, delay {}s, effective at {}",
        role,
        account,
        execution_delay,
        since
      );
      Self::deposit_event(Event::RoleGranted {
        role,
        account: account.clone(),
        delay: execution_delay,
        since,
        new_member,
      });
      Ok(())
    }

    pub(crate) fn do_revoke_role(role: RoleId, account: &T::AccountId) -> DispatchResult {
      ensure!(role != PUBLIC_ROLE, Error::<T>::LockedRole);
      if RoleMembers::<T>::take(role, account).is_some() {
        log::debug!(target: LOG_TARGET, "role {} revoked from {:?}", role, account);
        Self::deposit_event(Event::RoleRevoked {
          role,
          account: account.clone(),
        });
      }
      Ok(())
    }

    pub(crate) fn do_set_role_admin(role: RoleId, admin: RoleId) -> DispatchResult {
      ensure!(role != ADMIN_ROLE && role != PUBLIC_ROLE, Error::<T>::LockedRole);
      Self::ensure_admin_chain(role, admin)?;
      Roles::<T>::mutate(role, |config| config.admin = admin);
      Self::deposit_event(Event::RoleAdminChanged { role, admin });
      Ok(())
    }

    /// Walks the admin chain from `admin`; it must reach ADMIN without passing `role`.
    fn ensure_admin_chain(role: RoleId, admin: RoleId) -> DispatchResult {
      let mut current = admin;
      for _ in 0..T::MaxRoleDepth::get() {
        ensure!(current != role, Error::<T>::RoleAdminCycle);
        if current == ADMIN_ROLE || current == PUBLIC_ROLE {
          return Ok(());
        }
        current = Self::role_admin(current);
      }
      Err(Error::<T>::RoleAdminCycle.into())
    }

    pub(crate) fn do_set_role_guardian(role: RoleId, guardian: RoleId) -> DispatchResult {
      ensure!(role != ADMIN_ROLE && role != PUBLIC_ROLE, Error::<T>::LockedRole);
      Roles::<T>::mutate(role, |config| config.guardian = guardian);
      Self::deposit_event(Event::RoleGuardianChanged { role, guardian });
      Ok(())
    }

    pub(crate) fn do_set_grant_delay(role: RoleId, grant_delay: Delay) -> DispatchResult {
      ensure!(role != PUBLIC_ROLE, Error::<T>::LockedRole);
      Roles::<T>::mutate(role, |config| config.grant_delay = grant_delay);
      Self::deposit_event(Event::RoleGrantDelayChanged {
        role,
        delay: grant_delay,
      });
      Ok(())
    }

    pub(crate) fn do_label_role(role: RoleId, label: LabelOf<T>) -> DispatchResult {
      ensure!(role != ADMIN_ROLE && role != PUBLIC_ROLE, Error::<T>::LockedRole);
      Self::deposit_event(Event::RoleLabel { role, label });
      Ok(())
    }

    pub(crate) fn do_set_minimal_execution_delays(roles: &[RoleId], delays: &[Delay]) -> DispatchResult {
      ensure!(roles.len() == delays.len(), Error::<T>::LengthMismatch);
      for (role, delay) in roles.iter().zip(delays) {
        ensure!(*role != PUBLIC_ROLE, Error::<T>::LockedRole);
        MinimalExecutionDelays::<T>::insert(role, delay);
        Self::deposit_event(Event::MinimalExecutionDelaySet {
          role: *role,
          delay: *delay,
        });
      }
      Ok(())
    }

    pub(crate) fn do_set_target_function_role(
      target: &T::AccountId,
      selectors: &[Selector],
      role: RoleId,
    ) -> DispatchResult {
      for selector in selectors {
        TargetFunctionRoles::<T>::insert(target, selector, role);
        Self::deposit_event(Event::TargetFunctionRoleUpdated {
          target: target.clone(),
          selector: *selector,
          role,
        });
      }
      Ok(())
    }

    pub(crate) fn do_set_target_closed(target: &T::AccountId, closed: bool) -> DispatchResult {
      ensure!(*target != Self::account_id(), Error::<T>::InvalidTarget);
      TargetConfigs::<T>::mutate(target, |config| config.closed = closed);
      log::debug!(target: LOG_TARGET, "target {:?} closed: {}", target, closed);
      Self::deposit_event(Event::TargetClosed {
        target: target.clone(),
        closed,
      });
      Ok(())
    }

    pub(crate) fn do_set_target_admin_delay(target: &T::AccountId, delay: Delay) -> DispatchResult {
      TargetConfigs::<T>::mutate(target, |config| config.admin_delay = delay);
      Self::deposit_event(Event::TargetAdminDelayUpdated {
        target: target.clone(),
        delay,
      });
      Ok(())
    }
  }

  impl<T: Config> super::AuthorityInterface<T::AccountId> for Pallet<T> {
    fn can_call(caller: &T::AccountId, target: &T::AccountId, selector: Selector) -> (bool, Delay) {
      Pallet::<T>::can_call(caller, target, selector)
    }

    fn consume_scheduled_op(
      caller: &T::AccountId,
      target: &T::AccountId,
      data: &[u8],
    ) -> Result<u32, DispatchError> {
      Pallet::<T>::do_consume_scheduled_op(caller, target, data)
    }
  }
}
