//! Plasma Vault Pallet
//!
//! Governance core of a strategy vault. Capital is moved by fuses: accounts bound by the
//! runtime to protocol integrations through [`StrategyAdapter`]. Every fuse action passes a
//! central gate (fuse registered, market bound, substrates granted) before anything is
//! dispatched, and the markets it touched are re-read afterwards together with their declared
//! dependencies.
//!
//! Total assets are the vault's underlying cash plus the value reported by the balance fuse
//! of every active market, converted from USD through the price oracle. All governance calls
//! are authorised by the access manager with the vault account as target.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use pallet::*;

pub mod adapters;
pub use adapters::{BalanceAdapter, PriceOracle, StrategyAdapter};

pub mod types;
pub use types::*;

pub mod weights;
pub use weights::WeightInfo;

#[cfg(test)]
mod mock;

#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;

use primitives::RoleId;
use primitives::roles::{ALPHA_ROLE, FUSE_MANAGER_ROLE, UPDATE_MARKETS_BALANCES_ROLE};

pub const LOG_TARGET: &str = "runtime::plasma-vault";

/// Vault calls and the roles they are assigned to in a default deployment.
pub const DEFAULT_FUNCTION_ROLES: &[(&str, RoleId)] = &[
  ("execute", ALPHA_ROLE),
  ("add_fuses", FUSE_MANAGER_ROLE),
  ("remove_fuses", FUSE_MANAGER_ROLE),
  ("add_balance_fuse", FUSE_MANAGER_ROLE),
  ("remove_balance_fuse", FUSE_MANAGER_ROLE),
  ("grant_market_substrates", FUSE_MANAGER_ROLE),
  ("update_dependency_balance_graphs", FUSE_MANAGER_ROLE),
  ("update_markets_balances", UPDATE_MARKETS_BALANCES_ROLE),
];

#[cfg(feature = "runtime-benchmarks")]
pub trait BenchmarkHelper<AccountId> {
  /// Make `who` an immediate caller of every vault governance function.
  fn authorize(who: &AccountId, vault: &AccountId);

  /// A dispatchable action with its market and the substrates it needs granted. The vault
  /// is funded for it.
  fn fuse_action(
    vault: &AccountId,
    index: u32,
  ) -> (primitives::MarketId, alloc::vec::Vec<primitives::Substrate>, FuseAction<AccountId>);

  /// Balance fuse that reports nothing for an empty market.
  fn empty_balance_fuse() -> AccountId;
}

#[frame::pallet]
pub mod pallet {
  use super::{
    BalanceAdapter, FuseAction, FuseActionKind, LOG_TARGET, PriceOracle, StrategyAdapter,
    WeightInfo,
  };
  use alloc::vec::Vec;
  use codec::DecodeAll;
  use frame::deps::{
    frame_support::{
      PalletId,
      traits::{
        GetCallName,
        fungibles::{Inspect, metadata::Inspect as MetadataInspect},
      },
    },
    sp_runtime::{
      DispatchError,
      traits::{AccountIdConversion, TrailingZeroInput},
    },
  };
  use frame::prelude::*;
  use pallet_access_manager::{AuthorityInterface, ManagedTarget, call_selector, function_selector};
  use primitives::math::{from_wad, to_wad, usd_to_asset_wad};
  use primitives::{MarketId, RoleId, Selector, Substrate};

  pub type FuseActionOf<T> = FuseAction<<T as frame_system::Config>::AccountId>;
  pub type SubstratesOf<T> = BoundedVec<Substrate, <T as Config>::MaxSubstratesPerMarket>;
  pub type DependenciesOf<T> = BoundedVec<MarketId, <T as Config>::MaxDependencies>;

  #[pallet::pallet]
  pub struct Pallet<T>(_);

  #[pallet::config]
  pub trait Config: frame_system::Config {
    /// Fungible assets; the underlying is held and described through it
    type Assets: Inspect<Self::AccountId, AssetId = u32, Balance = u128>
      + MetadataInspect<Self::AccountId>;
    /// Asset the vault accounts in
    #[pallet::constant]
    type UnderlyingAsset: Get<u32>;
    /// USD price feed for the underlying
    type PriceOracle: PriceOracle<u32>;
    /// Capital moving side of fuses
    type Strategies: StrategyAdapter<Self::AccountId>;
    /// Market valuation side of fuses
    type BalanceAdapters: BalanceAdapter<Self::AccountId>;
    /// Access manager authorising governance calls
    type Authority: AuthorityInterface<Self::AccountId>;
    /// Pallet ID; its account holds the vault's cash and is the target for role checks
    #[pallet::constant]
    type PalletId: Get<PalletId>;
    #[pallet::constant]
    type MaxFuses: Get<u32>;
    #[pallet::constant]
    type MaxMarkets: Get<u32>;
    #[pallet::constant]
    type MaxSubstratesPerMarket: Get<u32>;
    /// Maximum dependencies declared for one market
    #[pallet::constant]
    type MaxDependencies: Get<u32>;
    /// Maximum fuse actions in one `execute` batch
    #[pallet::constant]
    type MaxActions: Get<u32>;
    /// USD value (18 decimals) below which a balance fuse counts as empty
    #[pallet::constant]
    type BalanceFuseDust: Get<u128>;
    /// Weight information for extrinsics
    type WeightInfo: WeightInfo;
    #[cfg(feature = "runtime-benchmarks")]
    type BenchmarkHelper: crate::BenchmarkHelper<Self::AccountId>;
  }

  #[pallet::storage]
  pub type Fuses<T: Config> = CountedStorageMap<_, Blake2_128Concat, T::AccountId, (), OptionQuery>;

  #[pallet::storage]
  #[pallet::getter(fn balance_fuse)]
  pub type BalanceFuses<T: Config> =
    StorageMap<_, Blake2_128Concat, MarketId, T::AccountId, OptionQuery>;

  /// Markets with a balance fuse, in registration order
  #[pallet::storage]
  #[pallet::getter(fn active_markets)]
  pub type ActiveMarkets<T: Config> = StorageValue<_, BoundedVec<MarketId, T::MaxMarkets>, ValueQuery>;

  #[pallet::storage]
  pub type MarketSubstrates<T: Config> =
    StorageMap<_, Blake2_128Concat, MarketId, SubstratesOf<T>, ValueQuery>;

  /// Membership index over `MarketSubstrates`
  #[pallet::storage]
  pub type GrantedSubstrates<T: Config> =
    StorageDoubleMap<_, Blake2_128Concat, MarketId, Blake2_128Concat, Substrate, (), OptionQuery>;

  #[pallet::storage]
  #[pallet::getter(fn dependency_balance_graph)]
  pub type DependencyBalanceGraph<T: Config> =
    StorageMap<_, Blake2_128Concat, MarketId, DependenciesOf<T>, ValueQuery>;

  #[pallet::event]
  #[pallet::generate_deposit(pub(super) fn deposit_event)]
  pub enum Event<T: Config> {
    FuseAdded {
      fuse: T::AccountId,
    },
    FuseRemoved {
      fuse: T::AccountId,
    },
    /// Balance fuse registered, `replaced` holds the previous one
    BalanceFuseAdded {
      market_id: MarketId,
      fuse: T::AccountId,
      replaced: Option<T::AccountId>,
    },
    BalanceFuseRemoved {
      market_id: MarketId,
      fuse: T::AccountId,
    },
    /// Granted set of a market replaced
    MarketSubstratesGranted {
      market_id: MarketId,
      substrates: SubstratesOf<T>,
    },
    DependencyBalanceGraphUpdated {
      market_id: MarketId,
      dependencies: DependenciesOf<T>,
    },
    FuseActionExecuted {
      fuse: T::AccountId,
      market_id: MarketId,
      kind: FuseActionKind,
    },
    /// Freshly read market value in underlying units
    MarketBalanceUpdated {
      market_id: MarketId,
      balance: u128,
    },
  }

  #[pallet::error]
  pub enum Error<T> {
    /// Caller holds no role permitting the call
    Unauthorized,
    /// Zero account used as a fuse
    InvalidAddress,
    /// Market id zero
    InvalidMarketId,
    /// Fuse is not registered
    UnsupportedFuse,
    /// Fuse is not bound to any market
    UnsupportedMarket,
    /// Action touches a substrate not granted to the market
    UnsupportedSubstrate,
    /// Underlying asset has no usable price
    UnsupportedAsset,
    /// Dependencies do not pair with markets or a market depends on itself
    InvalidDependencyGraph,
    /// Different balance fuse registered for the market
    BalanceFuseDoesNotExist,
    /// Market still reports a balance above dust
    BalanceFuseNotReadyToRemove,
    /// Aggregated value does not fit the balance type
    BalanceOverflow,
    /// Scheduled data does not decode to a vault call
    InvalidCallData,
    TooManyFuses,
    TooManyMarkets,
  }

  #[pallet::genesis_config]
  #[derive(DefaultNoBound)]
  pub struct GenesisConfig<T: Config> {
    pub fuses: Vec<T::AccountId>,
    /// `(market, balance fuse)`
    pub balance_fuses: Vec<(MarketId, T::AccountId)>,
    pub market_substrates: Vec<(MarketId, Vec<Substrate>)>,
    pub dependencies: Vec<(MarketId, Vec<MarketId>)>,
  }

  #[pallet::genesis_build]
  impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
    fn build(&self) {
      // Keep the custody account alive without a native deposit
      frame_system::Pallet::<T>::inc_providers(&Pallet::<T>::account_id());

      Pallet::<T>::do_add_fuses(&self.fuses).expect("genesis fuses are valid");
      for (market_id, fuse) in &self.balance_fuses {
        Pallet::<T>::do_add_balance_fuse(*market_id, fuse).expect("genesis balance fuses are valid");
      }
      for (market_id, substrates) in &self.market_substrates {
        let substrates: SubstratesOf<T> = substrates
          .clone()
          .try_into()
          .expect("genesis substrates exceed max limit");
        Pallet::<T>::do_grant_market_substrates(*market_id, &substrates)
          .expect("genesis substrates are valid");
      }
      for (market_id, dependencies) in &self.dependencies {
        let dependencies: DependenciesOf<T> = dependencies
          .clone()
          .try_into()
          .expect("genesis dependencies exceed max limit");
        Pallet::<T>::do_set_dependencies(*market_id, dependencies)
          .expect("genesis dependency graph is valid");
      }
    }
  }

  #[pallet::call]
  impl<T: Config> Pallet<T> {
    /// Run a batch of fuse actions.
    ///
    /// Every action is checked before the first one is dispatched. Touched markets and their
    /// dependencies are re-read afterwards; any failure reverts the whole batch.
    #[pallet::call_index(0)]
    #[pallet::weight(T::WeightInfo::execute(actions.len() as u32))]
    pub fn execute(
      origin: OriginFor<T>,
      actions: BoundedVec<FuseActionOf<T>, T::MaxActions>,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::ensure_authorized(
        &who,
        &Call::<T>::execute {
          actions: actions.clone(),
        },
      )?;
      Self::do_execute(&actions)
    }

    #[pallet::call_index(1)]
    #[pallet::weight(T::WeightInfo::add_fuses(fuses.len() as u32))]
    pub fn add_fuses(
      origin: OriginFor<T>,
      fuses: BoundedVec<T::AccountId, T::MaxFuses>,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::ensure_authorized(
        &who,
        &Call::<T>::add_fuses {
          fuses: fuses.clone(),
        },
      )?;
      Self::do_add_fuses(&fuses)
    }

    #[pallet::call_index(2)]
    #[pallet::weight(T::WeightInfo::remove_fuses(fuses.len() as u32))]
    pub fn remove_fuses(
      origin: OriginFor<T>,
      fuses: BoundedVec<T::AccountId, T::MaxFuses>,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::ensure_authorized(
        &who,
        &Call::<T>::remove_fuses {
          fuses: fuses.clone(),
        },
      )?;
      Self::do_remove_fuses(&fuses)
    }

    /// Register the balance fuse of a market, replacing any previous one.
    #[pallet::call_index(3)]
    #[pallet::weight(T::WeightInfo::add_balance_fuse())]
    pub fn add_balance_fuse(
      origin: OriginFor<T>,
      market_id: MarketId,
      fuse: T::AccountId,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::ensure_authorized(
        &who,
        &Call::<T>::add_balance_fuse {
          market_id,
          fuse: fuse.clone(),
        },
      )?;
      Self::do_add_balance_fuse(market_id, &fuse)
    }

    /// Unregister the balance fuse of a market once its reported value is dust.
    #[pallet::call_index(4)]
    #[pallet::weight(T::WeightInfo::remove_balance_fuse())]
    pub fn remove_balance_fuse(
      origin: OriginFor<T>,
      market_id: MarketId,
      fuse: T::AccountId,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::ensure_authorized(
        &who,
        &Call::<T>::remove_balance_fuse {
          market_id,
          fuse: fuse.clone(),
        },
      )?;
      Self::do_remove_balance_fuse(market_id, &fuse)
    }

    /// Replace the full substrate set of a market.
    #[pallet::call_index(5)]
    #[pallet::weight(T::WeightInfo::grant_market_substrates(substrates.len() as u32))]
    pub fn grant_market_substrates(
      origin: OriginFor<T>,
      market_id: MarketId,
      substrates: SubstratesOf<T>,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::ensure_authorized(
        &who,
        &Call::<T>::grant_market_substrates {
          market_id,
          substrates: substrates.clone(),
        },
      )?;
      Self::do_grant_market_substrates(market_id, &substrates)
    }

    /// Declare, per market, the markets whose value must be re-read whenever it changes.
    /// An empty list clears the entry.
    #[pallet::call_index(6)]
    #[pallet::weight(T::WeightInfo::update_dependency_balance_graphs(market_ids.len() as u32))]
    pub fn update_dependency_balance_graphs(
      origin: OriginFor<T>,
      market_ids: BoundedVec<MarketId, T::MaxMarkets>,
      dependencies: BoundedVec<DependenciesOf<T>, T::MaxMarkets>,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::ensure_authorized(
        &who,
        &Call::<T>::update_dependency_balance_graphs {
          market_ids: market_ids.clone(),
          dependencies: dependencies.clone(),
        },
      )?;
      Self::do_update_dependency_balance_graphs(&market_ids, &dependencies)
    }

    #[pallet::call_index(7)]
    #[pallet::weight(T::WeightInfo::update_markets_balances(market_ids.len() as u32))]
    pub fn update_markets_balances(
      origin: OriginFor<T>,
      market_ids: BoundedVec<MarketId, T::MaxMarkets>,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::ensure_authorized(
        &who,
        &Call::<T>::update_markets_balances {
          market_ids: market_ids.clone(),
        },
      )?;
      Self::do_update_markets_balances(&market_ids)
    }
  }

  impl<T: Config> Pallet<T> {
    pub fn account_id() -> T::AccountId {
      T::PalletId::get().into_account_truncating()
    }

    /// Selector to role table for seeding the access manager.
    pub fn default_function_roles() -> Vec<(Selector, RoleId)> {
      crate::DEFAULT_FUNCTION_ROLES
        .iter()
        .map(|(name, role)| (function_selector(name), *role))
        .collect()
    }

    pub fn is_fuse_supported(fuse: &T::AccountId) -> bool {
      Fuses::<T>::contains_key(fuse)
    }

    pub fn get_fuses() -> Vec<T::AccountId> {
      Fuses::<T>::iter_keys().collect()
    }

    pub fn is_substrate_granted(market_id: MarketId, substrate: &Substrate) -> bool {
      GrantedSubstrates::<T>::contains_key(market_id, substrate)
    }

    pub fn market_substrates(market_id: MarketId) -> Vec<Substrate> {
      MarketSubstrates::<T>::get(market_id).into_inner()
    }

    pub fn ensure_substrates_granted(market_id: MarketId, substrates: &[Substrate]) -> DispatchResult {
      for substrate in substrates {
        ensure!(
          Self::is_substrate_granted(market_id, substrate),
          Error::<T>::UnsupportedSubstrate
        );
      }
      Ok(())
    }

    /// Pre-dispatch gate of a fuse action. Returns the market it operates in.
    pub fn authorize_action(action: &FuseActionOf<T>) -> Result<MarketId, DispatchError> {
      ensure!(Self::is_fuse_supported(&action.fuse), Error::<T>::UnsupportedFuse);
      let market_id = T::Strategies::market_id(&action.fuse).ok_or(Error::<T>::UnsupportedMarket)?;
      let substrates = T::Strategies::substrates(&action.fuse, action.kind, &action.data)?;
      Self::ensure_substrates_granted(market_id, &substrates)?;
      Ok(market_id)
    }

    fn ensure_authorized(who: &T::AccountId, call: &Call<T>) -> DispatchResult {
      let vault = Self::account_id();
      let (immediate, delay) = T::Authority::can_call(who, &vault, call_selector(call));
      if immediate {
        return Ok(());
      }
      ensure!(delay > 0, Error::<T>::Unauthorized);
      T::Authority::consume_scheduled_op(who, &vault, &call.encode()).map(|_| ())
    }

    fn is_zero_account(who: &T::AccountId) -> bool {
      T::AccountId::decode(&mut TrailingZeroInput::zeroes())
        .map(|zero| zero == *who)
        .unwrap_or(false)
    }

    fn underlying_decimals() -> u8 {
      T::Assets::decimals(T::UnderlyingAsset::get())
    }

    fn underlying_price() -> Result<(u128, u8), DispatchError> {
      let (price, decimals) = T::PriceOracle::asset_price(T::UnderlyingAsset::get())?;
      ensure!(price > 0, Error::<T>::UnsupportedAsset);
      Ok((price, decimals))
    }

    /// Value of a market in underlying units scaled to 18 decimals.
    fn market_value_wad(market_id: MarketId) -> Result<u128, DispatchError> {
      let Some(fuse) = BalanceFuses::<T>::get(market_id) else {
        return Ok(0);
      };
      let substrates = MarketSubstrates::<T>::get(market_id);
      let usd_wad =
        T::BalanceAdapters::balance_of(&fuse, &Self::account_id(), market_id, &substrates)?;
      if usd_wad == 0 {
        return Ok(0);
      }
      let (price, price_decimals) = Self::underlying_price()?;
      usd_to_asset_wad(usd_wad, price, price_decimals).ok_or_else(|| Error::<T>::BalanceOverflow.into())
    }

    /// Current value of a market in underlying units (underlying decimals).
    pub fn total_assets_in_market(market_id: MarketId) -> Result<u128, DispatchError> {
      let value = Self::market_value_wad(market_id)?;
      from_wad(value, Self::underlying_decimals()).ok_or_else(|| Error::<T>::BalanceOverflow.into())
    }

    /// Vault cash plus every active market, in underlying units scaled to 18 decimals.
    ///
    /// Each market is read fresh; a failing or negative market aborts the whole sum.
    pub fn total_assets() -> Result<u128, DispatchError> {
      let cash = T::Assets::balance(T::UnderlyingAsset::get(), &Self::account_id());
      let mut total = to_wad(cash, Self::underlying_decimals()).ok_or(Error::<T>::BalanceOverflow)?;
      for market_id in ActiveMarkets::<T>::get() {
        total = total
          .checked_add(Self::market_value_wad(market_id)?)
          .ok_or(Error::<T>::BalanceOverflow)?;
      }
      Ok(total)
    }

    /// `markets` followed by every market reachable through the dependency graph, each once.
    ///
    /// At most `MaxMarkets` graph entries are followed per walk.
    pub fn dependency_closure(markets: &[MarketId]) -> Vec<MarketId> {
      let max_reads = T::MaxMarkets::get() as usize;
      let mut reads = 0;
      let mut closure: Vec<MarketId> = Vec::new();
      let mut queue: Vec<MarketId> = markets.to_vec();
      let mut cursor = 0;
      while let Some(market_id) = queue.get(cursor).copied() {
        cursor += 1;
        if closure.contains(&market_id) {
          continue;
        }
        closure.push(market_id);
        if reads == max_reads {
          log::warn!(target: LOG_TARGET, "dependency walk stopped before market {}", market_id);
          continue;
        }
        reads += 1;
        queue.extend(DependencyBalanceGraph::<T>::get(market_id).iter().copied());
      }
      closure
    }

    fn refresh_markets(markets: &[MarketId]) -> DispatchResult {
      for market_id in Self::dependency_closure(markets) {
        if !BalanceFuses::<T>::contains_key(market_id) {
          log::trace!(target: LOG_TARGET, "market {} has no balance fuse", market_id);
          continue;
        }
        let balance = Self::total_assets_in_market(market_id)?;
        log::debug!(target: LOG_TARGET, "market {} balance {}", market_id, balance);
        Self::deposit_event(Event::MarketBalanceUpdated { market_id, balance });
      }
      Ok(())
    }

    pub(crate) fn do_execute(actions: &[FuseActionOf<T>]) -> DispatchResult {
      let mut markets: Vec<MarketId> = Vec::with_capacity(actions.len());
      for action in actions {
        markets.push(Self::authorize_action(action)?);
      }

      let vault = Self::account_id();
      for (action, market_id) in actions.iter().zip(markets.iter()) {
        match action.kind {
          FuseActionKind::Enter => T::Strategies::enter(&action.fuse, &vault, &action.data)?,
          FuseActionKind::Exit => T::Strategies::exit(&action.fuse, &vault, &action.data)?,
        }
        log::debug!(
          target: LOG_TARGET,
          "fuse {:?} {:?} in market {}",
          action.fuse,
          action.kind,
          market_id
        );
        Self::deposit_event(Event::FuseActionExecuted {
          fuse: action.fuse.clone(),
          market_id: *market_id,
          kind: action.kind,
        });
      }

      markets.sort_unstable();
      markets.dedup();
      Self::refresh_markets(&markets)
    }

    pub(crate) fn do_add_fuses(fuses: &[T::AccountId]) -> DispatchResult {
      for fuse in fuses {
        ensure!(!Self::is_zero_account(fuse), Error::<T>::InvalidAddress);
        if Fuses::<T>::contains_key(fuse) {
          continue;
        }
        ensure!(Fuses::<T>::count() < T::MaxFuses::get(), Error::<T>::TooManyFuses);
        Fuses::<T>::insert(fuse, ());
        log::debug!(target: LOG_TARGET, "fuse {:?} added", fuse);
        Self::deposit_event(Event::FuseAdded { fuse: fuse.clone() });
      }
      Ok(())
    }

    pub(crate) fn do_remove_fuses(fuses: &[T::AccountId]) -> DispatchResult {
      for fuse in fuses {
        ensure!(!Self::is_zero_account(fuse), Error::<T>::InvalidAddress);
        if Fuses::<T>::take(fuse).is_some() {
          log::debug!(target: LOG_TARGET, "fuse {:?} removed", fuse);
          Self::deposit_event(Event::FuseRemoved { fuse: fuse.clone() });
        }
      }
      Ok(())
    }

    pub(crate) fn do_add_balance_fuse(market_id: MarketId, fuse: &T::AccountId) -> DispatchResult {
      ensure!(market_id != 0, Error::<T>::InvalidMarketId);
      ensure!(!Self::is_zero_account(fuse), Error::<T>::InvalidAddress);

      let replaced = BalanceFuses::<T>::get(market_id);
      if replaced.is_none() {
        ActiveMarkets::<T>::try_mutate(|markets| {
          markets
            .try_push(market_id)
            .map_err(|_| Error::<T>::TooManyMarkets)
        })?;
      }
      BalanceFuses::<T>::insert(market_id, fuse);

      Self::deposit_event(Event::BalanceFuseAdded {
        market_id,
        fuse: fuse.clone(),
        replaced,
      });
      Ok(())
    }

    pub(crate) fn do_remove_balance_fuse(market_id: MarketId, fuse: &T::AccountId) -> DispatchResult {
      ensure!(
        BalanceFuses::<T>::get(market_id).as_ref() == Some(fuse),
        Error::<T>::BalanceFuseDoesNotExist
      );
      let substrates = MarketSubstrates::<T>::get(market_id);
      let usd_wad =
        T::BalanceAdapters::balance_of(fuse, &Self::account_id(), market_id, &substrates)?;
      ensure!(
        usd_wad <= T::BalanceFuseDust::get(),
        Error::<T>::BalanceFuseNotReadyToRemove
      );

      BalanceFuses::<T>::remove(market_id);
      ActiveMarkets::<T>::mutate(|markets| markets.retain(|m| *m != market_id));

      Self::deposit_event(Event::BalanceFuseRemoved {
        market_id,
        fuse: fuse.clone(),
      });
      Ok(())
    }

    pub(crate) fn do_grant_market_substrates(
      market_id: MarketId,
      substrates: &[Substrate],
    ) -> DispatchResult {
      ensure!(market_id != 0, Error::<T>::InvalidMarketId);

      for old in MarketSubstrates::<T>::get(market_id).iter() {
        GrantedSubstrates::<T>::remove(market_id, old);
      }
      let mut unique: Vec<Substrate> = Vec::with_capacity(substrates.len());
      for substrate in substrates {
        if !unique.contains(substrate) {
          GrantedSubstrates::<T>::insert(market_id, substrate, ());
          unique.push(*substrate);
        }
      }
      let granted = SubstratesOf::<T>::truncate_from(unique);
      MarketSubstrates::<T>::insert(market_id, &granted);

      log::debug!(
        target: LOG_TARGET,
        "market {} granted {} substrates",
        market_id,
        granted.len()
      );
      Self::deposit_event(Event::MarketSubstratesGranted {
        market_id,
        substrates: granted,
      });
      Ok(())
    }

    pub(crate) fn do_update_dependency_balance_graphs(
      market_ids: &[MarketId],
      dependencies: &[DependenciesOf<T>],
    ) -> DispatchResult {
      ensure!(
        market_ids.len() == dependencies.len(),
        Error::<T>::InvalidDependencyGraph
      );
      for (market_id, deps) in market_ids.iter().zip(dependencies) {
        Self::do_set_dependencies(*market_id, deps.clone())?;
      }
      Ok(())
    }

    pub(crate) fn do_set_dependencies(
      market_id: MarketId,
      dependencies: DependenciesOf<T>,
    ) -> DispatchResult {
      ensure!(market_id != 0, Error::<T>::InvalidMarketId);
      ensure!(
        dependencies.iter().all(|dependency| *dependency != 0),
        Error::<T>::InvalidMarketId
      );
      ensure!(
        !dependencies.contains(&market_id),
        Error::<T>::InvalidDependencyGraph
      );
      let mut unique: Vec<MarketId> = Vec::with_capacity(dependencies.len());
      for dependency in dependencies {
        if !unique.contains(&dependency) {
          unique.push(dependency);
        }
      }
      let dependencies = DependenciesOf::<T>::truncate_from(unique);

      if dependencies.is_empty() {
        DependencyBalanceGraph::<T>::remove(market_id);
      } else {
        DependencyBalanceGraph::<T>::insert(market_id, &dependencies);
      }
      Self::deposit_event(Event::DependencyBalanceGraphUpdated {
        market_id,
        dependencies,
      });
      Ok(())
    }

    pub(crate) fn do_update_markets_balances(market_ids: &[MarketId]) -> DispatchResult {
      ensure!(
        market_ids.iter().all(|market_id| *market_id != 0),
        Error::<T>::InvalidMarketId
      );
      Self::refresh_markets(market_ids)
    }

    /// Applies a call the access manager scheduled and already authorised.
    fn apply_call(call: Call<T>) -> DispatchResult {
      match call {
        Call::execute { actions } => Self::do_execute(&actions),
        Call::add_fuses { fuses } => Self::do_add_fuses(&fuses),
        Call::remove_fuses { fuses } => Self::do_remove_fuses(&fuses),
        Call::add_balance_fuse { market_id, fuse } => Self::do_add_balance_fuse(market_id, &fuse),
        Call::remove_balance_fuse { market_id, fuse } => {
          Self::do_remove_balance_fuse(market_id, &fuse)
        },
        Call::grant_market_substrates {
          market_id,
          substrates,
        } => Self::do_grant_market_substrates(market_id, &substrates),
        Call::update_dependency_balance_graphs {
          market_ids,
          dependencies,
        } => Self::do_update_dependency_balance_graphs(&market_ids, &dependencies),
        Call::update_markets_balances { market_ids } => Self::do_update_markets_balances(&market_ids),
        _ => Err(Error::<T>::InvalidCallData.into()),
      }
    }
  }

  impl<T: Config> ManagedTarget<T::AccountId> for Pallet<T> {
    fn manages(target: &T::AccountId) -> bool {
      *target == Self::account_id()
    }

    fn selector(target: &T::AccountId, data: &[u8]) -> Option<Selector> {
      if !Self::manages(target) {
        return None;
      }
      Call::<T>::decode_all(&mut &data[..])
        .ok()
        .map(|call| call_selector(&call))
    }

    fn dispatch(target: &T::AccountId, caller: &T::AccountId, data: &[u8]) -> DispatchResult {
      ensure!(Self::manages(target), Error::<T>::InvalidCallData);
      let call = Call::<T>::decode_all(&mut &data[..]).map_err(|_| Error::<T>::InvalidCallData)?;
      log::debug!(
        target: LOG_TARGET,
        "scheduled {} from {:?}",
        call.get_call_name(),
        caller
      );
      Self::apply_call(call)
    }
  }
}
