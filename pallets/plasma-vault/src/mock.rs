extern crate alloc;

use crate as pallet_plasma_vault;
use codec::{Decode, Encode};
use polkadot_sdk::frame_support::traits::fungibles::{Mutate, metadata::Inspect as MetadataInspect};
use polkadot_sdk::frame_support::traits::tokens::Preservation;
use polkadot_sdk::frame_support::{
  PalletId, construct_runtime, derive_impl,
  traits::{ConstU32, ConstU128, UnixTime},
};
use polkadot_sdk::frame_system;
use polkadot_sdk::sp_runtime::{
  BuildStorage, DispatchError, DispatchResult,
  testing::H256,
  traits::{BlakeTwo256, IdentityLookup},
};
use primitives::markets::{AAVE_V3_MARKET, ERC20_VAULT_BALANCE_MARKET};
use primitives::math::{WAD, asset_to_usd_wad};
use primitives::pallet_ids::{ACCESS_MANAGER_PALLET_ID, PLASMA_VAULT_PALLET_ID};
use primitives::roles::{
  ADMIN_ROLE, ALPHA_ROLE, ATOMIST_ROLE, DEFAULT_HIERARCHY, FUSE_MANAGER_ROLE, GUARDIAN_ROLE,
  OWNER_ROLE, UPDATE_MARKETS_BALANCES_ROLE,
};
use primitives::{AssetSubstrate, MarketId, Substrate};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

pub const ADMIN: u64 = 1;
pub const OWNER: u64 = 2;
pub const ATOMIST: u64 = 3;
pub const ALPHA: u64 = 4;
pub const FUSE_MANAGER: u64 = 5;
pub const GUARDIAN: u64 = 6;
pub const UPDATER: u64 = 7;
pub const BOB: u64 = 8;
pub const MALLORY: u64 = 66;
/// Counterparty holding the lending protocol's liquidity
pub const POOL: u64 = 900;

pub const USDC: u32 = 1;
pub const USDC_DECIMALS: u8 = 6;
pub const UNIT: u128 = 1_000_000;

pub const SUPPLY_FUSE: u64 = 1001;
pub const BORROW_FUSE: u64 = 1002;
pub const TRANSFER_FUSE: u64 = 1003;
/// Known to the vault but to no strategy
pub const UNBOUND_FUSE: u64 = 1098;
/// Bound to the lending market but never registered
pub const UNKNOWN_FUSE: u64 = 1099;
pub const LENDING_BALANCE_FUSE: u64 = 1101;
pub const ERC20_BALANCE_FUSE: u64 = 1107;

pub const LENDING: MarketId = AAVE_V3_MARKET;
pub const ERC20: MarketId = ERC20_VAULT_BALANCE_MARKET;

pub const GENESIS_TIME: u64 = 1_700_000_000;
pub const HOUR: u64 = 3_600;
pub const DAY: u32 = 86_400;

/// Params of the supply and borrow fuses.
#[derive(Encode, Decode)]
pub struct PositionParams {
  pub asset: u32,
  pub sub_account: u8,
  pub amount: u128,
}

/// Params of the transfer fuse: moves supply between two sub-accounts.
#[derive(Encode, Decode)]
pub struct TransferParams {
  pub asset: u32,
  pub from: u8,
  pub to: u8,
  pub amount: u128,
}

thread_local! {
    pub static NOW: Cell<u64> = const { Cell::new(GENESIS_TIME) };
    pub static SUPPLIED: RefCell<BTreeMap<(u32, u8), u128>> = const { RefCell::new(BTreeMap::new()) };
    pub static DEBT: RefCell<BTreeMap<(u32, u8), u128>> = const { RefCell::new(BTreeMap::new()) };
    pub static PRICES: RefCell<BTreeMap<u32, (u128, u8)>> = const { RefCell::new(BTreeMap::new()) };
    pub static ERC20_USD: Cell<u128> = const { Cell::new(0) };
    pub static ERC20_FEED_DOWN: Cell<bool> = const { Cell::new(false) };
}

pub fn advance(seconds: u64) {
  NOW.with(|n| n.set(n.get() + seconds));
}

pub fn supplied(asset: u32, sub_account: u8) -> u128 {
  SUPPLIED.with(|s| s.borrow().get(&(asset, sub_account)).copied().unwrap_or_default())
}

pub fn debt(asset: u32, sub_account: u8) -> u128 {
  DEBT.with(|d| d.borrow().get(&(asset, sub_account)).copied().unwrap_or_default())
}

pub fn set_debt(asset: u32, sub_account: u8, amount: u128) {
  DEBT.with(|d| d.borrow_mut().insert((asset, sub_account), amount));
}

pub fn set_price(asset: u32, price: u128, decimals: u8) {
  PRICES.with(|p| p.borrow_mut().insert(asset, (price, decimals)));
}

pub fn clear_price(asset: u32) {
  PRICES.with(|p| p.borrow_mut().remove(&asset));
}

pub fn set_erc20_usd(value: u128) {
  ERC20_USD.with(|v| v.set(value));
}

pub fn set_erc20_feed_down(down: bool) {
  ERC20_FEED_DOWN.with(|v| v.set(down));
}

type Block = frame_system::mocking::MockBlock<Test>;

construct_runtime!(
  pub struct Test {
    System: frame_system,
    Balances: polkadot_sdk::pallet_balances,
    Assets: polkadot_sdk::pallet_assets,
    AccessManager: pallet_access_manager,
    PlasmaVault: pallet_plasma_vault,
  }
);

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Test {
  type Block = Block;
  type AccountId = u64;
  type Lookup = IdentityLookup<Self::AccountId>;
  type Hash = H256;
  type Hashing = BlakeTwo256;
  type AccountData = polkadot_sdk::pallet_balances::AccountData<u128>;
}

impl polkadot_sdk::pallet_balances::Config for Test {
  type MaxLocks = ();
  type MaxReserves = ();
  type ReserveIdentifier = [u8; 8];
  type Balance = u128;
  type DustRemoval = ();
  type RuntimeEvent = RuntimeEvent;
  type ExistentialDeposit = ConstU128<1>;
  type AccountStore = System;
  type WeightInfo = ();
  type FreezeIdentifier = ();
  type MaxFreezes = ();
  type RuntimeHoldReason = ();
  type RuntimeFreezeReason = ();
  type DoneSlashHandler = ();
}

impl polkadot_sdk::pallet_assets::Config for Test {
  type RuntimeEvent = RuntimeEvent;
  type Balance = u128;
  type AssetId = u32;
  type AssetIdParameter = u32;
  type Currency = Balances;
  type CreateOrigin = polkadot_sdk::frame_support::traits::AsEnsureOriginWithArg<
    frame_system::EnsureSigned<Self::AccountId>,
  >;
  type ForceOrigin = frame_system::EnsureRoot<Self::AccountId>;
  type AssetDeposit = ConstU128<1>;
  type AssetAccountDeposit = ConstU128<1>;
  type MetadataDepositBase = ConstU128<1>;
  type MetadataDepositPerByte = ConstU128<1>;
  type ApprovalDeposit = ConstU128<1>;
  type StringLimit = ConstU32<50>;
  type Freezer = ();
  type Extra = ();
  type CallbackHandle = ();
  type WeightInfo = ();
  type RemoveItemsLimit = ConstU32<5>;
  type Holder = ();
  type ReserveData = ();
  #[cfg(feature = "runtime-benchmarks")]
  type BenchmarkHelper = ();
}

pub struct MockTime;
impl UnixTime for MockTime {
  fn now() -> core::time::Duration {
    core::time::Duration::from_secs(NOW.with(|n| n.get()))
  }
}

polkadot_sdk::frame_support::parameter_types! {
  pub const AccessManagerPalletId: PalletId = PalletId(*ACCESS_MANAGER_PALLET_ID);
  pub const PlasmaVaultPalletId: PalletId = PalletId(*PLASMA_VAULT_PALLET_ID);
}

impl pallet_access_manager::Config for Test {
  type TimeProvider = MockTime;
  type Targets = PlasmaVault;
  type PalletId = AccessManagerPalletId;
  type MaxCallDataLen = ConstU32<4096>;
  type MaxBatchLen = ConstU32<16>;
  type MaxLabelLen = ConstU32<32>;
  type MaxRoleDepth = ConstU32<8>;
  type WeightInfo = ();
}

fn decode_params<P: Decode>(data: &[u8]) -> Result<P, DispatchError> {
  P::decode(&mut &data[..]).map_err(|_| DispatchError::Other("invalid fuse params"))
}

fn price_of(asset: u32) -> Result<(u128, u8), DispatchError> {
  PRICES
    .with(|p| p.borrow().get(&asset).copied())
    .ok_or(DispatchError::Other("no price"))
}

/// Lending protocol fuses backed by thread-local positions. Liquidity moves between the
/// vault account and [`POOL`].
pub struct MockStrategies;
impl pallet_plasma_vault::StrategyAdapter<u64> for MockStrategies {
  fn market_id(fuse: &u64) -> Option<MarketId> {
    match *fuse {
      SUPPLY_FUSE | BORROW_FUSE | TRANSFER_FUSE | UNKNOWN_FUSE => Some(LENDING),
      _ => None,
    }
  }

  fn substrates(
    fuse: &u64,
    _kind: pallet_plasma_vault::FuseActionKind,
    data: &[u8],
  ) -> Result<Vec<Substrate>, DispatchError> {
    match *fuse {
      SUPPLY_FUSE => {
        let p: PositionParams = decode_params(data)?;
        Ok(alloc::vec![AssetSubstrate::new(p.asset, p.sub_account, false).to_substrate()])
      },
      BORROW_FUSE => {
        let p: PositionParams = decode_params(data)?;
        Ok(alloc::vec![AssetSubstrate::new(p.asset, p.sub_account, true).to_substrate()])
      },
      TRANSFER_FUSE => {
        let p: TransferParams = decode_params(data)?;
        Ok(alloc::vec![
          AssetSubstrate::new(p.asset, p.from, false).to_substrate(),
          AssetSubstrate::new(p.asset, p.to, false).to_substrate(),
        ])
      },
      _ => Ok(alloc::vec![]),
    }
  }

  fn enter(fuse: &u64, vault: &u64, data: &[u8]) -> DispatchResult {
    match *fuse {
      SUPPLY_FUSE => {
        let p: PositionParams = decode_params(data)?;
        <Assets as Mutate<u64>>::transfer(p.asset, vault, &POOL, p.amount, Preservation::Expendable)?;
        SUPPLIED.with(|s| *s.borrow_mut().entry((p.asset, p.sub_account)).or_default() += p.amount);
        Ok(())
      },
      BORROW_FUSE => {
        let p: PositionParams = decode_params(data)?;
        <Assets as Mutate<u64>>::transfer(p.asset, &POOL, vault, p.amount, Preservation::Expendable)?;
        DEBT.with(|d| *d.borrow_mut().entry((p.asset, p.sub_account)).or_default() += p.amount);
        Ok(())
      },
      TRANSFER_FUSE => {
        let p: TransferParams = decode_params(data)?;
        let remaining = supplied(p.asset, p.from)
          .checked_sub(p.amount)
          .ok_or(DispatchError::Other("insufficient supply"))?;
        SUPPLIED.with(|s| {
          let mut s = s.borrow_mut();
          s.insert((p.asset, p.from), remaining);
          *s.entry((p.asset, p.to)).or_default() += p.amount;
        });
        Ok(())
      },
      _ => Ok(()),
    }
  }

  fn exit(fuse: &u64, vault: &u64, data: &[u8]) -> DispatchResult {
    match *fuse {
      SUPPLY_FUSE => {
        let p: PositionParams = decode_params(data)?;
        let remaining = supplied(p.asset, p.sub_account)
          .checked_sub(p.amount)
          .ok_or(DispatchError::Other("insufficient supply"))?;
        <Assets as Mutate<u64>>::transfer(p.asset, &POOL, vault, p.amount, Preservation::Expendable)?;
        SUPPLIED.with(|s| s.borrow_mut().insert((p.asset, p.sub_account), remaining));
        Ok(())
      },
      BORROW_FUSE => {
        let p: PositionParams = decode_params(data)?;
        let remaining = debt(p.asset, p.sub_account)
          .checked_sub(p.amount)
          .ok_or(DispatchError::Other("repay exceeds debt"))?;
        <Assets as Mutate<u64>>::transfer(p.asset, vault, &POOL, p.amount, Preservation::Expendable)?;
        set_debt(p.asset, p.sub_account, remaining);
        Ok(())
      },
      _ => Err(DispatchError::Other("unsupported action")),
    }
  }
}

/// Lending balance nets supply against debt on borrow-enabled substrates. The ERC20 fuse
/// reports a fixed USD value from its own feed.
pub struct MockBalances;
impl pallet_plasma_vault::BalanceAdapter<u64> for MockBalances {
  fn balance_of(
    fuse: &u64,
    _vault: &u64,
    _market_id: MarketId,
    substrates: &[Substrate],
  ) -> Result<u128, DispatchError> {
    match *fuse {
      LENDING_BALANCE_FUSE => {
        let mut positions: BTreeMap<(u32, u8), bool> = BTreeMap::new();
        for substrate in substrates {
          let Some(position) = AssetSubstrate::from_substrate(substrate) else {
            continue;
          };
          *positions.entry((position.asset, position.sub_account)).or_default() |= position.can_borrow;
        }

        let overflow = DispatchError::Other("usd overflow");
        let (mut supply_usd, mut debt_usd) = (0u128, 0u128);
        for ((asset, sub_account), can_borrow) in positions {
          let (price, price_decimals) = price_of(asset)?;
          let decimals = <Assets as MetadataInspect<u64>>::decimals(asset);
          let value = asset_to_usd_wad(supplied(asset, sub_account), decimals, price, price_decimals)
            .ok_or(overflow)?;
          supply_usd = supply_usd.checked_add(value).ok_or(overflow)?;
          if can_borrow {
            let value = asset_to_usd_wad(debt(asset, sub_account), decimals, price, price_decimals)
              .ok_or(overflow)?;
            debt_usd = debt_usd.checked_add(value).ok_or(overflow)?;
          }
        }
        supply_usd
          .checked_sub(debt_usd)
          .ok_or(DispatchError::Other("negative market balance"))
      },
      ERC20_BALANCE_FUSE => {
        if ERC20_FEED_DOWN.with(|d| d.get()) {
          return Err(DispatchError::Other("erc20 feed unavailable"));
        }
        Ok(ERC20_USD.with(|v| v.get()))
      },
      _ => Err(DispatchError::Other("not a balance fuse")),
    }
  }
}

pub struct MockOracle;
impl pallet_plasma_vault::PriceOracle<u32> for MockOracle {
  fn asset_price(asset: u32) -> Result<(u128, u8), DispatchError> {
    price_of(asset)
  }
}

#[cfg(feature = "runtime-benchmarks")]
pub struct BenchmarkAuthority;
#[cfg(feature = "runtime-benchmarks")]
impl pallet_plasma_vault::BenchmarkHelper<u64> for BenchmarkAuthority {
  fn authorize(who: &u64, _vault: &u64) {
    for role in [ALPHA_ROLE, FUSE_MANAGER_ROLE, UPDATE_MARKETS_BALANCES_ROLE] {
      pallet_access_manager::RoleMembers::<Test>::insert(
        role,
        who,
        pallet_access_manager::RoleAccess { since: 0, delay: 0 },
      );
    }
  }

  fn fuse_action(vault: &u64, _index: u32) -> (MarketId, Vec<Substrate>, pallet_plasma_vault::FuseAction<u64>) {
    <Assets as Mutate<u64>>::mint_into(USDC, vault, UNIT).expect("benchmark mint");
    let params = PositionParams {
      asset: USDC,
      sub_account: 0,
      amount: UNIT,
    };
    let action = pallet_plasma_vault::FuseAction::enter(
      SUPPLY_FUSE,
      params.encode().try_into().expect("position params fit"),
    );
    (LENDING, alloc::vec![usdc_substrate(0, false)], action)
  }

  fn empty_balance_fuse() -> u64 {
    LENDING_BALANCE_FUSE
  }
}

impl pallet_plasma_vault::Config for Test {
  type Assets = Assets;
  type UnderlyingAsset = ConstU32<USDC>;
  type PriceOracle = MockOracle;
  type Strategies = MockStrategies;
  type BalanceAdapters = MockBalances;
  type Authority = AccessManager;
  type PalletId = PlasmaVaultPalletId;
  type MaxFuses = ConstU32<8>;
  type MaxMarkets = ConstU32<8>;
  type MaxSubstratesPerMarket = ConstU32<8>;
  type MaxDependencies = ConstU32<4>;
  type MaxActions = ConstU32<8>;
  // One cent
  type BalanceFuseDust = ConstU128<{ WAD / 100 }>;
  type WeightInfo = ();
  #[cfg(feature = "runtime-benchmarks")]
  type BenchmarkHelper = BenchmarkAuthority;
}

pub fn usdc_substrate(sub_account: u8, can_borrow: bool) -> Substrate {
  AssetSubstrate::new(USDC, sub_account, can_borrow).to_substrate()
}

/// Lending market with the supply, borrow and transfer fuses, a balance fuse and a single
/// supply-only USDC substrate. USDC trades at exactly one dollar.
pub fn new_test_ext() -> polkadot_sdk::sp_io::TestExternalities {
  let mut t = frame_system::GenesisConfig::<Test>::default()
    .build_storage()
    .unwrap();

  polkadot_sdk::pallet_assets::GenesisConfig::<Test> {
    assets: alloc::vec![(USDC, ADMIN, true, 1)],
    metadata: alloc::vec![(USDC, b"USD Coin".to_vec(), b"USDC".to_vec(), USDC_DECIMALS)],
    accounts: alloc::vec![(USDC, POOL, 1_000_000 * UNIT)],
    reserves: alloc::vec![],
    next_asset_id: None,
  }
  .assimilate_storage(&mut t)
  .unwrap();

  let vault = PlasmaVault::account_id();
  pallet_access_manager::GenesisConfig::<Test> {
    roles: DEFAULT_HIERARCHY.to_vec(),
    minimal_execution_delays: alloc::vec![],
    members: alloc::vec![
      (ADMIN_ROLE, ADMIN, 0),
      (OWNER_ROLE, OWNER, 0),
      (ATOMIST_ROLE, ATOMIST, 0),
      (GUARDIAN_ROLE, GUARDIAN, 0),
      (ALPHA_ROLE, ALPHA, 0),
      (FUSE_MANAGER_ROLE, FUSE_MANAGER, 0),
      (UPDATE_MARKETS_BALANCES_ROLE, UPDATER, 0),
    ],
    function_roles: PlasmaVault::default_function_roles()
      .into_iter()
      .map(|(selector, role)| (vault, selector, role))
      .collect(),
  }
  .assimilate_storage(&mut t)
  .unwrap();

  pallet_plasma_vault::GenesisConfig::<Test> {
    fuses: alloc::vec![SUPPLY_FUSE, BORROW_FUSE, TRANSFER_FUSE],
    balance_fuses: alloc::vec![(LENDING, LENDING_BALANCE_FUSE)],
    market_substrates: alloc::vec![(LENDING, alloc::vec![usdc_substrate(0, false)])],
    dependencies: alloc::vec![],
  }
  .assimilate_storage(&mut t)
  .unwrap();

  NOW.with(|n| n.set(GENESIS_TIME));
  SUPPLIED.with(|s| s.borrow_mut().clear());
  DEBT.with(|d| d.borrow_mut().clear());
  PRICES.with(|p| p.borrow_mut().clear());
  ERC20_USD.with(|v| v.set(0));
  ERC20_FEED_DOWN.with(|v| v.set(false));
  set_price(USDC, 100_000_000, 8);

  t.into()
}
