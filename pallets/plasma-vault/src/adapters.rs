//! Adapter traits for the plasma vault.
//!
//! Fuses are plain accounts. The runtime binds each of them to protocol code through
//! these static traits, so the vault never calls into anything it cannot name.

use crate::types::FuseActionKind;
use alloc::vec::Vec;
use frame::prelude::*;
use primitives::{MarketId, Substrate};

/// Strategy side of a fuse: the market it belongs to and how it moves capital.
pub trait StrategyAdapter<AccountId> {
  /// Market the fuse operates in, `None` for unknown fuses.
  fn market_id(fuse: &AccountId) -> Option<MarketId>;

  /// Every substrate the action touches. The vault checks each against the market's
  /// granted set before dispatching.
  fn substrates(
    fuse: &AccountId,
    kind: FuseActionKind,
    data: &[u8],
  ) -> Result<Vec<Substrate>, DispatchError>;

  fn enter(fuse: &AccountId, vault: &AccountId, data: &[u8]) -> DispatchResult;

  fn exit(fuse: &AccountId, vault: &AccountId, data: &[u8]) -> DispatchResult;
}

/// Balance side of a market.
pub trait BalanceAdapter<AccountId> {
  /// Net USD value (18 decimals) the vault holds in `market_id`, computed over the
  /// market's granted substrates. Debt on borrow-enabled substrates is subtracted;
  /// a negative net must be reported as an error.
  fn balance_of(
    fuse: &AccountId,
    vault: &AccountId,
    market_id: MarketId,
    substrates: &[Substrate],
  ) -> Result<u128, DispatchError>;
}

/// USD price feed.
pub trait PriceOracle<AssetId> {
  /// `(price, price_decimals)` of one whole unit of `asset`.
  fn asset_price(asset: AssetId) -> Result<(u128, u8), DispatchError>;
}

/// No-op adapters for configurations without integrations.
impl<AccountId> StrategyAdapter<AccountId> for () {
  fn market_id(_: &AccountId) -> Option<MarketId> {
    None
  }

  fn substrates(_: &AccountId, _: FuseActionKind, _: &[u8]) -> Result<Vec<Substrate>, DispatchError> {
    Ok(Vec::new())
  }

  fn enter(_: &AccountId, _: &AccountId, _: &[u8]) -> DispatchResult {
    Err(DispatchError::Other("no strategies"))
  }

  fn exit(_: &AccountId, _: &AccountId, _: &[u8]) -> DispatchResult {
    Err(DispatchError::Other("no strategies"))
  }
}

impl<AccountId> BalanceAdapter<AccountId> for () {
  fn balance_of(_: &AccountId, _: &AccountId, _: MarketId, _: &[Substrate]) -> Result<u128, DispatchError> {
    Ok(0)
  }
}

impl<AssetId> PriceOracle<AssetId> for () {
  fn asset_price(_: AssetId) -> Result<(u128, u8), DispatchError> {
    Err(DispatchError::Other("no price oracle"))
  }
}
