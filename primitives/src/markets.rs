//! Market identifiers and the substrate codec.
//!
//! A substrate is an opaque 32-byte word granted to a market. Fuses that deal
//! with plain assets use the [`AssetSubstrate`] layout:
//!
//! ```text
//! [0..4]  asset id, big-endian
//! [4]     sub-account id
//! [5]     flags, bit 0 = borrow enabled
//! [6..32] zero
//! ```

use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

/// Integration market identifier. Zero is never a valid market.
pub type MarketId = u32;

/// Market-scoped permission word.
pub type Substrate = [u8; 32];

pub const AAVE_V3_MARKET: MarketId = 1;
pub const MOONWELL_MARKET: MarketId = 2;
pub const DOLOMITE_MARKET: MarketId = 3;
pub const RAMSES_V2_POSITIONS_MARKET: MarketId = 4;
pub const ODOS_SWAPPER_MARKET: MarketId = 5;
/// Tokens held directly by the vault other than the underlying.
pub const ERC20_VAULT_BALANCE_MARKET: MarketId = 7;

const FLAG_CAN_BORROW: u8 = 0b0000_0001;

/// Asset permission decoded from a [`Substrate`].
#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Default,
  Deserialize,
  Encode,
  Eq,
  MaxEncodedLen,
  Ord,
  PartialEq,
  PartialOrd,
  Serialize,
  TypeInfo,
)]
pub struct AssetSubstrate {
  pub asset: u32,
  pub sub_account: u8,
  pub can_borrow: bool,
}

impl AssetSubstrate {
  pub const fn new(asset: u32, sub_account: u8, can_borrow: bool) -> Self {
    Self {
      asset,
      sub_account,
      can_borrow,
    }
  }

  pub fn to_substrate(&self) -> Substrate {
    let mut out = [0u8; 32];
    out[..4].copy_from_slice(&self.asset.to_be_bytes());
    out[4] = self.sub_account;
    if self.can_borrow {
      out[5] = FLAG_CAN_BORROW;
    }
    out
  }

  /// Rejects words with unknown flag bits or non-zero padding.
  pub fn from_substrate(substrate: &Substrate) -> Option<Self> {
    if substrate[5] & !FLAG_CAN_BORROW != 0 || substrate[6..].iter().any(|b| *b != 0) {
      return None;
    }
    let mut asset = [0u8; 4];
    asset.copy_from_slice(&substrate[..4]);
    Some(Self {
      asset: u32::from_be_bytes(asset),
      sub_account: substrate[4],
      can_borrow: substrate[5] & FLAG_CAN_BORROW != 0,
    })
  }
}

/// Substrate for `asset` on the default sub-account without borrowing.
pub fn asset_substrate(asset: u32) -> Substrate {
  AssetSubstrate::new(asset, 0, false).to_substrate()
}
