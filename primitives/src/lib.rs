#![cfg_attr(not(feature = "std"), no_std)]

pub mod markets;
pub mod math;
pub mod roles;

pub use markets::{AssetSubstrate, MarketId, Substrate};
pub use roles::{Delay, RoleId, Selector};

/// Pallet identifiers for deriving pallet-owned accounts.
///
/// The first four bytes must stay distinct: `into_account_truncating` keeps only
/// a prefix of the identifier on short account types.
pub mod pallet_ids {
  /// Access manager pallet ID, also the target id of its own admin functions
  pub const ACCESS_MANAGER_PALLET_ID: &[u8; 8] = b"acmgr000";

  /// Plasma vault pallet ID, custody account of the vault's underlying cash
  pub const PLASMA_VAULT_PALLET_ID: &[u8; 8] = b"plvault0";
}
