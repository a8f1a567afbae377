//! WAD (18-decimal) fixed-point helpers used by balance aggregation.

use sp_arithmetic::{Rounding, helpers_128bit::multiply_by_rational_with_rounding};

pub const WAD_DECIMALS: u8 = 18;
pub const WAD: u128 = 1_000_000_000_000_000_000;

fn pow10(decimals: u8) -> Option<u128> {
  10u128.checked_pow(u32::from(decimals))
}

/// Scales `amount` expressed with `decimals` to 18 decimals.
pub fn to_wad(amount: u128, decimals: u8) -> Option<u128> {
  if decimals <= WAD_DECIMALS {
    amount.checked_mul(pow10(WAD_DECIMALS - decimals)?)
  } else {
    Some(amount / pow10(decimals - WAD_DECIMALS)?)
  }
}

/// Scales an 18-decimal `value` down (or up) to `decimals`, rounding down.
pub fn from_wad(value: u128, decimals: u8) -> Option<u128> {
  if decimals <= WAD_DECIMALS {
    Some(value / pow10(WAD_DECIMALS - decimals)?)
  } else {
    value.checked_mul(pow10(decimals - WAD_DECIMALS)?)
  }
}

/// Converts a USD WAD value into WAD units of an asset priced at
/// `price / 10^price_decimals` USD.
pub fn usd_to_asset_wad(usd_wad: u128, price: u128, price_decimals: u8) -> Option<u128> {
  if price == 0 {
    return None;
  }
  multiply_by_rational_with_rounding(usd_wad, pow10(price_decimals)?, price, Rounding::Down)
}

/// USD WAD value of `amount` of an asset with `decimals`.
pub fn asset_to_usd_wad(amount: u128, decimals: u8, price: u128, price_decimals: u8) -> Option<u128> {
  multiply_by_rational_with_rounding(
    to_wad(amount, decimals)?,
    price,
    pow10(price_decimals)?,
    Rounding::Down,
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn wad_scaling_follows_decimals() {
    assert_eq!(to_wad(1_000_000, 6), Some(WAD));
    assert_eq!(from_wad(WAD, 6), Some(1_000_000));
    assert_eq!(to_wad(5, 20), Some(0));
    assert_eq!(from_wad(1, 20), Some(100));
    assert_eq!(to_wad(u128::MAX, 6), None);
  }

  #[test]
  fn usd_conversion_uses_oracle_price() {
    // 2 USD per unit, 8 price decimals
    let usd = asset_to_usd_wad(3_000_000, 6, 200_000_000, 8);
    assert_eq!(usd, Some(6 * WAD));
    assert_eq!(usd_to_asset_wad(6 * WAD, 200_000_000, 8), Some(3 * WAD));
    assert_eq!(usd_to_asset_wad(WAD, 0, 8), None);
  }
}
