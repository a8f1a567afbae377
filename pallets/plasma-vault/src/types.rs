use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use frame::prelude::{BoundedVec, ConstU32};
use scale_info::TypeInfo;

/// Upper bound of the opaque payload handed to a fuse.
pub const MAX_ACTION_DATA_LEN: u32 = 1024;

pub type ActionData = BoundedVec<u8, ConstU32<MAX_ACTION_DATA_LEN>>;

#[derive(
  Clone, Copy, Debug, Decode, DecodeWithMemTracking, Encode, Eq, MaxEncodedLen, PartialEq, TypeInfo,
)]
pub enum FuseActionKind {
  /// Deploy capital into the fuse's market
  Enter,
  /// Withdraw capital from the fuse's market
  Exit,
}

/// One step of an `execute` batch.
#[derive(
  Clone, Debug, Decode, DecodeWithMemTracking, Encode, Eq, MaxEncodedLen, PartialEq, TypeInfo,
)]
pub struct FuseAction<AccountId> {
  pub fuse: AccountId,
  pub kind: FuseActionKind,
  /// Fuse-specific parameters, SCALE encoded
  pub data: ActionData,
}

impl<AccountId> FuseAction<AccountId> {
  pub fn enter(fuse: AccountId, data: ActionData) -> Self {
    Self {
      fuse,
      kind: FuseActionKind::Enter,
      data,
    }
  }

  pub fn exit(fuse: AccountId, data: ActionData) -> Self {
    Self {
      fuse,
      kind: FuseActionKind::Exit,
      data,
    }
  }
}
