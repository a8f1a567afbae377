//! Role identifiers and the default governance hierarchy.
//!
//! Roles are plain integers. The access manager treats only [`ADMIN_ROLE`] and
//! [`PUBLIC_ROLE`] specially; every other id gets its meaning from the function
//! roles assigned to it.

/// Identifier of a governance role.
pub type RoleId = u64;

/// Execution or grant delay in seconds.
pub type Delay = u32;

/// First four bytes of the blake2-256 hash of a call name.
pub type Selector = [u8; 4];

/// Self-administering root role.
pub const ADMIN_ROLE: RoleId = 0;
pub const OWNER_ROLE: RoleId = 1;
pub const GUARDIAN_ROLE: RoleId = 2;
pub const TECH_PLASMA_VAULT_ROLE: RoleId = 3;
pub const IPOR_DAO_ROLE: RoleId = 4;
pub const ATOMIST_ROLE: RoleId = 100;
pub const ALPHA_ROLE: RoleId = 200;
pub const FUSE_MANAGER_ROLE: RoleId = 300;
pub const PRE_HOOKS_MANAGER_ROLE: RoleId = 301;
pub const TECH_PERFORMANCE_FEE_MANAGER_ROLE: RoleId = 400;
pub const TECH_MANAGEMENT_FEE_MANAGER_ROLE: RoleId = 500;
pub const CLAIM_REWARDS_ROLE: RoleId = 600;
pub const TECH_REWARDS_CLAIM_MANAGER_ROLE: RoleId = 601;
pub const TRANSFER_REWARDS_ROLE: RoleId = 700;
pub const WHITELIST_ROLE: RoleId = 800;
pub const CONFIG_INSTANT_WITHDRAWAL_FUSES_ROLE: RoleId = 900;
pub const UPDATE_MARKETS_BALANCES_ROLE: RoleId = 1000;
pub const UPDATE_REWARDS_BALANCE_ROLE: RoleId = 1100;
/// Held implicitly by every account with zero execution delay.
pub const PUBLIC_ROLE: RoleId = u64::MAX;

/// Default `(role, admin, guardian)` triples seeded into the access manager.
///
/// ADMIN administers OWNER, OWNER administers ATOMIST and GUARDIAN, and ATOMIST
/// administers the operational roles. GUARDIAN may cancel anything scheduled
/// under an operational role.
pub const DEFAULT_HIERARCHY: &[(RoleId, RoleId, RoleId)] = &[
  (OWNER_ROLE, ADMIN_ROLE, GUARDIAN_ROLE),
  (GUARDIAN_ROLE, OWNER_ROLE, ADMIN_ROLE),
  (ATOMIST_ROLE, OWNER_ROLE, GUARDIAN_ROLE),
  (ALPHA_ROLE, ATOMIST_ROLE, GUARDIAN_ROLE),
  (FUSE_MANAGER_ROLE, ATOMIST_ROLE, GUARDIAN_ROLE),
  (PRE_HOOKS_MANAGER_ROLE, ATOMIST_ROLE, GUARDIAN_ROLE),
  (TECH_PERFORMANCE_FEE_MANAGER_ROLE, ATOMIST_ROLE, GUARDIAN_ROLE),
  (TECH_MANAGEMENT_FEE_MANAGER_ROLE, ATOMIST_ROLE, GUARDIAN_ROLE),
  (CLAIM_REWARDS_ROLE, ATOMIST_ROLE, GUARDIAN_ROLE),
  (TECH_REWARDS_CLAIM_MANAGER_ROLE, ATOMIST_ROLE, GUARDIAN_ROLE),
  (TRANSFER_REWARDS_ROLE, ATOMIST_ROLE, GUARDIAN_ROLE),
  (WHITELIST_ROLE, ATOMIST_ROLE, GUARDIAN_ROLE),
  (CONFIG_INSTANT_WITHDRAWAL_FUSES_ROLE, ATOMIST_ROLE, GUARDIAN_ROLE),
  (UPDATE_MARKETS_BALANCES_ROLE, ATOMIST_ROLE, GUARDIAN_ROLE),
  (UPDATE_REWARDS_BALANCE_ROLE, ATOMIST_ROLE, GUARDIAN_ROLE),
];

/// Admin role of `role` under [`DEFAULT_HIERARCHY`].
pub fn default_role_admin(role: RoleId) -> RoleId {
  DEFAULT_HIERARCHY
    .iter()
    .find(|(r, _, _)| *r == role)
    .map(|(_, admin, _)| *admin)
    .unwrap_or(ADMIN_ROLE)
}
