//! Catalogue of the events emitted by the vault program.

/// Fractional bits of the vault program's `u128` fixed-point fields
/// (6 fractional bytes).
pub const DECIMAL_FRACTIONAL_BITS: u32 = 8 * 6;

/// Fields carrying a `u128` fixed-point quantity rather than a plain count.
pub const VAULT_DECIMAL_FIELDS: &[&str] = &[
    "vaultHighestAssetPerLpDecimalBitsBefore",
    "vaultHighestAssetPerLpDecimalBitsAfter",
    "amountAssetToWithdrawDecimalBits",
];

/// Field-name prefixes that mark storage alignment data.
pub const SUPPRESSED_PREFIXES: &[&str] = &["padding", "_padding", "reserved", "_reserved"];

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::AsRefStr,
)]
#[strum(serialize_all = "camelCase")]
pub enum VaultEvent {
    AddAdaptorEvent,
    CancelRequestWithdrawVaultEvent,
    CloseStrategyEvent,
    DepositStrategyEvent,
    DepositVaultEvent,
    DirectWithdrawStrategyEvent,
    HarvestFeeEvent,
    InitProtocolEvent,
    InitializeDirectWithdrawStrategyEvent,
    InitializeStrategyEvent,
    InitializeVaultEvent,
    RemoveAdaptorEvent,
    RequestWithdrawVaultEvent,
    UpdateProtocolEvent,
    UpdateVaultEvent,
    WithdrawStrategyEvent,
    WithdrawVaultEvent,
}

impl VaultEvent {
    pub fn from_name(name: &str) -> Option<Self> {
        name.parse().ok()
    }

    pub fn all() -> &'static [VaultEvent] {
        &[
            Self::AddAdaptorEvent,
            Self::CancelRequestWithdrawVaultEvent,
            Self::CloseStrategyEvent,
            Self::DepositStrategyEvent,
            Self::DepositVaultEvent,
            Self::DirectWithdrawStrategyEvent,
            Self::HarvestFeeEvent,
            Self::InitProtocolEvent,
            Self::InitializeDirectWithdrawStrategyEvent,
            Self::InitializeStrategyEvent,
            Self::InitializeVaultEvent,
            Self::RemoveAdaptorEvent,
            Self::RequestWithdrawVaultEvent,
            Self::UpdateProtocolEvent,
            Self::UpdateVaultEvent,
            Self::WithdrawStrategyEvent,
            Self::WithdrawVaultEvent,
        ]
    }

    /// The decimal field set is shared by every vault event.
    pub fn decimal_fields(self) -> &'static [&'static str] {
        VAULT_DECIMAL_FIELDS
    }
}
