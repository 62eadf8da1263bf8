// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! ESDT token data kept in account storage.

pub mod codec;
pub mod storage;

pub use codec::{EsdtMetadata, EsdtToken};
pub use storage::{
    esdt_last_nonce_key, esdt_roles_key, esdt_token_key, nonce_to_bytes, FullEsdtData,
};

/// Identifier moving EGLD inside a multi-transfer
pub const EGLD_TOKEN_IDENTIFIER: &[u8] = b"EGLD-000000";

/// Highest royalties value, 100.00%
pub const MAX_ROYALTIES: u64 = 10_000;

/// Role names granting token operations
pub mod roles {
    pub const LOCAL_MINT: &[u8] = b"ESDTRoleLocalMint";
    pub const LOCAL_BURN: &[u8] = b"ESDTRoleLocalBurn";
    pub const NFT_CREATE: &[u8] = b"ESDTRoleNFTCreate";
    pub const NFT_ADD_QUANTITY: &[u8] = b"ESDTRoleNFTAddQuantity";
    pub const NFT_BURN: &[u8] = b"ESDTRoleNFTBurn";
    pub const NFT_ADD_URI: &[u8] = b"ESDTRoleNFTAddURI";
    pub const NFT_UPDATE_ATTRIBUTES: &[u8] = b"ESDTRoleNFTUpdateAttributes";
    pub const TRANSFER: &[u8] = b"ESDTTransferRole";
}
