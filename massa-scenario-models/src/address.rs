// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Address layouts shared by the world model, the interpreter and the checks.

/// Every account address is exactly this many bytes long
pub const ADDRESS_LENGTH: usize = 32;

/// Smart contract addresses start with this many zero bytes
pub const SC_ADDRESS_NUM_LEADING_ZEROS: usize = 8;

/// Length of the VM type written right after the leading zeros
pub const VM_TYPE_LENGTH: usize = 2;

/// Account holding protocol-wide ESDT metadata, skipped by state checks
pub const SYSTEM_ACCOUNT_ADDRESS: [u8; ADDRESS_LENGTH] = [0xff; ADDRESS_LENGTH];

/// ESDT system smart contract, the only caller allowed to change token roles
pub const ESDT_SYSTEM_SC_ADDRESS: [u8; ADDRESS_LENGTH] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2, 0xff,
    0xff,
];

/// Storage keys starting with this prefix belong to the protocol
pub const PROTECTED_KEY_PREFIX: &[u8] = b"ELROND";

/// Storage key accumulating validator rewards
pub const REWARD_KEY: &[u8] = b"ELRONDreward";

/// VM type used by the dummy VM: contracts deployed with it carry no VM marker
pub const DUMMY_VM_TYPE: [u8; VM_TYPE_LENGTH] = [0, 0];

/// Returns true if the address has the smart contract layout
pub fn is_smart_contract_address(address: &[u8]) -> bool {
    address.len() == ADDRESS_LENGTH
        && address[..SC_ADDRESS_NUM_LEADING_ZEROS]
            .iter()
            .all(|byte| *byte == 0)
}

/// Deterministic address for a contract deployed by `creator` at `creator_nonce`.
///
/// Bytes 8..10 hold the VM type, 10..14 a fixed marker, 14..29 the head of
/// the creator address, 29 the low byte of the nonce and the last two bytes
/// keep the creator's shard suffix.
pub fn generate_mock_address(creator: &[u8], creator_nonce: u64, vm_type: &[u8]) -> Vec<u8> {
    let mut result = vec![0u8; ADDRESS_LENGTH];
    for byte in result.iter_mut().take(14).skip(10) {
        *byte = 0x11;
    }
    let head_len = creator.len().min(15);
    result[14..14 + head_len].copy_from_slice(&creator[..head_len]);
    result[29] = creator_nonce as u8;
    if creator.len() >= ADDRESS_LENGTH {
        result[30..].copy_from_slice(&creator[30..ADDRESS_LENGTH]);
    }
    let vm_len = vm_type.len().min(VM_TYPE_LENGTH);
    result[SC_ADDRESS_NUM_LEADING_ZEROS..SC_ADDRESS_NUM_LEADING_ZEROS + vm_len]
        .copy_from_slice(&vm_type[..vm_len]);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sc_address_detection() {
        let mut address = [0u8; 32];
        address[20] = b'x';
        assert!(is_smart_contract_address(&address));
        address[3] = 1;
        assert!(!is_smart_contract_address(&address));
        assert!(!is_smart_contract_address(&[0u8; 31]));
        assert!(!is_smart_contract_address(&SYSTEM_ACCOUNT_ADDRESS));
    }

    #[test]
    fn test_generate_mock_address_layout() {
        let mut creator = b"owner".to_vec();
        creator.resize(32, b'_');
        let address = generate_mock_address(&creator, 3, &[5, 0]);
        assert_eq!(address.len(), 32);
        assert!(is_smart_contract_address(&address));
        assert_eq!(&address[8..10], &[5, 0]);
        assert_eq!(&address[10..14], &[0x11; 4]);
        assert_eq!(&address[14..29], &creator[..15]);
        assert_eq!(address[29], 3);
        assert_eq!(&address[30..], &creator[30..]);
    }
}
