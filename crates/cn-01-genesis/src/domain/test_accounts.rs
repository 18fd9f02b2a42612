//! Prefunded development accounts.
//!
//! The first ten accounts of the public test mnemonic
//! `test test test test test test test test test test test junk`
//! (derivation path `m/44'/60'/0'/0/i`). Their private keys are public, so
//! seeding them is only acceptable on throwaway networks; the builder exposes
//! `include_test_accounts` to switch it off.

use primitive_types::U256;
use shared_types::Address;

const TEST_ACCOUNT_ADDRESSES: [&str; 10] = [
    "f39fd6e51aad88f6f4ce6ab8827279cfffb92266",
    "70997970c51812dc3a010c7d01b50e0d17dc79c8",
    "3c44cdddb6a900fa2b585dd299e03d12fa4293bc",
    "90f79bf6eb2c4f870365e785982e1f101e93b906",
    "15d34aaf54267db7d7c367839aaf71a00a2c6a65",
    "9965507d1a55bcc2695c58ba16fb37d819b0a4dc",
    "976ea74026e726554db657fa54763abd0c3a0aa9",
    "14dc79964da2c08b23698b3d3cc7ca32193d9955",
    "23618e81e3f5cdf7f54c3d65f7fbc0abf5b21e8f",
    "a0ee7a142d267c1f36714e4a8f75612f20a79720",
];

/// 10,000 ether in wei.
pub fn test_account_balance() -> U256 {
    U256::exp10(22)
}

/// The fixed test accounts, in derivation order.
pub fn test_accounts() -> Vec<Address> {
    TEST_ACCOUNT_ADDRESSES
        .iter()
        .filter_map(|raw| Address::from_hex(raw).ok())
        .collect()
}
