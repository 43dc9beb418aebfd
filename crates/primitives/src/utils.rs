//! Misc utils

use ethers::{
    types::{Address, U128, U256},
    utils::to_checksum,
};
use std::time::{SystemTime, UNIX_EPOCH};

/// Converts address to checksum address
pub fn as_checksum_addr<S>(val: &Address, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.serialize_str(&to_checksum(val, None))
}

/// If possible, parses address from the first 20 bytes
pub fn get_address(buf: &[u8]) -> Option<Address> {
    if buf.len() >= 20 {
        Some(Address::from_slice(&buf[0..20]))
    } else {
        None
    }
}

/// Packs two uint128 (high and low half of a bytes32 word)
pub fn pack_uint128(a: U256, b: U256) -> [u8; 32] {
    let mut res = [0u8; 32];
    let a: U128 = {
        let mut tem = [0; 32];
        a.to_big_endian(&mut tem);
        U128::from_big_endian(&tem[16..32])
    };
    let b: U128 = {
        let mut tem = [0; 32];
        b.to_big_endian(&mut tem);
        U128::from_big_endian(&tem[16..32])
    };
    a.to_big_endian(&mut res[0..16]);
    b.to_big_endian(&mut res[16..32]);
    res
}

/// Unpacks two uint128 from bytes
pub fn unpack_uint128(buf: &[u8]) -> (U256, U256) {
    let mut a = [0u8; 16];
    let mut b = [0u8; 16];
    a.copy_from_slice(&buf[0..16]);
    b.copy_from_slice(&buf[16..32]);
    (U256::from_big_endian(&a), U256::from_big_endian(&b))
}

/// Seconds since the unix epoch
pub fn unix_timestamp() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or_default()
}
