//! Hashing

use super::common::Float;

const MURMUR_M: u64 = 0xc6a4a7935bd1e995;
const MURMUR_R: u32 = 47;

/// 64-bit MurmurHash2 (variant 64A) of a byte slice.
///
/// * `key`  - Bytes to hash.
/// * `seed` - Hash seed.
pub fn murmur_hash64a(key: &[u8], seed: u64) -> u64 {
    murmur_hash64a_stream(key.len(), key.iter().copied(), seed)
}

/// MurmurHash64A over `len` bytes produced by an iterator, consumed eight
/// at a time through a stack buffer.
///
/// * `len`   - Number of bytes `bytes` yields.
/// * `bytes` - Bytes to hash.
/// * `seed`  - Hash seed.
fn murmur_hash64a_stream<I: Iterator<Item = u8>>(len: usize, bytes: I, seed: u64) -> u64 {
    let mut h = seed ^ (len as u64).wrapping_mul(MURMUR_M);

    let mut buf = [0_u8; 8];
    let mut n = 0;
    for b in bytes {
        buf[n] = b;
        n += 1;
        if n == 8 {
            let mut k = u64::from_le_bytes(buf);
            k = k.wrapping_mul(MURMUR_M);
            k ^= k >> MURMUR_R;
            k = k.wrapping_mul(MURMUR_M);
            h ^= k;
            h = h.wrapping_mul(MURMUR_M);
            n = 0;
        }
    }

    if n > 0 {
        for (i, &b) in buf[..n].iter().enumerate() {
            h ^= (b as u64) << (8 * i);
        }
        h = h.wrapping_mul(MURMUR_M);
    }

    h ^= h >> MURMUR_R;
    h = h.wrapping_mul(MURMUR_M);
    h ^= h >> MURMUR_R;
    h
}

/// Scrambles the bits of a 64-bit value.
///
/// * `v` - The value.
#[inline]
pub fn mix_bits(v: u64) -> u64 {
    let mut v = v;
    v ^= v >> 31;
    v = v.wrapping_mul(0x7fb5d329728ea185);
    v ^= v >> 27;
    v = v.wrapping_mul(0x81dadef4bc2dd44d);
    v ^= v >> 33;
    v
}

/// Hashes a list of floating point values by their bit patterns.
///
/// * `values` - The values.
pub fn hash_floats(values: &[Float]) -> u64 {
    let bytes = values.iter().flat_map(|v| v.to_le_bytes());
    murmur_hash64a_stream(4 * values.len(), bytes, 0)
}

/// Hashes an integer seed followed by a list of floating point values.
///
/// * `seed`   - Integer seed mixed in ahead of the values.
/// * `values` - The values.
pub fn hash_seeded(seed: i64, values: &[Float]) -> u64 {
    let bytes = seed
        .to_le_bytes()
        .into_iter()
        .chain(values.iter().flat_map(|v| v.to_le_bytes()));
    murmur_hash64a_stream(8 + 4 * values.len(), bytes, 0)
}
