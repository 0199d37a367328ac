//! Reversible run codes for sharing a seed.
//! Code format: CR-<WORD><NN>, e.g. CR-BEACON42

fn fnv1a64(bytes: &[u8]) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0100_0000_01b3;
    let mut hash = FNV_OFFSET;
    for b in bytes {
        hash = (hash ^ u64::from(*b)).wrapping_mul(FNV_PRIME);
    }
    hash
}

fn sanitize_word(word: &str) -> String {
    word.chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

pub const CODE_PREFIX: &str = "CR";

pub const WORD_LIST: [&str; 48] = [
    "BEACON", "BUNKER", "CIPHER", "CURFEW", "DECREE", "DRONE", "EMBARGO", "FIREWAL", "GRID",
    "HARBOR", "INTEL", "LEDGER", "MANDATE", "MEMO", "OUTAGE", "PATROL", "PERMIT", "QUORUM",
    "RADAR", "RELAY", "SENTRY", "SIGNAL", "SUNSET", "APPEAL", "TRUST", "VIGIL", "WARRANT",
    "ARCHIVE", "BALLOT", "BRIEF", "CABINET", "CHARTER", "COUNCIL", "DISPATC", "ESCROW", "FORUM",
    "GAZETTE", "HOTLINE", "ISLAND", "JURY", "KEYSTON", "LANTERN", "MARSHAL", "NOTICE", "ORACLE",
    "PRESS", "RECORD", "SHIELD",
];

#[inline]
fn pack(word_index: u16, nn: u8) -> u16 {
    word_index & 0x01FF | ((u16::from(nn) & 0x7F) << 9)
}

#[inline]
fn unpack(packed: u16) -> (u16, u8) {
    (packed & 0x01FF, ((packed >> 9) & 0x7F) as u8)
}

fn compose_seed(word_index: u16, nn: u8) -> u64 {
    let packed = pack(word_index, nn);
    let mut buf = [0u8; 9];
    buf[..6].copy_from_slice(b"CRISIS");
    buf[6] = (packed & 0xFF) as u8;
    buf[7] = (packed >> 8) as u8;
    buf[8] = 0x5A;
    let h = fnv1a64(&buf);
    (h & 0xFFFF_FFFF_FFFF_0000) | u64::from(packed)
}

/// Render the run code for a seed. Only the low bits survive, so arbitrary
/// seeds map onto the code space; decode the code to get the canonical seed.
#[must_use]
pub fn encode_friendly(seed: u64) -> String {
    let packed = (seed & 0xFFFF) as u16;
    let (wi, mut nn) = unpack(packed);
    let word = WORD_LIST
        .get(usize::from(wi) % WORD_LIST.len())
        .copied()
        .unwrap_or("BEACON");
    if nn > 99 {
        nn %= 100;
    }
    format!("{CODE_PREFIX}-{word}{nn:02}")
}

#[must_use]
pub fn decode_to_seed(code: &str) -> Option<u64> {
    let s = code.trim();
    let (prefix, rest) = s.split_once('-')?;
    if !prefix.eq_ignore_ascii_case(CODE_PREFIX) || !rest.is_ascii() || rest.len() < 3 {
        return None;
    }
    let (word_part, nn_part) = rest.split_at(rest.len() - 2);
    let nn: u8 = nn_part.parse().ok()?;
    let word = sanitize_word(word_part);
    let idx = WORD_LIST.iter().position(|w| sanitize_word(w) == word)?;
    let wi = u16::try_from(idx).ok()?;
    Some(compose_seed(wi, nn))
}

#[must_use]
pub fn generate_code_from_entropy(entropy: u64) -> String {
    let wi = u16::try_from(entropy % WORD_LIST.len() as u64).unwrap_or(0);
    let nn = ((entropy >> 17) % 100) as u8;
    encode_friendly(compose_seed(wi, nn))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decoded_codes_reencode_identically() {
        let seed = decode_to_seed("CR-BEACON42").unwrap();
        assert_eq!(encode_friendly(seed), "CR-BEACON42");
        let seed = decode_to_seed("cr-shield07").unwrap();
        assert_eq!(encode_friendly(seed), "CR-SHIELD07");
    }

    #[test]
    fn rejects_foreign_or_garbled_codes() {
        assert!(decode_to_seed("DP-ORANGE42").is_none());
        assert!(decode_to_seed("CR-NOTAWORD11").is_none());
        assert!(decode_to_seed("CR-X").is_none());
    }

    #[test]
    fn non_ascii_codes_decode_to_none() {
        assert!(decode_to_seed("CR-xéa").is_none());
        assert!(decode_to_seed("CR-BEACON4é").is_none());
        assert!(decode_to_seed("CR-ÉÉ").is_none());
    }

    #[test]
    fn entropy_codes_are_decodable() {
        let code = generate_code_from_entropy(0xDEAD_BEEF);
        let seed = decode_to_seed(&code).unwrap();
        assert_eq!(encode_friendly(seed), code);
    }
}
