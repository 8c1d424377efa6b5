use crate::utils::{format_mac, parse_mac};

/// Locally administered bit of the first octet
const LOCAL_ADMIN_BIT: u8 = 0x02;
/// Group (multicast) bit of the first octet
const GROUP_BIT: u8 = 0x01;

/// Derive the lab node's system MAC from the production switch's address.
///
/// The first octet gets the locally administered bit set and the group bit
/// cleared; the rest is copied. MLAG on the virtual platform refuses a
/// system MAC without the LA bit. Returns None for unparseable input.
pub fn synthesize_system_mac(source: &str) -> Option<String> {
    let mut octets = parse_mac(source)?;
    octets[0] = (octets[0] | LOCAL_ADMIN_BIT) & !GROUP_BIT;
    Some(format_mac(&octets))
}

pub fn is_locally_administered(mac: &str) -> bool {
    parse_mac(mac).map_or(false, |o| o[0] & LOCAL_ADMIN_BIT != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sets_local_admin_bit() {
        assert_eq!(synthesize_system_mac("00:1c:73:aa:bb:cc").as_deref(), Some("02:1c:73:aa:bb:cc"));
        assert_eq!(synthesize_system_mac("001c.73aa.bbcc").as_deref(), Some("02:1c:73:aa:bb:cc"));
    }

    #[test]
    fn test_already_local_is_unchanged() {
        assert_eq!(synthesize_system_mac("02:00:00:00:00:01").as_deref(), Some("02:00:00:00:00:01"));
        assert_eq!(synthesize_system_mac("2E:00:00:00:00:01").as_deref(), Some("2e:00:00:00:00:01"));
    }

    #[test]
    fn test_clears_group_bit() {
        assert_eq!(synthesize_system_mac("01:00:5e:00:00:01").as_deref(), Some("02:00:5e:00:00:01"));
    }

    #[test]
    fn test_deterministic_and_always_local() {
        for first in 0u8..=255 {
            let src = format!("{:02x}:1c:73:00:10:20", first);
            let a = synthesize_system_mac(&src).unwrap();
            let b = synthesize_system_mac(&src).unwrap();
            assert_eq!(a, b);
            assert!(is_locally_administered(&a), "{} -> {}", src, a);
        }
    }

    #[test]
    fn test_unparseable() {
        assert_eq!(synthesize_system_mac("unknown"), None);
        assert!(!is_locally_administered("unknown"));
    }
}
