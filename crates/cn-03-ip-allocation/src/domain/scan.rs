//! Address scan.
//!
//! Host octets `10..=254` of the subnet's first `/24` are tried in order,
//! then the same octets of the next `/24` of the enclosing `/16`. Candidates
//! outside the subnet are skipped, so a `/24` network only has its own block
//! and narrower networks only the hosts they contain.

use std::collections::BTreeSet;
use std::net::Ipv4Addr;

use shared_types::Ipv4Subnet;

/// First host octet handed out; lower ones are left to the gateway and
/// manual assignments.
pub const FIRST_HOST_OCTET: u8 = 10;
/// Last host octet handed out.
pub const LAST_HOST_OCTET: u8 = 254;

/// `(a, b, c)` prefixes of the `/24` blocks scanned for `subnet`.
pub fn candidate_blocks(subnet: &Ipv4Subnet) -> Vec<[u8; 3]> {
    let [a, b, c, _] = subnet.network().octets();
    let mut blocks = vec![[a, b, c]];
    if let Some(next) = c.checked_add(1) {
        if subnet.contains(Ipv4Addr::new(a, b, next, FIRST_HOST_OCTET)) {
            blocks.push([a, b, next]);
        }
    }
    blocks
}

/// First address in `subnet` not present in `taken`.
pub fn find_free_address(subnet: &Ipv4Subnet, taken: &BTreeSet<Ipv4Addr>) -> Option<Ipv4Addr> {
    candidate_blocks(subnet).into_iter().find_map(|[a, b, c]| {
        (FIRST_HOST_OCTET..=LAST_HOST_OCTET)
            .map(|d| Ipv4Addr::new(a, b, c, d))
            .find(|ip| subnet.contains(*ip) && !taken.contains(ip))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subnet(raw: &str) -> Ipv4Subnet {
        raw.parse().unwrap()
    }

    fn block(a: u8, b: u8, c: u8) -> BTreeSet<Ipv4Addr> {
        (FIRST_HOST_OCTET..=LAST_HOST_OCTET)
            .map(|d| Ipv4Addr::new(a, b, c, d))
            .collect()
    }

    #[test]
    fn test_first_free_is_dot_ten() {
        let ip = find_free_address(&subnet("10.5.0.0/16"), &BTreeSet::new());
        assert_eq!(ip, Some(Ipv4Addr::new(10, 5, 0, 10)));
    }

    #[test]
    fn test_skips_taken() {
        let taken: BTreeSet<_> = [Ipv4Addr::new(10, 5, 0, 10), Ipv4Addr::new(10, 5, 0, 11)].into();
        let ip = find_free_address(&subnet("10.5.0.0/16"), &taken);
        assert_eq!(ip, Some(Ipv4Addr::new(10, 5, 0, 12)));
    }

    #[test]
    fn test_falls_back_to_secondary_block() {
        let ip = find_free_address(&subnet("10.5.0.0/16"), &block(10, 5, 0));
        assert_eq!(ip, Some(Ipv4Addr::new(10, 5, 1, 10)));
    }

    #[test]
    fn test_exhausted_after_both_blocks() {
        let mut taken = block(10, 5, 0);
        taken.extend(block(10, 5, 1));
        assert_eq!(find_free_address(&subnet("10.5.0.0/16"), &taken), None);
    }

    #[test]
    fn test_slash_24_has_single_block() {
        let net = subnet("192.168.7.0/24");
        assert_eq!(candidate_blocks(&net), vec![[192, 168, 7]]);
        assert_eq!(find_free_address(&net, &block(192, 168, 7)), None);
    }

    #[test]
    fn test_narrow_subnet_stays_inside() {
        let net = subnet("10.9.0.0/28");
        let ip = find_free_address(&net, &BTreeSet::new()).unwrap();
        assert_eq!(ip, Ipv4Addr::new(10, 9, 0, 10));
        let taken: BTreeSet<_> = (10..=15).map(|d| Ipv4Addr::new(10, 9, 0, d)).collect();
        assert_eq!(find_free_address(&net, &taken), None);
    }
}
