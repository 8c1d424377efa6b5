/// Maps the many spellings of a device identity onto one canonical key.
///
/// LLDP reports either the FQDN or the short hostname depending on how the
/// neighbor is configured, so identity comparison goes through this trait.
pub trait IdentityResolver: Send + Sync {
    fn canonical(&self, identity: &str) -> String;

    fn same_device(&self, a: &str, b: &str) -> bool {
        self.canonical(a) == self.canonical(b)
    }
}

/// Case-insensitive short hostname: "Leaf1.dc1.example.net" -> "leaf1".
/// IP-literal identities are kept whole.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortNameResolver;

impl IdentityResolver for ShortNameResolver {
    fn canonical(&self, identity: &str) -> String {
        let id = identity.trim().trim_end_matches('.').to_lowercase();
        if id.parse::<std::net::IpAddr>().is_ok() {
            return id;
        }
        match id.split_once('.') {
            Some((short, _)) if !short.is_empty() => short.to_string(),
            _ => id,
        }
    }
}

/// Exact (case-insensitive) comparison, for inventories where short names collide
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactResolver;

impl IdentityResolver for ExactResolver {
    fn canonical(&self, identity: &str) -> String {
        identity.trim().trim_end_matches('.').to_lowercase()
    }
}
