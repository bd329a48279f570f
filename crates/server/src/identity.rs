use async_trait::async_trait;
use floe_common::models::Role;
use floe_core::IdentityResolver;
use std::collections::HashMap;

/// Identity collaborator backed by the static identity table from
/// configuration. Credentials are verified by the gateway in front of
/// this service; this resolver only maps verified usernames to roles.
pub struct StaticIdentityResolver {
    identities: HashMap<String, Role>,
}

impl StaticIdentityResolver {
    pub fn new(identities: HashMap<String, Role>) -> Self {
        Self { identities }
    }
}

#[async_trait]
impl IdentityResolver for StaticIdentityResolver {
    async fn resolve(&self, identity: &str) -> Option<Role> {
        self.identities.get(identity).copied()
    }
}
