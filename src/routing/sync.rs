use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use crate::{
    error::Error,
    gateway::{client::GatewayClientRequest, resource::HttpRoute},
    logger,
};

use super::{
    codec::Codec,
    model::{Pool, RoutingConfig},
};

/// Orchestrates "apply a local rule-set change" as one read-fresh,
/// recompute, write-back cycle against the remote resource.
///
/// Re-reading before every write is the correctness mechanism here: it keeps
/// a stale local copy from clobbering rule edits made elsewhere between two
/// of our own cycles. Cycles for the same `namespace/name` are serialized
/// within the process; there is no cross-process exclusion and no
/// resourceVersion assertion on write (last-write-wins, see DESIGN.md).
pub struct Synchronizer<C> {
    client: C,
    codec: Codec,
    fallback_pool: Pool,
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl<C> Synchronizer<C>
where
    C: GatewayClientRequest,
{
    pub fn new(client: C, codec: Codec) -> Self {
        Self {
            client,
            codec,
            fallback_pool: Pool::Blue,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_fallback_pool(mut self, pool: Pool) -> Self {
        self.fallback_pool = pool;
        self
    }

    fn resource_lock(&self, namespace: &str, name: &str) -> Arc<tokio::sync::Mutex<()>> {
        let key = format!("{}/{}", namespace, name);

        let mut locks = self.locks.lock().expect("resource lock map poisoned");

        locks.entry(key).or_default().clone()
    }

    /// Reads and decodes the current remote routing intent.
    pub async fn fetch_config(&self, namespace: &str, name: &str) -> Result<RoutingConfig, Error> {
        let resource = self.client.get_route(namespace, name).await?;

        Ok(self.codec.decode(&resource, self.fallback_pool.clone()))
    }

    /// Fetches the current resource, decodes it, applies `mutate`, and
    /// merge-patches the re-encoded rules back.
    ///
    /// Any failure short-circuits: the store is only changed by a successful
    /// final write. A `mutate` error (validation) is returned before any
    /// write goes out.
    pub async fn apply_rule_change<F>(
        &self,
        namespace: &str,
        name: &str,
        mutate: F,
    ) -> Result<RoutingConfig, Error>
    where
        F: FnOnce(&mut RoutingConfig) -> Result<(), Error>,
    {
        let lock = self.resource_lock(namespace, name);
        let _guard = lock.lock().await;

        logger!(debug, "apply rule change {}/{}", namespace, name);

        let resource = self.client.get_route(namespace, name).await?;

        let mut config = self.codec.decode(&resource, self.fallback_pool.clone());

        mutate(&mut config)?;

        let patch = self.codec.encode_patch(&config);

        self.client.patch_route_spec(namespace, name, &patch).await?;

        logger!(info, "patched {} rules to {}/{}", patch.rules.len(), namespace, name);

        Ok(config)
    }

    /// Full read-modify-write through PUT: re-fetches the resource, encodes
    /// `config` against it so unrelated fields are preserved, and replaces
    /// the stored document.
    pub async fn replace(
        &self,
        namespace: &str,
        name: &str,
        config: &RoutingConfig,
    ) -> Result<HttpRoute, Error> {
        let lock = self.resource_lock(namespace, name);
        let _guard = lock.lock().await;

        let prior = self.client.get_route(namespace, name).await?;

        let encoded = self.codec.encode(config, &prior);

        self.client.replace_route(namespace, name, &encoded).await
    }
}
