//! Per-chain RPC endpoint pool with deterministic failover selection.
//!
//! Selection is on every scan's hot path, so the pool is read-mostly: a
//! read lock covers selection and listing, the write lock only admin
//! mutations and post-request counter updates. Network probes always run
//! outside any lock.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::error::EndpointError;
use super::mask::masked_url;
use super::storage::EndpointStore;
use crate::models::{
	EndpointSeed, EndpointUpdate, EndpointView, HealthReport, NewEndpoint, RpcEndpoint,
};
use crate::services::blockchain::ChainClient;
use crate::utils::UrlCipher;

/// An endpoint picked for a request, with the URL decrypted for use.
#[derive(Debug, Clone)]
pub struct SelectedEndpoint {
	pub id: Uuid,
	pub url: String,
}

/// Pool of rpc endpoints for all monitored chains.
pub struct EndpointPool {
	endpoints: RwLock<HashMap<String, Vec<RpcEndpoint>>>,
	probes: RwLock<HashMap<String, Arc<dyn ChainClient>>>,
	default_probe: Arc<dyn ChainClient>,
	store: Arc<dyn EndpointStore>,
	cipher: UrlCipher,
}

impl EndpointPool {
	pub fn new(
		store: Arc<dyn EndpointStore>,
		cipher: UrlCipher,
		default_probe: Arc<dyn ChainClient>,
	) -> Self {
		Self {
			endpoints: RwLock::new(HashMap::new()),
			probes: RwLock::new(HashMap::new()),
			default_probe,
			store,
			cipher,
		}
	}

	/// Registers the chain-specific client used for liveness probes. Chains
	/// without a registered probe fall back to the default JSON-RPC probe.
	pub async fn register_probe(&self, chain: &str, client: Arc<dyn ChainClient>) {
		self.probes
			.write()
			.await
			.insert(chain.to_string(), client);
	}

	async fn probe_for(&self, chain: &str) -> Arc<dyn ChainClient> {
		self.probes
			.read()
			.await
			.get(chain)
			.cloned()
			.unwrap_or_else(|| self.default_probe.clone())
	}

	/// Loads persisted endpoints into the pool. Returns the number of rows.
	pub async fn hydrate(&self) -> Result<usize, EndpointError> {
		let loaded = self.store.load_all().await?;
		let count = loaded.values().map(Vec::len).sum();
		*self.endpoints.write().await = loaded;
		Ok(count)
	}

	/// Seeds endpoints for a chain at provisioning time. A chain that
	/// already has rows (persisted state) is left untouched. Seed URLs come
	/// from validated config, so no pre-add probe is issued here.
	pub async fn seed_chain(
		&self,
		chain: &str,
		seeds: &[EndpointSeed],
	) -> Result<(), EndpointError> {
		{
			let endpoints = self.endpoints.read().await;
			if endpoints.get(chain).map(|e| !e.is_empty()).unwrap_or(false) {
				return Ok(());
			}
		}

		let mut rows = Vec::with_capacity(seeds.len());
		for seed in seeds {
			let encrypted = self.cipher.encrypt(&seed.url)?;
			rows.push(RpcEndpoint::new(
				chain,
				encrypted,
				&seed.provider_name,
				seed.is_primary,
				seed.priority,
			));
		}

		self.store.save_chain(chain, &rows).await?;
		self.endpoints
			.write()
			.await
			.insert(chain.to_string(), rows);
		Ok(())
	}

	/// Selects the best available endpoint for a chain.
	///
	/// Total order over active endpoints: explicit primaries first, then
	/// configured priority (lower wins), then lowest observed latency with
	/// unmeasured endpoints last, then id for stability. Deterministic and
	/// idempotent given identical endpoint state, so a degrading primary is
	/// naturally passed over without ever being deactivated automatically.
	pub async fn select(&self, chain: &str) -> Result<SelectedEndpoint, EndpointError> {
		let encrypted = {
			let endpoints = self.endpoints.read().await;
			let mut active: Vec<&RpcEndpoint> = endpoints
				.get(chain)
				.map(|e| e.iter().filter(|e| e.is_active).collect())
				.unwrap_or_default();

			if active.is_empty() {
				return Err(EndpointError::NoAvailableEndpoint(chain.to_string()));
			}

			active.sort_by(|a, b| selection_order(a, b));
			let chosen = active[0];
			(chosen.id, chosen.url.clone())
		};

		Ok(SelectedEndpoint {
			id: encrypted.0,
			url: self.cipher.decrypt(&encrypted.1)?,
		})
	}

	/// Records the outcome of a request issued against an endpoint.
	/// Persistence is best-effort; counters are telemetry, not state the
	/// scheduler depends on.
	pub async fn record_usage(
		&self,
		chain: &str,
		id: Uuid,
		latency_ms: Option<u64>,
		success: bool,
	) {
		let snapshot = {
			let mut endpoints = self.endpoints.write().await;
			let Some(rows) = endpoints.get_mut(chain) else {
				return;
			};
			let Some(endpoint) = rows.iter_mut().find(|e| e.id == id) else {
				return;
			};

			endpoint.total_request_count += 1;
			if let Some(latency) = latency_ms {
				endpoint.last_latency_ms = Some(latency);
			}
			if !success {
				endpoint.error_count += 1;
			}
			rows.clone()
		};

		if let Err(e) = self.store.save_chain(chain, &snapshot).await {
			tracing::warn!(chain, error = %e, "failed to persist endpoint usage counters");
		}
	}

	/// All endpoints across chains, URLs masked for display.
	pub async fn list(&self) -> Vec<EndpointView> {
		let endpoints = self.endpoints.read().await;
		let mut views: Vec<EndpointView> = endpoints
			.values()
			.flatten()
			.map(|endpoint| {
				let display = match self.cipher.decrypt(&endpoint.url) {
					Ok(plaintext) => masked_url(&plaintext),
					Err(e) => {
						tracing::warn!(id = %endpoint.id, error = %e, "undecryptable endpoint url");
						"***".to_string()
					}
				};
				EndpointView::from_endpoint(endpoint, display)
			})
			.collect();

		views.sort_by(|a, b| a.chain.cmp(&b.chain).then(a.priority.cmp(&b.priority)));
		views
	}

	/// Adds an endpoint after a successful pre-add liveness probe. The URL
	/// is encrypted before it is persisted.
	pub async fn add(&self, new: NewEndpoint) -> Result<EndpointView, EndpointError> {
		let report = self.probe_url(&new.chain, &new.url).await;
		if !report.healthy {
			return Err(EndpointError::EndpointUnhealthy(
				report.error.unwrap_or_else(|| "probe failed".to_string()),
			));
		}

		let encrypted = self.cipher.encrypt(&new.url)?;
		let mut endpoint = RpcEndpoint::new(
			&new.chain,
			encrypted,
			&new.provider_name,
			new.is_primary,
			new.priority,
		);
		endpoint.last_latency_ms = report.latency_ms;
		endpoint.last_checked_at = Some(Utc::now());

		let view = EndpointView::from_endpoint(&endpoint, masked_url(&new.url));

		let snapshot = {
			let mut endpoints = self.endpoints.write().await;
			let rows = endpoints.entry(new.chain.clone()).or_default();
			rows.push(endpoint);
			rows.clone()
		};
		self.store.save_chain(&new.chain, &snapshot).await?;

		Ok(view)
	}

	/// Applies a partial update to an endpoint's selection attributes.
	/// Deactivating the last active endpoint of a chain is rejected.
	///
	/// Returns the before/after rows for the caller's audit trail.
	pub async fn update(
		&self,
		id: Uuid,
		update: EndpointUpdate,
	) -> Result<(RpcEndpoint, RpcEndpoint), EndpointError> {
		let (chain, before, after, snapshot) = {
			let mut endpoints = self.endpoints.write().await;
			let (chain, rows) = find_chain_mut(&mut endpoints, id)?;

			let index = rows
				.iter()
				.position(|e| e.id == id)
				.ok_or(EndpointError::NotFound(id))?;

			if update.is_active == Some(false)
				&& rows[index].is_active
				&& rows.iter().filter(|e| e.is_active).count() == 1
			{
				return Err(EndpointError::LastActiveEndpoint(chain));
			}

			let before = rows[index].clone();
			let endpoint = &mut rows[index];
			if let Some(is_active) = update.is_active {
				endpoint.is_active = is_active;
			}
			if let Some(is_primary) = update.is_primary {
				endpoint.is_primary = is_primary;
			}
			if let Some(priority) = update.priority {
				endpoint.priority = priority;
			}

			(chain, before, endpoint.clone(), rows.clone())
		};

		self.store.save_chain(&chain, &snapshot).await?;
		Ok((before, after))
	}

	/// Removes an endpoint. The last active endpoint of a chain cannot be
	/// deleted.
	pub async fn remove(&self, id: Uuid) -> Result<RpcEndpoint, EndpointError> {
		let (chain, removed, snapshot) = {
			let mut endpoints = self.endpoints.write().await;
			let (chain, rows) = find_chain_mut(&mut endpoints, id)?;

			let index = rows
				.iter()
				.position(|e| e.id == id)
				.ok_or(EndpointError::NotFound(id))?;

			if rows[index].is_active && rows.iter().filter(|e| e.is_active).count() == 1 {
				return Err(EndpointError::LastActiveEndpoint(chain));
			}

			let removed = rows.remove(index);
			(chain, removed, rows.clone())
		};

		self.store.save_chain(&chain, &snapshot).await?;
		Ok(removed)
	}

	/// Probes an endpoint on demand and records the observation. Probe
	/// failures update the error counter but never auto-disable the
	/// endpoint; disabling is an explicit admin decision to avoid flapping.
	pub async fn health_check(&self, id: Uuid) -> Result<HealthReport, EndpointError> {
		let (chain, url) = {
			let endpoints = self.endpoints.read().await;
			let endpoint = endpoints
				.values()
				.flatten()
				.find(|e| e.id == id)
				.ok_or(EndpointError::NotFound(id))?;
			(endpoint.chain.clone(), self.cipher.decrypt(&endpoint.url)?)
		};

		let report = self.probe_url(&chain, &url).await;

		let snapshot = {
			let mut endpoints = self.endpoints.write().await;
			let rows = endpoints
				.get_mut(&chain)
				.ok_or(EndpointError::NotFound(id))?;
			let endpoint = rows
				.iter_mut()
				.find(|e| e.id == id)
				.ok_or(EndpointError::NotFound(id))?;

			endpoint.last_latency_ms = report.latency_ms;
			endpoint.last_checked_at = Some(Utc::now());
			if !report.healthy {
				endpoint.error_count += 1;
			}
			rows.clone()
		};
		self.store.save_chain(&chain, &snapshot).await?;

		Ok(report)
	}

	async fn probe_url(&self, chain: &str, url: &str) -> HealthReport {
		let probe = self.probe_for(chain).await;
		let started = Instant::now();
		match probe.fetch_head_block(url).await {
			Ok(block_number) => HealthReport {
				latency_ms: Some(started.elapsed().as_millis() as u64),
				block_number: Some(block_number),
				healthy: true,
				error: None,
			},
			Err(e) => HealthReport {
				latency_ms: None,
				block_number: None,
				healthy: false,
				error: Some(e.to_string()),
			},
		}
	}
}

fn find_chain_mut<'a>(
	endpoints: &'a mut HashMap<String, Vec<RpcEndpoint>>,
	id: Uuid,
) -> Result<(String, &'a mut Vec<RpcEndpoint>), EndpointError> {
	let chain = endpoints
		.iter()
		.find(|(_, rows)| rows.iter().any(|e| e.id == id))
		.map(|(chain, _)| chain.clone())
		.ok_or(EndpointError::NotFound(id))?;

	let rows = endpoints
		.get_mut(&chain)
		.ok_or(EndpointError::NotFound(id))?;
	Ok((chain, rows))
}

fn selection_order(a: &RpcEndpoint, b: &RpcEndpoint) -> std::cmp::Ordering {
	use std::cmp::Ordering;

	b.is_primary
		.cmp(&a.is_primary)
		.then(a.priority.cmp(&b.priority))
		.then(match (a.last_latency_ms, b.last_latency_ms) {
			(Some(x), Some(y)) => x.cmp(&y),
			(Some(_), None) => Ordering::Less,
			(None, Some(_)) => Ordering::Greater,
			(None, None) => Ordering::Equal,
		})
		.then(a.id.cmp(&b.id))
}
