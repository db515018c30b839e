//! Normalized, read-only view of one polled master state
//!
//! A [`Snapshot`] is rebuilt wholesale from every accepted payload: lookup
//! maps keyed by id, task/slave counters copied from the payload, cluster
//! resource aggregates and per-framework shares. Nothing is carried over from
//! the previous snapshot.

use crate::identity::Pid;
use crate::model::{Framework, MasterState, Offer, Resources, Slave};
use crate::normalizer::NormalizeError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

/// A framework's fraction of the cluster totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Shares {
    pub cpus_share: f64,
    pub mem_share: f64,
    pub max_share: f64,
}

impl Shares {
    /// Shares are 0 for a dimension whose total is 0.
    pub fn of(used: Resources, total: Resources) -> Self {
        let cpus_share = if total.cpus > 0.0 { used.cpus / total.cpus } else { 0.0 };
        let mem_share = if total.mem > 0.0 { used.mem / total.mem } else { 0.0 };
        Self {
            cpus_share,
            mem_share,
            max_share: cpus_share.max(mem_share),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameworkEntry {
    #[serde(flatten)]
    pub framework: Framework,
    #[serde(flatten)]
    pub shares: Shares,
}

/// Offer denormalized with its owner's display fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfferEntry {
    #[serde(flatten)]
    pub offer: Offer,
    pub framework_name: String,
    pub hostname: String,
}

/// Cluster-wide resource totals.
///
/// `used` already has the offered resources subtracted, so
/// `idle + offered + used == total` holds per dimension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Aggregates {
    pub total: Resources,
    pub used: Resources,
    pub offered: Resources,
    pub idle: Resources,
}

impl Aggregates {
    fn compute<'a>(
        slaves: impl Iterator<Item = &'a Slave>,
        frameworks: impl Iterator<Item = &'a Framework>,
        offers: impl Iterator<Item = &'a Offer>,
    ) -> Self {
        let mut aggregates = Aggregates::default();
        for slave in slaves {
            aggregates.total += slave.resources;
        }
        for framework in frameworks {
            aggregates.used += framework.resources;
        }
        for offer in offers {
            aggregates.offered += offer.resources;
        }

        aggregates.used -= aggregates.offered;

        let mut busy = aggregates.offered;
        busy += aggregates.used;
        aggregates.idle = aggregates.total;
        aggregates.idle -= busy;

        if aggregates.idle.cpus < 0.0 || aggregates.idle.mem < 0.0 {
            warn!(
                "negative idle resources (cpus: {}, mem: {}), payload resources are inconsistent",
                aggregates.idle.cpus, aggregates.idle.mem
            );
        }
        aggregates
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub pid: Pid,
    pub leader: Option<Pid>,
    pub cluster: Option<String>,
    pub log_dir: Option<String>,
    pub fetched_at: DateTime<Utc>,

    pub slaves: BTreeMap<String, Slave>,
    pub frameworks: BTreeMap<String, FrameworkEntry>,
    pub completed_frameworks: BTreeMap<String, Framework>,
    pub offers: BTreeMap<String, OfferEntry>,

    pub staged_tasks: u64,
    pub started_tasks: u64,
    pub finished_tasks: u64,
    pub killed_tasks: u64,
    pub failed_tasks: u64,
    pub lost_tasks: u64,
    pub activated_slaves: u64,
    pub connected_slaves: u64,

    /// Σ running tasks over active frameworks.
    pub active_tasks: u64,
    /// Σ completed tasks over active frameworks.
    pub completed_tasks: u64,

    pub aggregates: Aggregates,
}

impl Snapshot {
    /// Builds the lookup maps and derived statistics of one payload.
    ///
    /// Fails when an offer references a framework or slave that is not part
    /// of the same payload.
    pub fn build(state: MasterState, pid: Pid, leader: Option<Pid>) -> Result<Self, NormalizeError> {
        let MasterState {
            log_dir,
            cluster,
            staged_tasks,
            started_tasks,
            finished_tasks,
            killed_tasks,
            failed_tasks,
            lost_tasks,
            activated_slaves,
            connected_slaves,
            slaves,
            frameworks,
            completed_frameworks,
            ..
        } = state;

        let slaves: BTreeMap<String, Slave> =
            slaves.into_iter().map(|slave| (slave.id.clone(), slave)).collect();

        let mut raw_offers: BTreeMap<String, Offer> = BTreeMap::new();
        let mut raw_frameworks: BTreeMap<String, Framework> = BTreeMap::new();
        for framework in frameworks {
            for offer in &framework.offers {
                raw_offers.insert(offer.id.clone(), offer.clone());
            }
            raw_frameworks.insert(framework.id.clone(), framework);
        }

        let completed_frameworks: BTreeMap<String, Framework> = completed_frameworks
            .into_iter()
            .map(|framework| (framework.id.clone(), framework))
            .collect();

        let aggregates = Aggregates::compute(
            slaves.values(),
            raw_frameworks.values(),
            raw_offers.values(),
        );

        let mut active_tasks = 0u64;
        let mut completed_tasks = 0u64;
        for framework in raw_frameworks.values() {
            active_tasks += framework.tasks.len() as u64;
            completed_tasks += framework.completed_tasks.len() as u64;
        }

        let mut offers = BTreeMap::new();
        for (id, offer) in raw_offers {
            let framework_name = raw_frameworks
                .get(&offer.framework_id)
                .map(|framework| framework.name.clone())
                .ok_or_else(|| NormalizeError::DanglingOffer {
                    offer_id: id.clone(),
                    field: "framework_id",
                    target: offer.framework_id.clone(),
                })?;
            let hostname = slaves
                .get(&offer.slave_id)
                .map(|slave| slave.hostname.clone())
                .ok_or_else(|| NormalizeError::DanglingOffer {
                    offer_id: id.clone(),
                    field: "slave_id",
                    target: offer.slave_id.clone(),
                })?;
            offers.insert(id, OfferEntry { offer, framework_name, hostname });
        }

        let frameworks = raw_frameworks
            .into_iter()
            .map(|(id, framework)| {
                let shares = Shares::of(framework.resources, aggregates.total);
                (id, FrameworkEntry { framework, shares })
            })
            .collect();

        Ok(Self {
            pid,
            leader,
            cluster,
            log_dir,
            fetched_at: Utc::now(),
            slaves,
            frameworks,
            completed_frameworks,
            offers,
            staged_tasks,
            started_tasks,
            finished_tasks,
            killed_tasks,
            failed_tasks,
            lost_tasks,
            activated_slaves,
            connected_slaves,
            active_tasks,
            completed_tasks,
            aggregates,
        })
    }

    pub fn slave(&self, id: &str) -> Option<&Slave> {
        self.slaves.get(id)
    }

    pub fn framework(&self, id: &str) -> Option<&FrameworkEntry> {
        self.frameworks.get(id)
    }

    pub fn completed_framework(&self, id: &str) -> Option<&Framework> {
        self.completed_frameworks.get(id)
    }

    pub fn offer(&self, id: &str) -> Option<&OfferEntry> {
        self.offers.get(id)
    }
}
