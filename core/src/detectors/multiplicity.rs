//! Account multiplicity feature: connected-component analysis over
//! accounts linked by shared identity attributes or direct fund flows.
//!
//! The one detector that needs whole-dataset structure. It is evaluated
//! once per run over an index-keyed union-find arena (stable entity
//! identifiers, no object references) and the per-account results are
//! fanned out to component members.
//!
//! Edges:
//!   - two accounts owned by the same partner,
//!   - accounts whose owners share an address, contact, or device
//!     fingerprint,
//!   - accounts on opposite sides of an internal transaction.
//!
//! Any account in a component exceeding the configured size limit gets an
//! elevated score; star-shaped or cyclic fund flow inside the component
//! adds a bonus; components over the hard limit set the contamination flag.

use crate::assessment::RiskAssessment;
use crate::config::AnalysisConfig;
use crate::dataset::AnalysisDataset;
use crate::detector::FeatureDetector;
use crate::stats;
use crate::types::AccountId;
use std::collections::{BTreeMap, HashMap, HashSet};

pub struct MultiplicityDetector;

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]]; // path halving
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent[ra.max(rb)] = ra.min(rb);
        }
    }
}

/// Fund-flow shape inside one component, from intra-component transaction
/// links only (ownership/attribute edges carry no flow).
#[derive(Default)]
struct FlowPattern {
    star: bool,
    cycle: bool,
}

fn flow_pattern(members: &[usize], links: &HashSet<(usize, usize)>) -> FlowPattern {
    let member_set: HashSet<usize> = members.iter().copied().collect();
    let mut degree: HashMap<usize, usize> = HashMap::new();
    let mut intra_links = 0usize;
    for (a, b) in links {
        if member_set.contains(a) && member_set.contains(b) {
            intra_links += 1;
            *degree.entry(*a).or_default() += 1;
            *degree.entry(*b).or_default() += 1;
        }
    }
    let linked_nodes = degree.len();
    let max_degree = degree.values().copied().max().unwrap_or(0);

    FlowPattern {
        // One hub touching most of the links, with at least three spokes.
        star: intra_links >= 3 && max_degree as f64 >= intra_links as f64 * 0.6,
        // A connected set with as many distinct links as nodes contains a cycle.
        cycle: linked_nodes >= 3 && intra_links >= linked_nodes,
    }
}

impl MultiplicityDetector {
    /// Whole-dataset pass. Runs once per analysis; the ranker fans the
    /// returned map out to each account's aggregation.
    pub fn evaluate(
        dataset: &AnalysisDataset,
        config: &AnalysisConfig,
    ) -> BTreeMap<AccountId, RiskAssessment> {
        let accounts = dataset.accounts();
        let mut uf = UnionFind::new(accounts.len());
        let index_of: HashMap<&str, usize> = accounts
            .iter()
            .enumerate()
            .map(|(i, a)| (a.id.as_str(), i))
            .collect();

        // Shared owner.
        let mut by_owner: HashMap<&str, Vec<usize>> = HashMap::new();
        for (i, account) in accounts.iter().enumerate() {
            by_owner
                .entry(account.owner_partner_id.as_str())
                .or_default()
                .push(i);
        }
        for group in by_owner.values() {
            for pair in group.windows(2) {
                uf.union(pair[0], pair[1]);
            }
        }

        // Shared partner attributes link the partners' account groups.
        let mut by_attribute: HashMap<(&str, &str), Vec<&str>> = HashMap::new();
        for partner in dataset.partners() {
            for (kind, value) in [
                ("address", partner.address.as_deref()),
                ("contact", partner.contact.as_deref()),
                ("device", partner.device_fingerprint.as_deref()),
            ] {
                if let Some(value) = value {
                    by_attribute
                        .entry((kind, value))
                        .or_default()
                        .push(partner.id.as_str());
                }
            }
        }
        for partner_ids in by_attribute.values() {
            let mut anchor: Option<usize> = None;
            for partner_id in partner_ids {
                for account_idx in by_owner.get(partner_id).into_iter().flatten() {
                    match anchor {
                        None => anchor = Some(*account_idx),
                        Some(a) => uf.union(a, *account_idx),
                    }
                }
            }
        }

        // Direct internal fund flows, also kept as links for shape analysis.
        let mut txn_links: HashSet<(usize, usize)> = HashSet::new();
        for txn in dataset.transactions() {
            if !txn.is_internal {
                continue;
            }
            let (Some(&src), Some(&dst)) = (
                index_of.get(txn.source_account_id.as_str()),
                index_of.get(txn.target_account_id.as_str()),
            ) else {
                continue;
            };
            if src == dst {
                continue;
            }
            uf.union(src, dst);
            txn_links.insert((src.min(dst), src.max(dst)));
        }

        let mut components: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for i in 0..accounts.len() {
            let root = uf.find(i);
            components.entry(root).or_default().push(i);
        }

        let size_limit = config.multiplicity.cluster_size_limit;
        let hard_limit = config.multiplicity.contamination_size_limit;

        let mut out = BTreeMap::new();
        for (root, members) in &components {
            let size = members.len();
            let pattern = flow_pattern(members, &txn_links);
            let pattern_bonus = if pattern.star || pattern.cycle { 15.0 } else { 0.0 };

            let (score, contaminated) = if size > size_limit {
                let raw = 50.0 + (size - size_limit) as f64 * 10.0 + pattern_bonus;
                (stats::clamp_score(raw), size > hard_limit)
            } else if size > 1 {
                (
                    stats::clamp_score((size as f64 * 5.0 + pattern_bonus).min(30.0)),
                    false,
                )
            } else {
                (0, false)
            };

            for member in members {
                let account = &accounts[*member];
                let mut assessment =
                    RiskAssessment::new("multiplicity", score, &config.thresholds)
                        .with_metric("component_size", size)
                        .with_metric("component_id", *root)
                        .with_metric("star_pattern", pattern.star)
                        .with_metric("cycle_pattern", pattern.cycle);

                if size > size_limit {
                    assessment = assessment.with_reason(format!(
                        "Member of a {size}-account linked cluster (limit {size_limit})"
                    ));
                    if pattern.star {
                        assessment = assessment.with_reason(
                            "Star-shaped fund flow through a single hub inside the cluster".into(),
                        );
                    }
                    if pattern.cycle {
                        assessment = assessment
                            .with_reason("Cyclical fund flow inside the cluster".into());
                    }
                    if contaminated {
                        assessment = assessment.mark_contaminated().with_reason(format!(
                            "Cluster size {size} exceeds the hard limit of {hard_limit}"
                        ));
                    }
                } else if size > 1 {
                    assessment = assessment.with_reason(format!(
                        "Linked to {} other account(s); below the cluster limit",
                        size - 1
                    ));
                } else {
                    assessment = assessment
                        .with_reason("No linkage to other accounts detected".into());
                }

                out.insert(account.id.clone(), assessment);
            }
        }

        out
    }
}

impl FeatureDetector for MultiplicityDetector {
    fn name(&self) -> &'static str {
        "multiplicity"
    }

    /// Per-account view: computes the global pass and extracts one entry.
    /// Single-account callers pay the whole-dataset cost once; mass
    /// analysis uses `evaluate` directly and fans out.
    fn assess(
        &self,
        account_id: &str,
        dataset: &AnalysisDataset,
        config: &AnalysisConfig,
    ) -> RiskAssessment {
        Self::evaluate(dataset, config)
            .remove(account_id)
            .unwrap_or_else(|| {
                RiskAssessment::insufficient_data(
                    self.name(),
                    &config.thresholds,
                    "Account record not found; multiplicity not evaluated",
                )
            })
    }
}
