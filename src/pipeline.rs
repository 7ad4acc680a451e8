/// One federated query, end to end.
///
/// Flow:
/// 1. Resolve the centralized sample hits against the described resources
/// 2. Rank resources with the configured selection algorithm
/// 3. Normalize the resource scores and keep the top resources
/// 4. Rescore each kept resource's own result list with the merging method
/// 5. Fold the rescored lists into one ranking with `merge_sorted`
///
/// A source that SSL or SAFE cannot calibrate is left out of the merged
/// ranking and reported in `QueryOutcome::skipped`.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::errors::{FedRankError, Result};
use crate::merge::merge_sorted;
use crate::merging::{MergeContext, MergingMethod};
use crate::norm::{Normalization, ScoreNormalizer};
use crate::scored::{sort_scored, ScoredItem, SortOrder};
use crate::selection::{Resource, ResourceSelection};

/// A document of the centralized sample ranking and the resource it was sampled from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleHit {
    pub doc: String,
    pub score: f64,
    pub resource: String,
}

/// Size statistics of one resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceInfo {
    pub id: String,
    pub full_size: i64,
    pub sample_size: i64,
}

/// A document returned by a resource's own search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceHit {
    pub doc: String,
    pub score: f64,
}

/// The inputs of one query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryRun {
    #[serde(default)]
    pub sample: Option<Vec<SampleHit>>,
    #[serde(default)]
    pub resources: Option<Vec<ResourceInfo>>,
    /// Resource id to that resource's result list.
    #[serde(default)]
    pub source_results: BTreeMap<String, Vec<SourceHit>>,
}

/// The result of one query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryOutcome {
    /// Every described resource with its selection score, best first.
    pub resources: Vec<ScoredItem<String>>,
    /// The merged document ranking, best first.
    pub documents: Vec<ScoredItem<String>>,
    /// Selected resources whose result lists could not be calibrated.
    pub skipped: Vec<String>,
}

/// A configured federated query: selection, resource-score normalization and merging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FederatedQuery {
    selection: ResourceSelection,
    resource_norm: ScoreNormalizer,
    merging: MergingMethod,
    top_resources: Option<usize>,
}

impl Default for FederatedQuery {
    fn default() -> Self {
        FederatedQuery::new(ResourceSelection::default(), MergingMethod::default())
    }
}

impl FederatedQuery {
    pub fn new(selection: ResourceSelection, merging: MergingMethod) -> Self {
        FederatedQuery {
            selection,
            resource_norm: ScoreNormalizer::new(Normalization::MinMax),
            merging,
            top_resources: None,
        }
    }

    pub fn with_resource_norm(self, resource_norm: ScoreNormalizer) -> Self {
        FederatedQuery { resource_norm, ..self }
    }

    /// Search only the `top_resources` best resources.
    pub fn with_top_resources(self, top_resources: usize) -> Result<Self> {
        if top_resources == 0 {
            return Err(FedRankError::invalid(
                "top_resources",
                "The number of resources to search is not positive: 0",
            ));
        }
        Ok(FederatedQuery { top_resources: Some(top_resources), ..self })
    }

    pub fn selection(&self) -> ResourceSelection {
        self.selection
    }

    pub fn merging(&self) -> MergingMethod {
        self.merging
    }

    pub fn top_resources(&self) -> Option<usize> {
        self.top_resources
    }

    pub fn run(&self, query: &QueryRun) -> Result<QueryOutcome> {
        let hits = query
            .sample
            .as_deref()
            .ok_or_else(|| FedRankError::missing("sample ranking"))?;
        let infos = query
            .resources
            .as_deref()
            .ok_or_else(|| FedRankError::missing("resource descriptions"))?;

        let described = describe_resources(infos)?;
        let (sample, assignments) = resolve_sample(hits, &described);

        let mut ranking = self.selection.select(&sample, &assignments)?;
        // resources nobody sampled a hit from are still candidates
        let unseen: Vec<&Resource> = infos
            .iter()
            .filter_map(|info| described.get(info.id.as_str()))
            .filter(|resource| !ranking.iter().any(|r| r.value() == *resource))
            .collect();
        if !unseen.is_empty() {
            ranking.extend(unseen.into_iter().map(|r| ScoredItem::new(r.clone(), 0.0)));
            ranking = sort_scored(&ranking, SortOrder::Descending);
        }

        let relevance = self.resource_norm.normalize(&ranking);
        let searched = self.top_resources.unwrap_or(relevance.len());
        let (centralized, centralized_resources) = best_first(&sample, &assignments);

        let mut documents: Vec<ScoredItem<String>> = Vec::new();
        let mut skipped = Vec::new();
        for selected in relevance.iter().take(searched) {
            let resource = selected.value();
            let Some(results) = query.source_results.get(resource.id()) else {
                continue;
            };
            let results: Vec<ScoredItem<String>> = results
                .iter()
                .map(|hit| ScoredItem::new(hit.doc.clone(), hit.score))
                .collect();
            let results = sort_scored(&results, SortOrder::Descending);

            let own_sample: Vec<ScoredItem<String>>;
            let ctx_sample: &[ScoredItem<String>] = match self.merging {
                MergingMethod::Safe(_) => {
                    own_sample = centralized
                        .iter()
                        .zip(&centralized_resources)
                        .filter(|(_, r)| **r == resource)
                        .map(|(doc, _)| doc.clone())
                        .collect();
                    &own_sample
                }
                _ => &centralized,
            };
            let ctx = MergeContext::new(ctx_sample)
                .with_relevance(selected.score().clamp(0.0, 1.0))
                .with_rank_ratio(resource.size_ratio());

            let merged = self.merging.merge(&results, &ctx)?;
            if merged.is_empty() && !results.is_empty() && self.merging.needs_evidence() {
                tracing::warn!(
                    resource = %resource,
                    method = self.merging.name(),
                    documents = results.len(),
                    "Dropping result list that could not be calibrated"
                );
                skipped.push(resource.id().to_string());
                continue;
            }
            documents = merge_sorted(documents, sort_scored(&merged, SortOrder::Descending));
        }

        tracing::debug!(
            selection = self.selection.method().name(),
            merging = self.merging.name(),
            resources = ranking.len(),
            searched = searched.min(ranking.len()),
            documents = documents.len(),
            skipped = skipped.len(),
            "Federated query complete"
        );

        Ok(QueryOutcome {
            resources: ranking
                .into_iter()
                .map(|r| r.map_value(|resource| resource.id().to_string()))
                .collect(),
            documents,
            skipped,
        })
    }
}

fn describe_resources(infos: &[ResourceInfo]) -> Result<HashMap<&str, Resource>> {
    let mut described = HashMap::with_capacity(infos.len());
    for info in infos {
        let resource = Resource::new(info.id.clone(), info.full_size, info.sample_size)?;
        if described.insert(info.id.as_str(), resource).is_some() {
            return Err(FedRankError::invalid(
                "resources",
                format!("The resource is described more than once: {}", info.id),
            ));
        }
    }
    Ok(described)
}

/// Pair each sampled document with its resource description. Hits naming a
/// resource the run never described are dropped.
fn resolve_sample(
    hits: &[SampleHit],
    described: &HashMap<&str, Resource>,
) -> (Vec<ScoredItem<String>>, Vec<Resource>) {
    let mut sample = Vec::with_capacity(hits.len());
    let mut assignments = Vec::with_capacity(hits.len());
    for hit in hits {
        let Some(resource) = described.get(hit.resource.as_str()) else {
            tracing::warn!(resource = %hit.resource, doc = %hit.doc, "Dropping sampled document of an undescribed resource");
            continue;
        };
        sample.push(ScoredItem::new(hit.doc.clone(), hit.score));
        assignments.push(resource.clone());
    }
    (sample, assignments)
}

/// The sample and its assignments, stably sorted best first in lockstep.
fn best_first<'a>(
    sample: &[ScoredItem<String>],
    assignments: &'a [Resource],
) -> (Vec<ScoredItem<String>>, Vec<&'a Resource>) {
    let mut order: Vec<usize> = (0..sample.len()).collect();
    order.sort_by(|&a, &b| sample[b].score().total_cmp(&sample[a].score()));
    order
        .into_iter()
        .map(|i| (sample[i].clone(), &assignments[i]))
        .unzip()
}
