use log::debug;
use serde::Serialize;
use std::fmt;

use crate::address::{extract_address_core, AddressCore};
use crate::model::{CustomerProfile, Employee, Job, PropertyTemplate};

/// Score for two addresses with identical composite keys.
pub const EXACT_ADDRESS_SCORE: f64 = 1.0;
/// Score for equal street numbers where one street name contains the other.
pub const PARTIAL_ADDRESS_SCORE: f64 = 0.95;
/// Score for names equal after removing whitespace and case.
pub const EXACT_NAME_SCORE: f64 = 0.8;
/// Score for one compact name containing the other.
pub const PARTIAL_NAME_SCORE: f64 = 0.72;
/// Any address hit ranks above every name-only hit.
const ADDRESS_RANK_OFFSET: f64 = 10.0;
const MIN_PARTIAL_NAME_LEN: usize = 4;
const SAMPLE_TEMPLATE_KEYS: usize = 3;

/// How a template was (or was not) selected for a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchStrategy {
    /// No templates were supplied.
    None,
    AddressCore,
    FallbackNameMatch,
    /// Several templates share the job's address core; needs a human.
    AmbiguousAddressCore,
    Unmatched,
}

impl MatchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStrategy::None => "none",
            MatchStrategy::AddressCore => "address-core",
            MatchStrategy::FallbackNameMatch => "fallback-name-match",
            MatchStrategy::AmbiguousAddressCore => "ambiguous-address-core",
            MatchStrategy::Unmatched => "unmatched",
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(
            self,
            MatchStrategy::AddressCore | MatchStrategy::FallbackNameMatch
        )
    }
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of matching one job against a template catalog.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateMatch {
    pub template: Option<PropertyTemplate>,
    pub score: f64,
    pub strategy: MatchStrategy,
    pub details: String,
    pub job_address_key: Option<String>,
    pub profile_address_key: Option<String>,
    pub candidate_count: usize,
    pub address_match_count: usize,
}

/// Compares two address cores. Symmetric in its arguments.
pub fn score_address_match(a: &AddressCore, b: &AddressCore) -> f64 {
    if a.key == b.key {
        return EXACT_ADDRESS_SCORE;
    }
    if a.street_number == b.street_number
        && (a.street_name.contains(&b.street_name) || b.street_name.contains(&a.street_name))
    {
        return PARTIAL_ADDRESS_SCORE;
    }
    0.0
}

/// Compares two display names ignoring whitespace and case.
pub fn score_name_match(a: &str, b: &str) -> f64 {
    let a = compact_name(a);
    let b = compact_name(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return EXACT_NAME_SCORE;
    }
    if a.chars().count() >= MIN_PARTIAL_NAME_LEN
        && b.chars().count() >= MIN_PARTIAL_NAME_LEN
        && (a.contains(&b) || b.contains(&a))
    {
        return PARTIAL_NAME_SCORE;
    }
    0.0
}

fn compact_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

struct IndexedTemplate<'a> {
    template: &'a PropertyTemplate,
    core: Option<AddressCore>,
}

struct Candidate<'a> {
    template: &'a PropertyTemplate,
    address_score: f64,
    name_score: f64,
    total: f64,
}

/// Matches jobs against a template catalog whose address cores are
/// extracted once up front.
pub struct TemplateMatcher<'a> {
    templates: Vec<IndexedTemplate<'a>>,
}

impl<'a> TemplateMatcher<'a> {
    pub fn new(templates: &'a [PropertyTemplate]) -> Self {
        let templates = templates
            .iter()
            .map(|template| IndexedTemplate {
                template,
                core: template.address.as_deref().and_then(extract_address_core),
            })
            .collect();
        Self { templates }
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn match_job(&self, job: &Job, profile: Option<&CustomerProfile>) -> TemplateMatch {
        let job_core = job.address().and_then(extract_address_core);
        let profile_core = profile
            .and_then(|p| p.address.as_deref())
            .and_then(extract_address_core);

        let mut result = TemplateMatch {
            template: None,
            score: 0.0,
            strategy: MatchStrategy::None,
            details: String::new(),
            job_address_key: job_core.as_ref().map(|c| c.key.clone()),
            profile_address_key: profile_core.as_ref().map(|c| c.key.clone()),
            candidate_count: self.templates.len(),
            address_match_count: 0,
        };

        if self.templates.is_empty() {
            result.details = "No property templates available".to_string();
            return result;
        }

        let mut candidates: Vec<Candidate<'_>> = self
            .templates
            .iter()
            .map(|indexed| {
                let address_score = indexed.core.as_ref().map_or(0.0, |template_core| {
                    [job_core.as_ref(), profile_core.as_ref()]
                        .into_iter()
                        .flatten()
                        .map(|core| score_address_match(core, template_core))
                        .fold(0.0, f64::max)
                });
                let name_score = [
                    Some(job.customer_name.as_str()),
                    profile.map(|p| p.name.as_str()),
                ]
                .into_iter()
                .flatten()
                .map(|name| score_name_match(name, &indexed.template.name))
                .fold(0.0, f64::max);
                let total = if address_score > 0.0 {
                    ADDRESS_RANK_OFFSET + address_score
                } else {
                    name_score
                };
                Candidate {
                    template: indexed.template,
                    address_score,
                    name_score,
                    total,
                }
            })
            .collect();

        candidates.sort_by(|a, b| b.total.total_cmp(&a.total));

        let address_hits: Vec<&Candidate<'_>> = candidates
            .iter()
            .filter(|c| c.address_score > 0.0)
            .collect();
        result.address_match_count = address_hits.len();

        let top = &candidates[0];
        result.score = top.total;

        if address_hits.len() > 1 {
            let names: Vec<&str> = address_hits
                .iter()
                .map(|c| c.template.name.as_str())
                .collect();
            result.strategy = MatchStrategy::AmbiguousAddressCore;
            result.details = format!(
                "{} templates share this address core ({}); disambiguate the template addresses",
                address_hits.len(),
                names.join(", ")
            );
        } else if top.address_score > 0.0 {
            result.template = Some(top.template.clone());
            result.strategy = MatchStrategy::AddressCore;
            result.details = format!(
                "Matched '{}' by address core (score {:.2})",
                top.template.name, top.address_score
            );
        } else if top.name_score >= EXACT_NAME_SCORE {
            result.template = Some(top.template.clone());
            result.strategy = MatchStrategy::FallbackNameMatch;
            result.details = format!(
                "Warning: matched '{}' by customer name only; address core did not match",
                top.template.name
            );
        } else {
            result.strategy = MatchStrategy::Unmatched;
            result.details = self.unmatched_details(&result);
        }

        debug!(
            "Template match for job {}: {} ({} candidates)",
            job.id, result.strategy, result.candidate_count
        );

        result
    }

    fn unmatched_details(&self, result: &TemplateMatch) -> String {
        let samples: Vec<&str> = self
            .templates
            .iter()
            .filter_map(|t| t.core.as_ref().map(|c| c.key.as_str()))
            .take(SAMPLE_TEMPLATE_KEYS)
            .collect();
        format!(
            "No template matched. Job address key: {}; profile address key: {}; sample template keys: [{}]",
            result.job_address_key.as_deref().unwrap_or("<none>"),
            result.profile_address_key.as_deref().unwrap_or("<none>"),
            samples.join(", ")
        )
    }
}

/// Finds the template for a job. See [`TemplateMatcher::match_job`].
pub fn find_matching_template(
    job: &Job,
    templates: &[PropertyTemplate],
    profile: Option<&CustomerProfile>,
) -> TemplateMatch {
    TemplateMatcher::new(templates).match_job(job, profile)
}

/// Input handed to the inspection-link generator once a job has a template.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionRequest {
    pub template: PropertyTemplate,
    pub job: Job,
    pub employee: Employee,
}

/// Builds an inspection request when the job matched a template and its
/// linked profile (if any) has recurring service enabled.
pub fn inspection_request(
    job: &Job,
    matched: &TemplateMatch,
    employee: &Employee,
    profile: Option<&CustomerProfile>,
) -> Option<InspectionRequest> {
    if !matched.strategy.is_match() {
        return None;
    }
    if profile.is_some_and(|p| !p.recurring_enabled) {
        return None;
    }
    let template = matched.template.clone()?;
    Some(InspectionRequest {
        template,
        job: job.clone(),
        employee: employee.clone(),
    })
}
