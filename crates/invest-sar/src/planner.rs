//! SEARCH-step query planning: enumerate `(check, params)` tuples from a
//! type's templates and the current [`KnowledgeBaseSnapshot`], dedup them,
//! and drop anything the requester isn't permitted to run (§4.F step 1).

use std::collections::{BTreeMap, HashMap, HashSet};

use invest_core::model::{InfoType, KnowledgeBaseSnapshot};
use invest_core::{Id, RequestContext};
use invest_providers::CheckRequest;

/// Build the initial SEARCH query set for `info_type`'s first iteration, or
/// a gap-targeted follow-up set for a later iteration when `gaps` is
/// non-empty. Queries are deduplicated by `(check_type, canonical params)`
/// and silently dropped when the context doesn't permit them (§4.H: a
/// forbidden check is dropped, never surfaced to the provider).
pub fn plan_queries(
    context: &RequestContext,
    subject_entity_id: Id,
    info_type: InfoType,
    kb: &KnowledgeBaseSnapshot,
    gaps: &[String],
) -> Vec<CheckRequest> {
    let mut seen: HashSet<BTreeMap<String, String>> = HashSet::new();
    let mut planned = Vec::new();

    for params in candidate_param_sets(info_type, kb, gaps) {
        let canonical: BTreeMap<String, String> = params.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        if !seen.insert(canonical) {
            continue;
        }
        if context.assert_check_permitted(info_type).is_err() {
            continue;
        }
        planned.push(CheckRequest {
            check_type: info_type,
            subject_entity_id,
            params,
            locale: context.locale.clone(),
        });
    }

    planned
}

/// The per-type template: what search parameters are worth trying given
/// what the KnowledgeBase already knows. When `gaps` names specific
/// missing facts, only the templates addressing those gaps are emitted
/// (one strategy per gap kind, per §4.F step 3's refiner rule); otherwise
/// every template for the type is emitted.
fn candidate_param_sets(info_type: InfoType, kb: &KnowledgeBaseSnapshot, gaps: &[String]) -> Vec<HashMap<String, String>> {
    let mut name_params: Vec<HashMap<String, String>> = kb
        .name_variants
        .iter()
        .map(|name| {
            let mut params = HashMap::new();
            params.insert("name".to_string(), name.clone());
            if let Some(dob) = kb.date_of_birth {
                params.insert("date_of_birth".to_string(), dob.to_string());
            }
            params
        })
        .collect();

    if name_params.is_empty() {
        name_params.push(HashMap::new());
    }

    let mut sets = match info_type {
        InfoType::Employment => kb
            .employers
            .iter()
            .map(|employer| {
                let mut params = name_params[0].clone();
                params.insert("employer".to_string(), employer.name.clone());
                params
            })
            .chain(name_params.clone())
            .collect(),
        InfoType::Education => kb
            .educations
            .iter()
            .map(|education| {
                let mut params = name_params[0].clone();
                params.insert("institution".to_string(), education.institution.clone());
                params
            })
            .chain(name_params.clone())
            .collect(),
        InfoType::Licenses | InfoType::Regulatory => kb
            .jurisdictions
            .iter()
            .map(|jurisdiction| {
                let mut params = name_params[0].clone();
                params.insert("jurisdiction".to_string(), jurisdiction.clone());
                params
            })
            .chain(name_params.clone())
            .collect(),
        _ => name_params,
    };

    if sets.is_empty() {
        sets.push(HashMap::new());
    }

    if !gaps.is_empty() {
        for params in &mut sets {
            params.insert("gap_focus".to_string(), gaps.join(","));
        }
    }

    sets
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use invest_core::compliance::ComplianceDecision;
    use invest_core::context::{CacheScope, RequestContextInit};
    use invest_core::model::{Degree, Tier};
    use std::collections::HashSet as StdHashSet;

    fn permissive_context(permitted: &[InfoType]) -> RequestContext {
        RequestContext::new(RequestContextInit {
            tenant_id: "tenant-a".to_string(),
            actor: "tester".to_string(),
            locale: "US".to_string(),
            permitted_checks: permitted.iter().copied().collect(),
            permitted_sources: StdHashSet::new(),
            consent_token: "token".to_string(),
            consent_scope: StdHashSet::new(),
            consent_expiry: Utc::now() + chrono::Duration::days(1),
            tier: Tier::Standard,
            degree: Degree::D1,
            budget_limit: None,
            cache_scope: CacheScope::Shared,
            compliance: ComplianceDecision::default(),
        })
    }

    #[test]
    fn dedups_identical_candidate_params() {
        let mut kb = KnowledgeBaseSnapshot::default();
        kb.name_variants.insert("Jane Doe".to_string());
        let context = permissive_context(&[InfoType::Identity]);
        let planned = plan_queries(&context, Id::new(), InfoType::Identity, &kb, &[]);
        assert_eq!(planned.len(), 1);
    }

    #[test]
    fn drops_unpermitted_checks_instead_of_erroring() {
        let kb = KnowledgeBaseSnapshot::default();
        let context = permissive_context(&[InfoType::Identity]);
        let planned = plan_queries(&context, Id::new(), InfoType::Criminal, &kb, &[]);
        assert!(planned.is_empty());
    }

    #[test]
    fn employment_queries_one_per_known_employer() {
        let mut kb = KnowledgeBaseSnapshot::default();
        kb.name_variants.insert("Jane Doe".to_string());
        kb.employers.push(invest_core::model::EmployerRecord {
            name: "Acme Corp".to_string(),
            title: None,
            start: None,
            end: None,
        });
        let context = permissive_context(&[InfoType::Employment]);
        let planned = plan_queries(&context, Id::new(), InfoType::Employment, &kb, &[]);
        assert!(planned.iter().any(|q| q.params.get("employer").map(String::as_str) == Some("Acme Corp")));
    }
}
