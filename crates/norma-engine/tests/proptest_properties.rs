//! Property tests for the consequence, metrics and strategy engines over
//! randomly generated teams.

use norma_engine::{
    analyze_fulfillment, analyze_violation, attack_surface, core_elements, defense_space,
    independence_test, query_partitions, simulate_attack, split, Classification, PartitionStatus,
    PathQuery, TeamMetrics,
};
use norma_model::proptest_generators::{
    arb_catalog, arb_model, arb_nonempty_team, arb_partitions, arb_team, MAX_GENERATED_ID,
};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn core_elements_are_in_every_model(team in arb_team()) {
        let core = core_elements(&team);
        for model in &team {
            prop_assert!(core.iter().all(|id| model.contains(*id)));
        }
    }

    #[test]
    fn scenario_totals_cover_the_team(
        catalog in arb_catalog(),
        team in arb_team(),
        target in 1..=MAX_GENERATED_ID,
    ) {
        let f = analyze_fulfillment(&catalog, &team, target).unwrap();
        let v = analyze_violation(&catalog, &team, target).unwrap();
        prop_assert_eq!(f.total_fulfillment_scenarios + f.total_violation_scenarios, team.len());
        prop_assert_eq!(f.total_fulfillment_scenarios, v.total_fulfillment_scenarios);
    }

    #[test]
    fn classifications_agree_with_counts(
        catalog in arb_catalog(),
        team in arb_team(),
        target in 1..=MAX_GENERATED_ID,
    ) {
        let report = analyze_violation(&catalog, &team, target).unwrap();
        let total = report.scenario_total();
        let mut seen = std::collections::BTreeSet::new();
        for c in &report.consequences {
            prop_assert!(seen.insert(c.predicate_id), "each id is classified once");
            prop_assert_ne!(c.predicate_id, target);
            prop_assert_eq!(c.total, total);
            match c.classification {
                Classification::AlwaysPresent => prop_assert_eq!(c.count, total),
                Classification::AlwaysAbsent => prop_assert_eq!(c.count, 0),
            }
        }
        if total == 0 {
            prop_assert!(report.consequences.is_empty());
            prop_assert!(report.message.is_some());
        }
    }

    #[test]
    fn independence_iff_all_four_combinations(
        team in arb_team(),
        id1 in 1..=MAX_GENERATED_ID,
        id2 in 1..=MAX_GENERATED_ID,
    ) {
        let test = independence_test(&team, id1, id2);
        let observed = test.combinations.iter().filter(|c| c.count > 0).count();
        prop_assert_eq!(test.independent, observed == 4);
        prop_assert_eq!(test.combinations.iter().map(|c| c.count).sum::<usize>(), team.len());
    }

    #[test]
    fn split_succeeds_iff_every_model_has_an_id(
        team in arb_team(),
        id1 in 1..=MAX_GENERATED_ID,
        id2 in 1..=MAX_GENERATED_ID,
    ) {
        let covered = team.iter().all(|m| m.contains(id1) || m.contains(id2));
        prop_assert_eq!(split(&team, id1, id2).is_ok(), covered);
    }

    #[test]
    fn attack_never_grows_the_team(
        catalog in arb_catalog(),
        team in arb_team(),
        target in 1..=MAX_GENERATED_ID,
    ) {
        let sim = simulate_attack(&catalog, &team, target, 5);
        prop_assert!(sim.remaining_size <= sim.original_size);
        prop_assert_eq!(sim.eliminated, team.len() - sim.remaining_size);
        prop_assert!(sim.remaining_sample.len() <= 5);
        prop_assert_eq!(sim.total_collapse, sim.remaining_size == 0);
    }

    #[test]
    fn metric_ranges(team in arb_nonempty_team(), id in 1..=MAX_GENERATED_ID) {
        let m = TeamMetrics::new(&team);
        let support = m.support(id);
        prop_assert!((0.0..=1.0).contains(&support));
        prop_assert!((0.0..=1.0).contains(&m.leverage(id)));
        prop_assert_eq!(m.essential(id), support == 1.0);
        prop_assert!(m.fragility(id) <= m.robustness(id));
        prop_assert!(m.dependency(id) < team.len());
    }

    #[test]
    fn surface_and_defense_partition_the_first_team(a in arb_team(), b in arb_team()) {
        prop_assert_eq!(attack_surface(&a, &b).len() + defense_space(&a, &b).len(), a.len());
    }

    #[test]
    fn partition_matches_respect_the_path(
        partitions in arb_partitions(),
        required in arb_model(),
        forbidden in arb_model(),
    ) {
        let query = PathQuery::new(required.ids().to_vec(), forbidden.ids().to_vec());
        let out = query_partitions(&partitions, &query);
        prop_assert_eq!(out.results.len(), partitions.len());
        for (result, partition) in out.results.iter().zip(&partitions) {
            if result.status == PartitionStatus::NotApplicable {
                let forbidden_absent = query.is_violation_style()
                    && !query.forbidden.iter().any(|id| partition.is_applicable(*id));
                prop_assert!(!result.non_applicable_required.is_empty() || forbidden_absent);
                prop_assert!(result.matches.is_empty());
                continue;
            }
            for model in &result.matches {
                prop_assert!(model.contains_all(&result.applicable_required));
                prop_assert!(!model.contains_any(&query.forbidden));
                prop_assert!(partition.models().contains(model));
            }
            for id in &result.necessary_ids {
                prop_assert!(result.matches.iter().all(|m| m.contains(*id)));
            }
        }
    }
}
