use dialograph_core::{
    ErrorKind, InMemoryPort, LevenshteinVector, Name, Scenario, ScenarioInfo, ScenarioPort,
    SourceText, StateAttrs, StateId,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
struct GraphPlan {
    required: Vec<bool>,
    edges: Vec<(usize, usize)>,
}

fn graph_plan() -> impl Strategy<Value = GraphPlan> {
    (1usize..6).prop_flat_map(|n| {
        (
            proptest::collection::vec(any::<bool>(), n),
            proptest::collection::vec((0..n, 0..n), 0..8),
        )
            .prop_map(|(required, edges)| GraphPlan { required, edges })
    })
}

fn name(s: &str) -> Name {
    Name::new(s).unwrap()
}

fn build(plan: &GraphPlan) -> (Scenario, Vec<StateId>) {
    let mut scenario = Scenario::in_memory(ScenarioInfo::default());
    let mut ids = Vec::new();
    for (idx, required) in plan.required.iter().enumerate() {
        let id = if *required {
            let vector = LevenshteinVector::with_synonyms(
                name(&format!("entry{idx}")),
                [format!("вход {idx}")],
            )
            .unwrap();
            scenario.create_enter_state(vector.into(), true).unwrap().id
        } else {
            scenario
                .restore_state(
                    StateAttrs::named(name(&format!("s{idx}"))),
                    SourceText::default(),
                    false,
                )
                .unwrap()
                .id
        };
        ids.push(id);
    }
    for (idx, (from, to)) in plan.edges.iter().enumerate() {
        let vector = name(&format!("v{idx}"));
        scenario
            .add_vector(LevenshteinVector::new(vector.clone()).into())
            .unwrap();
        scenario
            .create_step_between(ids[*from], ids[*to], &vector)
            .unwrap();
    }
    (scenario, ids)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn test_remove_state_outcome_follows_required_and_incident_steps(plan in graph_plan()) {
        let (scenario, ids) = build(&plan);
        for id in ids {
            let required = scenario.state(id).unwrap().required;
            let touching = scenario.port().steps_touching(id).unwrap();

            let mut copy = Scenario::new(scenario.info().clone(), scenario.port().clone());
            let result = copy.remove_state(id);
            if required {
                prop_assert_eq!(result.unwrap_err().kind(), ErrorKind::Forbidden);
            } else if !touching.is_empty() {
                prop_assert_eq!(result.unwrap_err().kind(), ErrorKind::Conflict);
            } else {
                prop_assert!(result.is_ok());
                prop_assert!(!copy.states(None).unwrap().contains_key(&id));
            }
        }
    }

    #[test]
    fn test_used_vectors_become_removable_once_unused(plan in graph_plan()) {
        let (mut scenario, ids) = build(&plan);
        for (idx, (from, _)) in plan.edges.iter().enumerate() {
            let vector = name(&format!("v{idx}"));
            prop_assert_eq!(
                scenario.remove_vector(&vector).unwrap_err().kind(),
                ErrorKind::Conflict
            );
            scenario.remove_step(ids[*from], &vector).unwrap();
            prop_assert!(scenario.remove_vector(&vector).is_ok());
        }
    }
}
