//! Property-based tests over randomly shaped plans
//!
//! Plans are generated from a fixed set of line templates at random (but well-formed)
//! depths, so every structural combination of parents, operators, values and contexts shows
//! up without the tests depending on any particular sample.

use normcode_compiler::normcode::ast::WorkingInterpretation;
use normcode_compiler::normcode::building::inferences::resolves;
use normcode_compiler::normcode::building::syntax::imperative::binding_of;
use normcode_compiler::normcode::parsing::parse;
use normcode_compiler::normcode::pipeline::Compiler;
use normcode_compiler::normcode::reindex::reindex;
use proptest::prelude::*;

const NAMES: [&str; 5] = ["a", "b", "total", "row", "ok"];

const TEMPLATES: [&str; 19] = [
    ":<: {NAME}",
    ":>: {NAME} | %{ground}: true",
    "<- {NAME}",
    "<- {NAME}<:{1}>",
    "<- {NAME}<:{2}> | %{axis}: [day]",
    "<- [NAME] | %{collapse}: [day]",
    "<- <NAME>",
    "<- {NAME's rows}",
    "<* {NAME}<$([items])*>",
    "<* {NAME}<$([items])*-1>",
    "<= ::(combine {1} and {2})",
    "<= ::(NAME holds)<{ALL True}>",
    "<= $. %>({NAME})",
    "<= $. %>(NAME)",
    "<= &[#] %>[{a}, {b}]",
    "<= &[#] %>[{NAME's rows}, {b}]",
    "<= &[{}] | %{by_axes}: [[x], [y], [z]]",
    "<= *every %>(items) %<({NAME})",
    "<= @if %>(<NAME>)",
];

fn plan_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        (0usize..3, 0..TEMPLATES.len(), 0..NAMES.len()),
        1..30,
    )
    .prop_map(|lines| {
        let mut depth = 0usize;
        let mut plan = String::new();
        for (idx, (step, template, name)) in lines.into_iter().enumerate() {
            if idx > 0 {
                depth = match step {
                    0 => depth.saturating_sub(1),
                    1 => depth,
                    _ => (depth + 1).min(4),
                };
            }
            plan.push_str(&" ".repeat(depth * 4));
            plan.push_str(&TEMPLATES[template].replace("NAME", NAMES[name]));
            plan.push('\n');
        }
        plan
    })
}

proptest! {
    #[test]
    fn test_tables_are_sorted(plan in plan_strategy()) {
        let compiled = Compiler::default().compile(&plan);
        for pair in compiled.inferences.windows(2) {
            prop_assert!(pair[0].position <= pair[1].position);
        }
        for pair in compiled.concepts.windows(2) {
            prop_assert!(pair[0].first_position() <= pair[1].first_position());
        }
    }

    #[test]
    fn test_grouping_has_one_axis_entry_per_value(plan in plan_strategy()) {
        let compiled = Compiler::default().compile(&plan);
        for row in &compiled.inferences {
            if let WorkingInterpretation::Grouping(syntax) = &row.working_interpretation {
                prop_assert_eq!(syntax.by_axes.len(), row.value_concepts.len());
            }
        }
    }

    #[test]
    fn test_value_order_only_names_value_concepts(plan in plan_strategy()) {
        let compiled = Compiler::default().compile(&plan);
        for row in &compiled.inferences {
            if let WorkingInterpretation::Imperative(syntax) = &row.working_interpretation {
                for key in syntax.value_order.keys() {
                    prop_assert!(row.value_concepts.contains(key), "{} not a value of {}", key, row.position);
                }
            }
        }
    }

    #[test]
    fn test_bound_siblings_exclude_unbound_ones(plan in plan_strategy()) {
        let compiled = Compiler::default().compile(&plan);
        for row in &compiled.inferences {
            let WorkingInterpretation::Imperative(syntax) = &row.working_interpretation else {
                continue;
            };
            let Some(cluster) = compiled
                .clusters
                .iter()
                .find(|c| c.position == row.position && c.concept_to_infer.is_some())
            else {
                continue;
            };
            if !cluster.value_concepts.iter().any(|v| binding_of(v).is_some()) {
                continue;
            }
            for value in cluster.value_concepts.iter().filter(|v| binding_of(v).is_none()) {
                let reference = value.reference();
                let also_bound = cluster
                    .value_concepts
                    .iter()
                    .any(|v| binding_of(v).is_some() && v.reference() == reference);
                prop_assert!(
                    also_bound || !syntax.value_order.contains_key(&reference),
                    "unbound {} ordered at {}",
                    reference,
                    row.position
                );
            }
        }
    }

    #[test]
    fn test_produced_concepts_are_never_ground(plan in plan_strategy()) {
        let compiled = Compiler::default().compile(&plan);
        for cluster in &compiled.clusters {
            let Some(parent) = &cluster.concept_to_infer else { continue };
            let derived = parent.role_marker().is_some_and(|m| m.is_derived());
            if !derived || parent.kind().is_function_like() {
                continue;
            }
            let row = compiled
                .concepts
                .iter()
                .find(|c| c.natural_name == parent.name() && c.element_type.is_none());
            prop_assert!(row.is_some_and(|c| !c.is_ground), "{} is ground", parent.name());
        }
    }

    #[test]
    fn test_concept_to_infer_is_a_concept_or_placeholder(plan in plan_strategy()) {
        let compiled = Compiler::default().compile(&plan);
        for row in &compiled.inferences {
            let placeholder = format!("{{_inferred_{}}}", row.position);
            prop_assert!(
                row.concept_to_infer == placeholder || resolves(&row.concept_to_infer, &compiled.concepts),
                "{} infers unknown {}",
                row.position,
                row.concept_to_infer
            );
            prop_assert!(!row.function_concept.is_empty());
        }
    }

    #[test]
    fn test_reindex_is_idempotent(plan in plan_strategy()) {
        let once = reindex(&plan, 4);
        let twice = reindex(&once.text, 4);
        prop_assert_eq!(&twice.text, &once.text);
        prop_assert_eq!(twice.updated, 0);
    }

    #[test]
    fn test_reindex_preserves_positions(plan in plan_strategy()) {
        let before: Vec<String> = parse(&plan, 4).iter().map(|l| l.position.to_string()).collect();
        let reindexed = reindex(&plan, 4);
        let after: Vec<String> = parse(&reindexed.text, 4).iter().map(|l| l.position.to_string()).collect();
        prop_assert_eq!(before, after);
    }
}
