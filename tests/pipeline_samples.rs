//! End-to-end compilation of the sample plans in `docs/samples/`

use normcode_compiler::normcode::ast::{
    GroupMarker, InferenceEntry, SequenceType, TimingMarker, WorkingInterpretation,
};
use normcode_compiler::normcode::pipeline::to_json;
use normcode_compiler::normcode::testing::NormSources;
use serde_json::json;

fn row<'r>(rows: &'r [InferenceEntry], position: &str) -> &'r InferenceEntry {
    rows.iter()
        .find(|r| r.position.as_str() == position)
        .unwrap_or_else(|| panic!("no inference at {position}"))
}

#[test]
fn test_specification_plan() {
    let plan = NormSources::compile("000-specification.ncds").unwrap();

    assert_eq!(plan.clusters.len(), 1);
    let cluster = &plan.clusters[0];
    assert_eq!(
        cluster.concept_to_infer.as_ref().map(|p| p.name()),
        Some("result")
    );
    assert_eq!(cluster.value_concepts.len(), 1);

    insta::assert_snapshot!(
        to_json(&plan.inferences, false).unwrap(),
        @r#"[{"position":"1","sequence":"assigning","concept_to_infer":"{result}","function_concept":"$.(...) %>({source})","value_concepts":["{source}"],"context_concepts":[],"working_interpretation":{"marker":".","assign_source":"{source}"}}]"#
    );
}

#[test]
fn test_bindings_decide_value_order() {
    let plan = NormSources::compile("010-imperative-bindings.ncds").unwrap();
    let inference = row(&plan.inferences, "1");
    assert_eq!(inference.sequence, SequenceType::Imperative);
    assert_eq!(
        inference.value_concepts,
        vec!["{second number}", "{first number}"]
    );
    let WorkingInterpretation::Imperative(syntax) = &inference.working_interpretation else {
        panic!("expected an imperative interpretation");
    };
    assert_eq!(syntax.value_order.get("{first number}"), Some(&1));
    assert_eq!(syntax.value_order.get("{second number}"), Some(&2));

    let root = plan.clusters[0].concept_to_infer.as_ref().unwrap();
    assert_eq!(root.source_text.as_deref(), Some("the sum of both numbers"));
}

#[test]
fn test_grouping_across() {
    let plan = NormSources::compile("020-grouping-across.ncds").unwrap();
    let WorkingInterpretation::Grouping(syntax) = &row(&plan.inferences, "1").working_interpretation
    else {
        panic!("expected a grouping interpretation");
    };
    assert_eq!(syntax.marker, GroupMarker::Across);
    assert_eq!(syntax.sources, vec!["{left rows}", "{right rows}"]);
    assert_eq!(syntax.by_axes, vec![vec!["row".to_string()]; 2]);

    let left = plan
        .concepts
        .iter()
        .find(|c| c.concept_name == "{left rows}")
        .unwrap();
    assert!(left.is_ground);
    assert_eq!(left.reference_axis_names, vec!["row"]);
}

#[test]
fn test_loop_accumulate() {
    let plan = NormSources::compile("030-loop-accumulate.ncds").unwrap();
    let positions: Vec<&str> = plan.inferences.iter().map(|r| r.position.as_str()).collect();
    assert_eq!(positions, vec!["1", "1.4"]);

    let looping = row(&plan.inferences, "1");
    assert_eq!(looping.context_concepts, vec!["{number}", "{running total}"]);
    let WorkingInterpretation::Looping(syntax) = &looping.working_interpretation else {
        panic!("expected a looping interpretation");
    };
    assert_eq!(syntax.loop_base.as_deref(), Some("[numbers]"));
    assert_eq!(syntax.loop_result.as_deref(), Some("{total}"));
    assert_eq!(syntax.current_element.as_deref(), Some("{number}"));
    assert_eq!(syntax.carry_state.as_deref(), Some("{running total}"));
    assert_eq!(syntax.group_base_axis.as_deref(), Some("number"));

    let promoted = row(&plan.inferences, "1.4");
    assert_eq!(promoted.sequence, SequenceType::Imperative);
    assert_eq!(promoted.concept_to_infer, "{_inferred_1.4}");

    let numbers = plan
        .concepts
        .iter()
        .find(|c| c.concept_name == "[numbers]")
        .unwrap();
    assert_eq!(numbers.reference_data, Some(json!(["%(1)", "%(2)", "%(3)"])));
}

#[test]
fn test_timing_and_judgement() {
    let plan = NormSources::compile("040-timing-judgement.ncds").unwrap();

    let WorkingInterpretation::Timing(timing) = &row(&plan.inferences, "1").working_interpretation
    else {
        panic!("expected a timing interpretation");
    };
    assert_eq!(timing.marker, Some(TimingMarker::If));
    assert_eq!(timing.condition.as_deref(), Some("<data is valid>"));

    let judgement = row(&plan.inferences, "1.2");
    assert_eq!(judgement.sequence, SequenceType::Judgement);
    assert_eq!(
        serde_json::to_value(&judgement.working_interpretation).unwrap(),
        json!({
            "value_order": {"[rows]": 1},
            "assertion_condition": {"quantifier": "all", "condition": "True"}
        })
    );

    let condition = plan
        .concepts
        .iter()
        .find(|c| c.concept_name == "<data is valid>")
        .unwrap();
    assert!(!condition.is_ground);
    assert_eq!(condition.kind, "<>");
}

#[test]
fn test_full_plan() {
    let plan = NormSources::compile("050-full-plan.ncds").unwrap();
    let positions: Vec<&str> = plan.inferences.iter().map(|r| r.position.as_str()).collect();
    assert_eq!(positions, vec!["1", "1.3", "1.4", "1.6"]);

    let root = row(&plan.inferences, "1");
    assert_eq!(root.context_concepts, vec!["{reviewer}"]);

    let abstraction = row(&plan.inferences, "1.3");
    assert_eq!(
        serde_json::to_value(&abstraction.working_interpretation).unwrap(),
        json!({"marker": "%", "face_value": "%(120)", "axis_names": ["_none_axis"]})
    );

    let after = row(&plan.inferences, "1.6");
    assert_eq!(after.concept_to_infer, "{table}");

    let concept = |name: &str| {
        plan.concepts
            .iter()
            .find(|c| c.concept_name == name)
            .unwrap_or_else(|| panic!("no concept {name}"))
    };
    let report = concept("{report}");
    assert!(report.is_final && !report.is_ground);
    assert_eq!(report.element_type.as_deref(), Some("text"));
    assert_eq!(
        concept("{table}").reference_data,
        Some(json!("%{file_location}(data/table.csv)"))
    );
    assert_eq!(concept("{house style}").reference_data, Some(json!("%(plain)")));
    assert!(!concept("{style notes}").is_ground);
    assert!(concept("{reviewer}").is_ground);

    let paradigm = concept("::(summarize {1} within {2})");
    assert_eq!(paradigm.element_type.as_deref(), Some("paradigm"));
    assert_eq!(paradigm.natural_name, "summarize {1} within {2}");
    assert_eq!(
        paradigm.reference_data,
        Some(json!("%{prompt_location}000(prompts/summarize.md)"))
    );
}

#[test]
fn test_every_sample_compiles_to_sorted_tables() {
    for name in NormSources::list_samples() {
        let plan = NormSources::compile(name).unwrap();
        assert!(
            plan.inferences.windows(2).all(|w| w[0].position <= w[1].position),
            "{name}"
        );
        assert!(
            plan.concepts
                .windows(2)
                .all(|w| w[0].first_position() <= w[1].first_position()),
            "{name}"
        );
    }
}
