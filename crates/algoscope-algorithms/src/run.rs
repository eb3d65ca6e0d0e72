//! Entry points that validate input, pick an adapter and run it.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use algoscope_core::StepList;

use crate::catalog::{self, Category};
use crate::error::{Result, ValidationError};
use crate::validate;

/// Everything a playback surface needs to replay one algorithm run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlgorithmRun {
    #[serde(rename = "type")]
    pub category: Category,
    pub algorithm: String,
    pub steps: StepList,
    pub final_array: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<f64>,
}

/// Run `name` over loosely typed JSON input.
///
/// The array is validated first; a target is required (and validated) only
/// for searching algorithms. Unknown names pass the input through.
pub fn run_algorithm(name: &str, array: &Value, target: Option<&Value>) -> Result<AlgorithmRun> {
    let input = validate::numeric_sequence(array)?;
    let target = match catalog::classify(name) {
        Category::Searching => Some(validate::search_target(target)?),
        _ => None,
    };
    execute(name, &input, target)
}

/// Run `name` over numbers the caller already holds.
pub fn execute(name: &str, input: &[f64], target: Option<f64>) -> Result<AlgorithmRun> {
    validate::numbers(input)?;
    let category = catalog::classify(name);
    let target = match category {
        Category::Searching => {
            let t = target.ok_or(ValidationError::MissingTarget)?;
            if !t.is_finite() {
                return Err(ValidationError::NonNumericTarget(t.to_string()));
            }
            Some(t)
        }
        _ => None,
    };

    debug!(algorithm = name, ?category, len = input.len(), "running algorithm");
    let produced = catalog::producer_for(name).produce(input, target);
    info!(
        algorithm = name,
        ?category,
        steps = produced.steps.len(),
        "algorithm produced steps"
    );

    // pass-through runs report as sorting so consumers only see two kinds
    Ok(AlgorithmRun {
        category: match category {
            Category::Unknown => Category::Sorting,
            known => known,
        },
        algorithm: name.to_string(),
        steps: produced.steps,
        final_array: produced.final_array,
        target,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use algoscope_core::StepKind;
    use proptest::prelude::*;
    use serde_json::json;

    const SORTS: [&str; 12] = [
        "bubbleSort",
        "selectionSort",
        "gnomeSort",
        "cocktailSort",
        "insertionSort",
        "mergeSort",
        "quickSort",
        "heapSort",
        "shellSort",
        "cycleSort",
        "bucketSort",
        "builtinSort",
    ];

    #[test]
    fn runs_are_deterministic() {
        let input = json!([5, 3, 8, 1, 9, 2, 7]);
        for name in SORTS {
            let a = run_algorithm(name, &input, None).unwrap();
            let b = run_algorithm(name, &input, None).unwrap();
            assert_eq!(a.steps, b.steps, "{}", name);
        }
        let a = run_algorithm("binarySearch", &input, Some(&json!(7))).unwrap();
        let b = run_algorithm("binarySearch", &input, Some(&json!(7))).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn every_sort_ends_with_one_done_holding_sorted_array() {
        let input = json!([5, 3, 8, 1, 9, 2, 7, 3]);
        let expected = vec![1.0, 2.0, 3.0, 3.0, 5.0, 7.0, 8.0, 9.0];
        for name in SORTS {
            let run = run_algorithm(name, &input, None).unwrap();
            assert_eq!(run.category, Category::Sorting);
            assert_eq!(run.steps.count_of(StepKind::Done), 1, "{}", name);
            let last = run.steps.last().unwrap();
            assert_eq!(last.kind, StepKind::Done, "{}", name);
            assert_eq!(last.array.as_deref(), Some(expected.as_slice()), "{}", name);
            assert_eq!(run.final_array, expected, "{}", name);
        }
    }

    #[test]
    fn unknown_name_passes_input_through() {
        let run = run_algorithm("bogoSort", &json!([3, 1, 2]), None).unwrap();
        assert_eq!(run.steps.kinds(), vec![StepKind::Done]);
        assert_eq!(run.final_array, vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn searches_end_with_found_or_not_found_then_done() {
        let input = json!([9, 4, 7, 1]);
        for name in ["linearSearch", "binarySearch", "jumpSearch"] {
            let hit = run_algorithm(name, &input, Some(&json!(7))).unwrap();
            assert_eq!(hit.category, Category::Searching);
            let kinds = hit.steps.kinds();
            assert_eq!(kinds[kinds.len() - 2..], [StepKind::Found, StepKind::Done], "{}", name);

            let miss = run_algorithm(name, &input, Some(&json!("5"))).unwrap();
            let kinds = miss.steps.kinds();
            assert_eq!(kinds[kinds.len() - 2..], [StepKind::NotFound, StepKind::Done], "{}", name);
        }
    }

    #[test]
    fn ordered_searches_report_the_searched_array() {
        let run = run_algorithm("jumpSearch", &json!([9, 4, 7, 1]), Some(&json!(4))).unwrap();
        assert_eq!(run.final_array, vec![1.0, 4.0, 7.0, 9.0]);
        let linear = run_algorithm("linearSearch", &json!([9, 4, 7, 1]), Some(&json!(4))).unwrap();
        assert_eq!(linear.final_array, vec![9.0, 4.0, 7.0, 1.0]);
    }

    #[test]
    fn validation_rejects_before_running() {
        assert_eq!(run_algorithm("bubbleSort", &json!([]), None), Err(ValidationError::EmptyInput));
        assert!(matches!(
            run_algorithm("bubbleSort", &json!(["a", "b"]), None),
            Err(ValidationError::NonNumeric { index: 0, .. })
        ));
        assert_eq!(
            run_algorithm("linearSearch", &json!([1, 2]), Some(&json!(null))),
            Err(ValidationError::MissingTarget)
        );
        assert_eq!(
            run_algorithm("binarySearch", &json!([1, 2]), None),
            Err(ValidationError::MissingTarget)
        );
    }

    #[test]
    fn sorts_ignore_target() {
        let run = run_algorithm("mergeSort", &json!([2, 1]), Some(&json!("junk"))).unwrap();
        assert_eq!(run.target, None);
    }

    #[test]
    fn typed_entry_requires_target_for_searches() {
        assert_eq!(execute("linearSearch", &[1.0], None), Err(ValidationError::MissingTarget));
        assert!(execute("linearSearch", &[1.0], Some(1.0)).is_ok());
    }

    #[test]
    fn serializes_with_type_tag() {
        let run = execute("builtinSort", &[2.0, 1.0], None).unwrap();
        let json = serde_json::to_value(&run).unwrap();
        assert_eq!(json["type"], "sorting");
        assert_eq!(json["finalArray"], json!([1.0, 2.0]));
        assert_eq!(json["steps"][0]["type"], "done");
        assert!(json.get("target").is_none());
    }

    proptest! {
        #[test]
        fn every_sort_sorts(input in proptest::collection::vec(-1000i32..1000, 1..40)) {
            let input: Vec<f64> = input.into_iter().map(f64::from).collect();
            let mut expected = input.clone();
            expected.sort_by(f64::total_cmp);
            for name in SORTS {
                let run = execute(name, &input, None).unwrap();
                prop_assert_eq!(&run.final_array, &expected);
                prop_assert_eq!(run.steps.count_of(StepKind::Done), 1);
            }
        }

        #[test]
        fn searches_find_present_targets(
            input in proptest::collection::vec(-50i32..50, 1..30),
            pick in any::<proptest::sample::Index>(),
        ) {
            let input: Vec<f64> = input.into_iter().map(f64::from).collect();
            let target = input[pick.index(input.len())];
            for name in ["linearSearch", "binarySearch", "jumpSearch"] {
                let run = execute(name, &input, Some(target)).unwrap();
                let found = run.steps.iter().find(|s| s.kind == StepKind::Found);
                prop_assert!(found.is_some(), "{} missed {}", name, target);
                let index = found.unwrap().indices[0];
                prop_assert_eq!(run.final_array[index], target);
            }
        }
    }
}
