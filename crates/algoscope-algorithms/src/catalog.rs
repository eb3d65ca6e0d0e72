//! Name-to-algorithm lookup table.
//!
//! The table decides the category of an algorithm and which adapter drives
//! it. Names are matched after normalization, so `bubbleSort`,
//! `bubble-sort` and `Bubble Sort` are the same key.

use algoscope_core::Operation;
use serde::{Deserialize, Serialize};

use crate::adapter::{
    CallbackAdapter, DirectAlgorithm, EventLogAdapter, LoggedAlgorithm, PaintedAlgorithm,
    PassThrough, StepProducer, ValueAdapter,
};
use crate::searching;
use crate::sorting::{direct, logged, painted};

/// What kind of algorithm a name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Sorting,
    Searching,
    Unknown,
}

/// How an algorithm reports its progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AdapterShape {
    Callback,
    EventLog,
    Value,
    PassThrough,
}

/// Public description of a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlgorithmInfo {
    pub key: &'static str,
    pub name: &'static str,
    pub category: Category,
    pub shape: AdapterShape,
    pub complexity: &'static str,
    pub pseudocode: &'static [&'static str],
}

#[derive(Clone, Copy)]
enum Implementation {
    Painted(PaintedAlgorithm),
    Logged { algorithm: LoggedAlgorithm, presort: bool },
    Direct(DirectAlgorithm),
}

struct Entry {
    info: AlgorithmInfo,
    implementation: Implementation,
}

const fn callback_entry(
    key: &'static str,
    name: &'static str,
    complexity: &'static str,
    pseudocode: &'static [&'static str],
    algorithm: PaintedAlgorithm,
) -> Entry {
    Entry {
        info: AlgorithmInfo {
            key,
            name,
            category: Category::Sorting,
            shape: AdapterShape::Callback,
            complexity,
            pseudocode,
        },
        implementation: Implementation::Painted(algorithm),
    }
}

const fn log_entry(
    key: &'static str,
    name: &'static str,
    category: Category,
    complexity: &'static str,
    pseudocode: &'static [&'static str],
    algorithm: LoggedAlgorithm,
    presort: bool,
) -> Entry {
    Entry {
        info: AlgorithmInfo {
            key,
            name,
            category,
            shape: AdapterShape::EventLog,
            complexity,
            pseudocode,
        },
        implementation: Implementation::Logged { algorithm, presort },
    }
}

const fn value_entry(
    key: &'static str,
    name: &'static str,
    complexity: &'static str,
    pseudocode: &'static [&'static str],
    algorithm: DirectAlgorithm,
) -> Entry {
    Entry {
        info: AlgorithmInfo {
            key,
            name,
            category: Category::Sorting,
            shape: AdapterShape::Value,
            complexity,
            pseudocode,
        },
        implementation: Implementation::Direct(algorithm),
    }
}

static CATALOG: &[Entry] = &[
    callback_entry(
        "bubblesort",
        "Bubble Sort",
        "O(n^2)",
        &[
            "repeat until no swaps:",
            "  for j in 0..n-1-pass:",
            "    if a[j] > a[j+1]: swap(a[j], a[j+1])",
        ],
        painted::bubble_sort,
    ),
    callback_entry(
        "selectionsort",
        "Selection Sort",
        "O(n^2)",
        &[
            "for i in 0..n-1:",
            "  min = index of smallest in a[i..n]",
            "  swap(a[i], a[min])",
        ],
        painted::selection_sort,
    ),
    callback_entry(
        "gnomesort",
        "Gnome Sort",
        "O(n^2)",
        &[
            "i = 1",
            "while i < n:",
            "  if a[i-1] <= a[i]: i += 1",
            "  else: swap(a[i-1], a[i]); i -= 1",
        ],
        painted::gnome_sort,
    ),
    callback_entry(
        "cocktailsort",
        "Cocktail Shaker Sort",
        "O(n^2)",
        &[
            "while swapped:",
            "  bubble forward over [start, end)",
            "  bubble backward over [start, end)",
        ],
        painted::cocktail_sort,
    ),
    log_entry(
        "insertionsort",
        "Insertion Sort",
        Category::Sorting,
        "O(n^2)",
        &[
            "for i in 1..n:",
            "  key = a[i]; j = i",
            "  while j > 0 and a[j-1] > key: a[j] = a[j-1]; j -= 1",
            "  a[j] = key",
        ],
        logged::insertion_sort,
        false,
    ),
    log_entry(
        "mergesort",
        "Merge Sort",
        Category::Sorting,
        "O(n log n)",
        &[
            "split a into halves",
            "sort each half",
            "merge halves by repeatedly taking the smaller head",
        ],
        logged::merge_sort,
        false,
    ),
    log_entry(
        "quicksort",
        "Quick Sort",
        Category::Sorting,
        "O(n log n) average, O(n^2) worst",
        &[
            "pivot = a[hi]",
            "move every element < pivot before the store index",
            "swap pivot into the store index",
            "sort both sides of the pivot",
        ],
        logged::quick_sort,
        false,
    ),
    log_entry(
        "heapsort",
        "Heap Sort",
        Category::Sorting,
        "O(n log n)",
        &[
            "build a max-heap",
            "for end in n-1..1:",
            "  swap(a[0], a[end]); sift_down(0, end)",
        ],
        logged::heap_sort,
        false,
    ),
    log_entry(
        "shellsort",
        "Shell Sort",
        Category::Sorting,
        "O(n^2) worst with halving gaps",
        &[
            "gap = n / 2",
            "gapped insertion sort",
            "gap = gap / 2 until 0",
        ],
        logged::shell_sort,
        false,
    ),
    log_entry(
        "cyclesort",
        "Cycle Sort",
        Category::Sorting,
        "O(n^2)",
        &[
            "for each cycle start:",
            "  pos = start + count of smaller elements",
            "  rotate the item into pos until the cycle closes",
        ],
        logged::cycle_sort,
        false,
    ),
    value_entry(
        "bucketsort",
        "Bucket Sort",
        "O(n + k) average",
        &[
            "distribute values into equal-width buckets",
            "sort each bucket",
            "concatenate buckets",
        ],
        direct::bucket_sort,
    ),
    value_entry(
        "builtinsort",
        "Built-in Sort",
        "O(n log n)",
        &["sort with the standard library"],
        direct::builtin_sort,
    ),
    log_entry(
        "linearsearch",
        "Linear Search",
        Category::Searching,
        "O(n)",
        &[
            "for i in 0..n:",
            "  if a[i] == target: return i",
            "return not found",
        ],
        searching::linear_search,
        false,
    ),
    log_entry(
        "binarysearch",
        "Binary Search",
        Category::Searching,
        "O(log n)",
        &[
            "lo = 0; hi = n",
            "mid = (lo + hi) / 2",
            "if a[mid] == target: return mid",
            "narrow to the half that can hold target",
        ],
        searching::binary_search,
        true,
    ),
    log_entry(
        "jumpsearch",
        "Jump Search",
        Category::Searching,
        "O(sqrt n)",
        &[
            "jump ahead in blocks of sqrt(n) while a[end-1] < target",
            "scan the block linearly",
        ],
        searching::jump_search,
        true,
    ),
];

/// Lowercase alphanumerics only.
pub fn normalize(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn lookup(name: &str) -> Option<&'static Entry> {
    let key = normalize(name);
    CATALOG.iter().find(|e| e.info.key == key)
}

/// Category of `name`. Unknown names are [`Category::Unknown`], never an error.
pub fn classify(name: &str) -> Category {
    lookup(name).map_or(Category::Unknown, |e| e.info.category)
}

/// Catalog details for `name`, if known.
pub fn info(name: &str) -> Option<AlgorithmInfo> {
    lookup(name).map(|e| e.info)
}

/// Every known algorithm in catalog order.
pub fn algorithms() -> impl Iterator<Item = AlgorithmInfo> {
    CATALOG.iter().map(|e| e.info)
}

/// The adapter that drives `name`.
pub fn producer_for(name: &str) -> Box<dyn StepProducer> {
    let Some(entry) = lookup(name) else {
        return Box::new(PassThrough);
    };
    match entry.implementation {
        Implementation::Painted(algorithm) => Box::new(CallbackAdapter { algorithm }),
        Implementation::Logged { algorithm, presort } => Box::new(EventLogAdapter {
            algorithm,
            presort,
            operation: match entry.info.category {
                Category::Searching => Operation::Search,
                _ => Operation::Sort,
            },
        }),
        Implementation::Direct(algorithm) => Box::new(ValueAdapter { algorithm }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn classification_is_total() {
        assert_eq!(classify("bubbleSort"), Category::Sorting);
        assert_eq!(classify("Binary Search"), Category::Searching);
        assert_eq!(classify("jump-search"), Category::Searching);
        assert_eq!(classify("bogoSort"), Category::Unknown);
        assert_eq!(classify(""), Category::Unknown);
    }

    #[test]
    fn keys_are_unique_and_normalized() {
        let keys: HashSet<_> = algorithms().map(|a| a.key).collect();
        assert_eq!(keys.len(), CATALOG.len());
        for key in keys {
            assert_eq!(normalize(key), key);
        }
    }

    #[test]
    fn every_entry_has_pseudocode() {
        assert!(algorithms().all(|a| !a.pseudocode.is_empty()));
    }

    #[test]
    fn info_reports_shape() {
        assert_eq!(info("mergeSort").map(|i| i.shape), Some(AdapterShape::EventLog));
        assert_eq!(info("bubble_sort").map(|i| i.shape), Some(AdapterShape::Callback));
        assert_eq!(info("bucketSort").map(|i| i.shape), Some(AdapterShape::Value));
        assert!(info("nope").is_none());
    }
}
