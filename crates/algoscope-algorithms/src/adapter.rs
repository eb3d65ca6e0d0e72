//! Adapters normalizing heterogeneous algorithm conventions into step lists.
//!
//! Algorithms come in three shapes:
//!
//! - **Painted**: mutate the array in place and report a color per index
//!   after every significant action ([`CallbackAdapter`]).
//! - **Logged**: read an immutable copy and return abstract [`Event`]s that
//!   only carry indices ([`EventLogAdapter`]).
//! - **Direct**: return the finished array and nothing else ([`ValueAdapter`]).
//!
//! Unknown algorithms go through [`PassThrough`]. Every adapter ends its list
//! with exactly one `done` step.

use algoscope_core::{Operation, Step, StepKind, StepList, StepRecorder};

/// Per-index color reported by painted algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Default,
    /// Being compared
    Active,
    /// Just exchanged
    Swapping,
    /// Tracked by the algorithm (current minimum, pivot, ...)
    Marked,
}

/// Callback a painted algorithm invokes with the array and its colors.
pub type Paint<'a> = dyn FnMut(&[f64], &[Color]) + 'a;

/// An algorithm that sorts in place and paints as it goes.
pub type PaintedAlgorithm = fn(&mut [f64], &mut Paint<'_>);

/// An algorithm that returns an event log. The second argument is the
/// search target, ignored by sorts.
pub type LoggedAlgorithm = fn(&[f64], Option<f64>) -> Vec<Event>;

/// An algorithm that only returns its result.
pub type DirectAlgorithm = fn(&[f64]) -> Vec<f64>;

/// Abstract event emitted by logged algorithms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    Compare(usize, usize),
    Swap(usize, usize),
    /// Copy `value` into `index` (merge-style write)
    Move { index: usize, value: f64 },
    /// Rotate `value` into `index` as part of a permutation cycle
    Cycle { index: usize, value: f64 },
    /// Drop a held key into `index`
    Insert { index: usize, value: f64 },
    Probe(usize),
    Found(usize),
    NotFound,
}

/// Output of a [`StepProducer`].
#[derive(Debug, Clone, PartialEq)]
pub struct Produced {
    pub steps: StepList,
    pub final_array: Vec<f64>,
}

/// The single interface every adapter implements.
pub trait StepProducer: Send + Sync {
    fn produce(&self, input: &[f64], target: Option<f64>) -> Produced;
}

fn finish(mut steps: StepRecorder, final_array: Vec<f64>, operation: Operation) -> Produced {
    steps.push(Step::done(&final_array).with_operation(operation));
    Produced {
        steps: steps.finish(),
        final_array,
    }
}

/// Turns every paint callback into a `compare` step.
#[derive(Debug, Clone, Copy)]
pub struct CallbackAdapter {
    pub algorithm: PaintedAlgorithm,
}

impl StepProducer for CallbackAdapter {
    fn produce(&self, input: &[f64], _target: Option<f64>) -> Produced {
        let mut working = input.to_vec();
        let mut steps = StepRecorder::new();

        (self.algorithm)(&mut working, &mut |array, colors| {
            let highlighted = colors
                .iter()
                .enumerate()
                .filter(|(_, c)| **c != Color::Default)
                .map(|(i, _)| i)
                .collect();
            steps.push(
                Step::on_array(StepKind::Compare, highlighted, array)
                    .with_operation(Operation::Sort),
            );
        });

        finish(steps, working, Operation::Sort)
    }
}

/// Replays an event log against a working copy to materialize snapshots.
#[derive(Debug, Clone, Copy)]
pub struct EventLogAdapter {
    pub algorithm: LoggedAlgorithm,
    /// Run against a sorted copy (binary and jump search).
    pub presort: bool,
    pub operation: Operation,
}

impl EventLogAdapter {
    fn step_for(&self, event: Event, working: &mut [f64], target: Option<f64>) -> Option<Step> {
        let len = working.len();
        let step = match event {
            Event::Compare(i, j) if i < len && j < len => {
                Step::on_array(StepKind::Compare, vec![i, j], working)
            }
            Event::Swap(i, j) if i < len && j < len => {
                working.swap(i, j);
                Step::on_array(StepKind::Swap, vec![i, j], working)
            }
            Event::Move { index, value } if index < len => {
                working[index] = value;
                Step::on_array(StepKind::Move, vec![index], working).with_value(value)
            }
            Event::Cycle { index, value } if index < len => {
                working[index] = value;
                Step::on_array(StepKind::Cycle, vec![index], working).with_value(value)
            }
            Event::Insert { index, value } if index < len => {
                working[index] = value;
                Step::on_array(StepKind::Insert, vec![index], working).with_value(value)
            }
            Event::Probe(i) if i < len => {
                Step::on_array(StepKind::Probe, vec![i], working).with_value(working[i])
            }
            Event::Found(i) if i < len => Step::on_array(StepKind::Found, vec![i], working)
                .with_value(working[i])
                .with_description(format!("found at index {}", i)),
            Event::NotFound => {
                let step = Step::marker(StepKind::NotFound);
                match target {
                    Some(t) => step.with_value(t),
                    None => step,
                }
            }
            other => {
                tracing::warn!(?other, len, "dropping out-of-range event");
                return None;
            }
        };
        Some(step.with_operation(self.operation))
    }
}

impl StepProducer for EventLogAdapter {
    fn produce(&self, input: &[f64], target: Option<f64>) -> Produced {
        let mut source = input.to_vec();
        if self.presort {
            source.sort_by(f64::total_cmp);
        }

        let events = (self.algorithm)(&source, target);
        let mut working = source.clone();
        let mut steps = StepRecorder::new();
        for event in events {
            if let Some(step) = self.step_for(event, &mut working, target) {
                steps.push(step);
            }
        }

        finish(steps, working, self.operation)
    }
}

/// Synthesizes a lone `done` step from the returned array.
#[derive(Debug, Clone, Copy)]
pub struct ValueAdapter {
    pub algorithm: DirectAlgorithm,
}

impl StepProducer for ValueAdapter {
    fn produce(&self, input: &[f64], _target: Option<f64>) -> Produced {
        finish(StepRecorder::new(), (self.algorithm)(input), Operation::Sort)
    }
}

/// Fallback for names nobody recognizes: the input, unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl StepProducer for PassThrough {
    fn produce(&self, input: &[f64], _target: Option<f64>) -> Produced {
        Produced {
            steps: StepList::new(vec![Step::done(input)]),
            final_array: input.to_vec(),
        }
    }
}
