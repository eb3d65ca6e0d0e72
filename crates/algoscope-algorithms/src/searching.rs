//! Searching algorithms. All of them are logged.

use crate::adapter::Event;

pub fn linear_search(input: &[f64], target: Option<f64>) -> Vec<Event> {
    let Some(target) = target else {
        return vec![Event::NotFound];
    };
    let mut events = Vec::new();
    for (i, &value) in input.iter().enumerate() {
        events.push(Event::Probe(i));
        if value == target {
            events.push(Event::Found(i));
            return events;
        }
    }
    events.push(Event::NotFound);
    events
}

/// Expects sorted input.
pub fn binary_search(input: &[f64], target: Option<f64>) -> Vec<Event> {
    let Some(target) = target else {
        return vec![Event::NotFound];
    };
    let mut events = Vec::new();
    let (mut lo, mut hi) = (0usize, input.len());
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        events.push(Event::Probe(mid));
        if input[mid] == target {
            events.push(Event::Found(mid));
            return events;
        }
        if input[mid] < target {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    events.push(Event::NotFound);
    events
}

/// Expects sorted input. Jumps in blocks of sqrt(n), then scans one block.
pub fn jump_search(input: &[f64], target: Option<f64>) -> Vec<Event> {
    let Some(target) = target else {
        return vec![Event::NotFound];
    };
    let n = input.len();
    if n == 0 {
        return vec![Event::NotFound];
    }
    let block = ((n as f64).sqrt() as usize).max(1);
    let mut events = Vec::new();

    let (mut start, mut end) = (0, block.min(n));
    loop {
        events.push(Event::Probe(end - 1));
        if input[end - 1] >= target {
            break;
        }
        start = end;
        if start >= n {
            events.push(Event::NotFound);
            return events;
        }
        end = (end + block).min(n);
    }

    for i in start..end {
        events.push(Event::Probe(i));
        if input[i] == target {
            events.push(Event::Found(i));
            return events;
        }
        if input[i] > target {
            break;
        }
    }
    events.push(Event::NotFound);
    events
}
