//! Sorts that describe themselves as an event log.
//!
//! Each function sorts a private copy and records what it did. The caller
//! replays the log against its own copy to rebuild intermediate arrays.

use crate::adapter::Event;

pub fn insertion_sort(input: &[f64], _target: Option<f64>) -> Vec<Event> {
    let mut a = input.to_vec();
    let mut events = Vec::new();
    for i in 1..a.len() {
        let key = a[i];
        let mut j = i;
        while j > 0 {
            events.push(Event::Compare(j - 1, j));
            if a[j - 1] <= key {
                break;
            }
            a[j] = a[j - 1];
            events.push(Event::Move { index: j, value: a[j] });
            j -= 1;
        }
        a[j] = key;
        events.push(Event::Insert { index: j, value: key });
    }
    events
}

pub fn merge_sort(input: &[f64], _target: Option<f64>) -> Vec<Event> {
    let mut a = input.to_vec();
    let mut events = Vec::new();
    merge_range(&mut a, 0, input.len(), &mut events);
    events
}

fn merge_range(a: &mut [f64], lo: usize, hi: usize, events: &mut Vec<Event>) {
    if hi - lo <= 1 {
        return;
    }
    let mid = lo + (hi - lo) / 2;
    merge_range(a, lo, mid, events);
    merge_range(a, mid, hi, events);

    let left = a[lo..mid].to_vec();
    let right = a[mid..hi].to_vec();
    let (mut i, mut j, mut k) = (0, 0, lo);
    while i < left.len() && j < right.len() {
        events.push(Event::Compare(lo + i, mid + j));
        if left[i] <= right[j] {
            a[k] = left[i];
            i += 1;
        } else {
            a[k] = right[j];
            j += 1;
        }
        events.push(Event::Move { index: k, value: a[k] });
        k += 1;
    }
    for &value in left[i..].iter().chain(&right[j..]) {
        a[k] = value;
        events.push(Event::Move { index: k, value });
        k += 1;
    }
}

pub fn quick_sort(input: &[f64], _target: Option<f64>) -> Vec<Event> {
    let mut a = input.to_vec();
    let mut events = Vec::new();
    // explicit stack of inclusive ranges
    let mut ranges = vec![(0usize, a.len().saturating_sub(1))];
    while let Some((lo, hi)) = ranges.pop() {
        if lo >= hi {
            continue;
        }
        let pivot = a[hi];
        let mut store = lo;
        for j in lo..hi {
            events.push(Event::Compare(j, hi));
            if a[j] < pivot {
                if store != j {
                    a.swap(store, j);
                    events.push(Event::Swap(store, j));
                }
                store += 1;
            }
        }
        if store != hi {
            a.swap(store, hi);
            events.push(Event::Swap(store, hi));
        }
        if store > lo {
            ranges.push((lo, store - 1));
        }
        ranges.push((store + 1, hi));
    }
    events
}

pub fn heap_sort(input: &[f64], _target: Option<f64>) -> Vec<Event> {
    let mut a = input.to_vec();
    let mut events = Vec::new();
    let n = a.len();
    for root in (0..n / 2).rev() {
        sift_down(&mut a, root, n, &mut events);
    }
    for end in (1..n).rev() {
        a.swap(0, end);
        events.push(Event::Swap(0, end));
        sift_down(&mut a, 0, end, &mut events);
    }
    events
}

fn sift_down(a: &mut [f64], mut root: usize, len: usize, events: &mut Vec<Event>) {
    loop {
        let mut largest = root;
        for child in [2 * root + 1, 2 * root + 2] {
            if child < len {
                events.push(Event::Compare(child, largest));
                if a[child] > a[largest] {
                    largest = child;
                }
            }
        }
        if largest == root {
            return;
        }
        a.swap(root, largest);
        events.push(Event::Swap(root, largest));
        root = largest;
    }
}

pub fn shell_sort(input: &[f64], _target: Option<f64>) -> Vec<Event> {
    let mut a = input.to_vec();
    let mut events = Vec::new();
    let mut gap = a.len() / 2;
    while gap > 0 {
        for i in gap..a.len() {
            let mut j = i;
            while j >= gap {
                events.push(Event::Compare(j - gap, j));
                if a[j - gap] <= a[j] {
                    break;
                }
                a.swap(j - gap, j);
                events.push(Event::Swap(j - gap, j));
                j -= gap;
            }
        }
        gap /= 2;
    }
    events
}

/// Minimizes writes: each value is rotated straight into its final slot.
pub fn cycle_sort(input: &[f64], _target: Option<f64>) -> Vec<Event> {
    let mut a = input.to_vec();
    let mut events = Vec::new();
    let n = a.len();

    let position_of = |a: &[f64], start: usize, item: f64, events: &mut Vec<Event>| {
        let mut pos = start;
        for i in start + 1..n {
            events.push(Event::Compare(i, start));
            if a[i] < item {
                pos += 1;
            }
        }
        pos
    };

    for start in 0..n.saturating_sub(1) {
        let mut item = a[start];
        let mut pos = position_of(&a, start, item, &mut events);
        if pos == start {
            continue;
        }
        while item == a[pos] {
            pos += 1;
        }
        std::mem::swap(&mut item, &mut a[pos]);
        events.push(Event::Cycle { index: pos, value: a[pos] });

        while pos != start {
            pos = position_of(&a, start, item, &mut events);
            while item == a[pos] {
                pos += 1;
            }
            if item != a[pos] {
                std::mem::swap(&mut item, &mut a[pos]);
                events.push(Event::Cycle { index: pos, value: a[pos] });
            }
        }
    }
    events
}
