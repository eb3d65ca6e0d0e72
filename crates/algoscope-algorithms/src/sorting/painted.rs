//! In-place sorts that report progress through a paint callback.

use crate::adapter::{Color, Paint};

fn highlight(colors: &mut [Color], indices: &[usize], color: Color) {
    for &i in indices {
        colors[i] = color;
    }
}

pub fn bubble_sort(arr: &mut [f64], paint: &mut Paint<'_>) {
    let n = arr.len();
    let mut colors = vec![Color::Default; n];
    for pass in 0..n {
        let mut swapped = false;
        for j in 0..n.saturating_sub(pass + 1) {
            highlight(&mut colors, &[j, j + 1], Color::Active);
            paint(arr, &colors);
            if arr[j] > arr[j + 1] {
                arr.swap(j, j + 1);
                highlight(&mut colors, &[j, j + 1], Color::Swapping);
                paint(arr, &colors);
                swapped = true;
            }
            highlight(&mut colors, &[j, j + 1], Color::Default);
        }
        if !swapped {
            break;
        }
    }
}

pub fn selection_sort(arr: &mut [f64], paint: &mut Paint<'_>) {
    let n = arr.len();
    let mut colors = vec![Color::Default; n];
    for i in 0..n.saturating_sub(1) {
        let mut min = i;
        colors[min] = Color::Marked;
        for j in i + 1..n {
            colors[j] = Color::Active;
            paint(arr, &colors);
            colors[j] = Color::Default;
            if arr[j] < arr[min] {
                colors[min] = Color::Default;
                min = j;
                colors[min] = Color::Marked;
            }
        }
        if min != i {
            arr.swap(i, min);
            highlight(&mut colors, &[i, min], Color::Swapping);
            paint(arr, &colors);
        }
        highlight(&mut colors, &[i, min], Color::Default);
    }
}

pub fn gnome_sort(arr: &mut [f64], paint: &mut Paint<'_>) {
    let n = arr.len();
    let mut colors = vec![Color::Default; n];
    let mut i = 1;
    while i < n {
        highlight(&mut colors, &[i - 1, i], Color::Active);
        paint(arr, &colors);
        highlight(&mut colors, &[i - 1, i], Color::Default);
        if arr[i - 1] <= arr[i] {
            i += 1;
        } else {
            arr.swap(i - 1, i);
            highlight(&mut colors, &[i - 1, i], Color::Swapping);
            paint(arr, &colors);
            highlight(&mut colors, &[i - 1, i], Color::Default);
            i = (i - 1).max(1);
        }
    }
}

pub fn cocktail_sort(arr: &mut [f64], paint: &mut Paint<'_>) {
    let n = arr.len();
    if n < 2 {
        return;
    }
    let mut colors = vec![Color::Default; n];
    let (mut start, mut end) = (0, n - 1);

    let mut step = |arr: &mut [f64], j: usize, colors: &mut [Color]| -> bool {
        highlight(colors, &[j, j + 1], Color::Active);
        paint(arr, colors);
        let swapped = arr[j] > arr[j + 1];
        if swapped {
            arr.swap(j, j + 1);
            highlight(colors, &[j, j + 1], Color::Swapping);
            paint(arr, colors);
        }
        highlight(colors, &[j, j + 1], Color::Default);
        swapped
    };

    while start < end {
        let mut swapped = false;
        for j in start..end {
            swapped |= step(arr, j, &mut colors);
        }
        end -= 1;
        if !swapped {
            break;
        }
        swapped = false;
        for j in (start..end).rev() {
            swapped |= step(arr, j, &mut colors);
        }
        start += 1;
        if !swapped {
            break;
        }
    }
}
