use crate::structs::{ChartLayout, ChartPoint, ChartSeries, LabelPosition};
use std::collections::BTreeSet;

/// Series shorter than this are rendered at full fidelity.
pub const DOWNSAMPLE_THRESHOLD: usize = 100;
pub const DEFAULT_TARGET_DENSITY: usize = 50;
/// Above this many labels, year-boundary labelling is attempted.
const MAX_PLAIN_LABELS: usize = 12;

/// Reduces a series to a chart-ready point set using the default layout.
///
/// See [`downsample_with_layout`].
pub fn downsample(values: &[Option<f64>], labels: &[String], target_density: usize) -> ChartSeries {
    downsample_with_layout(values, labels, target_density, ChartLayout::default())
}

/// Reduces a series to a chart-ready point set.
///
/// Short series (below [`DOWNSAMPLE_THRESHOLD`]) keep every index. Longer
/// ones keep the first and last index, the position of the global minimum
/// and maximum, and every Nth index with N = max(1, len / target_density).
///
/// Retained point `i` of `m` sits at `i / (m - 1) * inner_width + margin`
/// (a single point sits on the margin). Absent values are then dropped from
/// the rendered points rather than drawn as zero; the points around a gap
/// keep their positions.
///
/// # Arguments
///
/// * `values` - The series, `None` where there is no data
/// * `labels` - Axis labels parallel to `values`
/// * `target_density` - Roughly how many stride samples to keep; 0 is treated as 1
/// * `layout` - Horizontal geometry of the plot area
pub fn downsample_with_layout(
    values: &[Option<f64>],
    labels: &[String],
    target_density: usize,
    layout: ChartLayout,
) -> ChartSeries {
    let kept = retained_indices(values, target_density);
    let count = kept.len();
    let points = kept
        .into_iter()
        .enumerate()
        .filter_map(|(position, index)| {
            values[index]
                .filter(|v| !v.is_nan())
                .map(|value| ChartPoint {
                    index,
                    value,
                    x: x_position(position, count, &layout),
                })
        })
        .collect();

    let label_positions = label_indices(labels)
        .into_iter()
        .map(|i| LabelPosition {
            x: x_position(i, labels.len(), &layout),
            label: labels[i].clone(),
        })
        .collect();

    ChartSeries {
        points,
        label_positions,
    }
}

/// Indices of `values` to keep, ascending and without duplicates.
pub fn retained_indices(values: &[Option<f64>], target_density: usize) -> Vec<usize> {
    let len = values.len();
    if len < DOWNSAMPLE_THRESHOLD {
        return (0..len).collect();
    }

    let mut important = BTreeSet::from([0, len - 1]);
    if let Some((min_index, max_index)) = extreme_indices(values) {
        important.insert(min_index);
        important.insert(max_index);
    }

    let step = (len / target_density.max(1)).max(1);
    let strided: BTreeSet<usize> = (0..len).step_by(step).collect();

    important.union(&strided).copied().collect()
}

/// Horizontal coordinate of item `position` out of `count` evenly spaced items.
pub fn x_position(position: usize, count: usize, layout: &ChartLayout) -> f64 {
    if count <= 1 {
        return layout.margin;
    }
    position as f64 / (count - 1) as f64 * layout.inner_width + layout.margin
}

/// Picks which labels to show on the horizontal axis.
///
/// Long runs of "Mon YY" labels are marked at each year boundary, anything
/// else gets first, middle and last.
pub fn label_indices(labels: &[String]) -> Vec<usize> {
    let n = labels.len();
    if n == 0 {
        return Vec::new();
    }

    let years: Option<Vec<u32>> = labels.iter().map(|l| trailing_year(l)).collect();
    let mut selected = BTreeSet::from([0, n - 1]);
    match years {
        Some(years) if n > MAX_PLAIN_LABELS => {
            selected.extend((1..n).filter(|&i| years[i] != years[i - 1]));
        }
        _ => {
            selected.insert((n - 1) / 2);
        }
    }
    selected.into_iter().collect()
}

/// First occurrence of the global minimum and maximum present value.
fn extreme_indices(values: &[Option<f64>]) -> Option<(usize, usize)> {
    let mut present = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.filter(|v| !v.is_nan()).map(|v| (i, v)));

    let first = present.next()?;
    let (min, max) = present.fold((first, first), |(min, max), (i, v)| {
        (
            if v < min.1 { (i, v) } else { min },
            if v > max.1 { (i, v) } else { max },
        )
    });
    Some((min.0, max.0))
}

/// Two-digit year at the end of a label such as "Sep 24".
fn trailing_year(label: &str) -> Option<u32> {
    let bytes = label.trim_end().as_bytes();
    match bytes {
        [.., b' ', tens, ones] if tens.is_ascii_digit() && ones.is_ascii_digit() => {
            Some(((tens - b'0') * 10 + (ones - b'0')) as u32)
        }
        _ => None,
    }
}
