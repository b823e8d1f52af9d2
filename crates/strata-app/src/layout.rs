// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub const MIN_COLUMN_WIDTH: usize = 6;
pub const MAX_COLUMN_WIDTH: usize = 60;
pub const DEFAULT_WIDTH: u16 = 120;
pub const DEFAULT_HEIGHT: u16 = 24;

const MIN_LABEL_WIDTH: usize = 12;
const MAX_LABEL_WIDTH: usize = 40;
const MIN_VALUE_WIDTH: usize = 20;
const TABLE_MARGIN: usize = 4;
const MIN_TABLE_HEIGHT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width: if width == 0 { DEFAULT_WIDTH } else { width },
            height: if height == 0 { DEFAULT_HEIGHT } else { height },
        }
    }

    pub fn frame_width(self) -> usize {
        usize::from(self.width).saturating_sub(4).max(10)
    }

    pub fn frame_height(self) -> usize {
        usize::from(self.height).saturating_sub(6).max(5)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnWidths {
    pub widths: Vec<usize>,
    pub min_widths: Vec<usize>,
}

impl ColumnWidths {
    pub fn total(&self) -> usize {
        self.widths.iter().sum()
    }
}

fn text_width(value: &str) -> usize {
    value.chars().count()
}

/// Sizes each column to its widest cell within `[6, 60]`, then shrinks the
/// widest column above its header minimum until the total fits
/// `width_limit`. A limit of zero disables shrinking.
pub fn column_widths(headers: &[String], rows: &[Vec<String>], width_limit: usize) -> ColumnWidths {
    let mut widths = Vec::with_capacity(headers.len());
    let mut min_widths = Vec::with_capacity(headers.len());

    for (index, header) in headers.iter().enumerate() {
        let header_width = text_width(header);
        let min_width = header_width.clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH);
        let widest = rows
            .iter()
            .filter_map(|row| row.get(index))
            .map(|cell| text_width(cell))
            .fold(header_width, usize::max);
        min_widths.push(min_width);
        widths.push(widest.clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH).max(min_width));
    }

    if width_limit > 0 {
        let mut total: usize = widths.iter().sum();
        while total > width_limit {
            let Some(index) = widest_above_min(&widths, &min_widths) else {
                break;
            };
            widths[index] -= 1;
            total -= 1;
        }
    }

    ColumnWidths { widths, min_widths }
}

fn widest_above_min(widths: &[usize], min_widths: &[usize]) -> Option<usize> {
    widths
        .iter()
        .zip(min_widths)
        .enumerate()
        .filter(|(_, (width, min))| width > min)
        .fold(None, |best: Option<(usize, usize)>, (index, (&width, _))| match best {
            Some((_, top)) if top >= width => best,
            _ => Some((index, width)),
        })
        .map(|(index, _)| index)
}

pub fn stretch_columns(widths: &mut [usize], available: usize) {
    if widths.is_empty() || available == 0 {
        return;
    }
    let share = (available / widths.len()).max(1);
    for width in widths.iter_mut() {
        if *width < share {
            *width = share;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailColumns {
    pub label: usize,
    pub value: usize,
}

pub fn detail_columns<'a>(
    labels: impl IntoIterator<Item = &'a str>,
    width: usize,
) -> DetailColumns {
    let widest = labels.into_iter().map(text_width).fold(10, usize::max);
    let label = (widest + 2).clamp(MIN_LABEL_WIDTH, MAX_LABEL_WIDTH);
    let width = if width == 0 { label + 40 } else { width };
    DetailColumns {
        label,
        value: width.saturating_sub(label + 4).max(MIN_VALUE_WIDTH),
    }
}

pub fn table_height(row_count: usize, terminal_height: usize, reserved: usize) -> usize {
    let target = row_count + 1;
    if terminal_height == 0 {
        return target;
    }
    let available = terminal_height
        .saturating_sub(TABLE_MARGIN + reserved)
        .max(MIN_TABLE_HEIGHT);
    target.clamp(MIN_TABLE_HEIGHT, available)
}

pub fn scroll_offset(cursor: usize, height: usize) -> usize {
    if height == 0 {
        return cursor;
    }
    (cursor + 1).saturating_sub(height)
}

#[cfg(test)]
mod tests {
    use super::{
        Viewport, column_widths, detail_columns, scroll_offset, stretch_columns, table_height,
    };

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_owned()).collect()
    }

    #[test]
    fn widths_follow_content_within_bounds() {
        let headers = strings(&["ID", "DESCRIPTION"]);
        let rows = vec![strings(&["1", &"x".repeat(80)])];
        let widths = column_widths(&headers, &rows, 0);
        assert_eq!(widths.widths, vec![6, 60]);
        assert_eq!(widths.min_widths, vec![6, 11]);
    }

    #[test]
    fn widest_column_shrinks_first() {
        let headers = strings(&["NAME", "NOTES"]);
        let rows = vec![strings(&["abcdefghij", &"y".repeat(30)])];
        let widths = column_widths(&headers, &rows, 30);
        assert_eq!(widths.widths, vec![10, 20]);

        let tight = column_widths(&headers, &rows, 5);
        assert_eq!(tight.widths, tight.min_widths);
    }

    #[test]
    fn stretch_shares_width() {
        let mut widths = vec![6, 30];
        stretch_columns(&mut widths, 40);
        assert_eq!(widths, vec![20, 30]);
    }

    #[test]
    fn detail_columns_clamp() {
        let columns = detail_columns(["id", "name"], 100);
        assert_eq!(columns.label, 12);
        assert_eq!(columns.value, 84);
        let columns = detail_columns(["a".repeat(60).as_str()], 30);
        assert_eq!(columns.label, 40);
        assert_eq!(columns.value, 20);
    }

    #[test]
    fn viewport_floors() {
        let viewport = Viewport::new(8, 4);
        assert_eq!(viewport.frame_width(), 10);
        assert_eq!(viewport.frame_height(), 5);
        assert_eq!(Viewport::new(0, 0).frame_width(), 116);
    }

    #[test]
    fn table_heights() {
        assert_eq!(table_height(50, 24, 0), 20);
        assert_eq!(table_height(1, 24, 0), 3);
        assert_eq!(table_height(50, 5, 0), 3);
        assert_eq!(table_height(5, 0, 0), 6);
        assert_eq!(scroll_offset(3, 10), 0);
        assert_eq!(scroll_offset(12, 10), 3);
    }
}
