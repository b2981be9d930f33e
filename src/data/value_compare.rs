use crate::data::value::{CellValue, ValueKind};
use std::cmp::Ordering;

/// Rank used when two values of different classes meet.
/// Order: Null < Boolean < numbers < Text/Date < List
fn kind_rank(kind: ValueKind) -> u8 {
    match kind {
        ValueKind::Null => 0,
        ValueKind::Boolean => 1,
        ValueKind::Integer | ValueKind::Float => 2,
        ValueKind::Text | ValueKind::Date => 3,
        ValueKind::List => 4,
    }
}

/// Compare two cell values: numbers numerically, strings lexically,
/// booleans false < true. Mixed classes fall back to a fixed type order.
pub fn compare_values(a: &CellValue, b: &CellValue) -> Ordering {
    match (a, b) {
        (CellValue::Integer(a), CellValue::Integer(b)) => a.cmp(b),
        // total_cmp keeps NaN ordered (after every number) so sorts stay consistent
        (CellValue::Float(a), CellValue::Float(b)) => a.total_cmp(b),
        (CellValue::Integer(i), CellValue::Float(f)) => (*i as f64).total_cmp(f),
        (CellValue::Float(f), CellValue::Integer(i)) => f.total_cmp(&(*i as f64)),

        (CellValue::Text(a), CellValue::Text(b))
        | (CellValue::Date(a), CellValue::Date(b))
        | (CellValue::Text(a), CellValue::Date(b))
        | (CellValue::Date(a), CellValue::Text(b)) => a.cmp(b),

        (CellValue::Boolean(a), CellValue::Boolean(b)) => a.cmp(b),

        (CellValue::List(a), CellValue::List(b)) => {
            for (x, y) in a.iter().zip(b.iter()) {
                let cmp = compare_values(x, y);
                if cmp != Ordering::Equal {
                    return cmp;
                }
            }
            a.len().cmp(&b.len())
        }

        (CellValue::Null, CellValue::Null) => Ordering::Equal,

        _ => kind_rank(a.kind()).cmp(&kind_rank(b.kind())),
    }
}
