use formal_concept::{ContextHash, Description, Interval};

use crate::binary::checked_names;
use crate::hashing::ContextHasher;
use crate::{ClosureContext, ContextError, Result};

/// Many-valued context where every column is an interval pattern structure.
///
/// The intent of an object set is the per-column hull of its values. An object
/// lies in the extension of a description when each of its values falls inside
/// the matching interval.
#[derive(Clone, Debug)]
pub struct IntervalContext {
    object_names: Vec<String>,
    attribute_names: Vec<String>,
    values: Vec<Vec<f64>>,
    hash: ContextHash,
}

impl IntervalContext {
    pub fn new(
        object_names: Option<Vec<String>>,
        attribute_names: Option<Vec<String>>,
        values: Vec<Vec<f64>>,
    ) -> Result<Self> {
        let n_attributes = match (&attribute_names, values.first()) {
            (Some(names), _) => names.len(),
            (None, Some(row)) => row.len(),
            (None, None) => 0,
        };
        for (row, cells) in values.iter().enumerate() {
            if cells.len() != n_attributes {
                return Err(ContextError::RaggedRow {
                    row,
                    expected: n_attributes,
                    found: cells.len(),
                });
            }
            if let Some(column) = cells.iter().position(|v| v.is_nan()) {
                return Err(ContextError::NotANumber { row, column });
            }
        }
        let object_names = checked_names("objects", object_names, values.len(), "g")?;
        let attribute_names = checked_names("attributes", attribute_names, n_attributes, "m")?;

        let mut hasher = ContextHasher::new("interval");
        hasher.names(&object_names);
        hasher.names(&attribute_names);
        for &v in values.iter().flatten() {
            hasher.value(v);
        }

        Ok(Self {
            object_names,
            attribute_names,
            values,
            hash: hasher.finish(),
        })
    }

    pub fn value(&self, object: usize, attribute: usize) -> Option<f64> {
        self.values.get(object)?.get(attribute).copied()
    }

    fn hull(&self, objects: &[usize], attribute: usize) -> Option<Interval> {
        objects
            .iter()
            .filter_map(|&g| self.value(g, attribute))
            .fold(None, |acc: Option<Interval>, v| {
                let point = Interval::point(v).ok()?;
                Some(match acc {
                    Some(hull) => hull.hull(&point),
                    None => point,
                })
            })
    }
}

impl ClosureContext for IntervalContext {
    type Intent = Description;

    fn n_objects(&self) -> usize {
        self.object_names.len()
    }

    fn n_attributes(&self) -> usize {
        self.attribute_names.len()
    }

    fn object_names(&self) -> &[String] {
        &self.object_names
    }

    fn attribute_names(&self) -> &[String] {
        &self.attribute_names
    }

    fn intention(&self, objects: &[usize]) -> Description {
        let entries = self
            .attribute_names
            .iter()
            .enumerate()
            .map(|(m, name)| (m, name.clone(), self.hull(objects, m)));
        // indices are distinct by construction
        Description::new(entries).unwrap_or_default()
    }

    fn extension(&self, intent: &Description, base_objects: Option<&[usize]>) -> Vec<usize> {
        let all: Vec<usize>;
        let base = match base_objects {
            Some(base) => base,
            None => {
                all = (0..self.n_objects()).collect();
                &all
            }
        };
        let mut out: Vec<usize> = base
            .iter()
            .copied()
            .filter(|&g| self.values.get(g).is_some_and(|row| intent.describes(row)))
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    fn context_hash(&self) -> ContextHash {
        self.hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fruits() -> IntervalContext {
        IntervalContext::new(
            Some(vec!["apple".into(), "plum".into(), "melon".into()]),
            Some(vec!["weight".into(), "sugar".into()]),
            vec![vec![150.0, 10.0], vec![40.0, 12.0], vec![1500.0, 8.0]],
        )
        .expect("valid context")
    }

    #[test]
    fn intention_is_the_hull() {
        let ctx = fruits();
        let d = ctx.intention(&[0, 1]);
        assert_eq!(d.get(0), Some(Some(&Interval::new(40.0, 150.0).expect("interval"))));
        assert_eq!(d.get(1), Some(Some(&Interval::new(10.0, 12.0).expect("interval"))));
    }

    #[test]
    fn empty_object_set_gives_empty_descriptions() {
        let ctx = fruits();
        let d = ctx.intention(&[]);
        assert_eq!(d.len(), 2);
        assert_eq!(d.get(0), Some(None));
        assert!(ctx.extension(&d, None).is_empty());
    }

    #[test]
    fn closure_of_two_fruits() {
        let ctx = fruits();
        let closed = ctx.extension(&ctx.intention(&[0, 1]), None);
        assert_eq!(closed, vec![0, 1]);
        let wide = ctx.extension(&ctx.intention(&[1, 2]), None);
        assert_eq!(wide, vec![0, 1, 2]);
    }

    #[test]
    fn nan_values_are_rejected() {
        let err = IntervalContext::new(None, None, vec![vec![1.0, f64::NAN]]).unwrap_err();
        assert!(matches!(err, ContextError::NotANumber { row: 0, column: 1 }));
    }
}
