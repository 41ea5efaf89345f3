use log::info;

use formal_concept::{Concept, ItemSet};
use formal_context::{BinaryContext, ClosureContext, IntervalContext};

use crate::{
    CbOParams, ConstructionError, IterationSide, Parallelism, Result, TransposedContext,
    close_by_one,
};

/// Full Close-by-One construction for a concrete context.
pub trait ConceptConstruction: ClosureContext + Sized {
    fn close_by_one(
        &self,
        side: IterationSide,
        parallelism: Parallelism,
    ) -> Result<Vec<Concept<Self::Intent>>>;
}

fn objectwise<C: ClosureContext>(ctx: &C, parallelism: Parallelism) -> Result<Vec<Concept<C::Intent>>> {
    let hash = ctx.context_hash();
    let concepts = close_by_one(ctx, &CbOParams::default(), parallelism)?
        .into_iter()
        .map(|pair| {
            let extent = ItemSet::from_indices(pair.elements, ctx.object_names());
            Concept::new(extent, pair.sideset, Some(hash))
        })
        .collect();
    Ok(concepts)
}

impl ConceptConstruction for BinaryContext {
    fn close_by_one(
        &self,
        side: IterationSide,
        parallelism: Parallelism,
    ) -> Result<Vec<Concept<ItemSet>>> {
        let side = side.resolve(self.n_objects(), self.n_attributes());
        let concepts = match side {
            IterationSide::Attributes => {
                let view = TransposedContext::new(self);
                let hash = self.context_hash();
                close_by_one(&view, &CbOParams::default(), parallelism)?
                    .into_iter()
                    .map(|pair| {
                        let intent = ItemSet::from_indices(pair.elements, self.attribute_names());
                        Concept::new(pair.sideset, intent, Some(hash))
                    })
                    .collect()
            }
            _ => objectwise(self, parallelism)?,
        };
        info!(
            "close_by_one: {} concepts over {} ({}x{})",
            concepts.len(),
            side,
            self.n_objects(),
            self.n_attributes()
        );
        Ok(concepts)
    }
}

impl ConceptConstruction for IntervalContext {
    fn close_by_one(
        &self,
        side: IterationSide,
        parallelism: Parallelism,
    ) -> Result<Vec<Concept<Self::Intent>>> {
        if side == IterationSide::Attributes {
            return Err(ConstructionError::UnsupportedSide("attributes"));
        }
        let concepts = objectwise(self, parallelism)?;
        info!(
            "close_by_one: {} pattern concepts over {} objects",
            concepts.len(),
            self.n_objects()
        );
        Ok(concepts)
    }
}
