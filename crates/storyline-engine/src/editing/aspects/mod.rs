//! The standard aspects, in pipeline order.

pub mod fold_guard;
pub mod id_repair;
pub mod markup;
pub mod normalize;
pub mod word_count;

pub use fold_guard::FoldGuard;
pub use id_repair::IdRepair;
pub use markup::{Markup, MarkupRules};
pub use normalize::Normalize;
pub use word_count::WordCounter;

use crate::editing::pipeline::Aspect;

/// Fold guard, markup, word count, id repair, normalization.
pub fn standard(rules: MarkupRules) -> Vec<Box<dyn Aspect>> {
    vec![
        Box::new(FoldGuard),
        Box::new(Markup::new(rules)),
        Box::new(WordCounter::default()),
        Box::new(IdRepair::default()),
        Box::new(Normalize::default()),
    ]
}
