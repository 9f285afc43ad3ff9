//! Variant engine domain
pub mod aggregates;
pub mod combination;
pub mod dimension;
pub mod events;
pub mod generator;
pub mod matcher;
pub mod matrix;
pub mod pipeline;
pub mod reconciler;
pub mod value_objects;
