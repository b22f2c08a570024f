//! Cart domain model: aggregate, line items, commands and events.

pub mod aggregates;
pub mod commands;
pub mod events;
pub mod line_item;
