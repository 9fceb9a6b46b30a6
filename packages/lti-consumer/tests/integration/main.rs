mod common;

mod configuration;
mod line_item;
