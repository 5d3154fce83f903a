pub mod rules;
pub mod states;
