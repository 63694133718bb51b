pub mod engine;
pub mod protocol;
pub mod session;
pub mod apply_turn;

pub mod prompt_builder;
pub mod llm_client;

#[cfg(test)]
pub mod testing;
