mod engine;
mod tests;
