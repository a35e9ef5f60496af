pub mod encounter;
pub mod enemy;
