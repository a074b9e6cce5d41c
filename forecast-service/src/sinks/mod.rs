pub mod readings;

pub use readings::PgReadingSink;
