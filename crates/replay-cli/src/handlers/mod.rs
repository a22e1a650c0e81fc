pub mod backfill;
pub mod compare;
pub mod incident;
pub mod status;
