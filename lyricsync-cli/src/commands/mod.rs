pub mod convert;
pub mod record;
pub mod show;
