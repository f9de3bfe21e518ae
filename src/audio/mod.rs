pub mod decoder;
pub mod encoder;
pub mod filter;
pub mod resample;
pub mod trim;
