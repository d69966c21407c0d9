pub mod outliers;
pub mod resample;
