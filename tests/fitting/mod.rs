mod backgrounds;
mod errors;
mod multi_peak;
mod single_peak;
