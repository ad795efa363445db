/// Training datasets
pub mod dataset;
/// Named numeric feature tables
pub mod features;
/// Class labels and label frequency tables
pub mod labels;
