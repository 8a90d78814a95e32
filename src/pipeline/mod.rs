pub mod aggregate;
pub mod elevation;
pub mod enrich;
pub mod filter;
pub mod normalize;
pub mod parse;
pub mod polyline;
pub mod process;
pub mod report;
