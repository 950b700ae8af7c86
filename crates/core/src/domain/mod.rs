pub mod contract;
pub mod fundamentals;
pub mod screen;
pub mod valuation;
