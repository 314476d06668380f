// Domain layer - pure classification, arbitration and aggregation
pub mod buckets;
pub mod control;
pub mod dashboard;
pub mod distribution;
pub mod error;
pub mod export;
pub mod palette;
pub mod reading;
pub mod report;
pub mod room;
pub mod series;
pub mod severity;
pub mod table;
pub mod trend;
