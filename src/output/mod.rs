//! Output for people and for monitoring agents
//!
//! Adapters render to strings; the binaries own stdout.

mod mrtg;
mod summary;
mod zabbix;

pub use mrtg::MrtgReport;
pub use summary::{create_summary_formatter, display_float, ColoredSummary, PlainSummary, SummaryFormatter};
pub use zabbix::{MetricValue, ZabbixKey};
