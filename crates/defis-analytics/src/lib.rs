//! Pure, synchronous views over the loaded DEFIS tables: rating profiles,
//! weighted portfolios, group reports, product lookup and revenue.

pub mod error;
pub mod groups;
pub mod kpi;
pub mod lookup;
pub mod portfolio;
pub mod profile;
pub mod revenue;

pub use error::{AnalyticsError, PortfolioError};
pub use groups::{compare_groups, group_report, list_groups, GroupComparison, GroupReport, KpiDeltas};
pub use kpi::{compute_kpis, Kpis};
pub use lookup::{
    device_options, drug_options, lookup_device, lookup_drug, DeviceKey, DeviceLookup, DrugKey,
    DrugLookup,
};
pub use portfolio::{
    aggregate, default_entries, portfolio_report, Portfolio, PortfolioEntry, PortfolioProfile,
    PortfolioReport, WeightStatus, WeightedEntry,
};
pub use profile::{raw_distribution, ProfileEntry, RatingProfile, RawDistribution};
pub use revenue::{list_labs, revenue_breakdown, RevenueBreakdown, RevenueShare};
