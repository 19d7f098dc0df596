//! CSV ingestion of the source tables and writers for the output tables.

mod read;
mod write;

pub use read::{
    demand_observations, load_master_table, load_products, load_suppliers, read_records,
    read_table, revenue_records, stock_snapshots, MasterRow, MASTER_TABLE, PRODUCTS_TABLE,
    SUPPLIERS_TABLE,
};
pub use write::{
    write_forecast, write_forecast_to, write_recommendations, write_recommendations_to,
};
