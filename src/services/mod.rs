// Identity and tenancy
pub mod organizations;
pub mod users;

// Reference catalogs (customers, projects, products)
pub mod catalog;

// The estimate aggregate manager and its read-side consumer
pub mod estimates;
pub mod job_cards;

// Counts for /health and /statistics
pub mod statistics;
