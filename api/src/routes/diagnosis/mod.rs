pub mod diagnose_route;
pub mod diagnosis_request;
pub mod index_route;
