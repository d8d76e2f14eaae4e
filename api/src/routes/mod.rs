pub mod artifacts;
pub mod diagnosis;
pub mod health_route;
pub mod test_route;
pub mod tutor;
