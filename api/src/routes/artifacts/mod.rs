pub mod artifacts_request;
pub mod save_diagram_route;
pub mod save_image_route;
