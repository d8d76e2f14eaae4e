pub mod generate_route;
pub mod reset_session_route;
pub mod tutor_request;
pub mod tutor_response;
