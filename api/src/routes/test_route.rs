/// Liveness probe kept for the web app's connectivity check.
pub async fn test_route() -> &'static str {
    "This is a testing message for testing purposes."
}
