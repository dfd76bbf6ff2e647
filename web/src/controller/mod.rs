pub(crate) mod auth_controller;
pub(crate) mod config_controller;
pub(crate) mod health_check_controller;
pub(crate) mod insight_controller;
pub(crate) mod page_controller;
pub(crate) mod search_controller;
pub(crate) mod upload_controller;
