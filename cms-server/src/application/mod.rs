pub mod account_service;
pub mod admin_service;
pub mod auth_service;
pub mod category_service;
pub mod comment_service;
pub mod password;
pub mod post_service;

#[cfg(test)]
pub(crate) mod test_support;
