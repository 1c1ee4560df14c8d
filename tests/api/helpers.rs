pub mod test_app;
pub mod test_session;
pub mod unwritable_store;
