pub mod http_test_utils;
pub mod mock_stores;
pub mod test_logging;
