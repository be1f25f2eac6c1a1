// ==========================================
// Shared integration test helpers
// ==========================================

pub mod mock_config;
pub mod test_data_builder;
